#![deny(clippy::unwrap_used, clippy::expect_used)]

//! An object model for the Context-JSON font interchange format, and the
//! engine that moves it to and from disk with full round-trip fidelity.

mod anchor;
mod axis;
mod codec;
mod common;
mod error;
mod features;
mod font;
mod glyph;
mod guide;
mod i18ndictionary;
mod instance;
mod layer;
mod master;
mod metrics;
mod names;
mod node;
mod object;
pub mod schema;
mod shape;
mod validator;

pub use crate::{
    anchor::Anchor,
    axis::Axis,
    codec::{deserialize, load, save, serialize, PRIMARY_DOCUMENT},
    common::{Color, Direction, Location, OTValue, Position, Tag},
    error::ContextError,
    features::Features,
    font::Font,
    glyph::{Glyph, GlyphList},
    guide::Guide,
    i18ndictionary::I18NDictionary,
    instance::Instance,
    layer::Layer,
    master::Master,
    metrics::MetricType,
    node::{Node, NodeType},
    object::{FormatSpecific, ObjectRuntime, Owner},
    shape::{Component, Path, PathDirection, Shape},
};
