use serde_json::Value;
use smol_str::SmolStr;

use crate::codec::reader::RecordReader;
use crate::codec::writer::{number, Fragment, RecordFragment, ToFragment};
use crate::error::ContextError;
use crate::node::Node;
use crate::object::{impl_object_runtime, FormatSpecific, ObjectMeta, ObjectRuntime};
use crate::schema::{ClassDescriptor, FieldDescriptor, FieldKind};
use crate::validator;

pub static PATH_CLASS: ClassDescriptor = ClassDescriptor {
    name: "Path",
    compact: true,
    split_into: None,
    fields: &[
        FieldDescriptor::new("nodes", FieldKind::NodeList),
        FieldDescriptor::new("closed", FieldKind::Bool).default_text("true"),
        FieldDescriptor::new("direction", FieldKind::Int)
            .allowed(&["-1", "1"])
            .default_text("1"),
    ],
};

pub static COMPONENT_CLASS: ClassDescriptor = ClassDescriptor {
    name: "Component",
    compact: true,
    split_into: None,
    fields: &[
        FieldDescriptor::new("ref", FieldKind::Str).required(),
        FieldDescriptor::new("transform", FieldKind::Transform).default_text("identity"),
    ],
};

/// Winding direction of a path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PathDirection {
    /// Wire value 1.
    #[default]
    Clockwise,
    /// Wire value -1.
    CounterClockwise,
}

impl PathDirection {
    pub fn to_wire(self) -> i64 {
        match self {
            PathDirection::Clockwise => 1,
            PathDirection::CounterClockwise => -1,
        }
    }

    fn from_wire(value: &Value) -> Result<Self, ContextError> {
        match validator::expect_i64("Shape", "direction", value)? {
            1 => Ok(PathDirection::Clockwise),
            -1 => Ok(PathDirection::CounterClockwise),
            other => Err(ContextError::Validation {
                class: "Shape",
                field: "direction",
                value: other.to_string(),
                constraint: "-1 or 1".to_string(),
            }),
        }
    }
}

/// An outline drawn directly in a layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    pub nodes: Vec<Node>,
    pub closed: bool,
    pub direction: PathDirection,
    pub format_specific: FormatSpecific,
    pub(crate) meta: ObjectMeta,
}

impl Path {
    pub fn new() -> Self {
        Path {
            closed: true,
            ..Default::default()
        }
    }
}

/// A reference to another glyph's outline, with an affine transform.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub reference: SmolStr,
    pub transform: kurbo::Affine,
    pub format_specific: FormatSpecific,
    pub(crate) meta: ObjectMeta,
}

impl_object_runtime!(Path, Component);

impl Component {
    pub fn new(reference: impl Into<SmolStr>) -> Self {
        Component {
            reference: reference.into(),
            transform: kurbo::Affine::IDENTITY,
            format_specific: FormatSpecific::default(),
            meta: ObjectMeta::default(),
        }
    }

    /// The translation part of the transform.
    pub fn position(&self) -> (f64, f64) {
        let [_, _, _, _, dx, dy] = self.transform.as_coeffs();
        (dx, dy)
    }

    /// The rotation of the transform, in degrees.
    pub fn angle(&self) -> f64 {
        let [a, b, _, _, _, _] = self.transform.as_coeffs();
        b.atan2(a).to_degrees()
    }

    /// The (x, y) scale factors of the transform.
    pub fn scale(&self) -> (f64, f64) {
        let [a, b, c, d, _, _] = self.transform.as_coeffs();
        ((a * a + c * c).sqrt(), (b * b + d * d).sqrt())
    }
}

/// A shape in a glyph layer.
///
/// On the wire the two modes share one record type, distinguished by the
/// presence of `ref`; the distinction is resolved once, here, so nothing
/// downstream has to sniff fields.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Path(Path),
    Component(Component),
}

impl Shape {
    pub fn is_path(&self) -> bool {
        matches!(self, Shape::Path(_))
    }

    pub fn is_component(&self) -> bool {
        matches!(self, Shape::Component(_))
    }

    pub(crate) fn from_value(value: Value) -> Result<Self, ContextError> {
        let is_component = value
            .as_object()
            .map(|m| m.contains_key("ref"))
            .unwrap_or(false);
        if is_component {
            let mut r = RecordReader::new(&COMPONENT_CLASS, value)?;
            let reference = validator::expect_string(
                COMPONENT_CLASS.name,
                "ref",
                r.required("ref")?,
            )?;
            let transform = match r.take("transform") {
                Some(v) => transform_from_value(&v)?,
                None => kurbo::Affine::IDENTITY,
            };
            let format_specific = r.finish()?;
            Ok(Shape::Component(Component {
                reference: SmolStr::new(&reference),
                transform,
                format_specific,
                meta: ObjectMeta::default(),
            }))
        } else {
            let mut r = RecordReader::new(&PATH_CLASS, value)?;
            let nodes = match r.take("nodes") {
                Some(v) => validator::expect_array(PATH_CLASS.name, "nodes", v)?
                    .into_iter()
                    .map(Node::from_value)
                    .collect::<Result<Vec<Node>, ContextError>>()?,
                None => vec![],
            };
            let closed = match r.take("closed") {
                Some(v) => validator::expect_bool(PATH_CLASS.name, "closed", &v)?,
                None => true,
            };
            let direction = match r.take("direction") {
                Some(v) => PathDirection::from_wire(&v)?,
                None => PathDirection::default(),
            };
            let format_specific = r.finish()?;
            Ok(Shape::Path(Path {
                nodes,
                closed,
                direction,
                format_specific,
                meta: ObjectMeta::default(),
            }))
        }
    }
}

impl ObjectRuntime for Shape {
    fn meta(&self) -> &ObjectMeta {
        match self {
            Shape::Path(p) => &p.meta,
            Shape::Component(c) => &c.meta,
        }
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        match self {
            Shape::Path(p) => &mut p.meta,
            Shape::Component(c) => &mut c.meta,
        }
    }
}

impl ToFragment for Shape {
    fn fragment(&self) -> RecordFragment {
        match self {
            Shape::Path(path) => {
                let mut rec = RecordFragment::new(&PATH_CLASS);
                rec.set(
                    "nodes",
                    Fragment::list(
                        path.nodes
                            .iter()
                            .map(|n| Fragment::Leaf(n.to_value()))
                            .collect(),
                    ),
                );
                if !path.closed {
                    rec.leaf("closed", false);
                }
                if path.direction != PathDirection::default() {
                    rec.leaf("direction", path.direction.to_wire());
                }
                rec.side_channel(&path.format_specific);
                rec
            }
            Shape::Component(component) => {
                let mut rec = RecordFragment::new(&COMPONENT_CLASS);
                rec.leaf("ref", component.reference.as_str());
                if component.transform != kurbo::Affine::IDENTITY {
                    rec.set(
                        "transform",
                        Fragment::Leaf(Value::Array(
                            component
                                .transform
                                .as_coeffs()
                                .iter()
                                .map(|c| number(*c))
                                .collect(),
                        )),
                    );
                }
                rec.side_channel(&component.format_specific);
                rec
            }
        }
    }
}

fn transform_from_value(value: &Value) -> Result<kurbo::Affine, ContextError> {
    let items = validator::expect_array(COMPONENT_CLASS.name, "transform", value.clone())?;
    if items.len() != 6 {
        return Err(ContextError::Validation {
            class: COMPONENT_CLASS.name,
            field: "transform",
            value: format!("an array of {} elements", items.len()),
            constraint: "a six-number affine matrix".to_string(),
        });
    }
    let mut coeffs = [0.0f64; 6];
    for (slot, item) in coeffs.iter_mut().zip(items.iter()) {
        *slot = validator::expect_f64(COMPONENT_CLASS.name, "transform", item)?;
    }
    Ok(kurbo::Affine::new(coeffs))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::codec::writer::render_document;
    use serde_json::json;

    #[test]
    fn test_ref_presence_selects_component_mode() {
        let shape = Shape::from_value(json!({"ref": "A"})).unwrap();
        assert!(shape.is_component());
        let shape = Shape::from_value(json!({"nodes": [[0, 0, "l"]]})).unwrap();
        assert!(shape.is_path());
    }

    #[test]
    fn test_direction_constraint() {
        let err = Shape::from_value(json!({"nodes": [], "direction": 0})).unwrap_err();
        assert!(matches!(
            err,
            ContextError::Validation { field: "direction", .. }
        ));
        let shape = Shape::from_value(json!({"nodes": [], "direction": -1})).unwrap();
        match shape {
            Shape::Path(p) => assert_eq!(p.direction, PathDirection::CounterClockwise),
            _ => panic!("expected a path"),
        }
    }

    #[test]
    fn test_component_transform_round_trip() {
        let mut component = Component::new("acutecomb");
        component.transform = kurbo::Affine::translate((87.0, 0.0));
        let rendered =
            render_document(&Fragment::Record(Shape::Component(component.clone()).fragment()))
                .unwrap();
        let reparsed = Shape::from_value(serde_json::from_str(&rendered).unwrap()).unwrap();
        assert_eq!(reparsed, Shape::Component(component));
    }

    #[test]
    fn test_identity_transform_is_omitted() {
        let rendered =
            render_document(&Fragment::Record(Shape::Component(Component::new("A")).fragment()))
                .unwrap();
        assert!(!rendered.contains("transform"));
    }

    #[test]
    fn test_shapes_render_on_one_line() {
        let path = Path {
            nodes: vec![Node::line(0, 0), Node::line(100, 0), Node::line(100, 100)],
            closed: true,
            direction: PathDirection::default(),
            format_specific: FormatSpecific::default(),
            meta: ObjectMeta::default(),
        };
        let rendered = render_document(&Fragment::Record(Shape::Path(path).fragment())).unwrap();
        assert!(!rendered.trim_end().contains('\n'));
    }

    #[test]
    fn test_component_decomposition_accessors() {
        let mut component = Component::new("A");
        component.transform = kurbo::Affine::translate((10.0, 20.0));
        assert_eq!(component.position(), (10.0, 20.0));
        assert_eq!(component.scale(), (1.0, 1.0));
        assert_eq!(component.angle(), 0.0);
    }
}
