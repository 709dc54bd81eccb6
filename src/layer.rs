use serde_json::Value;
use uuid::Uuid;

use crate::anchor::Anchor;
use crate::codec::reader::RecordReader;
use crate::codec::writer::{record_list, Fragment, RecordFragment, ToFragment};
use crate::common::{location_from_value, location_to_fragment, Color, Location};
use crate::error::ContextError;
use crate::guide::Guide;
use crate::object::{impl_object_runtime, FormatSpecific, ObjectMeta};
use crate::schema::{ClassDescriptor, FieldDescriptor, FieldKind};
use crate::shape::{Component, Path, Shape};
use crate::validator;

pub static CLASS: ClassDescriptor = ClassDescriptor {
    name: "Layer",
    compact: false,
    split_into: None,
    fields: &[
        FieldDescriptor::new("width", FieldKind::Int).default_text("0"),
        FieldDescriptor::new("height", FieldKind::Int).default_text("0"),
        FieldDescriptor::new("vert_width", FieldKind::Int).wire("vertWidth"),
        FieldDescriptor::new("name", FieldKind::Str),
        // A foreign key: the id of the master this layer belongs to.
        // Dangling values are legal until resolved.
        FieldDescriptor::new("master", FieldKind::Str).wire("_master"),
        FieldDescriptor::new("id", FieldKind::Str).default_text("generated"),
        FieldDescriptor::new("guides", FieldKind::RecordList("Guide")).one_per_line(),
        FieldDescriptor::new("shapes", FieldKind::RecordList("Shape")).one_per_line(),
        FieldDescriptor::new("anchors", FieldKind::RecordList("Anchor")),
        FieldDescriptor::new("color", FieldKind::Color),
        FieldDescriptor::new("layer_index", FieldKind::Int)
            .wire("layerIndex")
            .default_text("0"),
        FieldDescriptor::new("background", FieldKind::Str),
        FieldDescriptor::new("is_background", FieldKind::Bool)
            .wire("isBackground")
            .default_text("false"),
        FieldDescriptor::new("location", FieldKind::Location),
    ],
};

/// One design of a glyph, usually belonging to a master.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub width: i32,
    pub height: i32,
    pub vert_width: Option<i32>,
    pub name: Option<String>,
    /// The id of the master this layer belongs to. Resolved lazily; see
    /// [`crate::Font::layer_master`].
    pub master: Option<String>,
    pub id: String,
    pub guides: Vec<Guide>,
    pub shapes: Vec<Shape>,
    pub anchors: Vec<Anchor>,
    pub color: Option<Color>,
    pub layer_index: i32,
    /// The id of this layer's background layer, if it has one.
    pub background: Option<String>,
    pub is_background: bool,
    /// A sparse-layer override of the owning master's location.
    pub location: Option<Location>,
    pub format_specific: FormatSpecific,
    pub(crate) meta: ObjectMeta,
}

impl_object_runtime!(Layer);

impl Default for Layer {
    fn default() -> Self {
        Layer::new(0)
    }
}

impl Layer {
    pub fn new(width: i32) -> Self {
        Layer {
            width,
            height: 0,
            vert_width: None,
            name: None,
            master: None,
            id: Uuid::new_v4().to_string(),
            guides: vec![],
            shapes: vec![],
            anchors: vec![],
            color: None,
            layer_index: 0,
            background: None,
            is_background: false,
            location: None,
            format_specific: FormatSpecific::default(),
            meta: ObjectMeta::default(),
        }
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.shapes.iter().filter_map(|s| match s {
            Shape::Path(p) => Some(p),
            _ => None,
        })
    }

    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.shapes.iter().filter_map(|s| match s {
            Shape::Component(c) => Some(c),
            _ => None,
        })
    }

    pub fn push_path(&mut self, path: Path) {
        self.shapes.push(Shape::Path(path));
    }

    pub fn push_component(&mut self, component: Component) {
        self.shapes.push(Shape::Component(component));
    }

    pub fn anchor(&self, name: &str) -> Option<&Anchor> {
        self.anchors.iter().find(|a| a.name == name)
    }

    pub(crate) fn from_value(value: Value) -> Result<Self, ContextError> {
        let mut r = RecordReader::new(&CLASS, value)?;
        let mut layer = Layer::new(0);
        if let Some(v) = r.take("width") {
            layer.width = validator::expect_i32(CLASS.name, "width", &v)?;
        }
        if let Some(v) = r.take("height") {
            layer.height = validator::expect_i32(CLASS.name, "height", &v)?;
        }
        if let Some(v) = r.take("vert_width") {
            layer.vert_width = Some(validator::expect_i32(CLASS.name, "vert_width", &v)?);
        }
        if let Some(v) = r.take("name") {
            layer.name = Some(validator::expect_string(CLASS.name, "name", v)?);
        }
        if let Some(v) = r.take("master") {
            layer.master = Some(validator::expect_string(CLASS.name, "master", v)?);
        }
        if let Some(v) = r.take("id") {
            layer.id = validator::expect_string(CLASS.name, "id", v)?;
        }
        if let Some(v) = r.take("guides") {
            layer.guides = validator::expect_array(CLASS.name, "guides", v)?
                .into_iter()
                .map(Guide::from_value)
                .collect::<Result<_, _>>()?;
        }
        if let Some(v) = r.take("shapes") {
            layer.shapes = validator::expect_array(CLASS.name, "shapes", v)?
                .into_iter()
                .map(Shape::from_value)
                .collect::<Result<_, _>>()?;
        }
        if let Some(v) = r.take("anchors") {
            layer.anchors = validator::expect_array(CLASS.name, "anchors", v)?
                .into_iter()
                .map(Anchor::from_value)
                .collect::<Result<_, _>>()?;
        }
        if let Some(v) = r.take("color") {
            layer.color = Some(Color::from_value(CLASS.name, "color", v)?);
        }
        if let Some(v) = r.take("layer_index") {
            layer.layer_index = validator::expect_i32(CLASS.name, "layer_index", &v)?;
        }
        if let Some(v) = r.take("background") {
            layer.background = Some(validator::expect_string(CLASS.name, "background", v)?);
        }
        if let Some(v) = r.take("is_background") {
            layer.is_background = validator::expect_bool(CLASS.name, "is_background", &v)?;
        }
        if let Some(v) = r.take("location") {
            layer.location = Some(location_from_value(CLASS.name, "location", v)?);
        }
        layer.format_specific = r.finish()?;
        Ok(layer)
    }
}

impl ToFragment for Layer {
    fn fragment(&self) -> RecordFragment {
        let mut rec = RecordFragment::new(&CLASS);
        rec.leaf("width", self.width);
        if self.height != 0 {
            rec.leaf("height", self.height);
        }
        if let Some(vert_width) = self.vert_width {
            rec.leaf("vert_width", vert_width);
        }
        if let Some(name) = &self.name {
            rec.leaf("name", name.as_str());
        }
        if let Some(master) = &self.master {
            rec.leaf("master", master.as_str());
        }
        rec.leaf("id", self.id.as_str());
        if !self.guides.is_empty() {
            rec.set("guides", record_list(&self.guides));
        }
        if !self.shapes.is_empty() {
            rec.set("shapes", record_list(&self.shapes));
        }
        if !self.anchors.is_empty() {
            rec.set("anchors", record_list(&self.anchors));
        }
        if let Some(color) = &self.color {
            rec.set("color", Fragment::Leaf(color.to_value()));
        }
        if self.layer_index != 0 {
            rec.leaf("layer_index", self.layer_index);
        }
        if let Some(background) = &self.background {
            rec.leaf("background", background.as_str());
        }
        if self.is_background {
            rec.leaf("is_background", true);
        }
        if let Some(location) = &self.location {
            rec.set("location", location_to_fragment(location));
        }
        rec.side_channel(&self.format_specific);
        rec
    }
}
