use smol_str::SmolStr;

use crate::codec::reader::RecordReader;
use crate::codec::writer::{RecordFragment, ToFragment};
use crate::error::ContextError;
use crate::object::{impl_object_runtime, FormatSpecific, ObjectMeta};
use crate::schema::{ClassDescriptor, FieldDescriptor, FieldKind};
use crate::validator;

pub static CLASS: ClassDescriptor = ClassDescriptor {
    name: "Anchor",
    compact: true,
    split_into: None,
    fields: &[
        FieldDescriptor::new("name", FieldKind::Str),
        FieldDescriptor::new("x", FieldKind::Int).default_text("0"),
        FieldDescriptor::new("y", FieldKind::Int).default_text("0"),
    ],
};

/// An attachment point in a glyph layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Anchor {
    pub name: SmolStr,
    pub x: i32,
    pub y: i32,
    pub format_specific: FormatSpecific,
    pub(crate) meta: ObjectMeta,
}

impl_object_runtime!(Anchor);

impl Anchor {
    pub fn new(name: impl Into<SmolStr>, x: i32, y: i32) -> Self {
        Anchor {
            name: name.into(),
            x,
            y,
            ..Default::default()
        }
    }

    /// Anchors whose name starts with an underscore are mark attachment
    /// anchors.
    pub fn is_mark_anchor(&self) -> bool {
        self.name.starts_with('_')
    }

    pub(crate) fn from_value(value: serde_json::Value) -> Result<Self, ContextError> {
        let mut r = RecordReader::new(&CLASS, value)?;
        let name = match r.take("name") {
            Some(v) => SmolStr::new(&validator::expect_string(CLASS.name, "name", v)?),
            None => SmolStr::default(),
        };
        let x = match r.take("x") {
            Some(v) => validator::expect_i32(CLASS.name, "x", &v)?,
            None => 0,
        };
        let y = match r.take("y") {
            Some(v) => validator::expect_i32(CLASS.name, "y", &v)?,
            None => 0,
        };
        let format_specific = r.finish()?;
        Ok(Anchor {
            name,
            x,
            y,
            format_specific,
            meta: ObjectMeta::default(),
        })
    }
}

impl ToFragment for Anchor {
    fn fragment(&self) -> RecordFragment {
        let mut rec = RecordFragment::new(&CLASS);
        rec.leaf("name", self.name.as_str());
        rec.leaf("x", self.x);
        rec.leaf("y", self.y);
        rec.side_channel(&self.format_specific);
        rec
    }
}
