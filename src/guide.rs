use crate::codec::reader::RecordReader;
use crate::codec::writer::{Fragment, RecordFragment, ToFragment};
use crate::common::{Color, Position};
use crate::error::ContextError;
use crate::object::{impl_object_runtime, FormatSpecific, ObjectMeta, ObjectRuntime};
use crate::schema::{ClassDescriptor, FieldDescriptor, FieldKind};
use crate::validator;

pub static CLASS: ClassDescriptor = ClassDescriptor {
    name: "Guide",
    compact: true,
    split_into: None,
    fields: &[
        // `pos` is the legacy name this field persists under.
        FieldDescriptor::new("position", FieldKind::Position).wire("pos"),
        FieldDescriptor::new("name", FieldKind::Str),
        FieldDescriptor::new("color", FieldKind::Color),
    ],
};

/// A guide line in a master or a glyph layer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Guide {
    position: Position,
    pub name: Option<String>,
    pub color: Option<Color>,
    pub format_specific: FormatSpecific,
    pub(crate) meta: ObjectMeta,
}

impl_object_runtime!(Guide);

impl Guide {
    pub fn new(position: Position) -> Self {
        Guide {
            position,
            ..Default::default()
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn set_position(&mut self, position: Position) {
        self.position = position;
        self.mark_dirty();
    }

    /// Alias for [`Guide::position`], matching the wire name.
    pub fn pos(&self) -> Position {
        self.position()
    }

    /// Alias for [`Guide::set_position`], matching the wire name.
    pub fn set_pos(&mut self, position: Position) {
        self.set_position(position)
    }

    pub(crate) fn from_value(value: serde_json::Value) -> Result<Self, ContextError> {
        let mut r = RecordReader::new(&CLASS, value)?;
        let position = match r.take("position") {
            Some(v) => Position::from_value(CLASS.name, "position", v)?,
            None => Position::zero(),
        };
        let name = match r.take("name") {
            Some(v) => Some(validator::expect_string(CLASS.name, "name", v)?),
            None => None,
        };
        let color = match r.take("color") {
            Some(v) => Some(Color::from_value(CLASS.name, "color", v)?),
            None => None,
        };
        let format_specific = r.finish()?;
        Ok(Guide {
            position,
            name,
            color,
            format_specific,
            meta: ObjectMeta::default(),
        })
    }
}

impl ToFragment for Guide {
    fn fragment(&self) -> RecordFragment {
        let mut rec = RecordFragment::new(&CLASS);
        rec.set("position", Fragment::Leaf(self.position.to_value()));
        if let Some(name) = &self.name {
            rec.leaf("name", name.as_str());
        }
        if let Some(color) = &self.color {
            rec.set("color", Fragment::Leaf(color.to_value()));
        }
        rec.side_channel(&self.format_specific);
        rec
    }
}
