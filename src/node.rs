use serde_json::Value;

use crate::error::ContextError;
use crate::object::{impl_object_runtime, FormatSpecific, ObjectMeta};
use crate::schema::{ClassDescriptor, FieldDescriptor, FieldKind};
use crate::validator;

/// The eight permitted wire codes: a kind letter with an optional trailing
/// `s` marking a smooth on-curve point.
pub const NODE_TYPE_CODES: &[&str] = &["o", "os", "c", "cs", "l", "ls", "q", "qs"];

pub static CLASS: ClassDescriptor = ClassDescriptor {
    name: "Node",
    compact: true,
    split_into: None,
    fields: &[
        FieldDescriptor::new("x", FieldKind::Int).required(),
        FieldDescriptor::new("y", FieldKind::Int).required(),
        FieldDescriptor::new("type", FieldKind::Str)
            .required()
            .allowed(NODE_TYPE_CODES),
    ],
};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum NodeType {
    OffCurve,
    Curve,
    Line,
    QCurve,
}

/// An on- or off-curve point. On the wire a node is the array
/// `[x, y, type]`, with an optional fourth element carrying the side
/// channel.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub x: i32,
    pub y: i32,
    pub nodetype: NodeType,
    pub smooth: bool,
    pub format_specific: FormatSpecific,
    pub(crate) meta: ObjectMeta,
}

impl_object_runtime!(Node);

impl Node {
    pub fn new(x: i32, y: i32, nodetype: NodeType, smooth: bool) -> Self {
        Node {
            x,
            y,
            nodetype,
            smooth,
            format_specific: FormatSpecific::default(),
            meta: ObjectMeta::default(),
        }
    }

    pub fn line(x: i32, y: i32) -> Self {
        Node::new(x, y, NodeType::Line, false)
    }

    pub fn curve(x: i32, y: i32) -> Self {
        Node::new(x, y, NodeType::Curve, false)
    }

    pub fn off_curve(x: i32, y: i32) -> Self {
        Node::new(x, y, NodeType::OffCurve, false)
    }

    pub fn type_code(&self) -> &'static str {
        match (self.nodetype, self.smooth) {
            (NodeType::OffCurve, false) => "o",
            (NodeType::OffCurve, true) => "os",
            (NodeType::Curve, false) => "c",
            (NodeType::Curve, true) => "cs",
            (NodeType::Line, false) => "l",
            (NodeType::Line, true) => "ls",
            (NodeType::QCurve, false) => "q",
            (NodeType::QCurve, true) => "qs",
        }
    }

    pub fn parse_type_code(code: &str) -> Result<(NodeType, bool), ContextError> {
        match code {
            "o" => Ok((NodeType::OffCurve, false)),
            "os" => Ok((NodeType::OffCurve, true)),
            "c" => Ok((NodeType::Curve, false)),
            "cs" => Ok((NodeType::Curve, true)),
            "l" => Ok((NodeType::Line, false)),
            "ls" => Ok((NodeType::Line, true)),
            "q" => Ok((NodeType::QCurve, false)),
            "qs" => Ok((NodeType::QCurve, true)),
            other => Err(ContextError::Validation {
                class: CLASS.name,
                field: "type",
                value: format!("\"{}\"", other),
                constraint: format!("one of {}", NODE_TYPE_CODES.join(", ")),
            }),
        }
    }

    pub(crate) fn to_value(&self) -> Value {
        let mut items = vec![
            Value::from(self.x),
            Value::from(self.y),
            Value::from(self.type_code()),
        ];
        if !self.format_specific.is_empty() {
            items.push(self.format_specific.to_value());
        }
        Value::Array(items)
    }

    pub(crate) fn from_value(value: Value) -> Result<Self, ContextError> {
        let items = validator::expect_array(CLASS.name, "node", value)?;
        let x = match items.first() {
            Some(v) => validator::expect_i32(CLASS.name, "x", v)?,
            None => return Err(missing("x")),
        };
        let y = match items.get(1) {
            Some(v) => validator::expect_i32(CLASS.name, "y", v)?,
            None => return Err(missing("y")),
        };
        let code = match items.get(2) {
            Some(Value::String(s)) => s.clone(),
            Some(other) => return Err(validator::type_error(CLASS.name, "type", other, "a string")),
            None => return Err(missing("type")),
        };
        let (nodetype, smooth) = Node::parse_type_code(&code)?;
        let mut node = Node::new(x, y, nodetype, smooth);
        if let Some(extra) = items.get(3) {
            let map = validator::expect_object(CLASS.name, "_", extra.clone())?;
            node.format_specific = FormatSpecific(map);
        }
        if items.len() > 4 {
            return Err(ContextError::Validation {
                class: CLASS.name,
                field: "node",
                value: format!("an array of {} elements", items.len()),
                constraint: "at most [x, y, type, data]".to_string(),
            });
        }
        Ok(node)
    }
}

fn missing(field: &'static str) -> ContextError {
    ContextError::MissingField {
        class: CLASS.name,
        field,
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("o", NodeType::OffCurve, false)]
    #[case("os", NodeType::OffCurve, true)]
    #[case("c", NodeType::Curve, false)]
    #[case("cs", NodeType::Curve, true)]
    #[case("l", NodeType::Line, false)]
    #[case("ls", NodeType::Line, true)]
    #[case("q", NodeType::QCurve, false)]
    #[case("qs", NodeType::QCurve, true)]
    fn test_type_codes(#[case] code: &str, #[case] nodetype: NodeType, #[case] smooth: bool) {
        assert_eq!(Node::parse_type_code(code).unwrap(), (nodetype, smooth));
        assert_eq!(Node::new(0, 0, nodetype, smooth).type_code(), code);
    }

    #[test]
    fn test_invalid_type_code() {
        let err = Node::parse_type_code("z").unwrap_err();
        assert!(matches!(
            err,
            ContextError::Validation { class: "Node", field: "type", .. }
        ));
    }

    #[test]
    fn test_missing_coordinates() {
        assert!(matches!(
            Node::from_value(json!([])).unwrap_err(),
            ContextError::MissingField { field: "x", .. }
        ));
        assert!(matches!(
            Node::from_value(json!([1])).unwrap_err(),
            ContextError::MissingField { field: "y", .. }
        ));
        assert!(matches!(
            Node::from_value(json!([1, 2])).unwrap_err(),
            ContextError::MissingField { field: "type", .. }
        ));
    }

    #[test]
    fn test_side_channel_rides_as_fourth_element() {
        let node = Node::from_value(json!([10, -5, "ls", {"com.example": 1}])).unwrap();
        assert_eq!(node.x, 10);
        assert_eq!(node.y, -5);
        assert!(node.smooth);
        assert_eq!(node.to_value(), json!([10, -5, "ls", {"com.example": 1}]));
    }

    #[test]
    fn test_plain_node_round_trip() {
        let node = Node::line(100, 200);
        assert_eq!(Node::from_value(node.to_value()).unwrap(), node);
    }
}
