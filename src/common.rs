use indexmap::IndexMap;
use serde_json::Value;
use smol_str::SmolStr;

use crate::codec::writer::{number, Fragment};
use crate::error::ContextError;
use crate::validator;

/// A four-character-style axis tag (`wght`, `wdth`, ...). Private axes may
/// use longer names; the engine does not constrain tag length.
pub type Tag = SmolStr;

/// A location in designspace: axis tag to coordinate.
pub type Location = IndexMap<Tag, f64>;

/// A position in 2D space, with an optional angle in degrees.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub angle: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, angle: f32) -> Self {
        Position { x, y, angle }
    }

    pub fn zero() -> Position {
        Position::default()
    }

    pub(crate) fn to_value(&self) -> Value {
        Value::Array(vec![
            number(self.x as f64),
            number(self.y as f64),
            number(self.angle as f64),
        ])
    }

    pub(crate) fn from_value(
        class: &'static str,
        field: &'static str,
        value: Value,
    ) -> Result<Self, ContextError> {
        let items = validator::expect_array(class, field, value)?;
        if items.len() < 2 || items.len() > 3 {
            return Err(ContextError::Validation {
                class,
                field,
                value: format!("an array of {} elements", items.len()),
                constraint: "an [x, y] or [x, y, angle] array".to_string(),
            });
        }
        let mut coords = [0.0f32; 3];
        for (slot, item) in coords.iter_mut().zip(items.iter()) {
            *slot = validator::expect_f64(class, field, item)? as f32;
        }
        Ok(Position {
            x: coords[0],
            y: coords[1],
            angle: coords[2],
        })
    }
}

/// An RGBA color with 0-255 channels.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Color {
    pub r: i32,
    pub g: i32,
    pub b: i32,
    pub a: i32,
}

impl Color {
    pub(crate) fn to_value(&self) -> Value {
        Value::Array(vec![
            Value::from(self.r),
            Value::from(self.g),
            Value::from(self.b),
            Value::from(self.a),
        ])
    }

    pub(crate) fn from_value(
        class: &'static str,
        field: &'static str,
        value: Value,
    ) -> Result<Self, ContextError> {
        let items = validator::expect_array(class, field, value)?;
        if items.len() < 3 || items.len() > 4 {
            return Err(ContextError::Validation {
                class,
                field,
                value: format!("an array of {} elements", items.len()),
                constraint: "an [r, g, b] or [r, g, b, a] array".to_string(),
            });
        }
        let mut channels = [0i32; 4];
        for (slot, item) in channels.iter_mut().zip(items.iter()) {
            *slot = validator::expect_i32(class, field, item)?;
        }
        Ok(Color {
            r: channels[0],
            g: channels[1],
            b: channels[2],
            a: channels[3],
        })
    }
}

/// Direction of text flow.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    LeftToRight,
    RightToLeft,
    TopToBottom,
    Bidi,
}

pub(crate) const DIRECTIONS: &[&str] = &["LTR", "RTL", "TTB", "bidi"];

impl Direction {
    pub fn code(&self) -> &'static str {
        match self {
            Direction::LeftToRight => "LTR",
            Direction::RightToLeft => "RTL",
            Direction::TopToBottom => "TTB",
            Direction::Bidi => "bidi",
        }
    }

    pub fn from_code(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ltr" | "lefttoright" => Some(Direction::LeftToRight),
            "rtl" | "righttoleft" => Some(Direction::RightToLeft),
            "ttb" | "toptobottom" => Some(Direction::TopToBottom),
            "bidi" => Some(Direction::Bidi),
            _ => None,
        }
    }
}

/// A font-wide value to be placed in an OpenType table on export,
/// overriding the compiler's default.
#[derive(Debug, Clone, PartialEq)]
pub struct OTValue {
    pub table: String,
    pub field: String,
    pub value: Value,
}

pub(crate) fn location_to_fragment(location: &Location) -> Fragment {
    Fragment::map(
        location
            .iter()
            .map(|(tag, coord)| (tag.to_string(), Fragment::Leaf(number(*coord))))
            .collect(),
    )
}

pub(crate) fn location_from_value(
    class: &'static str,
    field: &'static str,
    value: Value,
) -> Result<Location, ContextError> {
    let map = validator::expect_object(class, field, value)?;
    let mut location = Location::default();
    for (tag, coord) in map {
        location.insert(SmolStr::new(&tag), validator::expect_f64(class, field, &coord)?);
    }
    Ok(location)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use serde_json::json;

    #[test]
    fn test_position_accepts_two_or_three_coordinates() {
        let short = Position::from_value("Guide", "position", json!([10, 20])).unwrap();
        assert_eq!(short, Position::new(10.0, 20.0, 0.0));
        let full = Position::from_value("Guide", "position", json!([10, 20, 45.0])).unwrap();
        assert_eq!(full.angle, 45.0);
        assert!(Position::from_value("Guide", "position", json!([10])).is_err());
    }

    #[test]
    fn test_integral_coordinates_stay_integral_on_the_wire() {
        assert_eq!(Position::new(100.0, 200.0, 90.0).to_value(), json!([100, 200, 90]));
    }

    #[test]
    fn test_direction_codes() {
        assert_eq!(Direction::from_code("RTL"), Some(Direction::RightToLeft));
        assert_eq!(Direction::from_code("righttoleft"), Some(Direction::RightToLeft));
        assert_eq!(Direction::from_code("sideways"), None);
        assert_eq!(Direction::default().code(), "LTR");
    }

    #[test]
    fn test_location_round_trip() {
        let value = json!({"wght": 400, "wdth": 87.5});
        let loc = location_from_value("Master", "location", value).unwrap();
        assert_eq!(loc.get("wght"), Some(&400.0));
        assert_eq!(loc.get("wdth"), Some(&87.5));
    }
}
