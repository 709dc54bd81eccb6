//! Structural-type and allowed-value checks.
//!
//! Pure functions from (class, field, candidate value) to a typed value or
//! a [`ContextError::Validation`]. The record reader runs these on every
//! load; the typed API makes most invalid states unrepresentable at
//! construction time, so both paths end up enforcing the same constraints.

use serde_json::{Map, Value};

use crate::error::ContextError;

/// Render a candidate value for an error message, truncated to keep errors
/// readable when the value is a large subtree.
fn summarize(value: &Value) -> String {
    let mut s = value.to_string();
    if s.len() > 60 {
        s.truncate(57);
        s.push_str("...");
    }
    s
}

pub(crate) fn type_error(
    class: &'static str,
    field: &'static str,
    value: &Value,
    expected: &str,
) -> ContextError {
    ContextError::Validation {
        class,
        field,
        value: summarize(value),
        constraint: expected.to_string(),
    }
}

pub(crate) fn expect_object(
    class: &'static str,
    field: &'static str,
    value: Value,
) -> Result<Map<String, Value>, ContextError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(type_error(class, field, &other, "a JSON object")),
    }
}

pub(crate) fn expect_array(
    class: &'static str,
    field: &'static str,
    value: Value,
) -> Result<Vec<Value>, ContextError> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(type_error(class, field, &other, "a JSON array")),
    }
}

pub(crate) fn expect_string(
    class: &'static str,
    field: &'static str,
    value: Value,
) -> Result<String, ContextError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(type_error(class, field, &other, "a string")),
    }
}

pub(crate) fn expect_bool(
    class: &'static str,
    field: &'static str,
    value: &Value,
) -> Result<bool, ContextError> {
    value
        .as_bool()
        .ok_or_else(|| type_error(class, field, value, "a boolean"))
}

pub(crate) fn expect_i64(
    class: &'static str,
    field: &'static str,
    value: &Value,
) -> Result<i64, ContextError> {
    value
        .as_i64()
        .ok_or_else(|| type_error(class, field, value, "an integer"))
}

pub(crate) fn expect_i32(
    class: &'static str,
    field: &'static str,
    value: &Value,
) -> Result<i32, ContextError> {
    expect_i64(class, field, value)?
        .try_into()
        .map_err(|_| type_error(class, field, value, "a 32-bit integer"))
}

pub(crate) fn expect_u16(
    class: &'static str,
    field: &'static str,
    value: &Value,
) -> Result<u16, ContextError> {
    expect_i64(class, field, value)?
        .try_into()
        .map_err(|_| type_error(class, field, value, "an integer between 0 and 65535"))
}

pub(crate) fn expect_u32(
    class: &'static str,
    field: &'static str,
    value: &Value,
) -> Result<u32, ContextError> {
    value
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| type_error(class, field, value, "an unsigned 32-bit integer"))
}

pub(crate) fn expect_f64(
    class: &'static str,
    field: &'static str,
    value: &Value,
) -> Result<f64, ContextError> {
    value
        .as_f64()
        .ok_or_else(|| type_error(class, field, value, "a number"))
}

/// Allowed-value-set membership for enumerated string fields.
pub(crate) fn expect_member(
    class: &'static str,
    field: &'static str,
    value: Value,
    allowed: &'static [&'static str],
) -> Result<String, ContextError> {
    let s = expect_string(class, field, value)?;
    if allowed.contains(&s.as_str()) {
        Ok(s)
    } else {
        Err(ContextError::Validation {
            class,
            field,
            value: format!("\"{}\"", s),
            constraint: format!("one of {}", allowed.join(", ")),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_structural_mismatch_names_the_field() {
        let err = expect_array("Layer", "shapes", json!("oops")).unwrap_err();
        match err {
            ContextError::Validation { class, field, .. } => {
                assert_eq!(class, "Layer");
                assert_eq!(field, "shapes");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_member_check() {
        assert!(expect_member("Node", "type", json!("cs"), &["c", "cs"]).is_ok());
        assert!(expect_member("Node", "type", json!("z"), &["c", "cs"]).is_err());
    }

    #[test]
    fn test_floats_accept_integer_literals() {
        assert_eq!(expect_f64("Axis", "min", &json!(400)).unwrap(), 400.0);
    }

    #[test]
    fn test_long_values_are_truncated_in_errors() {
        let big = json!("x".repeat(200));
        let err = expect_i64("Font", "upm", &big).unwrap_err();
        assert!(err.to_string().len() < 160);
    }
}
