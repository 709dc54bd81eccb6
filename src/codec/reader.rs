//! The deserialization half of the codec.
//!
//! A [`RecordReader`] wraps one parsed JSON object and hands fields out by
//! their public names, resolving wire aliases through the class descriptor
//! and enforcing required-field presence. Whatever is left when an entity
//! has taken all its declared fields — the reserved `_` key plus any
//! unrecognized keys — becomes the entity's side channel.

use serde_json::{Map, Value};

use crate::error::ContextError;
use crate::object::FormatSpecific;
use crate::schema::ClassDescriptor;
use crate::validator;

#[derive(Debug)]
pub(crate) struct RecordReader {
    class: &'static ClassDescriptor,
    map: Map<String, Value>,
    taken: Vec<&'static str>,
}

impl RecordReader {
    pub fn new(class: &'static ClassDescriptor, value: Value) -> Result<Self, ContextError> {
        let map = match value {
            Value::Object(map) => map,
            other => {
                return Err(validator::type_error(
                    class.name,
                    "record",
                    &other,
                    "a JSON object",
                ))
            }
        };
        Ok(RecordReader {
            class,
            map,
            taken: Vec::new(),
        })
    }

    pub fn class_name(&self) -> &'static str {
        self.class.name
    }

    /// Take a field by its public name. The wire name is tried first; the
    /// public name is also accepted, keeping the alias table bidirectional.
    pub fn take(&mut self, field: &'static str) -> Option<Value> {
        let wire = self.class.wire_name(field);
        for key in [wire, field] {
            if let Some(value) = self.map.get(key) {
                if !self.taken.contains(&key) {
                    self.taken.push(key);
                    return Some(value.clone());
                }
            }
        }
        None
    }

    pub fn required(&mut self, field: &'static str) -> Result<Value, ContextError> {
        self.take(field).ok_or(ContextError::MissingField {
            class: self.class.name,
            field,
        })
    }

    /// Collect everything not claimed by the schema into the side channel.
    pub fn finish(self) -> Result<FormatSpecific, ContextError> {
        let mut out = Map::new();
        if let Some(reserved) = self.map.get("_") {
            match reserved {
                Value::Object(inner) => {
                    for (k, v) in inner {
                        out.insert(k.clone(), v.clone());
                    }
                }
                other => {
                    return Err(validator::type_error(
                        self.class.name,
                        "_",
                        other,
                        "a JSON object",
                    ))
                }
            }
        }
        for (key, value) in &self.map {
            if key == "_" || self.taken.iter().any(|t| t == key) {
                continue;
            }
            out.insert(key.clone(), value.clone());
        }
        Ok(FormatSpecific(out))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use serde_json::json;

    fn reader(value: Value) -> RecordReader {
        RecordReader::new(&crate::guide::CLASS, value).unwrap()
    }

    #[test]
    fn test_wire_name_resolution() {
        let mut r = reader(json!({"pos": [1, 2, 0]}));
        assert_eq!(r.take("position"), Some(json!([1, 2, 0])));
    }

    #[test]
    fn test_public_name_also_accepted() {
        let mut r = reader(json!({"position": [1, 2, 0]}));
        assert_eq!(r.take("position"), Some(json!([1, 2, 0])));
    }

    #[test]
    fn test_missing_required_field() {
        let mut r = RecordReader::new(&crate::master::CLASS, json!({"name": "Regular"})).unwrap();
        let err = r.required("id").unwrap_err();
        assert!(matches!(
            err,
            ContextError::MissingField { class: "Master", field: "id" }
        ));
    }

    #[test]
    fn test_unknown_keys_fold_into_side_channel() {
        let mut r = reader(json!({
            "pos": [1, 2, 0],
            "com.example.snap": true,
            "_": {"com.example.grid": 8}
        }));
        r.take("position");
        let fs = r.finish().unwrap();
        assert_eq!(fs.get("com.example.snap"), Some(&json!(true)));
        assert_eq!(fs.get("com.example.grid"), Some(&json!(8)));
        assert_eq!(fs.len(), 2);
    }

    #[test]
    fn test_non_object_record_is_structural_error() {
        let err = RecordReader::new(&crate::guide::CLASS, json!([1, 2])).unwrap_err();
        assert!(matches!(err, ContextError::Validation { .. }));
    }
}
