use std::fmt::{Debug, Formatter};

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::ContextError;
use crate::validator;

static DFLT: &str = "dflt";

/// A locale-keyed, insertion-ordered string mapping.
///
/// Used by every localizable field. The reserved locale `dflt` marks the
/// unlocalized default. Equality ignores insertion order, which is required
/// for round-trip idempotence testing; serialization order follows
/// insertion order for deterministic output.
#[derive(Default, Clone, PartialEq, Eq)]
pub struct I18NDictionary(pub IndexMap<String, String>);

impl I18NDictionary {
    pub fn new() -> Self {
        I18NDictionary::default()
    }

    pub fn with_default(s: impl Into<String>) -> Self {
        let mut inst = I18NDictionary::new();
        inst.set_default(s);
        inst
    }

    /// The `dflt` entry if present, else the first inserted entry.
    pub fn get_default(&self) -> Option<&String> {
        self.0.get(DFLT).or_else(|| self.0.values().next())
    }

    pub fn set_default(&mut self, s: impl Into<String>) {
        self.0.insert(DFLT.to_string(), s.into());
    }

    pub fn insert(&mut self, locale: impl Into<String>, s: impl Into<String>) {
        self.0.insert(locale.into(), s.into());
    }

    /// Exact-locale lookup.
    pub fn get(&self, locale: &str) -> Option<&str> {
        self.0.get(locale).map(|s| s.as_str())
    }

    /// Exact-locale lookup, falling back to the given locale on a miss.
    pub fn lookup(&self, locale: &str, fallback: Option<&str>) -> Option<&str> {
        self.get(locale)
            .or_else(|| fallback.and_then(|f| self.get(f)))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The wire form: a bare string when only the `dflt` entry is present,
    /// else a locale-keyed object. Maps keyed by real locales are never
    /// collapsed, so the collapse is lossless.
    pub(crate) fn to_value(&self) -> Value {
        if self.0.len() == 1 {
            if let Some(s) = self.0.get(DFLT) {
                return Value::String(s.clone());
            }
        }
        Value::Object(
            self.0
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect(),
        )
    }

    pub(crate) fn from_value(
        class: &'static str,
        field: &'static str,
        value: Value,
    ) -> Result<Self, ContextError> {
        match value {
            Value::String(s) => Ok(I18NDictionary::with_default(s)),
            Value::Object(map) => {
                let mut dict = I18NDictionary::new();
                for (locale, v) in map {
                    match v {
                        Value::String(s) => dict.insert(locale, s),
                        other => {
                            return Err(validator::type_error(
                                class,
                                field,
                                &other,
                                "a string for every locale",
                            ))
                        }
                    }
                }
                Ok(dict)
            }
            other => Err(validator::type_error(
                class,
                field,
                &other,
                "a string or a map of locale to string",
            )),
        }
    }
}

impl Debug for I18NDictionary {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        fmt.write_str("<")?;
        if let Some(def) = self.get_default() {
            fmt.write_str(def)?;
        } else {
            fmt.write_str("no default")?;
        }
        fmt.write_str(">")
    }
}

impl From<String> for I18NDictionary {
    fn from(val: String) -> Self {
        I18NDictionary::with_default(val)
    }
}

impl From<&str> for I18NDictionary {
    fn from(val: &str) -> Self {
        I18NDictionary::with_default(val)
    }
}

impl From<&String> for I18NDictionary {
    fn from(val: &String) -> Self {
        I18NDictionary::with_default(val.to_string())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fallback_resolution() {
        let mut name = I18NDictionary::new();
        name.insert("en", "Regular");
        assert_eq!(name.lookup("fr", Some("en")), Some("Regular"));
        assert_eq!(name.lookup("fr", None), None);
        assert_eq!(name.lookup("en", None), Some("Regular"));
    }

    #[test]
    fn test_default_falls_back_to_first_entry() {
        let mut name = I18NDictionary::new();
        name.insert("de", "Fett");
        name.insert("en", "Bold");
        assert_eq!(name.get_default().unwrap(), "Fett");
        name.set_default("Bold");
        assert_eq!(name.get_default().unwrap(), "Bold");
    }

    #[test]
    fn test_equality_ignores_insertion_order() {
        let mut a = I18NDictionary::new();
        a.insert("en", "Bold");
        a.insert("de", "Fett");
        let mut b = I18NDictionary::new();
        b.insert("de", "Fett");
        b.insert("en", "Bold");
        assert_eq!(a, b);
    }

    #[test]
    fn test_only_dflt_collapses_to_bare_string() {
        assert_eq!(I18NDictionary::with_default("Thin").to_value(), json!("Thin"));
        let mut localized = I18NDictionary::new();
        localized.insert("en", "Thin");
        assert_eq!(localized.to_value(), json!({"en": "Thin"}));
    }

    #[test]
    fn test_wire_forms_round_trip() {
        for value in [json!("Black"), json!({"en": "Black", "ja": "ブラック"})] {
            let dict = I18NDictionary::from_value("Master", "name", value).unwrap();
            let again =
                I18NDictionary::from_value("Master", "name", dict.to_value()).unwrap();
            assert_eq!(dict, again);
        }
    }

    #[test]
    fn test_non_string_locale_value_is_rejected() {
        let err =
            I18NDictionary::from_value("Master", "name", json!({"en": 3})).unwrap_err();
        assert!(matches!(err, ContextError::Validation { .. }));
    }
}
