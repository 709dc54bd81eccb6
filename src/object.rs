//! Shared runtime state carried by every entity: the dirty flag, the
//! non-owning owner back-reference, and the format-specific side channel.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smol_str::SmolStr;

/// Identifies the container an entity is attached to.
///
/// This is a relation, not an ownership edge: it is set by the owning
/// container (or the deserializer) when the entity is attached, it is never
/// serialized, and it does not keep anything alive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    Font,
    Master { id: String },
    Glyph { name: SmolStr },
    Layer { id: String },
    Instance,
    Shape,
}

/// Per-entity runtime state. Compares equal to any other `ObjectMeta` so
/// that structural equality of entities ignores transient state.
#[derive(Debug, Clone, Default)]
pub struct ObjectMeta {
    dirty: bool,
    owner: Option<Owner>,
}

impl PartialEq for ObjectMeta {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl ObjectMeta {
    pub(crate) fn attach(&mut self, owner: Owner) {
        self.owner = Some(owner);
    }
}

/// Uniform access to the shared runtime state of any entity.
pub trait ObjectRuntime {
    fn meta(&self) -> &ObjectMeta;
    fn meta_mut(&mut self) -> &mut ObjectMeta;

    fn is_dirty(&self) -> bool {
        self.meta().dirty
    }

    fn mark_dirty(&mut self) {
        self.meta_mut().dirty = true;
    }

    fn mark_clean(&mut self) {
        self.meta_mut().dirty = false;
    }

    fn owner(&self) -> Option<&Owner> {
        self.meta().owner.as_ref()
    }
}

macro_rules! impl_object_runtime {
    ($($t:ty),+ $(,)?) => {
        $(
            impl crate::object::ObjectRuntime for $t {
                fn meta(&self) -> &crate::object::ObjectMeta {
                    &self.meta
                }
                fn meta_mut(&mut self) -> &mut crate::object::ObjectMeta {
                    &mut self.meta
                }
            }
        )+
    };
}
pub(crate) use impl_object_runtime;

/// The side channel: arbitrary format-specific data attached to an entity.
///
/// Font tooling may store anything it wants preserved across a load/modify/
/// save cycle under a namespaced (reverse-domain) key, e.g. `com.example`.
/// The engine round-trips the contents verbatim as parsed JSON values and
/// never interprets them. On the wire this map lives under the reserved `_`
/// key; unknown top-level keys on an entity are folded into it at load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormatSpecific(pub(crate) Map<String, Value>);

impl FormatSpecific {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub(crate) fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Probe {
        meta: ObjectMeta,
    }
    impl_object_runtime!(Probe);

    #[test]
    fn test_dirty_flag() {
        let mut p = Probe {
            meta: ObjectMeta::default(),
        };
        assert!(!p.is_dirty());
        p.mark_dirty();
        assert!(p.is_dirty());
        p.mark_clean();
        assert!(!p.is_dirty());
    }

    #[test]
    fn test_meta_is_invisible_to_equality() {
        let clean = ObjectMeta::default();
        let mut dirty = ObjectMeta::default();
        dirty.dirty = true;
        dirty.attach(Owner::Font);
        assert_eq!(clean, dirty);
    }

    #[test]
    fn test_format_specific_round_trips_nested_values() {
        let mut fs = FormatSpecific::default();
        fs.insert("com.example.tool", json!({"grid": [1, 2, 3], "snap": true}));
        let clone = fs.clone();
        assert_eq!(fs, clone);
        assert_eq!(
            fs.get("com.example.tool").and_then(|v| v.get("snap")),
            Some(&json!(true))
        );
    }
}
