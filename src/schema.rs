//! The static field registry.
//!
//! Every entity type declares its fields once, as a [`ClassDescriptor`]
//! holding a table of [`FieldDescriptor`]s. The codec walks these tables to
//! decide emission order, wire-name aliasing, default omission and layout;
//! the record reader uses them to resolve aliases and enforce required
//! fields. Documentation generators may reflect over [`REGISTRY`] (the
//! descriptors serialize to JSON) but can never mutate entities through it.

use serde::Serialize;

/// The semantic type of a field, for reflection and documentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldKind {
    Int,
    Float,
    Bool,
    Str,
    /// A locale-keyed localizable string map.
    I18n,
    /// A `"%Y-%m-%d %H:%M:%S"` timestamp.
    Date,
    /// A two-element `[major, minor]` integer array.
    Version,
    /// An `[x, y, angle]` triple.
    Position,
    /// An `[r, g, b, a]` quadruple.
    Color,
    /// A six-number affine transformation matrix.
    Transform,
    /// An axis-tag to coordinate mapping.
    Location,
    /// A list of Unicode codepoints.
    CodepointList,
    /// A list of `[x, y, type]` node arrays.
    NodeList,
    /// An ordered list of `[tag, code]` pairs.
    FeatureList,
    /// A string-keyed mapping with scalar values.
    Map,
    /// A group-name to name-list mapping.
    GroupMap,
    /// A list of records of the named class.
    RecordList(&'static str),
    /// A single nested record of the named class.
    Record(&'static str),
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldDescriptor {
    /// The public (API) name of the field.
    pub name: &'static str,
    /// The name the field persists under. Equal to `name` unless aliased.
    pub wire: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub localizable: bool,
    /// Serialize list/map contents with one element per line.
    pub one_per_line: bool,
    /// Permitted wire values, where the field is enumerated.
    pub allowed: Option<&'static [&'static str]>,
    /// Display form of the default value, if the field has one.
    pub default: Option<&'static str>,
}

impl FieldDescriptor {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        FieldDescriptor {
            name,
            wire: name,
            kind,
            required: false,
            localizable: false,
            one_per_line: false,
            allowed: None,
            default: None,
        }
    }

    pub const fn wire(mut self, wire: &'static str) -> Self {
        self.wire = wire;
        self
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn localizable(mut self) -> Self {
        self.localizable = true;
        self
    }

    pub const fn one_per_line(mut self) -> Self {
        self.one_per_line = true;
        self
    }

    pub const fn allowed(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed = Some(allowed);
        self
    }

    pub const fn default_text(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct ClassDescriptor {
    pub name: &'static str,
    /// Render instances of this class with no embedded line breaks.
    pub compact: bool,
    /// Persist this class's collection into a separate document.
    pub split_into: Option<&'static str>,
    pub fields: &'static [FieldDescriptor],
}

impl ClassDescriptor {
    pub fn field(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The wire name for a public field name (identity for unknown fields).
    pub fn wire_name(&self, name: &'static str) -> &'static str {
        match self.field(name) {
            Some(f) => f.wire,
            None => name,
        }
    }
}

/// Every class in the schema, for read-only reflection.
pub static REGISTRY: &[&ClassDescriptor] = &[
    &crate::font::CLASS,
    &crate::master::CLASS,
    &crate::glyph::CLASS,
    &crate::layer::CLASS,
    &crate::shape::PATH_CLASS,
    &crate::shape::COMPONENT_CLASS,
    &crate::node::CLASS,
    &crate::anchor::CLASS,
    &crate::guide::CLASS,
    &crate::axis::CLASS,
    &crate::instance::CLASS,
    &crate::names::CLASS,
    &crate::features::CLASS,
];

/// Look up a class descriptor by name.
pub fn class(name: &str) -> Option<&'static ClassDescriptor> {
    REGISTRY.iter().find(|c| c.name == name).copied()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_alias_lookup() {
        let guide = class("Guide").unwrap();
        assert_eq!(guide.wire_name("position"), "pos");
        assert_eq!(guide.wire_name("name"), "name");
    }

    #[test]
    fn test_registry_reflects_constraints() {
        let node = class("Node").unwrap();
        let nodetype = node.field("type").unwrap();
        assert!(nodetype.required);
        assert_eq!(nodetype.allowed.unwrap().len(), 8);
    }

    #[test]
    fn test_registry_serializes_for_doc_tooling() {
        let dumped = serde_json::to_value(REGISTRY).unwrap();
        let classes = dumped.as_array().unwrap();
        assert_eq!(classes.len(), REGISTRY.len());
        assert!(classes.iter().any(|c| c["name"] == "Font"));
    }
}
