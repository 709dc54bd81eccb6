use std::collections::HashMap;

use serde_json::Value;
use smol_str::SmolStr;

use crate::codec::reader::RecordReader;
use crate::codec::writer::{record_list, Fragment, RecordFragment, ToFragment};
use crate::common::{Direction, DIRECTIONS};
use crate::error::ContextError;
use crate::layer::Layer;
use crate::object::{impl_object_runtime, FormatSpecific, ObjectMeta, ObjectRuntime, Owner};
use crate::schema::{ClassDescriptor, FieldDescriptor, FieldKind};
use crate::validator;

pub static CLASS: ClassDescriptor = ClassDescriptor {
    name: "Glyph",
    compact: false,
    split_into: Some("glyphs.json"),
    fields: &[
        FieldDescriptor::new("name", FieldKind::Str).required(),
        FieldDescriptor::new("production_name", FieldKind::Str),
        FieldDescriptor::new("category", FieldKind::Str).default_text("base"),
        FieldDescriptor::new("codepoints", FieldKind::CodepointList),
        FieldDescriptor::new("layers", FieldKind::RecordList("Layer")).one_per_line(),
        FieldDescriptor::new("exported", FieldKind::Bool).default_text("true"),
        FieldDescriptor::new("direction", FieldKind::Str)
            .allowed(DIRECTIONS)
            .default_text("LTR"),
    ],
};

/// A glyph and its layers.
///
/// The name is the glyph's key in the font's glyph collection, so it is
/// read-only here; rename through [`GlyphList::rename`], which re-keys the
/// collection atomically.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    name: SmolStr,
    pub production_name: Option<String>,
    pub category: SmolStr,
    pub codepoints: Vec<u32>,
    pub layers: Vec<Layer>,
    pub exported: bool,
    pub direction: Direction,
    pub format_specific: FormatSpecific,
    pub(crate) meta: ObjectMeta,
}

impl_object_runtime!(Glyph);

impl Glyph {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Glyph {
            name: name.into(),
            production_name: None,
            category: SmolStr::new("base"),
            codepoints: vec![],
            layers: vec![],
            exported: true,
            direction: Direction::default(),
            format_specific: FormatSpecific::default(),
            meta: ObjectMeta::default(),
        }
    }

    pub fn name(&self) -> &SmolStr {
        &self.name
    }

    pub fn layer(&self, id: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id == id)
    }

    pub fn layer_mut(&mut self, id: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    pub(crate) fn from_value(value: Value) -> Result<Self, ContextError> {
        let mut r = RecordReader::new(&CLASS, value)?;
        let name = validator::expect_string(CLASS.name, "name", r.required("name")?)?;
        let mut glyph = Glyph::new(name);
        if let Some(v) = r.take("production_name") {
            glyph.production_name =
                Some(validator::expect_string(CLASS.name, "production_name", v)?);
        }
        if let Some(v) = r.take("category") {
            glyph.category = SmolStr::new(&validator::expect_string(CLASS.name, "category", v)?);
        }
        if let Some(v) = r.take("codepoints") {
            glyph.codepoints = validator::expect_array(CLASS.name, "codepoints", v)?
                .iter()
                .map(|cp| validator::expect_u32(CLASS.name, "codepoints", cp))
                .collect::<Result<_, _>>()?;
        }
        if let Some(v) = r.take("layers") {
            glyph.layers = validator::expect_array(CLASS.name, "layers", v)?
                .into_iter()
                .map(Layer::from_value)
                .collect::<Result<_, _>>()?;
        }
        if let Some(v) = r.take("exported") {
            glyph.exported = validator::expect_bool(CLASS.name, "exported", &v)?;
        }
        if let Some(v) = r.take("direction") {
            let code = validator::expect_member(CLASS.name, "direction", v, DIRECTIONS)?;
            glyph.direction = Direction::from_code(&code).ok_or(ContextError::Validation {
                class: CLASS.name,
                field: "direction",
                value: code,
                constraint: "a writing direction".to_string(),
            })?;
        }
        glyph.format_specific = r.finish()?;
        Ok(glyph)
    }
}

impl ToFragment for Glyph {
    fn fragment(&self) -> RecordFragment {
        let mut rec = RecordFragment::new(&CLASS);
        rec.leaf("name", self.name.as_str());
        if let Some(production_name) = &self.production_name {
            rec.leaf("production_name", production_name.as_str());
        }
        if self.category != "base" {
            rec.leaf("category", self.category.as_str());
        }
        if !self.codepoints.is_empty() {
            rec.set(
                "codepoints",
                Fragment::list(
                    self.codepoints
                        .iter()
                        .map(|cp| Fragment::Leaf(Value::from(*cp)))
                        .collect(),
                ),
            );
        }
        if !self.layers.is_empty() {
            rec.set("layers", record_list(&self.layers));
        }
        if !self.exported {
            rec.leaf("exported", false);
        }
        if self.direction != Direction::default() {
            rec.leaf("direction", self.direction.code());
        }
        rec.side_channel(&self.format_specific);
        rec
    }
}

/// The font's glyph collection: insertion-ordered, with O(1) lookup by
/// glyph name. The set of indexed names is always exactly the set of names
/// of the contained glyphs.
#[derive(Debug, Clone, Default)]
pub struct GlyphList {
    glyphs: Vec<Glyph>,
    index: HashMap<SmolStr, usize>,
}

static COLLECTION: &str = "glyphs";

impl GlyphList {
    pub fn new() -> Self {
        GlyphList::default()
    }

    /// Append a glyph, failing if one of the same name is already present.
    pub fn append(&mut self, mut glyph: Glyph) -> Result<(), ContextError> {
        if self.index.contains_key(&glyph.name) {
            return Err(ContextError::DuplicateKey {
                collection: COLLECTION,
                key: glyph.name.to_string(),
            });
        }
        glyph.meta.attach(Owner::Font);
        self.index.insert(glyph.name.clone(), self.glyphs.len());
        self.glyphs.push(glyph);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Glyph, ContextError> {
        self.index
            .get(name)
            .and_then(|ix| self.glyphs.get(*ix))
            .ok_or_else(|| not_found(name))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut Glyph, ContextError> {
        match self.index.get(name) {
            Some(ix) => self.glyphs.get_mut(*ix).ok_or_else(|| not_found(name)),
            None => Err(not_found(name)),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Remove a glyph by name, re-indexing subsequent positions.
    pub fn remove(&mut self, name: &str) -> Result<Glyph, ContextError> {
        let ix = *self.index.get(name).ok_or_else(|| not_found(name))?;
        let glyph = self.glyphs.remove(ix);
        self.reindex();
        Ok(glyph)
    }

    /// Remove a glyph by position, re-indexing subsequent positions.
    pub fn remove_at(&mut self, position: usize) -> Result<Glyph, ContextError> {
        if position >= self.glyphs.len() {
            return Err(ContextError::NotFound {
                collection: COLLECTION,
                key: position.to_string(),
            });
        }
        let glyph = self.glyphs.remove(position);
        self.reindex();
        Ok(glyph)
    }

    /// Rename a glyph, re-keying the index atomically.
    pub fn rename(&mut self, old: &str, new: impl Into<SmolStr>) -> Result<(), ContextError> {
        let new = new.into();
        let ix = *self.index.get(old).ok_or_else(|| not_found(old))?;
        if new != old && self.index.contains_key(&new) {
            return Err(ContextError::DuplicateKey {
                collection: COLLECTION,
                key: new.to_string(),
            });
        }
        self.index.remove(old);
        self.index.insert(new.clone(), ix);
        if let Some(glyph) = self.glyphs.get_mut(ix) {
            glyph.name = new;
            glyph.mark_dirty();
        }
        Ok(())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Glyph> {
        self.glyphs.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Glyph> {
        self.glyphs.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    fn reindex(&mut self) {
        self.index = self
            .glyphs
            .iter()
            .enumerate()
            .map(|(ix, g)| (g.name.clone(), ix))
            .collect();
    }
}

impl PartialEq for GlyphList {
    fn eq(&self, other: &Self) -> bool {
        self.glyphs == other.glyphs
    }
}

impl<'a> IntoIterator for &'a GlyphList {
    type Item = &'a Glyph;
    type IntoIter = std::slice::Iter<'a, Glyph>;
    fn into_iter(self) -> Self::IntoIter {
        self.glyphs.iter()
    }
}

fn not_found(name: &str) -> ContextError {
    ContextError::NotFound {
        collection: COLLECTION,
        key: name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_append_rejects_duplicates() {
        let mut glyphs = GlyphList::new();
        glyphs.append(Glyph::new("A")).unwrap();
        let err = glyphs.append(Glyph::new("A")).unwrap_err();
        assert!(matches!(err, ContextError::DuplicateKey { key, .. } if key == "A"));
    }

    #[test]
    fn test_lookup_returns_the_appended_glyph() {
        let mut glyphs = GlyphList::new();
        let mut a = Glyph::new("A");
        a.codepoints = vec![0x41];
        glyphs.append(a).unwrap();
        glyphs.append(Glyph::new("B")).unwrap();
        assert_eq!(glyphs.get("A").unwrap().codepoints, vec![0x41]);
    }

    #[test]
    fn test_removal_then_lookup_fails() {
        let mut glyphs = GlyphList::new();
        glyphs.append(Glyph::new("A")).unwrap();
        glyphs.append(Glyph::new("B")).unwrap();
        glyphs.remove("A").unwrap();
        assert!(matches!(
            glyphs.get("A").unwrap_err(),
            ContextError::NotFound { key, .. } if key == "A"
        ));
        // B was re-indexed.
        assert_eq!(glyphs.get("B").unwrap().name(), "B");
        assert_eq!(glyphs.len(), 1);
    }

    #[test]
    fn test_remove_at_reindexes() {
        let mut glyphs = GlyphList::new();
        for name in ["A", "B", "C"] {
            glyphs.append(Glyph::new(name)).unwrap();
        }
        glyphs.remove_at(0).unwrap();
        assert_eq!(glyphs.iter().map(|g| g.name().as_str()).collect::<Vec<_>>(), ["B", "C"]);
        assert!(glyphs.get("C").is_ok());
        assert!(glyphs.remove_at(5).is_err());
    }

    #[test]
    fn test_rename_rekeys_atomically() {
        let mut glyphs = GlyphList::new();
        glyphs.append(Glyph::new("A")).unwrap();
        glyphs.append(Glyph::new("B")).unwrap();
        glyphs.rename("A", "A.alt").unwrap();
        assert!(glyphs.get("A").is_err());
        assert_eq!(glyphs.get("A.alt").unwrap().name(), "A.alt");
        assert!(matches!(
            glyphs.rename("A.alt", "B").unwrap_err(),
            ContextError::DuplicateKey { .. }
        ));
    }

    #[test]
    fn test_appended_glyphs_are_owned_by_the_font() {
        let mut glyphs = GlyphList::new();
        glyphs.append(Glyph::new("A")).unwrap();
        assert_eq!(glyphs.get("A").unwrap().owner(), Some(&Owner::Font));
    }

    #[test]
    fn test_missing_name_is_a_missing_field() {
        let err = Glyph::from_value(serde_json::json!({"category": "mark"})).unwrap_err();
        assert!(matches!(
            err,
            ContextError::MissingField { class: "Glyph", field: "name" }
        ));
    }
}
