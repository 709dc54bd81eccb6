//! Reading and writing the persisted form: a bundle directory holding the
//! primary document (`info.json`, the font minus its glyph collection) and
//! the glyph collection document (`glyphs.json`), linked by naming
//! convention.

pub(crate) mod reader;
pub(crate) mod writer;

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use indexmap::IndexMap;
use serde_json::Value;

use crate::error::ContextError;
use crate::font::Font;
use crate::glyph::Glyph;
use crate::object::{ObjectRuntime, Owner};
use crate::shape::Shape;
use crate::validator;
use self::writer::{render_document, Fragment, ToFragment};

/// The document holding everything except the glyph collection.
pub static PRIMARY_DOCUMENT: &str = "info.json";

fn glyphs_document() -> &'static str {
    crate::glyph::CLASS.split_into.unwrap_or("glyphs.json")
}

/// Serialize a font to its document set, keyed by document name.
pub fn serialize(font: &Font) -> Result<IndexMap<String, String>, ContextError> {
    let mut documents = IndexMap::new();
    documents.insert(
        PRIMARY_DOCUMENT.to_string(),
        render(PRIMARY_DOCUMENT, &Fragment::Record(font.fragment()))?,
    );
    let glyphs = Fragment::List {
        one_per_line: true,
        items: font
            .glyphs
            .iter()
            .map(|g| Fragment::Record(g.fragment()))
            .collect(),
    };
    documents.insert(
        glyphs_document().to_string(),
        render(glyphs_document(), &glyphs)?,
    );
    log::debug!(
        "Serialized font: {} glyphs, {} masters",
        font.glyphs.len(),
        font.masters.len()
    );
    Ok(documents)
}

/// Rebuild a font from its document set.
///
/// The whole load fails on the first malformed document or validation
/// error; a partially-constructed graph is never returned.
pub fn deserialize(documents: &IndexMap<String, String>) -> Result<Font, ContextError> {
    let info = parse_document(documents, PRIMARY_DOCUMENT)?;
    let mut font = Font::from_value(info)?;

    let glyphs = parse_document(documents, glyphs_document())?;
    for glyph in validator::expect_array("Font", "glyphs", glyphs)? {
        font.glyphs.append(Glyph::from_value(glyph)?)?;
    }

    font.validate()?;
    wire_owners(&mut font);
    font.mark_all_clean();
    log::debug!(
        "Deserialized font: {} glyphs, {} masters",
        font.glyphs.len(),
        font.masters.len()
    );
    Ok(font)
}

/// Load a font from a `.contextfont` bundle directory.
pub fn load(path: impl Into<PathBuf>) -> Result<Font, ContextError> {
    let path = path.into();
    let mut documents = IndexMap::new();
    documents.insert(
        PRIMARY_DOCUMENT.to_string(),
        fs::read_to_string(path.join(PRIMARY_DOCUMENT))?,
    );
    let glyphs_path = path.join(glyphs_document());
    let glyphs = fs::read_to_string(&glyphs_path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            // The primary document implies a glyph collection; a missing
            // side document is a broken reference, not an IO failure.
            ContextError::MalformedDocument {
                path: glyphs_path.clone(),
                reason: "unresolved split-file reference".to_string(),
            }
        } else {
            ContextError::Io(e)
        }
    })?;
    documents.insert(glyphs_document().to_string(), glyphs);
    let mut font = deserialize(&documents)?;
    font.source = Some(path);
    Ok(font)
}

/// Save a font as a `.contextfont` bundle directory.
pub fn save(font: &Font, path: impl Into<PathBuf>) -> Result<(), ContextError> {
    let path = path.into();
    let documents = serialize(font)?;
    fs::create_dir_all(&path)?;
    for (name, body) in &documents {
        fs::write(path.join(name), body)?;
    }
    Ok(())
}

fn render(name: &str, fragment: &Fragment) -> Result<String, ContextError> {
    render_document(fragment).map_err(|e| ContextError::MalformedDocument {
        path: PathBuf::from(name),
        reason: e.to_string(),
    })
}

fn parse_document(
    documents: &IndexMap<String, String>,
    name: &str,
) -> Result<Value, ContextError> {
    let source = documents
        .get(name)
        .ok_or_else(|| ContextError::MalformedDocument {
            path: PathBuf::from(name),
            reason: "document missing from set".to_string(),
        })?;
    serde_json::from_str(source).map_err(|e| ContextError::MalformedDocument {
        path: PathBuf::from(name),
        reason: e.to_string(),
    })
}

/// Attach owner back-references throughout a freshly built graph.
fn wire_owners(font: &mut Font) {
    for axis in &mut font.axes {
        axis.meta.attach(Owner::Font);
    }
    for instance in &mut font.instances {
        instance.custom_names.meta.attach(Owner::Instance);
        instance.meta.attach(Owner::Font);
    }
    for master in &mut font.masters {
        let id = master.id.clone();
        for guide in &mut master.guides {
            guide.meta.attach(Owner::Master { id: id.clone() });
        }
        master.meta.attach(Owner::Font);
    }
    for glyph in font.glyphs.iter_mut() {
        let name = glyph.name().clone();
        for layer in &mut glyph.layers {
            let layer_id = layer.id.clone();
            for shape in &mut layer.shapes {
                if let Shape::Path(path) = shape {
                    for node in &mut path.nodes {
                        node.meta.attach(Owner::Shape);
                    }
                }
                shape.meta_mut().attach(Owner::Layer {
                    id: layer_id.clone(),
                });
            }
            for anchor in &mut layer.anchors {
                anchor.meta.attach(Owner::Layer {
                    id: layer_id.clone(),
                });
            }
            for guide in &mut layer.guides {
                guide.meta.attach(Owner::Layer {
                    id: layer_id.clone(),
                });
            }
            layer.meta.attach(Owner::Glyph { name: name.clone() });
        }
        glyph.meta.attach(Owner::Font);
    }
    font.names.meta.attach(Owner::Font);
    font.features.meta.attach(Owner::Font);
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::master::Master;
    use pretty_assertions::assert_eq;

    fn minimal_font() -> Font {
        let mut font = Font::new();
        font.masters.push(Master::new("Regular", "M1"));
        font
    }

    #[test]
    fn test_document_set_has_primary_and_glyphs() {
        let documents = serialize(&minimal_font()).unwrap();
        assert!(documents.contains_key("info.json"));
        assert!(documents.contains_key("glyphs.json"));
    }

    #[test]
    fn test_missing_glyph_document_is_malformed() {
        let mut documents = serialize(&minimal_font()).unwrap();
        documents.shift_remove("glyphs.json");
        assert!(matches!(
            deserialize(&documents).unwrap_err(),
            ContextError::MalformedDocument { .. }
        ));
    }

    #[test]
    fn test_bad_json_is_malformed() {
        let mut documents = serialize(&minimal_font()).unwrap();
        documents.insert("info.json".to_string(), "{not json".to_string());
        assert!(matches!(
            deserialize(&documents).unwrap_err(),
            ContextError::MalformedDocument { .. }
        ));
    }

    #[test]
    fn test_owners_are_wired_on_load() {
        let mut font = minimal_font();
        font.glyphs.append(Glyph::new("A")).unwrap();
        let documents = serialize(&font).unwrap();
        let loaded = deserialize(&documents).unwrap();
        assert_eq!(loaded.masters[0].owner(), Some(&Owner::Font));
        assert_eq!(loaded.glyphs.get("A").unwrap().owner(), Some(&Owner::Font));
    }

    #[test]
    fn test_loaded_fonts_start_clean() {
        let documents = serialize(&minimal_font()).unwrap();
        let loaded = deserialize(&documents).unwrap();
        assert!(!loaded.is_dirty());
        assert!(!loaded.masters[0].is_dirty());
    }
}
