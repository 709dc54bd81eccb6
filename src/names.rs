use serde_json::Value;

use crate::codec::reader::RecordReader;
use crate::codec::writer::{Fragment, RecordFragment, ToFragment};
use crate::error::ContextError;
use crate::i18ndictionary::I18NDictionary;
use crate::object::{impl_object_runtime, FormatSpecific, ObjectMeta};
use crate::schema::{ClassDescriptor, FieldDescriptor, FieldKind};

const fn name_field(name: &'static str, wire: &'static str) -> FieldDescriptor {
    FieldDescriptor::new(name, FieldKind::I18n).wire(wire).localizable()
}

pub static CLASS: ClassDescriptor = ClassDescriptor {
    name: "Names",
    compact: false,
    split_into: None,
    fields: &[
        name_field("family_name", "familyName"),
        name_field("style_name", "styleName"),
        name_field("copyright", "copyright"),
        name_field("style_map_family_name", "styleMapFamilyName"),
        name_field("style_map_style_name", "styleMapStyleName"),
        name_field("unique_id", "uniqueID"),
        name_field("full_name", "fullName"),
        name_field("version", "version"),
        name_field("postscript_name", "postscriptName"),
        name_field("trademark", "trademark"),
        name_field("manufacturer", "manufacturer"),
        name_field("designer", "designer"),
        name_field("description", "description"),
        name_field("manufacturer_url", "manufacturerURL"),
        name_field("designer_url", "designerURL"),
        name_field("license", "license"),
        name_field("license_url", "licenseURL"),
        name_field("typographic_family", "typographicFamily"),
        name_field("typographic_subfamily", "typographicSubfamily"),
        name_field("compatible_full_name", "compatibleFullName"),
        name_field("sample_text", "sampleText"),
        name_field("wws_family_name", "WWSFamilyName"),
        name_field("wws_subfamily_name", "WWSSubfamilyName"),
    ],
};

/// The table of global, localizable names for a font (or for an instance,
/// via its `customNames`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Names {
    pub family_name: I18NDictionary,
    pub style_name: I18NDictionary,
    pub copyright: I18NDictionary,
    pub style_map_family_name: I18NDictionary,
    pub style_map_style_name: I18NDictionary,
    pub unique_id: I18NDictionary,
    pub full_name: I18NDictionary,
    pub version: I18NDictionary,
    pub postscript_name: I18NDictionary,
    pub trademark: I18NDictionary,
    pub manufacturer: I18NDictionary,
    pub designer: I18NDictionary,
    pub description: I18NDictionary,
    pub manufacturer_url: I18NDictionary,
    pub designer_url: I18NDictionary,
    pub license: I18NDictionary,
    pub license_url: I18NDictionary,
    pub typographic_family: I18NDictionary,
    pub typographic_subfamily: I18NDictionary,
    pub compatible_full_name: I18NDictionary,
    pub sample_text: I18NDictionary,
    pub wws_family_name: I18NDictionary,
    pub wws_subfamily_name: I18NDictionary,
    pub format_specific: FormatSpecific,
    pub(crate) meta: ObjectMeta,
}

impl_object_runtime!(Names);

impl Names {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every name field, in declaration order.
    pub fn fields(&self) -> [(&'static str, &I18NDictionary); 23] {
        [
            ("family_name", &self.family_name),
            ("style_name", &self.style_name),
            ("copyright", &self.copyright),
            ("style_map_family_name", &self.style_map_family_name),
            ("style_map_style_name", &self.style_map_style_name),
            ("unique_id", &self.unique_id),
            ("full_name", &self.full_name),
            ("version", &self.version),
            ("postscript_name", &self.postscript_name),
            ("trademark", &self.trademark),
            ("manufacturer", &self.manufacturer),
            ("designer", &self.designer),
            ("description", &self.description),
            ("manufacturer_url", &self.manufacturer_url),
            ("designer_url", &self.designer_url),
            ("license", &self.license),
            ("license_url", &self.license_url),
            ("typographic_family", &self.typographic_family),
            ("typographic_subfamily", &self.typographic_subfamily),
            ("compatible_full_name", &self.compatible_full_name),
            ("sample_text", &self.sample_text),
            ("wws_family_name", &self.wws_family_name),
            ("wws_subfamily_name", &self.wws_subfamily_name),
        ]
    }

    fn fields_mut(&mut self) -> [(&'static str, &mut I18NDictionary); 23] {
        [
            ("family_name", &mut self.family_name),
            ("style_name", &mut self.style_name),
            ("copyright", &mut self.copyright),
            ("style_map_family_name", &mut self.style_map_family_name),
            ("style_map_style_name", &mut self.style_map_style_name),
            ("unique_id", &mut self.unique_id),
            ("full_name", &mut self.full_name),
            ("version", &mut self.version),
            ("postscript_name", &mut self.postscript_name),
            ("trademark", &mut self.trademark),
            ("manufacturer", &mut self.manufacturer),
            ("designer", &mut self.designer),
            ("description", &mut self.description),
            ("manufacturer_url", &mut self.manufacturer_url),
            ("designer_url", &mut self.designer_url),
            ("license", &mut self.license),
            ("license_url", &mut self.license_url),
            ("typographic_family", &mut self.typographic_family),
            ("typographic_subfamily", &mut self.typographic_subfamily),
            ("compatible_full_name", &mut self.compatible_full_name),
            ("sample_text", &mut self.sample_text),
            ("wws_family_name", &mut self.wws_family_name),
            ("wws_subfamily_name", &mut self.wws_subfamily_name),
        ]
    }

    /// Look up a name field by its public or wire name.
    pub fn get(&self, key: &str) -> Option<&I18NDictionary> {
        let name = CLASS
            .fields
            .iter()
            .find(|f| f.name == key || f.wire == key)?
            .name;
        self.fields().into_iter().find(|(n, _)| *n == name).map(|(_, d)| d)
    }

    pub fn is_empty(&self) -> bool {
        self.fields().iter().all(|(_, dict)| dict.is_empty()) && self.format_specific.is_empty()
    }

    pub(crate) fn from_value(value: Value) -> Result<Self, ContextError> {
        let mut r = RecordReader::new(&CLASS, value)?;
        let mut names = Names::new();
        for (field, slot) in names.fields_mut() {
            if let Some(v) = r.take(field) {
                *slot = I18NDictionary::from_value(CLASS.name, field, v)?;
            }
        }
        names.format_specific = r.finish()?;
        Ok(names)
    }
}

impl ToFragment for Names {
    fn fragment(&self) -> RecordFragment {
        let mut rec = RecordFragment::new(&CLASS);
        for (field, dict) in self.fields() {
            if !dict.is_empty() {
                rec.set(field, Fragment::Leaf(dict.to_value()));
            }
        }
        rec.side_channel(&self.format_specific);
        rec
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::codec::writer::render_document;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_wire_names_are_camel_case() {
        let mut names = Names::new();
        names.family_name.insert("en", "Test Family");
        names.wws_family_name.set_default("Test WWS");
        let rendered = render_document(&Fragment::Record(names.fragment())).unwrap();
        let parsed: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["familyName"], json!({"en": "Test Family"}));
        assert_eq!(parsed["WWSFamilyName"], json!("Test WWS"));
        assert!(parsed.get("family_name").is_none());
    }

    #[test]
    fn test_round_trip() {
        let mut names = Names::new();
        names.family_name.insert("en", "Test");
        names.family_name.insert("ja", "テスト");
        names.license.set_default("OFL-1.1");
        let rendered = render_document(&Fragment::Record(names.fragment())).unwrap();
        let reparsed = Names::from_value(serde_json::from_str(&rendered).unwrap()).unwrap();
        assert_eq!(reparsed, names);
    }

    #[test]
    fn test_lookup_by_either_name() {
        let mut names = Names::new();
        names.typographic_family.set_default("Display");
        assert_eq!(
            names.get("typographicFamily").unwrap().get_default().unwrap(),
            "Display"
        );
        assert_eq!(
            names.get("typographic_family").unwrap().get_default().unwrap(),
            "Display"
        );
        assert!(names.get("nonsense").is_none());
    }

    #[test]
    fn test_locale_fallback_through_names() {
        let mut names = Names::new();
        names.family_name.insert("en", "Fallback Sans");
        assert_eq!(names.family_name.lookup("fr", Some("en")), Some("Fallback Sans"));
        assert_eq!(names.family_name.lookup("fr", None), None);
    }
}
