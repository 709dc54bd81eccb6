use std::path::PathBuf;

use chrono::{NaiveDateTime, Timelike};
use indexmap::IndexMap;
use serde_json::{json, Value};
use smol_str::SmolStr;

use crate::axis::Axis;
use crate::codec::reader::RecordReader;
use crate::codec::writer::{record_list, Fragment, RecordFragment, ToFragment};
use crate::common::{Location, OTValue};
use crate::error::ContextError;
use crate::features::Features;
use crate::glyph::{Glyph, GlyphList};
use crate::instance::Instance;
use crate::layer::Layer;
use crate::master::Master;
use crate::metrics::MetricType;
use crate::names::Names;
use crate::object::{impl_object_runtime, FormatSpecific, ObjectMeta, ObjectRuntime};
use crate::schema::{ClassDescriptor, FieldDescriptor, FieldKind};
use crate::shape::Shape;
use crate::validator;

pub(crate) static DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub static CLASS: ClassDescriptor = ClassDescriptor {
    name: "Font",
    compact: false,
    split_into: None,
    fields: &[
        FieldDescriptor::new("upm", FieldKind::Int).default_text("1000"),
        FieldDescriptor::new("version", FieldKind::Version).default_text("[1, 0]"),
        FieldDescriptor::new("axes", FieldKind::RecordList("Axis")).one_per_line(),
        FieldDescriptor::new("instances", FieldKind::RecordList("Instance")).one_per_line(),
        FieldDescriptor::new("masters", FieldKind::RecordList("Master")).one_per_line(),
        // Persisted into its own document; see the Glyph class descriptor.
        FieldDescriptor::new("glyphs", FieldKind::RecordList("Glyph")).one_per_line(),
        FieldDescriptor::new("note", FieldKind::Str),
        FieldDescriptor::new("date", FieldKind::Date).default_text("now"),
        FieldDescriptor::new("names", FieldKind::Record("Names")),
        FieldDescriptor::new("custom_ot_values", FieldKind::RecordList("OTValue"))
            .wire("customOpenTypeValues"),
        FieldDescriptor::new("features", FieldKind::Record("Features")),
        FieldDescriptor::new("first_kern_groups", FieldKind::GroupMap),
        FieldDescriptor::new("second_kern_groups", FieldKind::GroupMap),
    ],
};

/// A font, with one or more masters.
#[derive(Debug, Clone)]
pub struct Font {
    pub upm: u16,
    pub version: (u16, u16),
    pub axes: Vec<Axis>,
    pub instances: Vec<Instance>,
    pub masters: Vec<Master>,
    pub glyphs: GlyphList,
    pub note: Option<String>,
    pub date: NaiveDateTime,
    pub names: Names,
    pub custom_ot_values: Vec<OTValue>,
    pub features: Features,
    pub first_kern_groups: IndexMap<SmolStr, Vec<SmolStr>>,
    pub second_kern_groups: IndexMap<SmolStr, Vec<SmolStr>>,
    /// Where this font was loaded from, used as the default save target.
    /// Never serialized.
    pub source: Option<PathBuf>,
    pub format_specific: FormatSpecific,
    pub(crate) meta: ObjectMeta,
}

impl_object_runtime!(Font);

impl Default for Font {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Font {
    fn eq(&self, other: &Self) -> bool {
        // `source` is runtime state, like the dirty flag: a loaded font and
        // its in-memory twin compare equal.
        self.upm == other.upm
            && self.version == other.version
            && self.axes == other.axes
            && self.instances == other.instances
            && self.masters == other.masters
            && self.glyphs == other.glyphs
            && self.note == other.note
            && self.date == other.date
            && self.names == other.names
            && self.custom_ot_values == other.custom_ot_values
            && self.features == other.features
            && self.first_kern_groups == other.first_kern_groups
            && self.second_kern_groups == other.second_kern_groups
            && self.format_specific == other.format_specific
    }
}

impl Font {
    pub fn new() -> Self {
        let now = chrono::Local::now().naive_local();
        Font {
            upm: 1000,
            version: (1, 0),
            axes: vec![],
            instances: vec![],
            masters: vec![],
            glyphs: GlyphList::new(),
            note: None,
            // The wire format has second precision.
            date: now.with_nanosecond(0).unwrap_or(now),
            names: Names::new(),
            custom_ot_values: vec![],
            features: Features::new(),
            first_kern_groups: IndexMap::new(),
            second_kern_groups: IndexMap::new(),
            source: None,
            format_specific: FormatSpecific::default(),
            meta: ObjectMeta::default(),
        }
    }

    /// Locate a master by its id.
    pub fn master(&self, id: &str) -> Result<&Master, ContextError> {
        self.masters
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| master_not_found(id))
    }

    pub fn master_mut(&mut self, id: &str) -> Result<&mut Master, ContextError> {
        self.masters
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| master_not_found(id))
    }

    /// The designspace location of the axes' defaults.
    pub fn default_location(&self) -> Location {
        self.axes
            .iter()
            .map(|axis| {
                (
                    axis.tag.clone(),
                    axis.userspace_to_designspace(axis.default.unwrap_or(0.0)),
                )
            })
            .collect()
    }

    /// The master at the default location; the sole master if there is
    /// only one.
    pub fn default_master(&self) -> Result<&Master, ContextError> {
        if self.masters.len() == 1 {
            return Ok(&self.masters[0]);
        }
        let default_location = self.default_location();
        self.masters
            .iter()
            .find(|m| m.location == default_location)
            .ok_or_else(|| master_not_found("<default>"))
    }

    /// The glyph's layer belonging to the given master.
    pub fn master_layer_for(&self, glyph_name: &str, master: &Master) -> Option<&Layer> {
        let glyph = self.glyphs.get(glyph_name).ok()?;
        glyph
            .layers
            .iter()
            .find(|layer| layer.master.as_deref() == Some(master.id.as_str()))
    }

    /// Resolve a layer's master reference. Dangling references are legal
    /// in a loaded font; they only fail here, at resolution time.
    pub fn layer_master(&self, layer: &Layer) -> Result<&Master, ContextError> {
        match &layer.master {
            Some(id) => self.master(id),
            None => Err(master_not_found("<none>")),
        }
    }

    /// A metric of the default master.
    pub fn default_metric(&self, name: &str) -> Option<i32> {
        let metric = MetricType::from(name);
        self.default_master().ok().and_then(|m| m.metric(&metric))
    }

    /// Codepoint to glyph-name mapping, in glyph order.
    pub fn unicode_map(&self) -> IndexMap<u32, SmolStr> {
        let mut map = IndexMap::new();
        for glyph in &self.glyphs {
            for codepoint in &glyph.codepoints {
                map.insert(*codepoint, glyph.name().clone());
            }
        }
        map
    }

    /// Names of the glyphs marked for export, in glyph order.
    pub fn exported_glyphs(&self) -> Vec<&SmolStr> {
        self.glyphs
            .iter()
            .filter(|g| g.exported)
            .map(|g| g.name())
            .collect()
    }

    pub fn ot_value(&self, table: &str, field: &str) -> Option<&Value> {
        self.custom_ot_values
            .iter()
            .find(|v| v.table == table && v.field == field)
            .map(|v| &v.value)
    }

    pub fn set_ot_value(&mut self, table: &str, field: &str, value: Value) {
        self.custom_ot_values.push(OTValue {
            table: table.to_string(),
            field: field.to_string(),
            value,
        });
        self.mark_dirty();
    }

    /// Enforce font-level invariants: at least one master, unique master
    /// ids. Run by the deserializer; authoring code may call it before
    /// saving.
    pub fn validate(&self) -> Result<(), ContextError> {
        if self.masters.is_empty() {
            return Err(ContextError::Validation {
                class: CLASS.name,
                field: "masters",
                value: "[]".to_string(),
                constraint: "at least one master".to_string(),
            });
        }
        let mut seen: Vec<&str> = Vec::with_capacity(self.masters.len());
        for master in &self.masters {
            if seen.contains(&master.id.as_str()) {
                return Err(ContextError::DuplicateKey {
                    collection: "masters",
                    key: master.id.clone(),
                });
            }
            seen.push(&master.id);
        }
        Ok(())
    }

    /// Mark the font and every entity it owns clean, e.g. after a save.
    pub fn mark_all_clean(&mut self) {
        self.mark_clean();
        for axis in &mut self.axes {
            axis.mark_clean();
        }
        for instance in &mut self.instances {
            instance.custom_names.mark_clean();
            instance.mark_clean();
        }
        for master in &mut self.masters {
            for guide in &mut master.guides {
                guide.mark_clean();
            }
            master.mark_clean();
        }
        for glyph in self.glyphs.iter_mut() {
            for layer in &mut glyph.layers {
                for shape in &mut layer.shapes {
                    if let Shape::Path(path) = shape {
                        for node in &mut path.nodes {
                            node.mark_clean();
                        }
                    }
                    shape.mark_clean();
                }
                for anchor in &mut layer.anchors {
                    anchor.mark_clean();
                }
                for guide in &mut layer.guides {
                    guide.mark_clean();
                }
                layer.mark_clean();
            }
            glyph.mark_clean();
        }
        self.names.mark_clean();
        self.features.mark_clean();
    }

    /// Save back to the path the font was loaded from.
    pub fn save(&self) -> Result<(), ContextError> {
        match &self.source {
            Some(path) => crate::codec::save(self, path.clone()),
            None => Err(ContextError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "font has no stored source path",
            ))),
        }
    }

    /// Read everything except the glyph collection, which arrives from the
    /// split document.
    pub(crate) fn from_value(value: Value) -> Result<Self, ContextError> {
        let mut r = RecordReader::new(&CLASS, value)?;
        let mut font = Font::new();
        if let Some(v) = r.take("upm") {
            font.upm = validator::expect_u16(CLASS.name, "upm", &v)?;
        }
        if let Some(v) = r.take("version") {
            font.version = version_from_value(v)?;
        }
        if let Some(v) = r.take("axes") {
            font.axes = validator::expect_array(CLASS.name, "axes", v)?
                .into_iter()
                .map(Axis::from_value)
                .collect::<Result<_, _>>()?;
        }
        if let Some(v) = r.take("instances") {
            font.instances = validator::expect_array(CLASS.name, "instances", v)?
                .into_iter()
                .map(Instance::from_value)
                .collect::<Result<_, _>>()?;
        }
        if let Some(v) = r.take("masters") {
            font.masters = validator::expect_array(CLASS.name, "masters", v)?
                .into_iter()
                .map(Master::from_value)
                .collect::<Result<_, _>>()?;
        }
        if let Some(v) = r.take("glyphs") {
            // Normally split into its own document, but an inlined
            // collection is accepted on read.
            log::warn!("glyph collection found inline in the primary document");
            for glyph in validator::expect_array(CLASS.name, "glyphs", v)? {
                font.glyphs.append(Glyph::from_value(glyph)?)?;
            }
        }
        if let Some(v) = r.take("note") {
            font.note = Some(validator::expect_string(CLASS.name, "note", v)?);
        }
        if let Some(v) = r.take("date") {
            let text = validator::expect_string(CLASS.name, "date", v)?;
            font.date =
                NaiveDateTime::parse_from_str(&text, DATE_FORMAT).map_err(|_| {
                    ContextError::Validation {
                        class: CLASS.name,
                        field: "date",
                        value: format!("\"{}\"", text),
                        constraint: format!("a {} timestamp", DATE_FORMAT),
                    }
                })?;
        }
        if let Some(v) = r.take("names") {
            font.names = Names::from_value(v)?;
        }
        if let Some(v) = r.take("custom_ot_values") {
            font.custom_ot_values = validator::expect_array(CLASS.name, "custom_ot_values", v)?
                .into_iter()
                .map(ot_value_from_value)
                .collect::<Result<_, _>>()?;
        }
        if let Some(v) = r.take("features") {
            font.features = Features::from_value(v)?;
        }
        if let Some(v) = r.take("first_kern_groups") {
            font.first_kern_groups = kern_groups_from_value("first_kern_groups", v)?;
        }
        if let Some(v) = r.take("second_kern_groups") {
            font.second_kern_groups = kern_groups_from_value("second_kern_groups", v)?;
        }
        font.format_specific = r.finish()?;
        Ok(font)
    }
}

impl ToFragment for Font {
    /// Everything except the glyph collection, which the codec writes to
    /// the split document.
    fn fragment(&self) -> RecordFragment {
        let mut rec = RecordFragment::new(&CLASS);
        rec.leaf("upm", self.upm);
        rec.set(
            "version",
            Fragment::Leaf(json!([self.version.0, self.version.1])),
        );
        if !self.axes.is_empty() {
            rec.set("axes", record_list(&self.axes));
        }
        if !self.instances.is_empty() {
            rec.set("instances", record_list(&self.instances));
        }
        rec.set("masters", record_list(&self.masters));
        if let Some(note) = &self.note {
            rec.leaf("note", note.as_str());
        }
        rec.leaf("date", self.date.format(DATE_FORMAT).to_string());
        if !self.names.is_empty() {
            rec.set("names", Fragment::Record(self.names.fragment()));
        }
        if !self.custom_ot_values.is_empty() {
            rec.set(
                "custom_ot_values",
                Fragment::list(
                    self.custom_ot_values
                        .iter()
                        .map(|v| {
                            Fragment::Leaf(json!({
                                "table": v.table,
                                "field": v.field,
                                "value": v.value,
                            }))
                        })
                        .collect(),
                ),
            );
        }
        if !self.features.is_empty() {
            rec.set("features", Fragment::Record(self.features.fragment()));
        }
        if !self.first_kern_groups.is_empty() {
            rec.set(
                "first_kern_groups",
                kern_groups_fragment(&self.first_kern_groups),
            );
        }
        if !self.second_kern_groups.is_empty() {
            rec.set(
                "second_kern_groups",
                kern_groups_fragment(&self.second_kern_groups),
            );
        }
        rec.side_channel(&self.format_specific);
        rec
    }
}

fn master_not_found(key: &str) -> ContextError {
    ContextError::NotFound {
        collection: "masters",
        key: key.to_string(),
    }
}

fn version_from_value(value: Value) -> Result<(u16, u16), ContextError> {
    let items = validator::expect_array(CLASS.name, "version", value)?;
    if items.len() != 2 {
        return Err(ContextError::Validation {
            class: CLASS.name,
            field: "version",
            value: format!("an array of {} elements", items.len()),
            constraint: "a two-element [major, minor] integer array".to_string(),
        });
    }
    Ok((
        validator::expect_u16(CLASS.name, "version", &items[0])?,
        validator::expect_u16(CLASS.name, "version", &items[1])?,
    ))
}

fn ot_value_from_value(value: Value) -> Result<OTValue, ContextError> {
    let mut map = validator::expect_object(CLASS.name, "custom_ot_values", value)?;
    let missing = || ContextError::MissingField {
        class: CLASS.name,
        field: "custom_ot_values",
    };
    let table = validator::expect_string(
        CLASS.name,
        "custom_ot_values",
        map.remove("table").ok_or_else(missing)?,
    )?;
    let field = validator::expect_string(
        CLASS.name,
        "custom_ot_values",
        map.remove("field").ok_or_else(missing)?,
    )?;
    let value = map.remove("value").unwrap_or(Value::Null);
    Ok(OTValue {
        table,
        field,
        value,
    })
}

fn kern_groups_fragment(groups: &IndexMap<SmolStr, Vec<SmolStr>>) -> Fragment {
    Fragment::map(
        groups
            .iter()
            .map(|(name, members)| {
                (
                    name.to_string(),
                    Fragment::Leaf(Value::Array(
                        members.iter().map(|m| Value::from(m.as_str())).collect(),
                    )),
                )
            })
            .collect(),
    )
}

fn kern_groups_from_value(
    field: &'static str,
    value: Value,
) -> Result<IndexMap<SmolStr, Vec<SmolStr>>, ContextError> {
    let mut groups = IndexMap::new();
    for (name, members) in validator::expect_object(CLASS.name, field, value)? {
        let members = validator::expect_array(CLASS.name, field, members)?
            .into_iter()
            .map(|m| validator::expect_string(CLASS.name, field, m).map(|s| SmolStr::new(&s)))
            .collect::<Result<Vec<_>, _>>()?;
        groups.insert(SmolStr::new(&name), members);
    }
    Ok(groups)
}
