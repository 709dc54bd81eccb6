use indexmap::IndexMap;
use serde_json::Value;

use crate::codec::reader::RecordReader;
use crate::codec::writer::{record_list, Fragment, RecordFragment, ToFragment};
use crate::common::{location_from_value, location_to_fragment, Location};
use crate::error::ContextError;
use crate::guide::Guide;
use crate::i18ndictionary::I18NDictionary;
use crate::metrics::MetricType;
use crate::object::{impl_object_runtime, FormatSpecific, ObjectMeta};
use crate::schema::{ClassDescriptor, FieldDescriptor, FieldKind};
use crate::validator;

pub static CLASS: ClassDescriptor = ClassDescriptor {
    name: "Master",
    compact: false,
    split_into: None,
    fields: &[
        FieldDescriptor::new("name", FieldKind::I18n).required().localizable(),
        FieldDescriptor::new("id", FieldKind::Str).required(),
        FieldDescriptor::new("location", FieldKind::Location),
        FieldDescriptor::new("sparse", FieldKind::Bool).default_text("false"),
        FieldDescriptor::new("guides", FieldKind::RecordList("Guide")).one_per_line(),
        FieldDescriptor::new("metrics", FieldKind::Map),
        FieldDescriptor::new("kerning", FieldKind::Map),
    ],
};

/// A font master.
///
/// The id is the only stable cross-reference key: layers point at masters
/// by id, so names can be edited freely without breaking links.
#[derive(Debug, Clone, PartialEq)]
pub struct Master {
    pub name: I18NDictionary,
    pub id: String,
    pub location: Location,
    /// A sparse master contributes deltas only for the glyphs it defines.
    pub sparse: bool,
    pub guides: Vec<Guide>,
    pub metrics: IndexMap<MetricType, i32>,
    /// Kerning data, preserved as authored. The key and value encoding is
    /// tooling-defined; the engine does not interpret it.
    pub kerning: IndexMap<String, Value>,
    pub format_specific: FormatSpecific,
    pub(crate) meta: ObjectMeta,
}

impl_object_runtime!(Master);

impl Master {
    pub fn new<T, U>(name: T, id: U) -> Self
    where
        T: Into<I18NDictionary>,
        U: Into<String>,
    {
        Master {
            name: name.into(),
            id: id.into(),
            location: Location::default(),
            sparse: false,
            guides: vec![],
            metrics: IndexMap::new(),
            kerning: IndexMap::new(),
            format_specific: FormatSpecific::default(),
            meta: ObjectMeta::default(),
        }
    }

    pub fn metric(&self, metric: &MetricType) -> Option<i32> {
        self.metrics.get(metric).copied()
    }

    pub fn x_height(&self) -> Option<i32> {
        self.metric(&MetricType::XHeight)
    }

    pub fn cap_height(&self) -> Option<i32> {
        self.metric(&MetricType::CapHeight)
    }

    pub fn ascender(&self) -> Option<i32> {
        self.metric(&MetricType::Ascender)
    }

    pub fn descender(&self) -> Option<i32> {
        self.metric(&MetricType::Descender)
    }

    pub(crate) fn from_value(value: Value) -> Result<Self, ContextError> {
        let mut r = RecordReader::new(&CLASS, value)?;
        let name = I18NDictionary::from_value(CLASS.name, "name", r.required("name")?)?;
        let id = validator::expect_string(CLASS.name, "id", r.required("id")?)?;
        let mut master = Master::new(name, id);
        if let Some(v) = r.take("location") {
            master.location = location_from_value(CLASS.name, "location", v)?;
        }
        if let Some(v) = r.take("sparse") {
            master.sparse = validator::expect_bool(CLASS.name, "sparse", &v)?;
        }
        if let Some(v) = r.take("guides") {
            master.guides = validator::expect_array(CLASS.name, "guides", v)?
                .into_iter()
                .map(Guide::from_value)
                .collect::<Result<_, _>>()?;
        }
        if let Some(v) = r.take("metrics") {
            for (key, value) in validator::expect_object(CLASS.name, "metrics", v)? {
                master.metrics.insert(
                    MetricType::from(key.as_str()),
                    validator::expect_i32(CLASS.name, "metrics", &value)?,
                );
            }
        }
        if let Some(v) = r.take("kerning") {
            for (key, value) in validator::expect_object(CLASS.name, "kerning", v)? {
                master.kerning.insert(key, value);
            }
        }
        master.format_specific = r.finish()?;
        Ok(master)
    }
}

impl ToFragment for Master {
    fn fragment(&self) -> RecordFragment {
        let mut rec = RecordFragment::new(&CLASS);
        rec.set("name", Fragment::Leaf(self.name.to_value()));
        rec.leaf("id", self.id.as_str());
        if !self.location.is_empty() {
            rec.set("location", location_to_fragment(&self.location));
        }
        if self.sparse {
            rec.leaf("sparse", true);
        }
        if !self.guides.is_empty() {
            rec.set("guides", record_list(&self.guides));
        }
        if !self.metrics.is_empty() {
            rec.set(
                "metrics",
                Fragment::map(
                    self.metrics
                        .iter()
                        .map(|(metric, value)| {
                            (metric.as_str().to_string(), Fragment::Leaf(Value::from(*value)))
                        })
                        .collect(),
                ),
            );
        }
        if !self.kerning.is_empty() {
            rec.set(
                "kerning",
                Fragment::map(
                    self.kerning
                        .iter()
                        .map(|(pair, value)| (pair.clone(), Fragment::Leaf(value.clone())))
                        .collect(),
                ),
            );
        }
        rec.side_channel(&self.format_specific);
        rec
    }
}
