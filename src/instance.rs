use serde_json::Value;

use crate::codec::reader::RecordReader;
use crate::codec::writer::{Fragment, RecordFragment, ToFragment};
use crate::common::{location_from_value, location_to_fragment, Location};
use crate::error::ContextError;
use crate::i18ndictionary::I18NDictionary;
use crate::names::Names;
use crate::object::{impl_object_runtime, FormatSpecific, ObjectMeta};
use crate::schema::{ClassDescriptor, FieldDescriptor, FieldKind};
use crate::validator;

pub static CLASS: ClassDescriptor = ClassDescriptor {
    name: "Instance",
    compact: true,
    split_into: None,
    fields: &[
        FieldDescriptor::new("name", FieldKind::I18n).localizable(),
        FieldDescriptor::new("location", FieldKind::Location),
        FieldDescriptor::new("variable", FieldKind::Bool).default_text("false"),
        FieldDescriptor::new("custom_names", FieldKind::Record("Names")).wire("customNames"),
    ],
};

/// A named or variable instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Instance {
    pub name: I18NDictionary,
    pub location: Location,
    pub variable: bool,
    /// Name-table overrides for this instance.
    pub custom_names: Names,
    pub format_specific: FormatSpecific,
    pub(crate) meta: ObjectMeta,
}

impl_object_runtime!(Instance);

impl Instance {
    pub fn new<T>(name: T, location: Location) -> Self
    where
        T: Into<I18NDictionary>,
    {
        Instance {
            name: name.into(),
            location,
            ..Default::default()
        }
    }

    /// The style name shown to users: the custom style name if set, else
    /// the instance name.
    pub fn style_name(&self) -> &I18NDictionary {
        if self.custom_names.style_name.is_empty() {
            &self.name
        } else {
            &self.custom_names.style_name
        }
    }

    pub(crate) fn from_value(value: Value) -> Result<Self, ContextError> {
        let mut r = RecordReader::new(&CLASS, value)?;
        let mut instance = Instance::default();
        if let Some(v) = r.take("name") {
            instance.name = I18NDictionary::from_value(CLASS.name, "name", v)?;
        }
        if let Some(v) = r.take("location") {
            instance.location = location_from_value(CLASS.name, "location", v)?;
        }
        if let Some(v) = r.take("variable") {
            instance.variable = validator::expect_bool(CLASS.name, "variable", &v)?;
        }
        if let Some(v) = r.take("custom_names") {
            instance.custom_names = Names::from_value(v)?;
        }
        instance.format_specific = r.finish()?;
        Ok(instance)
    }
}

impl ToFragment for Instance {
    fn fragment(&self) -> RecordFragment {
        let mut rec = RecordFragment::new(&CLASS);
        if !self.name.is_empty() {
            rec.set("name", Fragment::Leaf(self.name.to_value()));
        }
        if !self.location.is_empty() {
            rec.set("location", location_to_fragment(&self.location));
        }
        if self.variable {
            rec.leaf("variable", true);
        }
        if !self.custom_names.is_empty() {
            rec.set("custom_names", Fragment::Record(self.custom_names.fragment()));
        }
        rec.side_channel(&self.format_specific);
        rec
    }
}
