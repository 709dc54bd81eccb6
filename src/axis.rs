use serde_json::Value;
use smol_str::SmolStr;
use uuid::Uuid;

use crate::codec::reader::RecordReader;
use crate::codec::writer::{number, Fragment, RecordFragment, ToFragment};
use crate::common::Tag;
use crate::error::ContextError;
use crate::i18ndictionary::I18NDictionary;
use crate::object::{impl_object_runtime, FormatSpecific, ObjectMeta};
use crate::schema::{ClassDescriptor, FieldDescriptor, FieldKind};
use crate::validator;

pub static CLASS: ClassDescriptor = ClassDescriptor {
    name: "Axis",
    compact: true,
    split_into: None,
    fields: &[
        FieldDescriptor::new("name", FieldKind::I18n).localizable(),
        FieldDescriptor::new("tag", FieldKind::Str).required(),
        FieldDescriptor::new("id", FieldKind::Str).default_text("generated"),
        FieldDescriptor::new("min", FieldKind::Float),
        FieldDescriptor::new("max", FieldKind::Float),
        FieldDescriptor::new("default", FieldKind::Float),
        FieldDescriptor::new("map", FieldKind::Map),
        FieldDescriptor::new("hidden", FieldKind::Bool).default_text("false"),
    ],
};

/// An axis of a variable or multiple-master font.
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub name: I18NDictionary,
    pub tag: Tag,
    pub id: String,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub default: Option<f64>,
    /// Piecewise linear userspace-to-designspace mapping.
    pub map: Option<Vec<(f64, f64)>>,
    pub hidden: bool,
    pub format_specific: FormatSpecific,
    pub(crate) meta: ObjectMeta,
}

impl_object_runtime!(Axis);

impl Axis {
    pub fn new<T>(name: T, tag: impl Into<Tag>) -> Self
    where
        T: Into<I18NDictionary>,
    {
        Axis {
            name: name.into(),
            tag: tag.into(),
            id: Uuid::new_v4().to_string(),
            min: None,
            max: None,
            default: None,
            map: None,
            hidden: false,
            format_specific: FormatSpecific::default(),
            meta: ObjectMeta::default(),
        }
    }

    pub fn display_name(&self) -> String {
        self.name
            .get_default()
            .cloned()
            .unwrap_or_else(|| "Unnamed axis".to_string())
    }

    /// Map a userspace coordinate to designspace.
    pub fn userspace_to_designspace(&self, v: f64) -> f64 {
        match &self.map {
            Some(map) => piecewise_linear(v, map.iter().map(|(u, d)| (*u, *d))),
            None => v,
        }
    }

    /// Map a designspace coordinate to userspace.
    pub fn designspace_to_userspace(&self, v: f64) -> f64 {
        match &self.map {
            Some(map) => piecewise_linear(v, map.iter().map(|(u, d)| (*d, *u))),
            None => v,
        }
    }

    fn bounds(&self) -> Result<(f64, f64, f64), ContextError> {
        let missing = |field| ContextError::MissingField {
            class: CLASS.name,
            field,
        };
        match (self.min, self.default, self.max) {
            (Some(min), Some(default), Some(max)) => Ok((min, default, max)),
            (None, _, _) => Err(missing("min")),
            (_, None, _) => Err(missing("default")),
            (_, _, None) => Err(missing("max")),
        }
    }

    /// Normalize a userspace coordinate to the -1.0 to 1.0 range.
    pub fn normalize_value(&self, v: f64) -> Result<f64, ContextError> {
        let (min, default, max) = self.bounds()?;
        let (v, min, default, max) = (
            self.userspace_to_designspace(v),
            self.userspace_to_designspace(min),
            self.userspace_to_designspace(default),
            self.userspace_to_designspace(max),
        );
        let v = v.clamp(min, max);
        if v < default {
            if default == min {
                return Ok(0.0);
            }
            Ok(-(default - v) / (default - min))
        } else if v > default {
            if max == default {
                return Ok(0.0);
            }
            Ok((v - default) / (max - default))
        } else {
            Ok(0.0)
        }
    }

    /// Map a normalized -1.0 to 1.0 coordinate back to userspace.
    pub fn denormalize_value(&self, v: f64) -> Result<f64, ContextError> {
        let (min, default, max) = self.bounds()?;
        if v == 0.0 {
            Ok(default)
        } else if v > 0.0 {
            Ok(default + (max - default) * v)
        } else {
            Ok(default + (default - min) * v)
        }
    }

    pub(crate) fn from_value(value: Value) -> Result<Self, ContextError> {
        let mut r = RecordReader::new(&CLASS, value)?;
        let tag = validator::expect_string(CLASS.name, "tag", r.required("tag")?)?;
        let mut axis = Axis::new(I18NDictionary::new(), SmolStr::new(&tag));
        if let Some(v) = r.take("name") {
            axis.name = I18NDictionary::from_value(CLASS.name, "name", v)?;
        }
        if let Some(v) = r.take("id") {
            axis.id = validator::expect_string(CLASS.name, "id", v)?;
        }
        if let Some(v) = r.take("min") {
            axis.min = Some(validator::expect_f64(CLASS.name, "min", &v)?);
        }
        if let Some(v) = r.take("max") {
            axis.max = Some(validator::expect_f64(CLASS.name, "max", &v)?);
        }
        if let Some(v) = r.take("default") {
            axis.default = Some(validator::expect_f64(CLASS.name, "default", &v)?);
        }
        if let Some(v) = r.take("map") {
            let mut map = vec![];
            for pair in validator::expect_array(CLASS.name, "map", v)? {
                let pair = validator::expect_array(CLASS.name, "map", pair)?;
                if pair.len() != 2 {
                    return Err(ContextError::Validation {
                        class: CLASS.name,
                        field: "map",
                        value: format!("an array of {} elements", pair.len()),
                        constraint: "[userspace, designspace] pairs".to_string(),
                    });
                }
                map.push((
                    validator::expect_f64(CLASS.name, "map", &pair[0])?,
                    validator::expect_f64(CLASS.name, "map", &pair[1])?,
                ));
            }
            axis.map = Some(map);
        }
        if let Some(v) = r.take("hidden") {
            axis.hidden = validator::expect_bool(CLASS.name, "hidden", &v)?;
        }
        axis.format_specific = r.finish()?;
        Ok(axis)
    }
}

impl ToFragment for Axis {
    fn fragment(&self) -> RecordFragment {
        let mut rec = RecordFragment::new(&CLASS);
        if !self.name.is_empty() {
            rec.set("name", Fragment::Leaf(self.name.to_value()));
        }
        rec.leaf("tag", self.tag.as_str());
        rec.leaf("id", self.id.as_str());
        if let Some(min) = self.min {
            rec.set("min", Fragment::Leaf(number(min)));
        }
        if let Some(max) = self.max {
            rec.set("max", Fragment::Leaf(number(max)));
        }
        if let Some(default) = self.default {
            rec.set("default", Fragment::Leaf(number(default)));
        }
        if let Some(map) = &self.map {
            rec.set(
                "map",
                Fragment::list(
                    map.iter()
                        .map(|(u, d)| {
                            Fragment::Leaf(Value::Array(vec![number(*u), number(*d)]))
                        })
                        .collect(),
                ),
            );
        }
        if self.hidden {
            rec.leaf("hidden", true);
        }
        rec.side_channel(&self.format_specific);
        rec
    }
}

/// Piecewise linear interpolation through a set of (from, to) control
/// points, constant beyond the extremes.
fn piecewise_linear(v: f64, points: impl Iterator<Item = (f64, f64)>) -> f64 {
    let mut points: Vec<(f64, f64)> = points.collect();
    points.sort_by(|a, b| a.0.total_cmp(&b.0));
    if points.is_empty() {
        return v;
    }
    if let Some(exact) = points.iter().find(|(from, _)| *from == v) {
        return exact.1;
    }
    match (points.first(), points.last()) {
        (Some(&(lo, lo_v)), Some(&(hi, hi_v))) => {
            if v < lo {
                return lo_v;
            }
            if v > hi {
                return hi_v;
            }
        }
        _ => return v,
    }
    let mut prev = points[0];
    for &(from, to) in &points[1..] {
        if v < from {
            let (a, a_v) = prev;
            return a_v + (to - a_v) * (v - a) / (from - a);
        }
        prev = (from, to);
    }
    v
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::codec::writer::render_document;

    fn weight() -> Axis {
        let mut weight = Axis::new("Weight", "wght");
        weight.min = Some(100.0);
        weight.max = Some(900.0);
        weight.default = Some(400.0);
        weight
    }

    #[test]
    fn test_linear_map() {
        let mut axis = weight();
        axis.map = Some(vec![(100.0, 10.0), (900.0, 90.0)]);
        assert_eq!(axis.userspace_to_designspace(400.0), 40.0);
        assert_eq!(axis.designspace_to_userspace(40.0), 400.0);
    }

    #[test]
    fn test_nonlinear_map() {
        let mut axis = weight();
        axis.map = Some(vec![
            (100.0, 42.0),
            (400.0, 81.0),
            (700.0, 125.0),
            (900.0, 178.0),
        ]);
        assert_eq!(axis.userspace_to_designspace(250.0), 61.5);
        assert_eq!(axis.designspace_to_userspace(151.5), 800.0);
        // Beyond the extremes the map is constant.
        assert_eq!(axis.userspace_to_designspace(1000.0), 178.0);
    }

    #[test]
    fn test_normalization() {
        let axis = weight();
        assert_eq!(axis.normalize_value(400.0).unwrap(), 0.0);
        assert_eq!(axis.normalize_value(900.0).unwrap(), 1.0);
        assert_eq!(axis.normalize_value(100.0).unwrap(), -1.0);
        assert_eq!(axis.normalize_value(650.0).unwrap(), 0.5);
        assert_eq!(axis.denormalize_value(0.5).unwrap(), 650.0);
    }

    #[test]
    fn test_normalization_requires_bounds() {
        let axis = Axis::new("Width", "wdth");
        assert!(matches!(
            axis.normalize_value(100.0).unwrap_err(),
            ContextError::MissingField { class: "Axis", field: "min" }
        ));
    }

    #[test]
    fn test_axes_render_on_one_line() {
        let mut axis = weight();
        axis.map = Some(vec![(100.0, 10.0), (900.0, 90.0)]);
        let rendered =
            render_document(&Fragment::Record(axis.fragment())).unwrap();
        assert!(!rendered.trim_end().contains('\n'));
        let reparsed = Axis::from_value(serde_json::from_str(&rendered).unwrap()).unwrap();
        assert_eq!(reparsed, axis);
    }
}
