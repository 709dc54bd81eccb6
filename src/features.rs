use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;
use smol_str::SmolStr;

use crate::codec::reader::RecordReader;
use crate::codec::writer::{Fragment, RecordFragment, ToFragment};
use crate::error::ContextError;
use crate::object::{impl_object_runtime, FormatSpecific, ObjectMeta};
use crate::schema::{ClassDescriptor, FieldDescriptor, FieldKind};
use crate::validator;

pub static CLASS: ClassDescriptor = ClassDescriptor {
    name: "Features",
    compact: false,
    split_into: None,
    fields: &[
        FieldDescriptor::new("classes", FieldKind::GroupMap).one_per_line(),
        FieldDescriptor::new("prefixes", FieldKind::Map).one_per_line(),
        FieldDescriptor::new("features", FieldKind::FeatureList).one_per_line(),
    ],
};

static PREFIX_MARKER: &str = "# Prefix: ";

// The patterns are compile-time constants, so the unwraps cannot fire.
#[allow(clippy::unwrap_used)]
static CLASS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(\w+)\s*=\s*\[(.*?)\];?").unwrap());
#[allow(clippy::unwrap_used)]
static PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"# Prefix: (.*)").unwrap());
#[allow(clippy::unwrap_used)]
static FEATURE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"feature\s+(\w+)\s*\{").unwrap());

/// The font's OpenType feature code, split into glyph classes, prefix code
/// and per-feature blocks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Features {
    /// Glyph classes. The key should not start with `@`.
    pub classes: IndexMap<SmolStr, Vec<SmolStr>>,
    /// Lookups and other code to be placed before any feature definitions,
    /// under user-defined names.
    pub prefixes: IndexMap<SmolStr, String>,
    /// Feature code as ordered (feature tag, code) pairs.
    pub features: Vec<(SmolStr, String)>,
    pub format_specific: FormatSpecific,
    pub(crate) meta: ObjectMeta,
}

impl_object_runtime!(Features);

impl Features {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.prefixes.is_empty() && self.features.is_empty()
    }

    /// Assemble the table into AFDKO feature code.
    pub fn to_fea(&self) -> String {
        let mut fea = String::new();
        for (name, glyphs) in &self.classes {
            let glyphs: Vec<&str> = glyphs.iter().map(|g| g.as_str()).collect();
            fea.push_str(&format!("@{} = [{}];\n", name, glyphs.join(" ")));
        }
        for (prefix, code) in &self.prefixes {
            if prefix != "anonymous" {
                fea.push_str(&format!("{}{}\n", PREFIX_MARKER, prefix));
            }
            fea.push_str(code);
            fea.push('\n');
        }
        for (name, code) in &self.features {
            fea.push_str(&format!("feature {} {{\n{}\n}} {};\n", name, code, name));
        }
        fea
    }

    /// Split AFDKO feature code back into the table. Class definitions,
    /// `# Prefix:` markers and `feature` blocks are recognized; anything
    /// else accumulates under the current prefix.
    pub fn from_fea(fea: &str) -> Features {
        let mut features = Features::new();
        let mut current_prefix = SmolStr::new("anonymous");
        let lines: Vec<&str> = fea.split('\n').collect();
        let mut i = 0;

        while i < lines.len() {
            let line = lines[i].trim();

            if line.starts_with('@') && line.contains('=') {
                if let Some(caps) = CLASS_RE.captures(line) {
                    let glyphs = caps[2]
                        .split_whitespace()
                        .map(SmolStr::new)
                        .collect::<Vec<_>>();
                    features.classes.insert(SmolStr::new(&caps[1]), glyphs);
                    i += 1;
                    continue;
                }
            }

            if line.starts_with("# Prefix:") {
                if let Some(caps) = PREFIX_RE.captures(line) {
                    current_prefix = SmolStr::new(&caps[1]);
                    i += 1;
                    continue;
                }
            }

            if line.starts_with("feature ") {
                if let Some(caps) = FEATURE_RE.captures(line) {
                    let tag = SmolStr::new(&caps[1]);
                    let mut code = String::new();
                    let mut brace_count = 1;
                    i += 1;
                    while i < lines.len() && brace_count > 0 {
                        let current = lines[i];
                        brace_count += current.matches('{').count() as i64;
                        brace_count -= current.matches('}').count() as i64;
                        if brace_count > 0 {
                            code.push_str(current.trim_end());
                            code.push('\n');
                        }
                        i += 1;
                    }
                    features
                        .features
                        .push((tag, code.trim_end_matches('\n').to_string()));
                    continue;
                }
            }

            if !line.is_empty() {
                let slot = features.prefixes.entry(current_prefix.clone()).or_default();
                slot.push_str(lines[i].trim_end());
                slot.push('\n');
            }
            i += 1;
        }

        for code in features.prefixes.values_mut() {
            while code.ends_with('\n') {
                code.pop();
            }
        }
        features
    }

    pub(crate) fn from_value(value: Value) -> Result<Self, ContextError> {
        let mut r = RecordReader::new(&CLASS, value)?;
        let mut features = Features::new();
        if let Some(v) = r.take("classes") {
            for (name, members) in validator::expect_object(CLASS.name, "classes", v)? {
                let members = validator::expect_array(CLASS.name, "classes", members)?
                    .into_iter()
                    .map(|m| {
                        validator::expect_string(CLASS.name, "classes", m).map(|s| SmolStr::new(&s))
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                features.classes.insert(SmolStr::new(&name), members);
            }
        }
        if let Some(v) = r.take("prefixes") {
            for (name, code) in validator::expect_object(CLASS.name, "prefixes", v)? {
                features.prefixes.insert(
                    SmolStr::new(&name),
                    validator::expect_string(CLASS.name, "prefixes", code)?,
                );
            }
        }
        if let Some(v) = r.take("features") {
            for pair in validator::expect_array(CLASS.name, "features", v)? {
                let pair = validator::expect_array(CLASS.name, "features", pair)?;
                if pair.len() != 2 {
                    return Err(ContextError::Validation {
                        class: CLASS.name,
                        field: "features",
                        value: format!("an array of {} elements", pair.len()),
                        constraint: "[tag, code] pairs".to_string(),
                    });
                }
                let tag = validator::expect_string(CLASS.name, "features", pair[0].clone())?;
                let code = validator::expect_string(CLASS.name, "features", pair[1].clone())?;
                features.features.push((SmolStr::new(&tag), code));
            }
        }
        features.format_specific = r.finish()?;
        Ok(features)
    }
}

impl ToFragment for Features {
    fn fragment(&self) -> RecordFragment {
        let mut rec = RecordFragment::new(&CLASS);
        if !self.classes.is_empty() {
            rec.set(
                "classes",
                Fragment::map(
                    self.classes
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
                ),
            );
        }
        if !self.prefixes.is_empty() {
            rec.set(
                "prefixes",
                Fragment::map(
                    self.prefixes
                        .iter()
                        .map(|(name, code)| {
                            (name.to_string(), Fragment::Leaf(Value::from(code.as_str())))
                        })
                        .collect(),
                ),
            );
        }
        if !self.features.is_empty() {
            rec.set(
                "features",
                Fragment::list(
                    self.features
                        .iter()
                        .map(|(tag, code)| {
                            Fragment::Leaf(Value::Array(vec![
                                Value::from(tag.as_str()),
                                Value::from(code.as_str()),
                            ]))
                        })
                        .collect(),
                ),
            );
        }
        rec.side_channel(&self.format_specific);
        rec
    }
}
