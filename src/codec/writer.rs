//! The serialization half of the codec.
//!
//! Entities lower themselves to a [`Fragment`] layout tree; rendering the
//! tree applies the per-class and per-field formatting directives from the
//! schema registry. Alias substitution (public name to wire name) happens
//! as fields are added to a [`RecordFragment`], so entity code only ever
//! speaks public names.

use serde_json::Value;

use crate::object::FormatSpecific;
use crate::schema::ClassDescriptor;

#[derive(Debug, Clone)]
pub(crate) enum Fragment {
    /// A plain JSON value, rendered compactly.
    Leaf(Value),
    Record(RecordFragment),
    List {
        one_per_line: bool,
        items: Vec<Fragment>,
    },
    Map {
        one_per_line: bool,
        entries: Vec<(String, Fragment)>,
    },
}

impl Fragment {
    pub fn list(items: Vec<Fragment>) -> Fragment {
        Fragment::List {
            one_per_line: false,
            items,
        }
    }

    pub fn map(entries: Vec<(String, Fragment)>) -> Fragment {
        Fragment::Map {
            one_per_line: false,
            entries,
        }
    }

    fn set_one_per_line(&mut self) {
        match self {
            Fragment::List { one_per_line, .. } | Fragment::Map { one_per_line, .. } => {
                *one_per_line = true
            }
            _ => {}
        }
    }
}

/// An entity lowered to its wire fields, in registry declaration order.
#[derive(Debug, Clone)]
pub(crate) struct RecordFragment {
    class: &'static ClassDescriptor,
    fields: Vec<(&'static str, Fragment)>,
    format_specific: Option<Value>,
}

impl RecordFragment {
    pub fn new(class: &'static ClassDescriptor) -> Self {
        RecordFragment {
            class,
            fields: Vec::new(),
            format_specific: None,
        }
    }

    /// Add a field under its public name; the wire name and the
    /// one-per-line directive are taken from the class descriptor.
    pub fn set(&mut self, field: &'static str, mut fragment: Fragment) {
        if let Some(descriptor) = self.class.field(field) {
            if descriptor.one_per_line {
                fragment.set_one_per_line();
            }
        }
        self.fields.push((self.class.wire_name(field), fragment));
    }

    pub fn leaf(&mut self, field: &'static str, value: impl Into<Value>) {
        self.set(field, Fragment::Leaf(value.into()));
    }

    pub fn side_channel(&mut self, fs: &FormatSpecific) {
        if !fs.is_empty() {
            self.format_specific = Some(fs.to_value());
        }
    }
}

/// Entities that lower to a record.
pub(crate) trait ToFragment {
    fn fragment(&self) -> RecordFragment;
}

/// Lower a slice of entities to a list of record fragments.
pub(crate) fn record_list<T: ToFragment>(items: &[T]) -> Fragment {
    Fragment::list(items.iter().map(|i| Fragment::Record(i.fragment())).collect())
}

/// Emit a coordinate as an integer where it is one, for compact output.
pub(crate) fn number(v: f64) -> Value {
    if v.fract() == 0.0 && v.abs() < 9.0e15 {
        Value::from(v as i64)
    } else {
        Value::from(v)
    }
}

/// Render a document rooted at the given fragment.
pub(crate) fn render_document(root: &Fragment) -> Result<String, serde_json::Error> {
    let mut out = String::new();
    render(&mut out, root, 0, false)?;
    out.push('\n');
    Ok(out)
}

fn push_indent(out: &mut String, indent: usize) {
    for _ in 0..indent {
        out.push_str("  ");
    }
}

fn render(
    out: &mut String,
    fragment: &Fragment,
    indent: usize,
    compact: bool,
) -> Result<(), serde_json::Error> {
    match fragment {
        Fragment::Leaf(value) => {
            out.push_str(&serde_json::to_string(value)?);
        }
        Fragment::Record(record) => render_record(out, record, indent, compact)?,
        Fragment::List { one_per_line, items } => {
            if items.is_empty() || compact || !*one_per_line {
                out.push('[');
                for (ix, item) in items.iter().enumerate() {
                    if ix > 0 {
                        out.push_str(", ");
                    }
                    render(out, item, indent, true)?;
                }
                out.push(']');
            } else {
                out.push('[');
                for (ix, item) in items.iter().enumerate() {
                    if ix > 0 {
                        out.push(',');
                    }
                    out.push('\n');
                    push_indent(out, indent + 1);
                    render(out, item, indent + 1, false)?;
                }
                out.push('\n');
                push_indent(out, indent);
                out.push(']');
            }
        }
        Fragment::Map { one_per_line, entries } => {
            if entries.is_empty() || compact || !*one_per_line {
                out.push('{');
                for (ix, (key, value)) in entries.iter().enumerate() {
                    if ix > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(&serde_json::to_string(key)?);
                    out.push_str(": ");
                    render(out, value, indent, true)?;
                }
                out.push('}');
            } else {
                out.push('{');
                for (ix, (key, value)) in entries.iter().enumerate() {
                    if ix > 0 {
                        out.push(',');
                    }
                    out.push('\n');
                    push_indent(out, indent + 1);
                    out.push_str(&serde_json::to_string(key)?);
                    out.push_str(": ");
                    render(out, value, indent + 1, false)?;
                }
                out.push('\n');
                push_indent(out, indent);
                out.push('}');
            }
        }
    }
    Ok(())
}

fn render_record(
    out: &mut String,
    record: &RecordFragment,
    indent: usize,
    compact: bool,
) -> Result<(), serde_json::Error> {
    let compact = compact || record.class.compact;
    let side_channel = record
        .format_specific
        .iter()
        .map(|fs| ("_", Fragment::Leaf(fs.clone())));
    let fields: Vec<(&str, Fragment)> = record
        .fields
        .iter()
        .map(|(wire, frag)| (*wire, frag.clone()))
        .chain(side_channel)
        .collect();

    if fields.is_empty() {
        out.push_str("{}");
        return Ok(());
    }
    if compact {
        out.push('{');
        for (ix, (wire, value)) in fields.iter().enumerate() {
            if ix > 0 {
                out.push_str(", ");
            }
            out.push_str(&serde_json::to_string(wire)?);
            out.push_str(": ");
            render(out, value, indent, true)?;
        }
        out.push('}');
    } else {
        out.push('{');
        for (ix, (wire, value)) in fields.iter().enumerate() {
            if ix > 0 {
                out.push(',');
            }
            out.push('\n');
            push_indent(out, indent + 1);
            out.push_str(&serde_json::to_string(wire)?);
            out.push_str(": ");
            render(out, value, indent + 1, false)?;
        }
        out.push('\n');
        push_indent(out, indent);
        out.push('}');
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use serde_json::json;

    #[test]
    fn test_one_per_line_lists() {
        let frag = Fragment::List {
            one_per_line: true,
            items: vec![Fragment::Leaf(json!(1)), Fragment::Leaf(json!(2))],
        };
        assert_eq!(render_document(&frag).unwrap(), "[\n  1,\n  2\n]\n");
    }

    #[test]
    fn test_inline_lists() {
        let frag = Fragment::list(vec![Fragment::Leaf(json!(1)), Fragment::Leaf(json!(2))]);
        assert_eq!(render_document(&frag).unwrap(), "[1, 2]\n");
    }

    #[test]
    fn test_compact_records_have_no_newlines() {
        let mut rec = RecordFragment::new(&crate::axis::CLASS);
        rec.leaf("tag", "wght");
        rec.leaf("min", 100);
        let rendered = render_document(&Fragment::Record(rec)).unwrap();
        assert!(!rendered.trim_end().contains('\n'), "{:?}", rendered);
    }

    #[test]
    fn test_alias_applied_at_emission() {
        let mut rec = RecordFragment::new(&crate::guide::CLASS);
        rec.leaf("position", json!([1, 2, 0]));
        let rendered = render_document(&Fragment::Record(rec)).unwrap();
        assert!(rendered.contains("\"pos\""));
        assert!(!rendered.contains("\"position\""));
    }

    #[test]
    fn test_output_is_well_formed_json() {
        let mut rec = RecordFragment::new(&crate::layer::CLASS);
        rec.leaf("width", 500);
        rec.set(
            "shapes",
            Fragment::list(vec![Fragment::Leaf(json!({"ref": "A"}))]),
        );
        let rendered = render_document(&Fragment::Record(rec)).unwrap();
        let parsed: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["width"], json!(500));
    }
}
