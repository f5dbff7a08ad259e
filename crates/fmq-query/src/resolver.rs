//! Field resolution: one table cell from one document's metadata.

use fmq_core::date::{format_long_date, parse_calendar_date};
use fmq_core::{MetadataRecord, Value};
use fmq_parser::{FieldSpecifier, Selector};

/// Resolve `field` against `record` into the text of a table cell.
///
/// A missing key, an out-of-range or malformed index, and a null value all
/// resolve to the empty string. Present values render literally, so `0` and
/// `false` stay visible. Strings that parse as calendar dates are rendered
/// as `"November 09, 2024"`.
#[must_use]
pub fn resolve(record: &MetadataRecord, field: &FieldSpecifier) -> String {
    let value = match field.selector {
        Selector::Whole => record.get(&field.key),
        Selector::Element(position) => record.get(&field.key).and_then(|v| v.element(position)),
        Selector::Unresolvable => None,
    };
    value.map(render_cell).unwrap_or_default()
}

/// Render a resolved value as cell text.
#[must_use]
pub fn render_cell(value: &Value) -> String {
    match value {
        Value::Absent => String::new(),
        Value::String(s) => parse_calendar_date(s).map_or_else(|| s.clone(), format_long_date),
        other => other.to_string(),
    }
}
