//! Calendar date detection and formatting for table cells.
//!
//! A cell value is treated as a date only when the whole string matches one
//! of a fixed set of locale-independent layouts. Dates are formatted from the
//! calendar day as written, never shifted into the local time zone.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATE_LAYOUTS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%B %d, %Y", "%b %d, %Y"];

const DATETIME_LAYOUTS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Parse `text` as a calendar date.
///
/// Accepts ISO dates, ISO date-times with or without an offset, RFC 2822
/// timestamps, and the long `"November 09, 2024"` form produced by
/// [`format_long_date`].
#[must_use]
pub fn parse_calendar_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.date_naive());
    }
    for layout in DATE_LAYOUTS {
        if let Ok(date) = NaiveDate::parse_from_str(text, layout) {
            return Some(date);
        }
    }
    for layout in DATETIME_LAYOUTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, layout) {
            return Some(dt.date());
        }
    }
    None
}

/// Format a date as `"<FullMonthName> DD, YYYY"`, e.g. `"November 09, 2024"`.
#[must_use]
pub fn format_long_date(date: NaiveDate) -> String {
    date.format("%B %d, %Y").to_string()
}
