//! Placeholder expansion.
//!
//! A placeholder is the shortest span from `<%` to the next `%>`. Its
//! contents are evaluated as one expression against the [`DateHelpers`]
//! namespace and the span is replaced by the result. A failing placeholder
//! becomes `<Error: message>` and expansion moves on to the next one.

use std::ops::Range;

use chrono::{Local, NaiveDateTime};
use fmq_query::eval_str;
use tracing::error;

use crate::helpers::DateHelpers;

pub const OPEN: &str = "<%";
pub const CLOSE: &str = "%>";

/// A `<% ... %>` span found in template text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder<'a> {
    /// Byte range of the whole span, delimiters included.
    pub range: Range<usize>,
    /// The enclosed expression, untrimmed.
    pub code: &'a str,
}

/// Find all non-overlapping placeholders, left to right.
#[must_use]
pub fn find_placeholders(text: &str) -> Vec<Placeholder<'_>> {
    let mut found = Vec::new();
    let mut cursor = 0;

    while let Some(open) = text[cursor..].find(OPEN) {
        let start = cursor + open;
        let code_start = start + OPEN.len();
        let Some(close) = text[code_start..].find(CLOSE) else {
            break;
        };
        let code_end = code_start + close;
        let end = code_end + CLOSE.len();
        found.push(Placeholder {
            range: start..end,
            code: &text[code_start..code_end],
        });
        cursor = end;
    }

    found
}

/// Expands templates against a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct TemplateExpander {
    helpers: DateHelpers,
}

impl TemplateExpander {
    /// Expander whose helpers all observe `now`.
    #[must_use]
    pub fn at(now: NaiveDateTime) -> Self {
        Self {
            helpers: DateHelpers::new(now),
        }
    }

    /// Expander bound to the current local time, read once.
    #[must_use]
    pub fn local() -> Self {
        Self::at(Local::now().naive_local())
    }

    /// Replace every placeholder in `text`. Never fails.
    #[must_use]
    pub fn expand(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        let mut cursor = 0;
        for placeholder in find_placeholders(text) {
            out.push_str(&text[cursor..placeholder.range.start]);
            out.push_str(&self.evaluate(placeholder.code));
            cursor = placeholder.range.end;
        }
        out.push_str(&text[cursor..]);
        out
    }

    fn evaluate(&self, code: &str) -> String {
        let code = code.trim();
        match eval_str(code, &self.helpers) {
            Ok(value) => value.to_string(),
            Err(err) => {
                error!(code, error = %err, "error evaluating template code");
                format!("<Error: {err}>")
            }
        }
    }
}

/// Expand `text` with every helper observing `now`.
#[must_use]
pub fn expand(text: &str, now: NaiveDateTime) -> String {
    TemplateExpander::at(now).expand(text)
}
