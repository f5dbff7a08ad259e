//! The `tp.date` helper namespace available inside placeholders.
//!
//! | helper                        | result                                   |
//! |-------------------------------|------------------------------------------|
//! | `tp.date.now(format)`         | `format` with date tokens substituted    |
//! | `tp.date.today()`             | `YYYY-MM-DD`                             |
//! | `tp.date.tomorrow()`          | `YYYY-MM-DD`                             |
//! | `tp.date.yesterday()`         | `YYYY-MM-DD`                             |
//! | `tp.date.getCurrentWeek()`    | `ceil(day_of_year / 7)`                  |
//!
//! All helpers read the single instant the namespace was built with.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, Timelike};
use fmq_core::{EvalError, Value};
use fmq_query::Environment;

/// Root name of the helper namespace.
pub const NAMESPACE: &str = "tp";

/// Helper namespace bound to one instant.
#[derive(Debug, Clone, Copy)]
pub struct DateHelpers {
    now: NaiveDateTime,
}

impl DateHelpers {
    #[must_use]
    pub fn new(now: NaiveDateTime) -> Self {
        Self { now }
    }

    fn call_date(&self, name: &str, args: &[Value]) -> Option<Result<Value, EvalError>> {
        let result = match name {
            "now" => match args.first() {
                Some(Value::String(format)) => Ok(Value::String(format_now(format, self.now))),
                other => Err(EvalError::Type(format!(
                    "tp.date.now expects a format string, got {}",
                    other.map_or("nothing", Value::type_name)
                ))),
            },
            "today" => Ok(iso_date(self.now.date())),
            "tomorrow" => self
                .now
                .date()
                .checked_add_days(Days::new(1))
                .map(iso_date)
                .ok_or_else(out_of_range),
            "yesterday" => self
                .now
                .date()
                .checked_sub_days(Days::new(1))
                .map(iso_date)
                .ok_or_else(out_of_range),
            "getCurrentWeek" => Ok(Value::Number(f64::from(current_week(self.now.date())))),
            _ => return None,
        };
        Some(result)
    }
}

impl Environment for DateHelpers {
    fn variable(&self, _name: &str) -> Option<Value> {
        None
    }

    fn is_namespace(&self, name: &str) -> bool {
        name == NAMESPACE
    }

    fn call(&self, path: &[&str], args: &[Value]) -> Option<Result<Value, EvalError>> {
        match path {
            [NAMESPACE, "date", name] => self.call_date(name, args),
            _ => None,
        }
    }
}

fn iso_date(date: NaiveDate) -> Value {
    Value::String(date.format("%Y-%m-%d").to_string())
}

fn out_of_range() -> EvalError {
    EvalError::Type("date out of range".to_string())
}

/// Week number as `ceil(day_of_year / 7)`, so January 1–7 is week 1.
#[must_use]
pub fn current_week(date: NaiveDate) -> u32 {
    date.ordinal().div_ceil(7)
}

/// Substitute date tokens in `format`.
///
/// Tokens are tried in the fixed order `dddd, MMMM, Do, YYYY, MM, DD, HH,
/// mm, ss`, and each replaces only its first occurrence in the text produced
/// so far. Text inserted by an earlier token is therefore visible to later
/// ones.
#[must_use]
pub fn format_now(format: &str, now: NaiveDateTime) -> String {
    let substitutions = [
        ("dddd", now.format("%A").to_string()),
        ("MMMM", now.format("%B").to_string()),
        ("Do", ordinal(now.day())),
        ("YYYY", now.year().to_string()),
        ("MM", format!("{:02}", now.month())),
        ("DD", format!("{:02}", now.day())),
        ("HH", format!("{:02}", now.hour())),
        ("mm", format!("{:02}", now.minute())),
        ("ss", format!("{:02}", now.second())),
    ];

    substitutions
        .iter()
        .fold(format.to_string(), |text, (token, value)| {
            text.replacen(token, value, 1)
        })
}

fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, s)
            .unwrap()
    }

    #[test]
    fn formats_every_token() {
        let now = at(2024, 11, 9, 14, 5, 7);
        assert_eq!(
            format_now("dddd, MMMM Do YYYY HH:mm:ss", now),
            "Saturday, November 9th 2024 14:05:07"
        );
        assert_eq!(format_now("YYYY-MM-DD", now), "2024-11-09");
    }

    #[test]
    fn each_token_replaces_its_first_occurrence_only() {
        let now = at(2024, 11, 9, 14, 5, 7);
        assert_eq!(format_now("MM MM", now), "11 MM");
    }

    #[test]
    fn tokens_match_inside_literal_words() {
        // "Do" is a token even when it starts a word
        let now = at(2024, 11, 9, 14, 5, 7);
        assert_eq!(format_now("Doors at HH", now), "9thors at 14");
    }

    #[test]
    fn ordinals() {
        let cases = [
            (1, "1st"),
            (2, "2nd"),
            (3, "3rd"),
            (4, "4th"),
            (11, "11th"),
            (12, "12th"),
            (13, "13th"),
            (21, "21st"),
            (22, "22nd"),
            (23, "23rd"),
            (31, "31st"),
        ];
        for (n, expected) in cases {
            assert_eq!(ordinal(n), expected);
        }
    }

    #[test]
    fn week_numbers() {
        let date = |m, d| NaiveDate::from_ymd_opt(2024, m, d).unwrap();
        assert_eq!(current_week(date(1, 1)), 1);
        assert_eq!(current_week(date(1, 7)), 1);
        assert_eq!(current_week(date(1, 8)), 2);
        assert_eq!(current_week(date(11, 9)), 45);
        assert_eq!(current_week(date(12, 31)), 53);
    }

    #[test]
    fn relative_days_cross_year_boundaries() {
        let helpers = DateHelpers::new(at(2024, 12, 31, 23, 59, 59));
        assert_eq!(
            helpers.call(&["tp", "date", "tomorrow"], &[]),
            Some(Ok(Value::from("2025-01-01")))
        );
        assert_eq!(
            helpers.call(&["tp", "date", "yesterday"], &[]),
            Some(Ok(Value::from("2024-12-30")))
        );
        assert_eq!(
            helpers.call(&["tp", "date", "today"], &[]),
            Some(Ok(Value::from("2024-12-31")))
        );
    }

    #[test]
    fn now_requires_a_format_string() {
        let helpers = DateHelpers::new(at(2024, 11, 9, 0, 0, 0));
        assert!(matches!(
            helpers.call(&["tp", "date", "now"], &[]),
            Some(Err(EvalError::Type(_)))
        ));
        assert!(matches!(
            helpers.call(&["tp", "date", "now"], &[Value::Number(1.0)]),
            Some(Err(EvalError::Type(_)))
        ));
    }

    #[test]
    fn unknown_helpers_are_not_resolved() {
        let helpers = DateHelpers::new(at(2024, 11, 9, 0, 0, 0));
        assert_eq!(helpers.call(&["tp", "date", "later"], &[]), None);
        assert_eq!(helpers.call(&["tp", "bogus"], &[]), None);
        assert!(helpers.is_namespace("tp"));
    }
}
