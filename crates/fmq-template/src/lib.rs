//! # fmq-template
//!
//! Expands `<% ... %>` placeholders in template text.
//!
//! Each placeholder holds one expression evaluated by the `fmq-query`
//! interpreter with nothing in scope but the `tp.date` helpers
//! ([`helpers`]). All helpers in one expansion observe the same instant,
//! passed in by the caller ([`TemplateExpander::at`]).
//!
//! ```
//! use chrono::NaiveDate;
//! use fmq_template::expand;
//!
//! let now = NaiveDate::from_ymd_opt(2024, 11, 9).unwrap().and_hms_opt(9, 0, 0).unwrap();
//! assert_eq!(expand("Due <% tp.date.tomorrow() %>", now), "Due 2024-11-10");
//! ```

pub mod expander;
pub mod helpers;

pub use expander::{expand, find_placeholders, Placeholder, TemplateExpander};
pub use helpers::{format_now, DateHelpers};
