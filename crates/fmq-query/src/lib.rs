//! # fmq-query
//!
//! Query engine for fmq. Runs parsed `table` / `from` / `where` queries over
//! document metadata and renders the matches as a markdown table.
//!
//! Includes:
//! - Expression interpreter shared with template expansion ([`eval`])
//! - Field resolution with date-aware cell rendering ([`resolver`])
//! - `where` condition evaluation ([`condition`])
//! - Table formatting, markdown and JSON ([`formatter`])
//! - Query execution and in-document block rendering ([`executor`])

pub mod condition;
pub mod eval;
pub mod executor;
pub mod formatter;
pub mod resolver;

pub use condition::{matches, Condition, RecordEnvironment};
pub use eval::{eval_str, evaluate, Environment};
pub use executor::{
    execute, parse_blocks, render_blocks, run, ParsedDocument, RenderedDocument, FILE_COLUMN,
};
pub use formatter::{format_table, render, OutputFormat, Table};
pub use resolver::resolve;
