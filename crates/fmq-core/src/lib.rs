//! # fmq-core
//!
//! Core types shared by every fmq crate:
//! - [`Value`] and [`MetadataRecord`]: decoded frontmatter metadata
//! - [`Document`]: a markdown file reduced to its name and record
//! - Frontmatter parsing ([`frontmatter`])
//! - Calendar date detection and long-form formatting ([`date`])
//! - Error hierarchy ([`FmqError`], [`QueryError`], [`EvalError`], [`TemplateError`])

pub mod date;
pub mod document;
pub mod error;
pub mod frontmatter;
pub mod value;

pub use document::Document;
pub use error::{EvalError, FmqError, QueryError, Result, TemplateError};
pub use value::{MetadataRecord, Value};
