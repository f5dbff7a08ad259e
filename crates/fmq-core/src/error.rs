//! Error types for fmq.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level result type for fmq operations.
pub type Result<T> = std::result::Result<T, FmqError>;

/// Top-level error type for fmq.
#[derive(Debug, Error)]
pub enum FmqError {
    #[error("query error: {0}")]
    Query(#[from] QueryError),

    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    #[error("vault error: {0}")]
    Vault(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Errors that abort a query before any document is read.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("selected text is not a `{fence}` query block")]
    NotAQueryBlock { fence: String },

    #[error("invalid query format: missing `table` clause")]
    MissingTable,

    #[error("invalid query format: missing `from` clause")]
    MissingFrom,

    #[error("`table` clause lists no fields")]
    EmptyFieldList,

    #[error("`from` clause names no tag")]
    EmptySourceTag,
}

/// Errors raised while parsing or evaluating an expression.
///
/// These never abort a query or a template expansion: callers map them
/// to "row excluded" or to an inline error marker.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("{0} is not defined")]
    Undefined(String),

    #[error("{0} is not a function")]
    NotAFunction(String),

    #[error("cannot read properties of {target} (reading '{property}')")]
    PropertyOfAbsent { target: String, property: String },

    #[error("{0}")]
    Type(String),
}

/// Errors related to the template folder.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template folder not found at {}", .0.display())]
    FolderMissing(PathBuf),

    #[error("no template files found in {}", .0.display())]
    NoTemplates(PathBuf),

    #[error("template '{0}' not found")]
    UnknownTemplate(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_display_human_readable_messages() {
        let err = QueryError::MissingFrom;
        assert!(err.to_string().contains("from"));

        let err = EvalError::NotAFunction("tp.bogus".to_string());
        assert_eq!(err.to_string(), "tp.bogus is not a function");

        let err = TemplateError::FolderMissing(PathBuf::from("/vault/Template"));
        assert!(err.to_string().contains("/vault/Template"));
    }

    #[test]
    fn query_errors_convert_into_top_level_error() {
        let err: FmqError = QueryError::MissingTable.into();
        assert!(matches!(err, FmqError::Query(QueryError::MissingTable)));
        assert!(err.to_string().starts_with("query error:"));
    }
}
