//! `where` condition evaluation.
//!
//! Any bare name that is a key of the document's metadata refers to that
//! field; every other name is undefined. A condition that fails to parse or
//! evaluate excludes the row instead of aborting the query.

use fmq_core::{EvalError, MetadataRecord, Value};
use fmq_parser::ast::Expr;
use fmq_parser::parse_expression;
use tracing::debug;

use crate::eval::{evaluate, Environment};

/// Exposes one document's fields to an expression.
pub struct RecordEnvironment<'a> {
    record: &'a MetadataRecord,
}

impl<'a> RecordEnvironment<'a> {
    #[must_use]
    pub fn new(record: &'a MetadataRecord) -> Self {
        Self { record }
    }
}

impl Environment for RecordEnvironment<'_> {
    fn variable(&self, name: &str) -> Option<Value> {
        self.record.get(name).cloned()
    }
}

/// A `where` condition, parsed once and evaluated per document.
#[derive(Debug, Clone)]
pub struct Condition {
    source: String,
    parsed: Result<Expr, EvalError>,
}

impl Condition {
    #[must_use]
    pub fn parse(source: &str) -> Self {
        Self {
            source: source.to_string(),
            parsed: parse_expression(source),
        }
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate against a record, reporting why evaluation failed.
    ///
    /// # Errors
    ///
    /// Returns the syntax error of the condition, or the evaluation error
    /// raised for this record.
    pub fn evaluate(&self, record: &MetadataRecord) -> Result<bool, EvalError> {
        let expr = self.parsed.as_ref().map_err(EvalError::clone)?;
        let value = evaluate(expr, &RecordEnvironment::new(record))?;
        Ok(value.is_truthy())
    }

    /// Whether the record satisfies the condition. Failures count as "no".
    #[must_use]
    pub fn matches(&self, record: &MetadataRecord) -> bool {
        match self.evaluate(record) {
            Ok(result) => result,
            Err(err) => {
                debug!(condition = %self.source, error = %err, "condition failed, row excluded");
                false
            }
        }
    }
}

/// Evaluate `condition` against `record` in one step.
#[must_use]
pub fn matches(record: &MetadataRecord, condition: &str) -> bool {
    Condition::parse(condition).matches(record)
}
