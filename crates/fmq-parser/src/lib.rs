//! # fmq-parser
//!
//! Parsers for the two small languages fmq understands:
//! - query blocks: `table` / `from` / `where` clauses ([`query`])
//! - expressions used by `where` conditions and template placeholders,
//!   defined by a pest PEG grammar in `src/expr.pest` ([`expression`], [`ast`])

pub mod ast;
pub mod expression;
pub mod query;

pub use expression::parse_expression;
pub use query::{
    find_query_blocks, parse_query, parse_query_block, FieldSpecifier, QueryBlock, QuerySpec,
    Selector, DEFAULT_FENCE,
};
