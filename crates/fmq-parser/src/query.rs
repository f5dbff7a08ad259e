//! Query block parsing: `table` / `from` / `where` clauses.
//!
//! A query block is a fenced code block whose body holds one clause per line,
//! in any order:
//!
//! ````markdown
//! ```fmq
//! table status, due, owners[0]
//! from #project
//! where priority > 1 and status != "done"
//! ```
//! ````
//!
//! Lines that start with none of the clause keywords are ignored. When a
//! keyword appears on several lines the first one wins.

use std::ops::Range;

use fmq_core::QueryError;
use serde::{Deserialize, Serialize};

/// Info string that marks a fenced block as a query.
pub const DEFAULT_FENCE: &str = "fmq";

/// A parsed query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySpec {
    /// Columns after the leading `File` column. Never empty.
    pub fields: Vec<FieldSpecifier>,
    /// Tag a document must carry, without the leading `#`.
    pub source_tag: String,
    /// Raw `where` expression; `None` means every tagged document matches.
    pub condition: Option<String>,
}

/// A column reference: a frontmatter key, optionally indexed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpecifier {
    /// The text as written in the `table` clause; used as the column header.
    pub source: String,
    pub key: String,
    pub selector: Selector,
}

/// Which part of a field value a specifier selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selector {
    /// `key`
    Whole,
    /// `key[n]`
    Element(usize),
    /// `key[...]` where the index is not a non-negative integer. Always empty.
    Unresolvable,
}

impl FieldSpecifier {
    /// Parse a single trimmed field specifier such as `tags` or `tags[1]`.
    #[must_use]
    pub fn parse(source: &str) -> Self {
        let source = source.trim();
        let Some((key, rest)) = source.split_once('[') else {
            return Self {
                source: source.to_string(),
                key: source.to_string(),
                selector: Selector::Whole,
            };
        };

        let index = rest.split(']').next().unwrap_or("").trim();
        let selector = if !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()) {
            index
                .parse()
                .map_or(Selector::Unresolvable, Selector::Element)
        } else {
            Selector::Unresolvable
        };

        Self {
            source: source.to_string(),
            key: key.trim().to_string(),
            selector,
        }
    }
}

/// Parse the clauses of a query, fenced or bare.
///
/// Fence lines (starting with three backticks) and blank lines are dropped
/// before clauses are located.
///
/// # Errors
///
/// Returns [`QueryError::MissingTable`] or [`QueryError::MissingFrom`] when
/// a required clause is absent, [`QueryError::EmptyFieldList`] when `table`
/// names no fields, and [`QueryError::EmptySourceTag`] when `from` names no tag.
pub fn parse_query(text: &str) -> Result<QuerySpec, QueryError> {
    let lines: Vec<&str> = text
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter(|line| !line.trim_start().starts_with("```"))
        .collect();

    let table = find_clause(&lines, "table").ok_or(QueryError::MissingTable)?;
    let from = find_clause(&lines, "from").ok_or(QueryError::MissingFrom)?;
    let condition = find_clause(&lines, "where")
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string);

    let fields: Vec<FieldSpecifier> = table
        .split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .map(FieldSpecifier::parse)
        .collect();
    if fields.is_empty() {
        return Err(QueryError::EmptyFieldList);
    }

    let from = from.trim();
    let source_tag = from.strip_prefix('#').unwrap_or(from).trim();
    if source_tag.is_empty() {
        return Err(QueryError::EmptySourceTag);
    }

    Ok(QuerySpec {
        fields,
        source_tag: source_tag.to_string(),
        condition,
    })
}

/// Parse a selection that must be a fenced query block tagged with `fence`.
///
/// # Errors
///
/// Returns [`QueryError::NotAQueryBlock`] when the text does not open with
/// the query fence, otherwise the errors of [`parse_query`].
pub fn parse_query_block(text: &str, fence: &str) -> Result<QuerySpec, QueryError> {
    let opening = text.trim_start().lines().next().unwrap_or("");
    if !is_opening_fence(opening, fence) {
        return Err(QueryError::NotAQueryBlock {
            fence: fence.to_string(),
        });
    }
    parse_query(text)
}

fn find_clause<'a>(lines: &[&'a str], keyword: &str) -> Option<&'a str> {
    lines.iter().find_map(|line| line.strip_prefix(keyword))
}

fn is_opening_fence(line: &str, fence: &str) -> bool {
    line.trim()
        .strip_prefix("```")
        .is_some_and(|info| info.trim() == fence)
}

/// A fenced query block found inside a markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryBlock<'a> {
    /// Byte range from the opening fence to the end of the closing fence,
    /// excluding the closing line break.
    pub range: Range<usize>,
    /// The block text, fences included.
    pub text: &'a str,
}

/// Locate every closed query block in `markdown`, in document order.
#[must_use]
pub fn find_query_blocks<'a>(markdown: &'a str, fence: &str) -> Vec<QueryBlock<'a>> {
    let mut blocks = Vec::new();
    let mut start = None;
    let mut offset = 0;

    for line in markdown.split_inclusive('\n') {
        let content = line.trim_end_matches(['\r', '\n']);
        match start {
            None if is_opening_fence(content, fence) => start = Some(offset),
            Some(begin) if content.trim() == "```" => {
                let end = offset + content.len();
                blocks.push(QueryBlock {
                    range: begin..end,
                    text: &markdown[begin..end],
                });
                start = None;
            }
            _ => {}
        }
        offset += line.len();
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn parses_all_three_clauses() {
        let spec = parse_query("table a, b\nfrom #proj\nwhere a > 1").unwrap();
        assert_eq!(
            spec.fields.iter().map(|f| f.source.as_str()).collect::<Vec<_>>(),
            vec!["a", "b"]
        );
        assert_eq!(spec.source_tag, "proj");
        assert_eq!(spec.condition.as_deref(), Some("a > 1"));
    }

    #[test]
    fn clauses_may_appear_in_any_order_with_extra_lines() {
        let text = "```fmq\nwhere done\nnote: ignored\nfrom proj\ntable title\n```";
        let spec = parse_query(text).unwrap();
        assert_eq!(spec.source_tag, "proj");
        assert_eq!(spec.fields[0].key, "title");
        assert_eq!(spec.condition.as_deref(), Some("done"));
    }

    #[test]
    fn where_is_optional() {
        let spec = parse_query("table a\nfrom #proj").unwrap();
        assert_eq!(spec.condition, None);

        let spec = parse_query("table a\nfrom #proj\nwhere   ").unwrap();
        assert_eq!(spec.condition, None);
    }

    #[test]
    fn missing_required_clauses_abort() {
        assert_eq!(parse_query("from #proj"), Err(QueryError::MissingTable));
        assert_eq!(
            parse_query("table a, b\nwhere a > 1"),
            Err(QueryError::MissingFrom)
        );
        assert_eq!(
            parse_query("table , \nfrom #proj"),
            Err(QueryError::EmptyFieldList)
        );
        assert_eq!(
            parse_query("table a\nfrom #"),
            Err(QueryError::EmptySourceTag)
        );
    }

    #[test]
    fn clause_prefixes_are_case_sensitive_and_left_anchored() {
        assert_eq!(
            parse_query("TABLE a\nfrom #proj"),
            Err(QueryError::MissingTable)
        );
        assert_eq!(
            parse_query("  table a\nfrom #proj"),
            Err(QueryError::MissingTable)
        );
    }

    #[test]
    fn first_matching_line_wins() {
        let spec = parse_query("table a\ntable b\nfrom #one\nfrom #two").unwrap();
        assert_eq!(spec.fields[0].key, "a");
        assert_eq!(spec.source_tag, "one");
    }

    #[test]
    fn only_one_leading_hash_is_stripped() {
        let spec = parse_query("table a\nfrom ##proj").unwrap();
        assert_eq!(spec.source_tag, "#proj");
    }

    #[test]
    fn field_specifiers() {
        assert_eq!(FieldSpecifier::parse("tags").selector, Selector::Whole);

        let indexed = FieldSpecifier::parse("tags[1]");
        assert_eq!(indexed.key, "tags");
        assert_eq!(indexed.selector, Selector::Element(1));
        assert_eq!(indexed.source, "tags[1]");

        assert_eq!(
            FieldSpecifier::parse("tags[ 2 ]").selector,
            Selector::Element(2)
        );
        assert_eq!(
            FieldSpecifier::parse("tags[-1]").selector,
            Selector::Unresolvable
        );
        assert_eq!(
            FieldSpecifier::parse("tags[x]").selector,
            Selector::Unresolvable
        );
        assert_eq!(
            FieldSpecifier::parse("tags[]").selector,
            Selector::Unresolvable
        );
    }

    #[test]
    fn query_block_requires_fence() {
        let block = "```fmq\ntable a\nfrom #proj\n```";
        assert!(parse_query_block(block, DEFAULT_FENCE).is_ok());

        let result = parse_query_block("table a\nfrom #proj", DEFAULT_FENCE);
        assert!(matches!(result, Err(QueryError::NotAQueryBlock { .. })));

        let result = parse_query_block("```rust\ntable a\nfrom #proj\n```", DEFAULT_FENCE);
        assert!(matches!(result, Err(QueryError::NotAQueryBlock { .. })));
    }

    #[test]
    fn finds_closed_blocks_in_document_order() {
        let markdown = "# Notes\n\n```fmq\ntable a\nfrom #x\n```\n\ntext\n\n\
                        ```rust\nfn main() {}\n```\n\n\
                        ```fmq\ntable b\nfrom #y\n```\n```fmq\nunclosed\n";
        let blocks = find_query_blocks(markdown, DEFAULT_FENCE);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].text.starts_with("```fmq\ntable a"));
        assert!(blocks[0].text.ends_with("```"));
        assert_eq!(&markdown[blocks[0].range.clone()], blocks[0].text);
        assert!(blocks[1].text.contains("table b"));
    }

    proptest! {
        #[test]
        fn indexed_fields_select_their_element(
            key in "[a-z_][a-z0-9_]{0,12}",
            n in 0usize..10_000,
        ) {
            let spec = FieldSpecifier::parse(&format!("{key}[{n}]"));
            prop_assert_eq!(spec.key, key);
            prop_assert_eq!(spec.selector, Selector::Element(n));
        }

        #[test]
        fn field_order_is_preserved(keys in prop::collection::vec("[a-z]{1,8}", 1..6)) {
            let query = format!("table {}\nfrom #t", keys.join(", "));
            let spec = parse_query(&query).unwrap();
            let sources: Vec<String> = spec.fields.into_iter().map(|f| f.source).collect();
            prop_assert_eq!(sources, keys);
        }
    }
}
