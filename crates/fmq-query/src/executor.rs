//! Query executor: runs a parsed query over a document collection.
//!
//! Documents are visited in the order they are given. A document produces a
//! row when it carries the source tag and satisfies the `where` condition;
//! the row is its link followed by one resolved cell per field.

use fmq_core::{Document, FmqError};
use fmq_parser::{find_query_blocks, parse_query, parse_query_block, QueryBlock, QuerySpec};
use tracing::{debug, info};

use crate::condition::Condition;
use crate::formatter::Table;
use crate::resolver::resolve;

/// Header of the leading link column.
pub const FILE_COLUMN: &str = "File";

/// Execute a parsed query.
#[must_use]
pub fn execute(spec: &QuerySpec, documents: &[Document]) -> Table {
    let condition = spec.condition.as_deref().map(Condition::parse);

    let mut headers = Vec::with_capacity(spec.fields.len() + 1);
    headers.push(FILE_COLUMN.to_string());
    headers.extend(spec.fields.iter().map(|field| field.source.clone()));

    let mut rows = Vec::new();
    for doc in documents {
        if !doc.has_tag(&spec.source_tag) {
            continue;
        }
        if let Some(condition) = &condition {
            if !condition.matches(&doc.record) {
                debug!(document = %doc.name, "excluded by where clause");
                continue;
            }
        }

        let mut row = Vec::with_capacity(headers.len());
        row.push(doc.link());
        row.extend(spec.fields.iter().map(|field| resolve(&doc.record, field)));
        rows.push(row);
    }

    info!(
        tag = %spec.source_tag,
        scanned = documents.len(),
        rows = rows.len(),
        "query executed"
    );

    Table { headers, rows }
}

/// Parse a query (fenced or bare) and execute it.
///
/// # Errors
///
/// Returns [`FmqError::Query`] if the query is missing a required clause.
pub fn run(text: &str, documents: &[Document]) -> Result<Table, FmqError> {
    let spec = parse_query(text)?;
    Ok(execute(&spec, documents))
}

/// A markdown document with its query blocks replaced by tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub text: String,
    /// Number of query blocks replaced.
    pub blocks: usize,
}

/// A markdown document whose query blocks have all parsed, ready to run.
#[derive(Debug, Clone)]
pub struct ParsedDocument<'a> {
    markdown: &'a str,
    blocks: Vec<(QueryBlock<'a>, QuerySpec)>,
}

impl ParsedDocument<'_> {
    /// Number of query blocks found.
    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Execute every block against `documents` and splice in the tables.
    #[must_use]
    pub fn render(&self, documents: &[Document]) -> RenderedDocument {
        let mut text = String::with_capacity(self.markdown.len());
        let mut cursor = 0;
        for (block, spec) in &self.blocks {
            text.push_str(&self.markdown[cursor..block.range.start]);
            text.push_str(&execute(spec, documents).to_markdown());
            cursor = block.range.end;
        }
        text.push_str(&self.markdown[cursor..]);

        RenderedDocument {
            text,
            blocks: self.blocks.len(),
        }
    }
}

/// Parse every `fence` query block in `markdown` without executing any.
///
/// # Errors
///
/// Returns [`FmqError::Query`] for the first block that fails to parse.
pub fn parse_blocks<'a>(markdown: &'a str, fence: &str) -> Result<ParsedDocument<'a>, FmqError> {
    let blocks = find_query_blocks(markdown, fence)
        .into_iter()
        .map(|block| parse_query_block(block.text, fence).map(|spec| (block, spec)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ParsedDocument { markdown, blocks })
}

/// Replace every `fence` query block in `markdown` with its rendered table.
///
/// All blocks are parsed before any is executed, so a malformed block
/// leaves the document untouched.
///
/// # Errors
///
/// Returns [`FmqError::Query`] for the first block that fails to parse.
pub fn render_blocks(
    markdown: &str,
    fence: &str,
    documents: &[Document],
) -> Result<RenderedDocument, FmqError> {
    Ok(parse_blocks(markdown, fence)?.render(documents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use fmq_core::{MetadataRecord, QueryError, Value};

    fn make_doc(name: &str, tags: &[&str], fields: &[(&str, Value)]) -> Document {
        let mut record: MetadataRecord = fields
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect();
        record.insert(
            "tags".to_string(),
            Value::Sequence(tags.iter().map(|t| Value::from(*t)).collect()),
        );
        Document::new(name, format!("{name}.md"), record)
    }

    fn three_projects() -> Vec<Document> {
        vec![
            make_doc("one", &["proj"], &[("a", Value::Number(0.0)), ("b", Value::from("x"))]),
            make_doc("two", &["proj"], &[("a", Value::Number(2.0)), ("b", Value::from("y"))]),
            make_doc("three", &["proj"], &[("a", Value::Number(3.0))]),
        ]
    }

    #[test]
    fn where_clause_filters_in_discovery_order() {
        let table = run("table a, b\nfrom #proj\nwhere a > 1", &three_projects()).unwrap();
        assert_eq!(table.headers, vec!["File", "a", "b"]);
        assert_eq!(
            table.rows,
            vec![
                vec!["[[two]]".to_string(), "2".to_string(), "y".to_string()],
                vec!["[[three]]".to_string(), "3".to_string(), String::new()],
            ]
        );
    }

    #[test]
    fn documents_without_the_tag_are_skipped() {
        let mut docs = three_projects();
        docs.push(make_doc("other", &["meeting"], &[("a", Value::Number(9.0))]));
        docs.push(Document::new("bare", "bare.md", MetadataRecord::new()));
        let table = run("table a\nfrom #proj", &docs).unwrap();
        assert_eq!(table.rows.len(), 3);
        assert!(table.rows.iter().all(|row| row.len() == 2));
    }

    #[test]
    fn failing_condition_excludes_rows_without_aborting() {
        let table = run("table a\nfrom #proj\nwhere a.b.c > 1", &three_projects()).unwrap();
        assert!(table.rows.is_empty());
        assert_eq!(table.to_markdown(), "| File | a |\n| --- | --- |");
    }

    #[test]
    fn missing_from_aborts() {
        let result = run("table a, b\nwhere a > 1", &three_projects());
        assert!(matches!(
            result,
            Err(FmqError::Query(QueryError::MissingFrom))
        ));
    }

    #[test]
    fn render_blocks_replaces_each_block_in_place() {
        let markdown = "# Report\n\n```fmq\ntable a\nfrom #proj\nwhere a >= 3\n```\n\nfooter\n";
        let rendered = render_blocks(markdown, "fmq", &three_projects()).unwrap();
        assert_eq!(rendered.blocks, 1);
        assert_eq!(
            rendered.text,
            "# Report\n\n| File | a |\n| --- | --- |\n| [[three]] | 3 |\n\nfooter\n"
        );
    }

    #[test]
    fn render_blocks_is_all_or_nothing() {
        let markdown = "```fmq\ntable a\nfrom #proj\n```\n\n```fmq\ntable a\n```\n";
        let result = render_blocks(markdown, "fmq", &three_projects());
        assert!(matches!(
            result,
            Err(FmqError::Query(QueryError::MissingFrom))
        ));
    }

    #[test]
    fn parsed_blocks_render_against_documents_loaded_later() {
        let markdown = "```fmq\ntable a\nfrom #proj\nwhere a > 2\n```\n";
        let parsed = parse_blocks(markdown, "fmq").unwrap();
        assert_eq!(parsed.block_count(), 1);
        let rendered = parsed.render(&three_projects());
        assert_eq!(rendered.text, "| File | a |\n| --- | --- |\n| [[three]] | 3 |\n");
    }

    #[test]
    fn parse_blocks_rejects_before_any_documents_exist() {
        let markdown = "```fmq\ntable a\n```\n";
        assert!(matches!(
            parse_blocks(markdown, "fmq"),
            Err(FmqError::Query(QueryError::MissingFrom))
        ));
    }

    #[test]
    fn render_blocks_without_blocks_is_identity() {
        let markdown = "no queries here\n";
        let rendered = render_blocks(markdown, "fmq", &three_projects()).unwrap();
        assert_eq!(rendered.blocks, 0);
        assert_eq!(rendered.text, markdown);
    }
}
