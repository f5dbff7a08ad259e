//! Result formatting: markdown pipe tables and JSON.

use serde::{Deserialize, Serialize};

/// Output format for query results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Markdown,
    Json,
}

/// A rendered query result: one header per column, rows in match order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    #[must_use]
    pub fn to_markdown(&self) -> String {
        render(&self.headers, &self.rows)
    }
}

/// Format a table in the specified output format.
#[must_use]
pub fn format_table(table: &Table, format: OutputFormat) -> String {
    match format {
        OutputFormat::Markdown => table.to_markdown(),
        OutputFormat::Json => format_json(table),
    }
}

fn format_json(table: &Table) -> String {
    serde_json::to_string_pretty(table).unwrap_or_else(|_| "{}".to_string())
}

/// Render a markdown pipe table.
///
/// Produces a header line, a `---` divider line, and one line per row, joined
/// by single newlines with no trailing newline. Rows are emitted in the
/// given order; cell counts are not checked against the header count.
#[must_use]
pub fn render<H: AsRef<str>, C: AsRef<str>>(headers: &[H], rows: &[Vec<C>]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 2);
    lines.push(format_row(headers));
    lines.push(format_row(&vec!["---"; headers.len()]));
    lines.extend(rows.iter().map(|row| format_row(row)));
    lines.join("\n")
}

fn format_row<S: AsRef<str>>(cells: &[S]) -> String {
    let cells: Vec<&str> = cells.iter().map(AsRef::as_ref).collect();
    format!("| {} |", cells.join(" | "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_table() -> Table {
        Table {
            headers: vec!["File".to_string(), "status".to_string()],
            rows: vec![
                vec!["[[alpha]]".to_string(), "active".to_string()],
                vec!["[[beta]]".to_string(), String::new()],
            ],
        }
    }

    #[test]
    fn format_as_markdown() {
        let output = format_table(&sample_table(), OutputFormat::Markdown);
        assert_eq!(
            output,
            "| File | status |\n| --- | --- |\n| [[alpha]] | active |\n| [[beta]] |  |"
        );
    }

    #[test]
    fn format_as_json() {
        let output = format_table(&sample_table(), OutputFormat::Json);
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["headers"][1], "status");
        assert_eq!(parsed["rows"][0][0], "[[alpha]]");
    }

    #[test]
    fn empty_result_keeps_header_and_divider_only() {
        let output = render(&["File", "a"], &Vec::<Vec<String>>::new());
        assert_eq!(output, "| File | a |\n| --- | --- |");
    }

    #[test]
    fn rendering_is_pure() {
        let table = sample_table();
        assert_eq!(table.to_markdown(), table.to_markdown());
    }

    proptest! {
        #[test]
        fn line_and_cell_counts(
            headers in proptest::collection::vec("[a-z]{1,6}", 1..5),
            row_count in 0usize..8,
        ) {
            let rows: Vec<Vec<String>> = (0..row_count)
                .map(|r| headers.iter().map(|h| format!("{h}{r}")).collect())
                .collect();
            let output = render(&headers, &rows);
            let lines: Vec<&str> = output.split('\n').collect();
            prop_assert_eq!(lines.len(), 2 + row_count);
            for line in &lines[2..] {
                prop_assert_eq!(line.matches(" | ").count() + 1, headers.len());
            }
        }
    }
}
