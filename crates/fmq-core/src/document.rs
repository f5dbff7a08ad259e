//! Document type: one markdown file and its frontmatter record.

use std::path::{Path, PathBuf};

use crate::error::FmqError;
use crate::frontmatter::parse_record;
use crate::value::{MetadataRecord, Value};

/// A markdown file in the vault, reduced to what queries need.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// File name without the extension; shown as the row link.
    pub name: String,
    pub path: PathBuf,
    pub record: MetadataRecord,
}

impl Document {
    #[must_use]
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, record: MetadataRecord) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            record,
        }
    }

    /// Build a document from a file path and its markdown content.
    ///
    /// # Errors
    ///
    /// Propagates frontmatter errors from [`parse_record`].
    pub fn from_markdown(path: &Path, content: &str) -> Result<Self, FmqError> {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let record = parse_record(content)?;
        Ok(Self::new(name, path, record))
    }

    /// The wiki-style link used as the first cell of every row.
    #[must_use]
    pub fn link(&self) -> String {
        format!("[[{}]]", self.name)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.record.get(key)
    }

    /// Whether the document's `tags` field contains `tag`.
    ///
    /// Accepts a sequence of tags or a single string of comma or
    /// whitespace separated tags. A leading `#` on a stored tag is ignored.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        match self.record.get("tags") {
            Some(Value::Sequence(items)) => items
                .iter()
                .filter(|item| !item.is_absent())
                .any(|item| tag_matches(&item.to_string(), tag)),
            Some(Value::String(s)) => s
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|t| !t.is_empty())
                .any(|t| tag_matches(t, tag)),
            _ => false,
        }
    }
}

fn tag_matches(stored: &str, wanted: &str) -> bool {
    let stored = stored.trim();
    stored.strip_prefix('#').unwrap_or(stored) == wanted
}
