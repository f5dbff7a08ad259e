//! YAML frontmatter parsing.
//!
//! Handles the `---` delimited YAML frontmatter in markdown files.
//! Format:
//! ```markdown
//! ---
//! tags: [project]
//! status: active
//! due: 2024-11-09
//! ---
//!
//! ## Body content here
//! ```

use crate::error::FmqError;
use crate::value::{record_from_mapping, MetadataRecord};

/// `content` without a leading byte order mark or whitespace.
fn leading_trimmed(content: &str) -> &str {
    content.strip_prefix('\u{feff}').unwrap_or(content).trim_start()
}

/// Whether `content` opens with a `---` frontmatter delimiter line.
#[must_use]
pub fn has_frontmatter(content: &str) -> bool {
    let content = leading_trimmed(content);
    let first_line = content.lines().next().unwrap_or("");
    first_line.trim_end() == "---"
}

/// Parse a markdown file into frontmatter YAML and body content.
///
/// Returns `(yaml_str, body)` where `yaml_str` is the raw YAML between
/// `---` delimiters and `body` is everything after the closing `---` line.
///
/// # Errors
///
/// Returns [`FmqError::Parse`] if the file does not contain valid frontmatter.
pub fn split_frontmatter(content: &str) -> Result<(&str, &str), FmqError> {
    if !has_frontmatter(content) {
        return Err(FmqError::Parse(
            "File must start with '---' frontmatter delimiter".to_string(),
        ));
    }

    let content = leading_trimmed(content);
    // Skip the opening delimiter line
    let rest = content.split_once('\n').map_or("", |(_, rest)| rest);

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == "---" {
            let yaml = &rest[..offset];
            let body = &rest[offset + line.len()..];
            return Ok((yaml, body));
        }
        offset += line.len();
    }

    Err(FmqError::Parse(
        "No closing '---' frontmatter delimiter found".to_string(),
    ))
}

/// Parse the frontmatter of a markdown file into a [`MetadataRecord`].
///
/// A file without frontmatter, or with an empty block, has an empty record.
///
/// # Errors
///
/// Returns [`FmqError::Parse`] if the block is not closed.
/// Returns [`FmqError::Serialization`] if the YAML is malformed or is not a mapping.
pub fn parse_record(content: &str) -> Result<MetadataRecord, FmqError> {
    if !has_frontmatter(content) {
        return Ok(MetadataRecord::new());
    }

    let (yaml, _body) = split_frontmatter(content)?;
    if yaml.trim().is_empty() {
        return Ok(MetadataRecord::new());
    }

    let value: serde_yaml::Value =
        serde_yaml::from_str(yaml).map_err(|e| FmqError::Serialization(e.to_string()))?;

    match value {
        serde_yaml::Value::Mapping(mapping) => Ok(record_from_mapping(mapping)),
        serde_yaml::Value::Null => Ok(MetadataRecord::new()),
        other => Err(FmqError::Serialization(format!(
            "frontmatter must be a mapping, found {}",
            yaml_kind(&other)
        ))),
    }
}

fn yaml_kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "a boolean",
        serde_yaml::Value::Number(_) => "a number",
        serde_yaml::Value::String(_) => "a string",
        serde_yaml::Value::Sequence(_) => "a sequence",
        serde_yaml::Value::Mapping(_) => "a mapping",
        serde_yaml::Value::Tagged(_) => "a tagged value",
    }
}
