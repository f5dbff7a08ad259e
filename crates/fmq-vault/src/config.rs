//! Vault configuration, read from `.fmq.toml` at the vault root.
//!
//! ```toml
//! template_dir = "Template"
//! extension = "md"
//! include_hidden = false
//! fence = "fmq"
//! ```
//!
//! Every key is optional.

use std::path::Path;

use fmq_core::FmqError;
use serde::{Deserialize, Serialize};

/// Name of the configuration file at the vault root.
pub const CONFIG_FILE: &str = ".fmq.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VaultConfig {
    /// Template folder, relative to the vault root.
    pub template_dir: String,
    /// Extension of documents to scan, without the dot.
    pub extension: String,
    /// Whether to descend into dot-directories and read dot-files.
    pub include_hidden: bool,
    /// Info string marking a fenced block as a query.
    pub fence: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            template_dir: "Template".to_string(),
            extension: "md".to_string(),
            include_hidden: false,
            fence: "fmq".to_string(),
        }
    }
}

impl VaultConfig {
    /// Load `.fmq.toml` from `root`, falling back to defaults when absent.
    ///
    /// # Errors
    ///
    /// Returns [`FmqError::Io`] if the file exists but cannot be read, and
    /// [`FmqError::Serialization`] if it is not valid configuration.
    pub fn load(root: &Path) -> Result<Self, FmqError> {
        let path = root.join(CONFIG_FILE);
        if !path.is_file() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        Self::parse(&content)
    }

    /// Parse configuration text.
    ///
    /// # Errors
    ///
    /// Returns [`FmqError::Serialization`] on malformed TOML or unknown keys.
    pub fn parse(content: &str) -> Result<Self, FmqError> {
        toml::from_str(content)
            .map_err(|e| FmqError::Serialization(format!("{CONFIG_FILE}: {e}")))
    }
}
