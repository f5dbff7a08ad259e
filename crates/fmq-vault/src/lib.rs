//! # fmq-vault
//!
//! File system access for fmq. A vault is a directory of markdown files;
//! each file's frontmatter becomes one [`Document`]. The vault also owns the
//! template folder used by template expansion.
//!
//! Discovery order is deterministic: entries are visited depth-first and
//! sorted by file name within each directory.

pub mod config;
pub mod templates;

use std::fs;
use std::path::{Path, PathBuf};

use fmq_core::{Document, FmqError};
use tracing::{debug, info, warn};

pub use config::{VaultConfig, CONFIG_FILE};

/// A directory of markdown documents.
#[derive(Debug, Clone)]
pub struct Vault {
    root: PathBuf,
    config: VaultConfig,
}

impl Vault {
    /// Open the vault at `root`, reading `.fmq.toml` if present.
    ///
    /// # Errors
    ///
    /// Returns [`FmqError::Vault`] if `root` is not a directory, or the
    /// configuration error from [`VaultConfig::load`].
    pub fn open(root: &Path) -> Result<Self, FmqError> {
        Self::check_root(root)?;
        let config = VaultConfig::load(root)?;
        Ok(Self {
            root: root.to_path_buf(),
            config,
        })
    }

    /// Open the vault at `root` with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FmqError::Vault`] if `root` is not a directory.
    pub fn with_config(root: &Path, config: VaultConfig) -> Result<Self, FmqError> {
        Self::check_root(root)?;
        Ok(Self {
            root: root.to_path_buf(),
            config,
        })
    }

    fn check_root(root: &Path) -> Result<(), FmqError> {
        if root.is_dir() {
            Ok(())
        } else {
            Err(FmqError::Vault(format!(
                "no vault folder found at {}",
                root.display()
            )))
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[must_use]
    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut VaultConfig {
        &mut self.config
    }

    /// Paths of every document in the vault, in discovery order.
    ///
    /// Unreadable subdirectories are logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`FmqError::Io`] if the vault root cannot be read.
    pub fn discover(&self) -> Result<Vec<PathBuf>, FmqError> {
        let mut paths = Vec::new();
        self.walk(&self.root, &mut paths)?;
        Ok(paths)
    }

    fn walk(&self, dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), FmqError> {
        let mut entries = fs::read_dir(dir)?.collect::<Result<Vec<_>, _>>()?;
        entries.sort_by_key(fs::DirEntry::file_name);

        for entry in entries {
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            if hidden && !self.config.include_hidden {
                continue;
            }

            let path = entry.path();
            let file_type = entry.file_type()?;
            if file_type.is_dir() {
                if let Err(err) = self.walk(&path, out) {
                    warn!(path = %path.display(), error = %err, "skipping unreadable directory");
                }
            } else if file_type.is_file()
                && path.extension().and_then(|e| e.to_str()) == Some(self.config.extension.as_str())
            {
                out.push(path);
            }
        }
        Ok(())
    }

    /// Read every document's frontmatter, in discovery order.
    ///
    /// Files that cannot be read, or whose frontmatter is malformed, are
    /// logged and left out.
    ///
    /// # Errors
    ///
    /// Returns [`FmqError::Io`] if the vault root cannot be read.
    pub fn load_documents(&self) -> Result<Vec<Document>, FmqError> {
        let paths = self.discover()?;
        let mut documents = Vec::with_capacity(paths.len());

        for path in paths {
            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping unreadable document");
                    continue;
                }
            };
            match Document::from_markdown(&path, &content) {
                Ok(doc) => {
                    debug!(path = %path.display(), fields = doc.record.len(), "loaded document");
                    documents.push(doc);
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "skipping document with malformed frontmatter"
                    );
                }
            }
        }

        info!(root = %self.root.display(), documents = documents.len(), "vault scanned");
        Ok(documents)
    }
}
