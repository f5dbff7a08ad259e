//! Template folder access.
//!
//! Templates are the regular files directly inside the configured template
//! folder. They are addressed by file name only, so a name can never reach
//! outside the folder.

use std::fs;
use std::path::PathBuf;

use fmq_core::{FmqError, TemplateError};
use tracing::debug;

use crate::Vault;

impl Vault {
    /// Absolute path of the template folder.
    #[must_use]
    pub fn template_dir(&self) -> PathBuf {
        self.root().join(&self.config().template_dir)
    }

    /// File names in the template folder, sorted. Subdirectories are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::FolderMissing`] if the folder does not exist
    /// and [`TemplateError::NoTemplates`] if it holds no files.
    pub fn list_templates(&self) -> Result<Vec<String>, FmqError> {
        let dir = self.template_dir();
        if !dir.is_dir() {
            return Err(TemplateError::FolderMissing(dir).into());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();

        if names.is_empty() {
            return Err(TemplateError::NoTemplates(dir).into());
        }
        debug!(dir = %dir.display(), templates = names.len(), "listed templates");
        Ok(names)
    }

    /// Raw text of the template called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::UnknownTemplate`] if `name` is not one of
    /// [`Vault::list_templates`], or the listing error itself.
    pub fn read_template(&self, name: &str) -> Result<String, FmqError> {
        let names = self.list_templates()?;
        if !names.iter().any(|n| n == name) {
            return Err(TemplateError::UnknownTemplate(name.to_string()).into());
        }
        Ok(fs::read_to_string(self.template_dir().join(name))?)
    }
}
