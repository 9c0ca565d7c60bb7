//! Output sink for reconciled translations.

use std::path::PathBuf;

use thiserror::Error;

use crate::tree::LocaleTree;

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Failed to write '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize translations: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Destination for the final per-language trees.
pub trait Sink: Send + Sync {
    /// Persists `tree` as the `language` version of content unit `unit`.
    ///
    /// # Errors
    /// Returns [`SinkError`] when the tree could not be written.
    fn write(&self, unit: &str, language: &str, tree: &LocaleTree) -> Result<(), SinkError>;
}

/// Writes `<root>/<language>/<unit>.json`, pretty-printed.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    /// Output root; one subdirectory per language
    root: PathBuf,
}

impl DirectorySink {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[must_use]
    pub fn output_path(&self, unit: &str, language: &str) -> PathBuf {
        let mut path = self.root.join(language);
        path.push(format!("{unit}.json"));
        path
    }
}

impl Sink for DirectorySink {
    fn write(&self, unit: &str, language: &str, tree: &LocaleTree) -> Result<(), SinkError> {
        let path = self.output_path(unit, language);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|source| SinkError::Io { path: parent.to_path_buf(), source })?;
        }

        let mut content = serde_json::to_string_pretty(tree)?;
        content.push('\n');
        std::fs::write(&path, content).map_err(|source| SinkError::Io { path: path.clone(), source })?;

        tracing::debug!(unit, language, path = %path.display(), "Wrote translations");
        Ok(())
    }
}
