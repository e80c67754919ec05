//! Writes generated units under an output root.

use crate::emit::{GeneratedOutput, OutputFile};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
#[error("Failed to write {path}: {source}")]
pub struct WriteError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Writes files below `root`, creating directories and overwriting
/// existing content.
pub struct FsWriter {
    root: PathBuf,
}

impl FsWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn write(&self, file: &OutputFile) -> Result<PathBuf, WriteError> {
        let target = self.root.join(&file.path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| WriteError {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&target, &file.contents).map_err(|source| WriteError {
            path: target.clone(),
            source,
        })?;
        tracing::info!(path = %target.display(), bytes = file.contents.len(), "wrote file");
        Ok(target)
    }

    /// Write every unit; stops at the first failure.
    pub fn write_all(&self, output: &GeneratedOutput) -> Result<Vec<PathBuf>, WriteError> {
        output.files().map(|file| self.write(file)).collect()
    }

    /// Write only the combined unit.
    pub fn write_combined(&self, output: &GeneratedOutput) -> Result<PathBuf, WriteError> {
        self.write(&output.combined)
    }
}
