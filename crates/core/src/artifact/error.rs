//! Error types for the artifact module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while accessing stored artifacts.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// The artifact does not exist.
    #[error("Artifact not found: {path}")]
    NotFound { path: PathBuf },

    /// The store directory could not be created.
    #[error("Failed to create artifact directory {path}: {source}")]
    DirectoryFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// I/O error while reading an artifact.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArtifactError {
    /// Maps an I/O error for `path`, turning `NotFound` into the dedicated variant.
    pub fn from_io(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound { path: path.into() }
        } else {
            Self::Io(err)
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
