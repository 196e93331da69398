//! Error types for the delivery module.

use thiserror::Error;

use crate::artifact::ArtifactError;

/// Errors that can occur when starting a delivery.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Malformed token, unknown artifact, or already deleted.
    #[error("file not found: {token}")]
    NotFound { token: String },

    /// The artifact exists but could not be opened.
    #[error("failed to open artifact: {0}")]
    Artifact(#[source] ArtifactError),
}

impl DeliveryError {
    pub fn not_found(token: impl Into<String>) -> Self {
        Self::NotFound {
            token: token.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
