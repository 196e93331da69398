//! Trait definitions for the artifact module.

use async_trait::async_trait;

use super::error::ArtifactError;
use super::types::{ArtifactPath, ArtifactRole, CleanupOutcome, DeliveryToken};

/// An artifact opened for streaming.
#[derive(Debug)]
pub struct OpenedArtifact {
    pub file: tokio::fs::File,
    pub size_bytes: u64,
}

/// A directory of transient files produced while serving requests.
///
/// Names embed a random token, so concurrent requests never collide and no
/// locking is needed.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Creates the backing location if it does not exist yet.
    async fn prepare(&self) -> Result<(), ArtifactError>;

    /// Computes a fresh, collision-free path. Touches nothing on disk.
    fn allocate(&self, base_name: &str, extension: &str, role: ArtifactRole) -> ArtifactPath;

    /// Maps a delivery token back to the final artifact it names.
    ///
    /// Returns `None` for malformed tokens. Does not check existence.
    fn resolve(&self, token: &DeliveryToken) -> Option<ArtifactPath>;

    async fn exists(&self, artifact: &ArtifactPath) -> bool;

    /// Best-effort removal. A missing file is not an error and failures are
    /// logged here, never returned as `Err`.
    async fn delete(&self, artifact: &ArtifactPath) -> CleanupOutcome;

    /// Opens the artifact for reading.
    async fn open(&self, artifact: &ArtifactPath) -> Result<OpenedArtifact, ArtifactError>;
}
