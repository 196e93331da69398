//! Filesystem-backed artifact store.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::error::ArtifactError;
use super::traits::{ArtifactStore, OpenedArtifact};
use super::types::{ArtifactPath, ArtifactRole, CleanupOutcome, DeliveryToken};

/// Artifact store rooted at a single directory.
#[derive(Debug, Clone)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ArtifactStore for FsArtifactStore {
    async fn prepare(&self) -> Result<(), ArtifactError> {
        if tokio::fs::try_exists(&self.root).await.unwrap_or(false) {
            return Ok(());
        }

        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| ArtifactError::DirectoryFailed {
                path: self.root.clone(),
                source,
            })?;
        info!(dir = %self.root.display(), "Created artifact directory");
        Ok(())
    }

    fn allocate(&self, base_name: &str, extension: &str, role: ArtifactRole) -> ArtifactPath {
        let unique = Uuid::new_v4().to_string();
        let file_name = ArtifactPath::compose_name(base_name, &unique, extension, role);
        debug!(file = %file_name, ?role, "Allocated artifact path");
        ArtifactPath::new(self.root.clone(), file_name, role)
    }

    fn resolve(&self, token: &DeliveryToken) -> Option<ArtifactPath> {
        // Re-parse so hand-built tokens get the same checks as client input.
        let token = DeliveryToken::parse(token.as_str())?;
        Some(ArtifactPath::new(
            self.root.clone(),
            token.as_str().to_string(),
            ArtifactRole::Final,
        ))
    }

    async fn exists(&self, artifact: &ArtifactPath) -> bool {
        tokio::fs::metadata(artifact.path())
            .await
            .map(|m| m.is_file())
            .unwrap_or(false)
    }

    async fn delete(&self, artifact: &ArtifactPath) -> CleanupOutcome {
        let path = artifact.path();
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                info!(path = %path.display(), role = ?artifact.role(), "Deleted artifact");
                CleanupOutcome::Removed
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Artifact already absent");
                CleanupOutcome::Absent
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to delete artifact");
                CleanupOutcome::Failed(e.to_string())
            }
        }
    }

    async fn open(&self, artifact: &ArtifactPath) -> Result<OpenedArtifact, ArtifactError> {
        let path = artifact.path();
        let file = tokio::fs::File::open(&path)
            .await
            .map_err(|e| ArtifactError::from_io(&path, e))?;
        let metadata = file
            .metadata()
            .await
            .map_err(|e| ArtifactError::from_io(&path, e))?;

        if !metadata.is_file() {
            return Err(ArtifactError::NotFound { path });
        }

        Ok(OpenedArtifact {
            file,
            size_bytes: metadata.len(),
        })
    }
}
