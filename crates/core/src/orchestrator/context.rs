//! Per-request artifact bookkeeping.

use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::artifact::{ArtifactPath, ArtifactRole, ArtifactStore, CleanupOutcome};

/// Tracks every artifact one request allocates.
///
/// Whatever is still tracked when the request fails is deleted by
/// [`discard`](Self::discard). A context dropped without `commit` or
/// `discard` (panic, cancelled task) hands its artifacts to a background
/// cleanup task.
pub struct RequestContext {
    request_id: String,
    store: Arc<dyn ArtifactStore>,
    artifacts: Vec<ArtifactPath>,
}

impl RequestContext {
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            store,
            artifacts: Vec::new(),
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Allocates a path in the store and starts tracking it.
    pub fn allocate(
        &mut self,
        base_name: &str,
        extension: &str,
        role: ArtifactRole,
    ) -> ArtifactPath {
        let artifact = self.store.allocate(base_name, extension, role);
        self.artifacts.push(artifact.clone());
        artifact
    }

    /// Artifacts currently tracked, in allocation order.
    pub fn tracked(&self) -> &[ArtifactPath] {
        &self.artifacts
    }

    /// Deletes one artifact now and stops tracking it.
    pub async fn release(&mut self, artifact: &ArtifactPath) -> CleanupOutcome {
        self.artifacts.retain(|a| a != artifact);
        self.store.delete(artifact).await
    }

    /// Stops tracking everything; the artifacts now belong to the caller.
    pub fn commit(mut self) -> Vec<ArtifactPath> {
        std::mem::take(&mut self.artifacts)
    }

    /// Deletes every tracked artifact.
    pub async fn discard(mut self) {
        let artifacts = std::mem::take(&mut self.artifacts);
        debug!(
            request_id = %self.request_id,
            count = artifacts.len(),
            "Discarding request artifacts"
        );
        for artifact in &artifacts {
            let _ = self.store.delete(artifact).await;
        }
    }
}

impl Drop for RequestContext {
    fn drop(&mut self) {
        if self.artifacts.is_empty() {
            return;
        }

        let artifacts = std::mem::take(&mut self.artifacts);
        let store = Arc::clone(&self.store);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    for artifact in &artifacts {
                        let _ = store.delete(artifact).await;
                    }
                });
            }
            Err(_) => warn!(
                request_id = %self.request_id,
                count = artifacts.len(),
                "Request dropped outside a runtime, artifacts left behind"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::FsArtifactStore;
    use tempfile::TempDir;

    fn context() -> (RequestContext, Arc<dyn ArtifactStore>, TempDir) {
        let dir = TempDir::new().unwrap();
        let store: Arc<dyn ArtifactStore> = Arc::new(FsArtifactStore::new(dir.path()));
        (RequestContext::new(Arc::clone(&store)), store, dir)
    }

    #[tokio::test]
    async fn test_discard_removes_written_and_unwritten() {
        let (mut ctx, store, _dir) = context();
        let written = ctx.allocate("Song", "webm", ArtifactRole::Intermediate);
        let never_written = ctx.allocate("Song", "mp3", ArtifactRole::Final);
        tokio::fs::write(written.path(), b"partial").await.unwrap();

        ctx.discard().await;

        assert!(!store.exists(&written).await);
        assert!(!store.exists(&never_written).await);
    }

    #[tokio::test]
    async fn test_release_stops_tracking() {
        let (mut ctx, store, _dir) = context();
        let input = ctx.allocate("Song", "webm", ArtifactRole::Intermediate);
        let output = ctx.allocate("Song", "mp3", ArtifactRole::Final);
        tokio::fs::write(input.path(), b"a").await.unwrap();

        assert_eq!(ctx.release(&input).await, CleanupOutcome::Removed);
        assert_eq!(ctx.tracked(), std::slice::from_ref(&output));
        assert!(!store.exists(&input).await);
    }

    #[tokio::test]
    async fn test_commit_keeps_files() {
        let (mut ctx, store, _dir) = context();
        let output = ctx.allocate("Song", "mp3", ArtifactRole::Final);
        tokio::fs::write(output.path(), b"mp3").await.unwrap();

        let kept = ctx.commit();
        assert_eq!(kept, vec![output.clone()]);
        assert!(store.exists(&output).await);
    }

    #[tokio::test]
    async fn test_drop_schedules_cleanup() {
        let (mut ctx, store, _dir) = context();
        let output = ctx.allocate("Song", "mp3", ArtifactRole::Final);
        tokio::fs::write(output.path(), b"mp3").await.unwrap();

        drop(ctx);

        for _ in 0..50 {
            if !store.exists(&output).await {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        panic!("artifact survived a dropped context");
    }
}
