//! Delayed, cancelable artifact deletion.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::artifact::{ArtifactPath, ArtifactStore, CleanupOutcome};

use super::types::TransferOutcome;

/// Spawns deletion tasks against an artifact store.
#[derive(Clone)]
pub struct CleanupScheduler {
    store: Arc<dyn ArtifactStore>,
    grace_delay: Duration,
}

impl CleanupScheduler {
    pub fn new(store: Arc<dyn ArtifactStore>, grace_delay: Duration) -> Self {
        Self { store, grace_delay }
    }

    /// Deletes `artifact` a grace delay after the transfer reports its end.
    ///
    /// A sender dropped without reporting counts as an aborted transfer.
    pub fn schedule_after_transfer(
        &self,
        artifact: ArtifactPath,
        transfer: oneshot::Receiver<TransferOutcome>,
    ) -> ScheduledDeletion {
        let store = Arc::clone(&self.store);
        let grace_delay = self.grace_delay;
        let file_name = artifact.file_name().to_string();
        let handle = tokio::spawn(async move {
            let outcome = transfer.await.unwrap_or(TransferOutcome::Aborted {
                bytes_sent: 0,
                reason: None,
            });
            match &outcome {
                TransferOutcome::Completed { bytes_sent } => {
                    info!(file = %artifact.file_name(), bytes_sent, "Transfer completed")
                }
                TransferOutcome::Aborted { bytes_sent, reason } => info!(
                    file = %artifact.file_name(),
                    bytes_sent,
                    reason = reason.as_deref().unwrap_or("client disconnected"),
                    "Transfer aborted"
                ),
            }

            debug!(
                file = %artifact.file_name(),
                delay_ms = grace_delay.as_millis() as u64,
                "Deletion scheduled"
            );
            tokio::time::sleep(grace_delay).await;
            store.delete(&artifact).await
        });
        ScheduledDeletion { file_name, handle }
    }
}

/// Handle to a pending deletion. Dropping it leaves the deletion running.
#[derive(Debug)]
pub struct ScheduledDeletion {
    file_name: String,
    handle: JoinHandle<CleanupOutcome>,
}

impl ScheduledDeletion {
    /// Stops the deletion if it has not run yet.
    pub fn cancel(&self) {
        debug!(file = %self.file_name, "Deletion cancelled");
        self.handle.abort();
    }

    /// Waits for the deletion. `None` if it was cancelled first.
    pub async fn wait(self) -> Option<CleanupOutcome> {
        self.handle.await.ok()
    }
}
