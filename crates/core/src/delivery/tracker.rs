//! Delivery tracker implementation.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::artifact::{ArtifactStore, DeliveryToken};

use super::error::DeliveryError;
use super::scheduler::CleanupScheduler;
use super::stream::DeliveryStream;
use super::types::{mime_type_for, Delivery};

/// Hands final artifacts to clients and deletes them afterwards.
#[derive(Clone)]
pub struct DeliveryTracker {
    store: Arc<dyn ArtifactStore>,
    scheduler: CleanupScheduler,
}

impl DeliveryTracker {
    pub fn new(store: Arc<dyn ArtifactStore>, grace_delay: Duration) -> Self {
        let scheduler = CleanupScheduler::new(Arc::clone(&store), grace_delay);
        Self { store, scheduler }
    }

    pub fn scheduler(&self) -> &CleanupScheduler {
        &self.scheduler
    }

    /// Opens the artifact named by a client-supplied token.
    ///
    /// Deletion is scheduled right away but only runs a grace delay after
    /// the returned stream has been dropped.
    pub async fn deliver(&self, raw_token: &str) -> Result<Delivery, DeliveryError> {
        let artifact = DeliveryToken::parse(raw_token)
            .and_then(|token| self.store.resolve(&token))
            .ok_or_else(|| {
                debug!(token = %raw_token, "Rejected malformed delivery token");
                DeliveryError::not_found(raw_token)
            })?;

        let opened = self.store.open(&artifact).await.map_err(|e| {
            if e.is_not_found() {
                DeliveryError::not_found(raw_token)
            } else {
                DeliveryError::Artifact(e)
            }
        })?;

        info!(
            file = %artifact.file_name(),
            size_bytes = opened.size_bytes,
            "Starting delivery"
        );

        let (notify, transfer) = oneshot::channel();
        let file_name = artifact.file_name().to_string();
        let mime_type = mime_type_for(artifact.extension().as_deref());
        let stream = DeliveryStream::new(opened.file, notify);
        let cleanup = self.scheduler.schedule_after_transfer(artifact, transfer);

        Ok(Delivery {
            file_name,
            size_bytes: opened.size_bytes,
            mime_type,
            stream,
            cleanup,
        })
    }
}
