use async_trait::async_trait;
use std::path::Path;
use tokio::sync::mpsc;

use super::error::ConverterError;
use super::types::{ConversionJob, ConversionProgress, ConversionResult, ProbeReport};

/// Turns a downloaded media file into a deliverable audio file.
#[async_trait]
pub trait Converter: Send + Sync {
    fn name(&self) -> &str;

    async fn probe(&self, path: &Path) -> Result<ProbeReport, ConverterError>;

    /// Runs `job` to completion.
    ///
    /// Progress snapshots go to `progress` when given. Updates are dropped
    /// rather than awaited when the receiver lags or has gone away. The
    /// sender is released when this returns.
    async fn transcode(
        &self,
        job: &ConversionJob,
        progress: Option<mpsc::Sender<ConversionProgress>>,
    ) -> Result<ConversionResult, ConverterError>;

    /// Checks the tool is runnable and returns its version line.
    async fn validate(&self) -> Result<String, ConverterError>;
}
