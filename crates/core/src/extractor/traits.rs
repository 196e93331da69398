//! Trait definitions for the extractor module.

use async_trait::async_trait;

use super::error::ExtractorError;
use super::types::{DownloadRequest, VideoInfo};

/// A tool that resolves source URLs into stream metadata and downloads
/// selected streams to local files.
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// Returns the name of this extractor implementation.
    fn name(&self) -> &str;

    /// Resolves title and candidate streams for a source URL.
    async fn fetch_info(&self, source_url: &str) -> Result<VideoInfo, ExtractorError>;

    /// Downloads the selected streams to `request.output_path`.
    async fn download(&self, request: &DownloadRequest) -> Result<(), ExtractorError>;

    /// Checks that the tool is usable and returns its version string.
    async fn validate(&self) -> Result<String, ExtractorError>;
}
