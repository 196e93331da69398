//! Mock extractor for testing.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::extractor::{DownloadRequest, ExtractorError, MediaExtractor, VideoInfo};

/// Default bytes written for a successful download.
const MOCK_MEDIA_BYTES: &[u8] = b"mock-media-payload";

/// Mock implementation of the MediaExtractor trait.
///
/// Serves a configurable `VideoInfo`, records every download request and
/// writes a small payload to the requested output path, the way yt-dlp
/// would.
///
/// # Example
///
/// ```rust,ignore
/// use tubegrab_core::testing::{fixtures, MockExtractor};
///
/// let extractor = MockExtractor::new();
/// extractor
///     .set_info(fixtures::video_info("Song", vec![fixtures::audio_format("251", "webm", 160.0)]))
///     .await;
///
/// // Simulate yt-dlp failing halfway through a download
/// extractor.set_partial_on_failure(true).await;
/// extractor
///     .set_next_download_error(ExtractorError::download_failed("HTTP 403", None))
///     .await;
/// ```
#[derive(Debug)]
pub struct MockExtractor {
    /// Metadata returned for every URL.
    info: Arc<RwLock<VideoInfo>>,
    /// URLs passed to `fetch_info`.
    info_requests: Arc<RwLock<Vec<String>>>,
    /// Recorded download requests.
    downloads: Arc<RwLock<Vec<DownloadRequest>>>,
    /// If set, the next `fetch_info` fails with this error.
    next_info_error: Arc<RwLock<Option<ExtractorError>>>,
    /// If set, the next `download` fails with this error.
    next_download_error: Arc<RwLock<Option<ExtractorError>>>,
    /// Bytes written on a successful download.
    payload: Arc<RwLock<Vec<u8>>>,
    /// Whether successful downloads write the output file.
    write_output: Arc<RwLock<bool>>,
    /// Whether failed downloads leave a truncated output file.
    partial_on_failure: Arc<RwLock<bool>>,
    /// Simulated download duration in milliseconds.
    download_duration_ms: Arc<RwLock<u64>>,
}

impl Default for MockExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExtractor {
    /// Create a new mock extractor with no formats.
    pub fn new() -> Self {
        Self {
            info: Arc::new(RwLock::new(VideoInfo::default())),
            info_requests: Arc::new(RwLock::new(Vec::new())),
            downloads: Arc::new(RwLock::new(Vec::new())),
            next_info_error: Arc::new(RwLock::new(None)),
            next_download_error: Arc::new(RwLock::new(None)),
            payload: Arc::new(RwLock::new(MOCK_MEDIA_BYTES.to_vec())),
            write_output: Arc::new(RwLock::new(true)),
            partial_on_failure: Arc::new(RwLock::new(false)),
            download_duration_ms: Arc::new(RwLock::new(0)),
        }
    }

    /// Create a mock extractor serving the given metadata.
    pub fn with_info(info: VideoInfo) -> Self {
        Self {
            info: Arc::new(RwLock::new(info)),
            ..Self::new()
        }
    }

    /// Set the metadata returned by `fetch_info`.
    pub async fn set_info(&self, info: VideoInfo) {
        *self.info.write().await = info;
    }

    /// Configure the next `fetch_info` to fail.
    pub async fn set_next_info_error(&self, error: ExtractorError) {
        *self.next_info_error.write().await = Some(error);
    }

    /// Configure the next `download` to fail.
    pub async fn set_next_download_error(&self, error: ExtractorError) {
        *self.next_download_error.write().await = Some(error);
    }

    /// Set the bytes written by successful downloads.
    pub async fn set_payload(&self, payload: impl Into<Vec<u8>>) {
        *self.payload.write().await = payload.into();
    }

    /// When disabled, downloads succeed without creating the output.
    pub async fn set_write_output(&self, write: bool) {
        *self.write_output.write().await = write;
    }

    /// When enabled, failed downloads leave a truncated output file.
    pub async fn set_partial_on_failure(&self, partial: bool) {
        *self.partial_on_failure.write().await = partial;
    }

    /// Set the simulated download duration.
    pub async fn set_download_duration(&self, duration: Duration) {
        *self.download_duration_ms.write().await = duration.as_millis() as u64;
    }

    /// Get all recorded download requests.
    pub async fn recorded_downloads(&self) -> Vec<DownloadRequest> {
        self.downloads.read().await.clone()
    }

    /// Get all URLs metadata was requested for.
    pub async fn recorded_info_requests(&self) -> Vec<String> {
        self.info_requests.read().await.clone()
    }
}

#[async_trait]
impl MediaExtractor for MockExtractor {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch_info(&self, source_url: &str) -> Result<VideoInfo, ExtractorError> {
        self.info_requests
            .write()
            .await
            .push(source_url.to_string());

        if let Some(err) = self.next_info_error.write().await.take() {
            return Err(err);
        }

        Ok(self.info.read().await.clone())
    }

    async fn download(&self, request: &DownloadRequest) -> Result<(), ExtractorError> {
        self.downloads.write().await.push(request.clone());

        let duration_ms = *self.download_duration_ms.read().await;
        if duration_ms > 0 {
            tokio::time::sleep(Duration::from_millis(duration_ms)).await;
        }

        if let Some(err) = self.next_download_error.write().await.take() {
            if *self.partial_on_failure.read().await {
                let payload = self.payload.read().await.clone();
                let half = payload.len() / 2;
                tokio::fs::write(&request.output_path, &payload[..half]).await?;
            }
            return Err(err);
        }

        if *self.write_output.read().await {
            let payload = self.payload.read().await.clone();
            tokio::fs::write(&request.output_path, payload).await?;
        }

        Ok(())
    }

    async fn validate(&self) -> Result<String, ExtractorError> {
        Ok("mock 1.0".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::FormatSelector;
    use crate::testing::fixtures;
    use tempfile::TempDir;

    fn request(dir: &TempDir) -> DownloadRequest {
        DownloadRequest {
            source_url: "https://youtu.be/abc".to_string(),
            selector: FormatSelector::new("251"),
            output_path: dir.path().join("Song_input_1.webm"),
            merge_output_format: None,
        }
    }

    #[tokio::test]
    async fn test_fetch_info_returns_configured_metadata() {
        let extractor = MockExtractor::with_info(fixtures::video_info(
            "Song",
            vec![fixtures::audio_format("251", "webm", 160.0)],
        ));

        let info = extractor.fetch_info("https://youtu.be/abc").await.unwrap();
        assert_eq!(info.title.as_deref(), Some("Song"));
        assert_eq!(info.formats.len(), 1);
        assert_eq!(
            extractor.recorded_info_requests().await,
            vec!["https://youtu.be/abc".to_string()]
        );
    }

    #[tokio::test]
    async fn test_download_writes_payload() {
        let dir = TempDir::new().unwrap();
        let extractor = MockExtractor::new();
        extractor.set_payload(b"abc".to_vec()).await;

        extractor.download(&request(&dir)).await.unwrap();

        let written = tokio::fs::read(dir.path().join("Song_input_1.webm"))
            .await
            .unwrap();
        assert_eq!(written, b"abc");
        assert_eq!(extractor.recorded_downloads().await.len(), 1);
    }

    #[tokio::test]
    async fn test_download_failure_leaves_partial_file() {
        let dir = TempDir::new().unwrap();
        let extractor = MockExtractor::new();
        extractor.set_partial_on_failure(true).await;
        extractor
            .set_next_download_error(ExtractorError::download_failed("HTTP 403", None))
            .await;

        let err = extractor.download(&request(&dir)).await.unwrap_err();
        assert!(matches!(err, ExtractorError::DownloadFailed { .. }));
        assert!(dir.path().join("Song_input_1.webm").exists());
    }

    #[tokio::test]
    async fn test_info_error_is_consumed() {
        let extractor = MockExtractor::new();
        extractor
            .set_next_info_error(ExtractorError::metadata_failed("Video unavailable", None))
            .await;

        assert!(extractor.fetch_info("u").await.is_err());
        assert!(extractor.fetch_info("u").await.is_ok());
    }
}
