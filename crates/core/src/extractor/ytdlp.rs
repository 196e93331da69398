//! yt-dlp based extractor implementation.

use async_trait::async_trait;
use std::process::{Output, Stdio};
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, info};

use super::config::ExtractorConfig;
use super::error::ExtractorError;
use super::traits::MediaExtractor;
use super::types::{DownloadRequest, VideoInfo};

/// Extractor that shells out to yt-dlp.
pub struct YtDlpExtractor {
    config: ExtractorConfig,
}

impl YtDlpExtractor {
    /// Creates a new extractor with the given configuration.
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Creates an extractor with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(ExtractorConfig::default())
    }

    /// Builds yt-dlp arguments for a metadata lookup.
    fn build_info_args(&self, source_url: &str) -> Vec<String> {
        let mut args = vec![
            "--dump-single-json".to_string(),
            "--no-playlist".to_string(),
            "--no-warnings".to_string(),
        ];
        args.extend(self.config.extra_args.iter().cloned());
        args.push(source_url.to_string());
        args
    }

    /// Builds yt-dlp arguments for a download.
    fn build_download_args(&self, request: &DownloadRequest) -> Vec<String> {
        let mut args = vec![
            request.source_url.clone(),
            "-f".to_string(),
            request.selector.as_str().to_string(),
            "-o".to_string(),
            request.output_path.to_string_lossy().to_string(),
            "--no-playlist".to_string(),
            "--no-part".to_string(),
            "--no-progress".to_string(),
        ];

        if let Some(ref container) = request.merge_output_format {
            args.extend(["--merge-output-format".to_string(), container.clone()]);
        }

        args.extend(self.config.extra_args.iter().cloned());
        args
    }

    /// Parses `--dump-single-json` output.
    fn parse_info_output(output: &[u8]) -> Result<VideoInfo, ExtractorError> {
        serde_json::from_slice(output).map_err(|e| ExtractorError::ParseError {
            reason: format!("Failed to parse yt-dlp JSON: {}", e),
        })
    }

    /// Runs yt-dlp to completion under the configured timeout.
    async fn run(&self, args: &[String]) -> Result<Output, ExtractorError> {
        debug!(binary = %self.config.ytdlp_path.display(), ?args, "Running yt-dlp");

        let child = Command::new(&self.config.ytdlp_path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let timeout_duration = Duration::from_secs(self.config.timeout_secs);
        match timeout(timeout_duration, child).await {
            Ok(Ok(output)) => Ok(output),
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ExtractorError::BinaryNotFound {
                    path: self.config.ytdlp_path.clone(),
                })
            }
            Ok(Err(e)) => Err(ExtractorError::Io(e)),
            // Dropping the output future kills the child
            Err(_) => Err(ExtractorError::Timeout {
                timeout_secs: self.config.timeout_secs,
            }),
        }
    }
}

fn stderr_text(output: &Output) -> Option<String> {
    let text = String::from_utf8_lossy(&output.stderr).trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait]
impl MediaExtractor for YtDlpExtractor {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn fetch_info(&self, source_url: &str) -> Result<VideoInfo, ExtractorError> {
        let output = self.run(&self.build_info_args(source_url)).await?;

        if !output.status.success() {
            return Err(ExtractorError::metadata_failed(
                format!("yt-dlp exited with code: {:?}", output.status.code()),
                stderr_text(&output),
            ));
        }

        let info = Self::parse_info_output(&output.stdout)?;
        debug!(
            title = info.title.as_deref().unwrap_or_default(),
            formats = info.formats.len(),
            "Resolved video metadata"
        );
        Ok(info)
    }

    async fn download(&self, request: &DownloadRequest) -> Result<(), ExtractorError> {
        info!(
            selector = %request.selector,
            output = %request.output_path.display(),
            "Downloading streams"
        );

        let output = self.run(&self.build_download_args(request)).await?;

        if !output.status.success() {
            return Err(ExtractorError::download_failed(
                format!("yt-dlp exited with code: {:?}", output.status.code()),
                stderr_text(&output),
            ));
        }

        Ok(())
    }

    async fn validate(&self) -> Result<String, ExtractorError> {
        let output = self.run(&["--version".to_string()]).await?;
        if !output.status.success() {
            return Err(ExtractorError::metadata_failed(
                "yt-dlp --version failed",
                stderr_text(&output),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}
