//! Error types for the extractor module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving or downloading media.
#[derive(Debug, Error)]
pub enum ExtractorError {
    /// yt-dlp binary not found.
    #[error("yt-dlp not found at path: {path}")]
    BinaryNotFound { path: PathBuf },

    /// Metadata lookup failed.
    #[error("Metadata lookup failed: {reason}")]
    MetadataFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// Download process failed.
    #[error("Download failed: {reason}")]
    DownloadFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// Failed to parse yt-dlp output.
    #[error("Failed to parse extractor output: {reason}")]
    ParseError { reason: String },

    /// The source offers no stream matching the request.
    #[error("No suitable stream: {reason}")]
    NoSuitableStream { reason: String },

    /// Process timed out.
    #[error("Extractor timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// I/O error while running the extractor.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractorError {
    pub fn metadata_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::MetadataFailed {
            reason: reason.into(),
            stderr,
        }
    }

    pub fn download_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::DownloadFailed {
            reason: reason.into(),
            stderr,
        }
    }

    pub fn no_suitable_stream(reason: impl Into<String>) -> Self {
        Self::NoSuitableStream {
            reason: reason.into(),
        }
    }

    /// Message including captured stderr, for diagnostics.
    pub fn details(&self) -> String {
        match self {
            Self::MetadataFailed {
                stderr: Some(stderr),
                ..
            }
            | Self::DownloadFailed {
                stderr: Some(stderr),
                ..
            } if !stderr.trim().is_empty() => format!("{}: {}", self, stderr.trim()),
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_include_stderr() {
        let err = ExtractorError::download_failed(
            "yt-dlp exited with code: Some(1)",
            Some("ERROR: Video unavailable\n".to_string()),
        );
        assert_eq!(
            err.details(),
            "Download failed: yt-dlp exited with code: Some(1): ERROR: Video unavailable"
        );
    }

    #[test]
    fn test_details_without_stderr() {
        let err = ExtractorError::Timeout { timeout_secs: 5 };
        assert_eq!(err.details(), "Extractor timed out after 5 seconds");
    }
}
