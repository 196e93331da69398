//! Types for the request orchestrator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::artifact::DeliveryToken;
use crate::converter::ConverterError;
use crate::extractor::{ExtractorError, VideoQuality};

/// Route prefix under which final artifacts are downloadable.
pub const DOWNLOAD_ROUTE_PREFIX: &str = "/downloads";

/// What the client asked to receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputKind {
    /// MP3 audio.
    #[serde(rename = "mp3")]
    Audio,
    /// MP4 video with audio.
    #[serde(rename = "mp4")]
    Video,
}

impl OutputKind {
    /// Parses the wire value (`mp3` or `mp4`).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "mp3" => Some(Self::Audio),
            "mp4" => Some(Self::Video),
            _ => None,
        }
    }

    /// Extension of the final artifact.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Audio => "mp3",
            Self::Video => "mp4",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Audio => "audio/mpeg",
            Self::Video => "video/mp4",
        }
    }
}

impl std::fmt::Display for OutputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

/// A validated client request.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRequest {
    pub url: String,
    pub kind: OutputKind,
    /// Resolution ceiling. Ignored for audio.
    pub quality: VideoQuality,
}

impl MediaRequest {
    pub fn audio(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: OutputKind::Audio,
            quality: VideoQuality::Highest,
        }
    }

    pub fn video(url: impl Into<String>, quality: VideoQuality) -> Self {
        Self {
            url: url.into(),
            kind: OutputKind::Video,
            quality,
        }
    }
}

/// A final artifact ready for download.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedDownload {
    pub token: DeliveryToken,
    /// Relative URL the client should fetch, `/downloads/<token>`.
    pub download_url: String,
    /// Title reported by the source, if any.
    pub title: Option<String>,
    pub mime_type: String,
    pub kind: OutputKind,
}

impl PreparedDownload {
    pub(crate) fn new(token: DeliveryToken, title: Option<String>, kind: OutputKind) -> Self {
        let download_url = format!(
            "{}/{}",
            DOWNLOAD_ROUTE_PREFIX,
            urlencoding::encode(token.as_str())
        );
        Self {
            token,
            download_url,
            title,
            mime_type: kind.mime_type().to_string(),
            kind,
        }
    }

    /// File name the client will see, same as the token.
    pub fn file_name(&self) -> &str {
        self.token.as_str()
    }
}

/// Errors that can occur while preparing a download.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Metadata lookup failed.
    #[error("failed to fetch video metadata: {0}")]
    Metadata(#[source] ExtractorError),

    /// No stream satisfies the request.
    #[error("no suitable stream: {0}")]
    NoSuitableStream(String),

    /// Downloading the selected streams failed.
    #[error("download failed: {0}")]
    Download(#[source] ExtractorError),

    /// Transcoding failed.
    #[error("conversion to MP3 failed: {0}")]
    Conversion(#[source] ConverterError),

    /// A tool reported success but the output file is missing.
    #[error("output file was not created: {file_name}")]
    MissingOutput { file_name: String },

    /// The processing task ended abnormally.
    #[error("processing task failed: {0}")]
    TaskFailed(String),
}

impl ProcessError {
    /// Message for clients, including captured tool diagnostics.
    pub fn details(&self) -> String {
        match self {
            Self::Metadata(e) => format!("failed to fetch video metadata: {}", e.details()),
            Self::Download(e) => format!("download failed: {}", e.details()),
            Self::Conversion(e) => format!("conversion to MP3 failed: {}", e.details()),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_kind_parse() {
        assert_eq!(OutputKind::parse("mp3"), Some(OutputKind::Audio));
        assert_eq!(OutputKind::parse("MP4"), Some(OutputKind::Video));
        assert_eq!(OutputKind::parse("wav"), None);
        assert_eq!(OutputKind::parse(""), None);
    }

    #[test]
    fn test_output_kind_wire_value() {
        assert_eq!(
            serde_json::to_string(&OutputKind::Audio).unwrap(),
            "\"mp3\""
        );
        let kind: OutputKind = serde_json::from_str("\"mp4\"").unwrap();
        assert_eq!(kind, OutputKind::Video);
    }

    #[test]
    fn test_prepared_download_url_is_encoded() {
        let token = DeliveryToken::parse("My Song_abc.mp3").unwrap();
        let prepared = PreparedDownload::new(token, Some("My Song".to_string()), OutputKind::Audio);
        assert_eq!(prepared.download_url, "/downloads/My%20Song_abc.mp3");
        assert_eq!(prepared.file_name(), "My Song_abc.mp3");
        assert_eq!(prepared.mime_type, "audio/mpeg");
    }

    #[test]
    fn test_error_details_include_stderr() {
        let err = ProcessError::Download(ExtractorError::download_failed(
            "yt-dlp exited with code: Some(1)",
            Some("ERROR: Video unavailable".to_string()),
        ));
        let details = err.details();
        assert!(details.starts_with("download failed:"));
        assert!(details.contains("Video unavailable"));
    }
}
