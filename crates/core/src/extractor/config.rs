//! Configuration for the extractor module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the yt-dlp based extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Path to yt-dlp binary.
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: PathBuf,

    /// Timeout for a single yt-dlp invocation in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Additional arguments passed to every invocation (cookies, proxies...).
    #[serde(default)]
    pub extra_args: Vec<String>,
}

fn default_ytdlp_path() -> PathBuf {
    PathBuf::from("yt-dlp")
}

fn default_timeout() -> u64 {
    600 // 10 minutes
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: default_ytdlp_path(),
            timeout_secs: default_timeout(),
            extra_args: Vec::new(),
        }
    }
}

impl ExtractorConfig {
    /// Creates a new config with a custom yt-dlp path.
    pub fn with_path(ytdlp_path: PathBuf) -> Self {
        Self {
            ytdlp_path,
            ..Default::default()
        }
    }

    /// Sets the timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}
