use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::types::AudioTarget;

/// `[converter]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    pub ffmpeg_path: PathBuf,
    /// Only used for progress percentages; conversions work without it.
    pub ffprobe_path: PathBuf,
    pub timeout_secs: u64,
    /// Passed to `-loglevel`.
    pub ffmpeg_log_level: String,
    /// libmp3lame VBR scale, 0 (best) to 9.
    pub mp3_quality: u8,
    /// Appended right before the output path.
    pub extra_ffmpeg_args: Vec<String>,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            timeout_secs: 3600,
            ffmpeg_log_level: "warning".to_string(),
            mp3_quality: 0,
            extra_ffmpeg_args: Vec::new(),
        }
    }
}

impl ConverterConfig {
    pub fn with_ffmpeg(mut self, path: impl Into<PathBuf>) -> Self {
        self.ffmpeg_path = path.into();
        self
    }

    pub fn with_ffprobe(mut self, path: impl Into<PathBuf>) -> Self {
        self.ffprobe_path = path.into();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    pub fn with_mp3_quality(mut self, quality: u8) -> Self {
        self.mp3_quality = quality;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Target used for `format: "mp3"` requests.
    pub fn mp3_target(&self) -> AudioTarget {
        AudioTarget::mp3_vbr(self.mp3_quality)
    }
}
