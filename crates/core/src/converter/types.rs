//! Transcode targets, jobs and reports.

use std::path::PathBuf;

/// MP3 encode settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioTarget {
    /// libmp3lame VBR scale, 0 (best) to 9.
    pub vbr_quality: u8,
}

impl AudioTarget {
    pub const EXTENSION: &'static str = "mp3";

    pub fn mp3_vbr(vbr_quality: u8) -> Self {
        Self { vbr_quality }
    }

    /// Encoder, quality and muxer arguments.
    pub fn ffmpeg_args(&self) -> Vec<String> {
        vec![
            "-c:a".to_string(),
            "libmp3lame".to_string(),
            "-q:a".to_string(),
            self.vbr_quality.to_string(),
            "-f".to_string(),
            "mp3".to_string(),
        ]
    }
}

impl Default for AudioTarget {
    fn default() -> Self {
        Self::mp3_vbr(0)
    }
}

/// Tags written into the output file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackTags {
    pub title: Option<String>,
    pub artist: Option<String>,
}

impl TrackTags {
    pub fn ffmpeg_args(&self) -> Vec<String> {
        [("title", &self.title), ("artist", &self.artist)]
            .into_iter()
            .filter_map(|(key, value)| value.as_ref().map(|v| format!("{}={}", key, v)))
            .flat_map(|pair| ["-metadata".to_string(), pair])
            .collect()
    }
}

/// One input file to transcode into one output file.
#[derive(Debug, Clone)]
pub struct ConversionJob {
    /// Correlates logs and progress; the orchestrator uses its request id.
    pub job_id: String,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub target: AudioTarget,
    pub tags: TrackTags,
}

#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub job_id: String,
    pub output_size_bytes: u64,
    pub elapsed_ms: u64,
}

/// What ffprobe reports about an input file.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReport {
    pub duration_secs: Option<f64>,
}

/// Snapshot emitted at the end of each ffmpeg progress block.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionProgress {
    pub job_id: String,
    pub out_time_secs: f64,
    /// Known only when the input duration could be probed.
    pub percent: Option<f32>,
    /// Multiple of real time.
    pub speed: Option<f32>,
}
