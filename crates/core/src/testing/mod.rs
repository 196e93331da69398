//! Testing utilities and mock implementations.
//!
//! This module provides mock implementations of the external tool traits,
//! allowing the request lifecycle to be tested without yt-dlp or ffmpeg.
//!
//! # Example
//!
//! ```rust,ignore
//! use tubegrab_core::testing::{fixtures, MockConverter, MockExtractor};
//!
//! let extractor = MockExtractor::with_info(fixtures::video_info(
//!     "Song",
//!     vec![fixtures::audio_format("251", "webm", 160.0)],
//! ));
//! let converter = MockConverter::new();
//!
//! // Use in a RequestOrchestrator...
//! ```

mod mock_converter;
mod mock_extractor;

pub use mock_converter::{MockConverter, RecordedConversion};
pub use mock_extractor::MockExtractor;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::extractor::{StreamFormat, VideoInfo};

    /// Metadata with a title and the given formats.
    pub fn video_info(title: &str, formats: Vec<StreamFormat>) -> VideoInfo {
        VideoInfo {
            title: Some(title.to_string()),
            uploader: Some("Test Channel".to_string()),
            formats,
        }
    }

    /// An audio-only stream.
    pub fn audio_format(format_id: &str, ext: &str, abr: f64) -> StreamFormat {
        StreamFormat {
            format_id: Some(format_id.to_string()),
            ext: Some(ext.to_string()),
            vcodec: Some("none".to_string()),
            acodec: Some(if ext == "webm" { "opus" } else { "mp4a.40.2" }.to_string()),
            abr: Some(abr),
            tbr: Some(abr),
            url: Some(format!("https://media.invalid/{}", format_id)),
            ..Default::default()
        }
    }

    /// A video-only mp4 stream.
    pub fn video_format(format_id: &str, height: u32, tbr: f64) -> StreamFormat {
        StreamFormat {
            format_id: Some(format_id.to_string()),
            ext: Some("mp4".to_string()),
            vcodec: Some("avc1.640028".to_string()),
            acodec: Some("none".to_string()),
            height: Some(height),
            tbr: Some(tbr),
            url: Some(format!("https://media.invalid/{}", format_id)),
            ..Default::default()
        }
    }

    /// An mp4 stream carrying both video and audio.
    pub fn muxed_format(format_id: &str, height: u32) -> StreamFormat {
        StreamFormat {
            acodec: Some("mp4a.40.2".to_string()),
            ..video_format(format_id, height, 1000.0)
        }
    }

    /// A typical set of streams: two audio-only, three video-only and one muxed.
    pub fn typical_formats() -> Vec<StreamFormat> {
        vec![
            audio_format("140", "m4a", 129.5),
            audio_format("251", "webm", 160.0),
            video_format("160", 144, 100.0),
            video_format("136", 720, 2500.0),
            video_format("137", 1080, 4400.0),
            muxed_format("18", 360),
        ]
    }
}
