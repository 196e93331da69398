//! Extractor module for resolving and downloading source media.
//!
//! This module provides the `MediaExtractor` trait, a yt-dlp backed
//! implementation, and the stream selection rules used to choose what to
//! download.
//!
//! # Example
//!
//! ```ignore
//! use tubegrab_core::extractor::{
//!     select_best_audio, DownloadRequest, FormatSelector, MediaExtractor, YtDlpExtractor,
//! };
//!
//! let extractor = YtDlpExtractor::with_defaults();
//! let info = extractor.fetch_info("https://www.youtube.com/watch?v=dQw4w9WgXcQ").await?;
//!
//! let best = select_best_audio(&info.formats);
//! extractor
//!     .download(&DownloadRequest {
//!         source_url: "https://www.youtube.com/watch?v=dQw4w9WgXcQ".to_string(),
//!         selector: FormatSelector::audio(best),
//!         output_path: PathBuf::from("/tmp/audio.webm"),
//!         merge_output_format: None,
//!     })
//!     .await?;
//! ```

mod config;
mod error;
mod traits;
mod types;
mod ytdlp;

pub use config::ExtractorConfig;
pub use error::ExtractorError;
pub use traits::MediaExtractor;
pub use types::{
    select_best_audio, select_best_video, DownloadRequest, FormatSelector, StreamFormat,
    VideoInfo, VideoQuality,
};
pub use ytdlp::YtDlpExtractor;
