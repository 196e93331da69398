//! Audio transcoding for MP3 requests.
//!
//! ```ignore
//! use tubegrab_core::converter::{AudioTarget, ConversionJob, Converter, FfmpegConverter, TrackTags};
//!
//! let converter = FfmpegConverter::with_defaults();
//! let version = converter.validate().await?;
//!
//! let job = ConversionJob {
//!     job_id: "req-1".to_string(),
//!     input_path: PathBuf::from("/tmp/Song_input_1.webm"),
//!     output_path: PathBuf::from("/tmp/Song_1.mp3"),
//!     target: AudioTarget::mp3_vbr(0),
//!     tags: TrackTags::default(),
//! };
//! let result = converter.transcode(&job, None).await?;
//! ```

mod config;
mod error;
mod ffmpeg;
mod traits;
mod types;

pub use config::ConverterConfig;
pub use error::ConverterError;
pub use ffmpeg::FfmpegConverter;
pub use traits::Converter;
pub use types::{
    AudioTarget, ConversionJob, ConversionProgress, ConversionResult, ProbeReport, TrackTags,
};
