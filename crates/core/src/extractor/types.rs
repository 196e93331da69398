//! Types for the extractor module.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Codec value yt-dlp reports for an absent component.
const CODEC_NONE: &str = "none";

/// Metadata resolved for a source URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoInfo {
    #[serde(default)]
    pub title: Option<String>,
    /// Channel or account that published the video.
    #[serde(default)]
    pub uploader: Option<String>,
    #[serde(default)]
    pub formats: Vec<StreamFormat>,
}

/// One candidate stream offered by the source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamFormat {
    #[serde(default)]
    pub format_id: Option<String>,
    #[serde(default)]
    pub ext: Option<String>,
    #[serde(default)]
    pub vcodec: Option<String>,
    #[serde(default)]
    pub acodec: Option<String>,
    /// Audio bitrate in kbps.
    #[serde(default)]
    pub abr: Option<f64>,
    /// Total bitrate in kbps.
    #[serde(default)]
    pub tbr: Option<f64>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub url: Option<String>,
}

impl StreamFormat {
    /// Whether the stream is known to carry video.
    pub fn has_video(&self) -> bool {
        matches!(self.vcodec.as_deref(), Some(codec) if codec != CODEC_NONE)
    }

    /// Whether the stream may carry audio. An unreported codec counts as audio.
    pub fn has_audio(&self) -> bool {
        !matches!(self.acodec.as_deref(), Some(CODEC_NONE))
    }

    pub fn is_audio_only(&self) -> bool {
        !self.has_video() && self.has_audio()
    }

    fn ext_is(&self, ext: &str) -> bool {
        self.ext
            .as_deref()
            .is_some_and(|e| e.eq_ignore_ascii_case(ext))
    }
}

/// Requested ceiling for video resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoQuality {
    /// Best available, no ceiling.
    #[default]
    Highest,
    /// Best stream whose height does not exceed the value.
    MaxHeight(u32),
}

impl VideoQuality {
    /// Parses the client's quality hint.
    ///
    /// Absent, empty and `highest` mean no ceiling; `720` and `720p` mean a
    /// 720 line ceiling. Returns `None` for anything else.
    pub fn parse(hint: Option<&str>) -> Option<Self> {
        let hint = match hint.map(str::trim) {
            None | Some("") => return Some(Self::Highest),
            Some(h) => h,
        };

        if hint.eq_ignore_ascii_case("highest") {
            return Some(Self::Highest);
        }

        let digits = hint
            .strip_suffix('p')
            .or_else(|| hint.strip_suffix('P'))
            .unwrap_or(hint);
        match digits.parse::<u32>() {
            Ok(height) if height > 0 => Some(Self::MaxHeight(height)),
            _ => None,
        }
    }

    pub fn max_height(&self) -> Option<u32> {
        match self {
            Self::Highest => None,
            Self::MaxHeight(h) => Some(*h),
        }
    }

    /// Whether a stream of the given height satisfies the ceiling.
    ///
    /// Under a ceiling an unreported height is never admitted; those
    /// streams are left to yt-dlp's `height<=?` fallback.
    pub fn admits(&self, height: Option<u32>) -> bool {
        match self.max_height() {
            None => true,
            Some(max) => height.is_some_and(|h| h <= max),
        }
    }
}

/// A yt-dlp format selector expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormatSelector(String);

impl FormatSelector {
    pub fn new(expr: impl Into<String>) -> Self {
        Self(expr.into())
    }

    /// Selector for a chosen audio stream, or yt-dlp's own best audio.
    pub fn audio(stream: Option<&StreamFormat>) -> Self {
        match stream.and_then(|s| s.format_id.as_deref()) {
            Some(id) => Self::new(id),
            None => Self::new("bestaudio/best"),
        }
    }

    /// Selector for a chosen video stream, merged with the best m4a audio
    /// when the stream has no audio of its own.
    pub fn video_stream(stream: &StreamFormat) -> Option<Self> {
        let id = stream.format_id.as_deref()?;
        if stream.has_video() && stream.acodec.is_some() && stream.has_audio() {
            Some(Self::new(id))
        } else {
            Some(Self::new(format!("{id}+bestaudio[ext=m4a]/{id}")))
        }
    }

    /// Selector letting yt-dlp pick the best mp4 within the ceiling.
    pub fn video_fallback(quality: VideoQuality) -> Self {
        match quality.max_height() {
            None => Self::new("bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]"),
            Some(h) => Self::new(format!(
                "bestvideo[height<=?{h}][ext=mp4]+bestaudio[ext=m4a]/best[height<=?{h}][ext=mp4]"
            )),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FormatSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A download the extractor should perform.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRequest {
    pub source_url: String,
    pub selector: FormatSelector,
    pub output_path: PathBuf,
    /// Container to merge separate video and audio streams into.
    pub merge_output_format: Option<String>,
}

/// Picks the audio-only stream with the highest audio bitrate.
///
/// A missing bitrate counts as zero; on ties the first stream wins.
pub fn select_best_audio(formats: &[StreamFormat]) -> Option<&StreamFormat> {
    let mut best: Option<&StreamFormat> = None;
    for candidate in formats.iter().filter(|f| f.is_audio_only()) {
        let better = match best {
            None => true,
            Some(current) => candidate.abr.unwrap_or(0.0) > current.abr.unwrap_or(0.0),
        };
        if better {
            best = Some(candidate);
        }
    }
    best
}

/// Picks the tallest mp4 video stream allowed by `quality`.
///
/// Ties on height go to the higher total bitrate, then to the first stream.
pub fn select_best_video(formats: &[StreamFormat], quality: VideoQuality) -> Option<&StreamFormat> {
    let rank = |f: &StreamFormat| (f.height.unwrap_or(0), f.tbr.unwrap_or(0.0));

    let mut best: Option<&StreamFormat> = None;
    for candidate in formats
        .iter()
        .filter(|f| f.has_video() && f.ext_is("mp4") && quality.admits(f.height))
    {
        let better = match best {
            None => true,
            Some(current) => {
                let (ch, ct) = rank(candidate);
                let (bh, bt) = rank(current);
                ch > bh || (ch == bh && ct > bt)
            }
        };
        if better {
            best = Some(candidate);
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn audio(id: &str, ext: &str, abr: Option<f64>) -> StreamFormat {
        StreamFormat {
            format_id: Some(id.to_string()),
            ext: Some(ext.to_string()),
            vcodec: Some("none".to_string()),
            acodec: Some("opus".to_string()),
            abr,
            ..Default::default()
        }
    }

    fn video(id: &str, ext: &str, height: Option<u32>, tbr: Option<f64>) -> StreamFormat {
        StreamFormat {
            format_id: Some(id.to_string()),
            ext: Some(ext.to_string()),
            vcodec: Some("avc1.640028".to_string()),
            acodec: Some("none".to_string()),
            height,
            tbr,
            ..Default::default()
        }
    }

    #[test]
    fn test_best_audio_highest_bitrate() {
        let formats = vec![
            StreamFormat {
                abr: Some(128.0),
                ext: Some("m4a".to_string()),
                ..Default::default()
            },
            StreamFormat {
                abr: Some(192.0),
                ext: Some("webm".to_string()),
                ..Default::default()
            },
            StreamFormat {
                abr: None,
                ext: Some("opus".to_string()),
                ..Default::default()
            },
        ];
        let best = select_best_audio(&formats).unwrap();
        assert_eq!(best.abr, Some(192.0));
        assert_eq!(best.ext.as_deref(), Some("webm"));
    }

    #[test]
    fn test_best_audio_ignores_video_streams() {
        let formats = vec![
            video("137", "mp4", Some(1080), Some(4000.0)),
            StreamFormat {
                abr: Some(320.0),
                ..video("22", "mp4", Some(720), Some(1500.0))
            },
            audio("140", "m4a", Some(129.5)),
        ];
        assert_eq!(
            select_best_audio(&formats).unwrap().format_id.as_deref(),
            Some("140")
        );
    }

    #[test]
    fn test_best_audio_excludes_silent_streams() {
        let formats = vec![video("137", "mp4", Some(1080), None)];
        assert!(select_best_audio(&formats).is_none());
    }

    #[test]
    fn test_best_audio_tie_keeps_first() {
        let formats = vec![
            audio("a", "m4a", Some(160.0)),
            audio("b", "webm", Some(160.0)),
            audio("c", "opus", None),
        ];
        assert_eq!(
            select_best_audio(&formats).unwrap().format_id.as_deref(),
            Some("a")
        );
    }

    #[test]
    fn test_best_audio_all_missing_bitrate_keeps_first() {
        let formats = vec![audio("a", "m4a", None), audio("b", "webm", None)];
        assert_eq!(
            select_best_audio(&formats).unwrap().format_id.as_deref(),
            Some("a")
        );
    }

    #[test]
    fn test_best_video_respects_ceiling() {
        let formats = vec![
            video("137", "mp4", Some(1080), Some(4000.0)),
            video("136", "mp4", Some(720), Some(2000.0)),
            video("135", "mp4", Some(480), Some(1000.0)),
        ];
        let best = select_best_video(&formats, VideoQuality::MaxHeight(720)).unwrap();
        assert_eq!(best.format_id.as_deref(), Some("136"));
        assert!(best.height.unwrap() <= 720);
    }

    #[test]
    fn test_best_video_highest_has_no_ceiling() {
        let formats = vec![
            video("136", "mp4", Some(720), Some(2000.0)),
            video("401", "mp4", Some(2160), Some(15000.0)),
        ];
        let best = select_best_video(&formats, VideoQuality::Highest).unwrap();
        assert_eq!(best.format_id.as_deref(), Some("401"));
    }

    #[test]
    fn test_best_video_prefers_mp4_and_bitrate() {
        let formats = vec![
            video("248", "webm", Some(1080), Some(3000.0)),
            video("137a", "mp4", Some(1080), Some(2500.0)),
            video("137b", "mp4", Some(1080), Some(4000.0)),
        ];
        let best = select_best_video(&formats, VideoQuality::Highest).unwrap();
        assert_eq!(best.format_id.as_deref(), Some("137b"));
    }

    #[test]
    fn test_best_video_ceiling_skips_unknown_height() {
        let formats = vec![
            video("137", "mp4", Some(1080), Some(4000.0)),
            video("hls-x", "mp4", None, Some(900.0)),
        ];
        assert!(select_best_video(&formats, VideoQuality::MaxHeight(720)).is_none());

        // Without a ceiling the unknown height still qualifies
        let picked = select_best_video(&formats, VideoQuality::Highest).unwrap();
        assert_eq!(picked.format_id.as_deref(), Some("137"));
    }

    #[test]
    fn test_presence_flags_from_codecs() {
        let unreported = StreamFormat {
            format_id: Some("x".to_string()),
            ..Default::default()
        };
        assert!(!unreported.has_video());
        assert!(unreported.has_audio());
        assert!(unreported.is_audio_only());

        let silent = video("137", "mp4", Some(1080), None);
        assert!(silent.has_video());
        assert!(!silent.has_audio());
    }

    #[test]
    fn test_quality_admits() {
        assert!(VideoQuality::Highest.admits(None));
        assert!(VideoQuality::MaxHeight(720).admits(Some(720)));
        assert!(!VideoQuality::MaxHeight(720).admits(Some(1080)));
        assert!(!VideoQuality::MaxHeight(720).admits(None));
    }

    #[test]
    fn test_best_video_none_fits() {
        let formats = vec![video("137", "mp4", Some(1080), None)];
        assert!(select_best_video(&formats, VideoQuality::MaxHeight(360)).is_none());
    }

    #[test]
    fn test_quality_parse() {
        assert_eq!(VideoQuality::parse(None), Some(VideoQuality::Highest));
        assert_eq!(VideoQuality::parse(Some("")), Some(VideoQuality::Highest));
        assert_eq!(
            VideoQuality::parse(Some("highest")),
            Some(VideoQuality::Highest)
        );
        assert_eq!(
            VideoQuality::parse(Some("720")),
            Some(VideoQuality::MaxHeight(720))
        );
        assert_eq!(
            VideoQuality::parse(Some("1080p")),
            Some(VideoQuality::MaxHeight(1080))
        );
        assert_eq!(VideoQuality::parse(Some("best-ish")), None);
        assert_eq!(VideoQuality::parse(Some("0")), None);
    }

    #[test]
    fn test_selector_for_audio() {
        let stream = audio("251", "webm", Some(160.0));
        assert_eq!(FormatSelector::audio(Some(&stream)).as_str(), "251");

        let anonymous = StreamFormat::default();
        assert_eq!(
            FormatSelector::audio(Some(&anonymous)).as_str(),
            "bestaudio/best"
        );
        assert_eq!(FormatSelector::audio(None).as_str(), "bestaudio/best");
    }

    #[test]
    fn test_selector_for_video_stream() {
        let video_only = video("137", "mp4", Some(1080), None);
        assert_eq!(
            FormatSelector::video_stream(&video_only).unwrap().as_str(),
            "137+bestaudio[ext=m4a]/137"
        );

        let muxed = StreamFormat {
            acodec: Some("mp4a.40.2".to_string()),
            ..video("22", "mp4", Some(720), None)
        };
        assert_eq!(FormatSelector::video_stream(&muxed).unwrap().as_str(), "22");
    }

    #[test]
    fn test_selector_video_fallback() {
        let capped = FormatSelector::video_fallback(VideoQuality::MaxHeight(720));
        assert_eq!(
            capped.as_str(),
            "bestvideo[height<=?720][ext=mp4]+bestaudio[ext=m4a]/best[height<=?720][ext=mp4]"
        );

        let uncapped = FormatSelector::video_fallback(VideoQuality::Highest);
        assert!(!uncapped.as_str().contains("height"));
    }

    #[test]
    fn test_deserialize_ytdlp_format() {
        let json = r#"{
            "format_id": "140",
            "ext": "m4a",
            "vcodec": "none",
            "acodec": "mp4a.40.2",
            "abr": 129.478,
            "tbr": 129.478,
            "url": "https://example.invalid/audio",
            "filesize": 3453453
        }"#;
        let format: StreamFormat = serde_json::from_str(json).unwrap();
        assert!(format.is_audio_only());
        assert_eq!(format.height, None);
        assert_eq!(format.format_id.as_deref(), Some("140"));
    }
}
