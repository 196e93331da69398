//! Request orchestrator implementation.
//!
//! Turns one client request into one final artifact:
//! - Audio: download the best audio stream, transcode it to MP3, drop the input
//! - Video: download the best mp4 stream (merged with m4a audio when needed)
//!
//! Every artifact allocated along the way is tracked by a `RequestContext`
//! so a failure at any step leaves nothing behind.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::artifact::{ArtifactPath, ArtifactRole, ArtifactStore, FALLBACK_BASE_NAME};
use crate::converter::{AudioTarget, ConversionJob, ConversionProgress, Converter, TrackTags};
use crate::extractor::{
    select_best_audio, select_best_video, DownloadRequest, FormatSelector, MediaExtractor,
    VideoInfo, VideoQuality,
};

use super::context::RequestContext;
use super::types::{MediaRequest, OutputKind, PreparedDownload, ProcessError};

/// Extension used for the downloaded audio when the stream reports none.
const DEFAULT_AUDIO_INPUT_EXT: &str = "m4a";

/// Container yt-dlp merges separate video and audio streams into.
const VIDEO_CONTAINER: &str = "mp4";

/// Coordinates extractor, converter and artifact store for each request.
pub struct RequestOrchestrator {
    store: Arc<dyn ArtifactStore>,
    extractor: Arc<dyn MediaExtractor>,
    converter: Arc<dyn Converter>,
    audio_target: AudioTarget,
}

impl RequestOrchestrator {
    /// Create a new orchestrator producing best-quality VBR MP3s.
    pub fn new(
        store: Arc<dyn ArtifactStore>,
        extractor: Arc<dyn MediaExtractor>,
        converter: Arc<dyn Converter>,
    ) -> Self {
        Self {
            store,
            extractor,
            converter,
            audio_target: AudioTarget::default(),
        }
    }

    /// Sets what audio requests are transcoded into.
    pub fn with_audio_target(mut self, target: AudioTarget) -> Self {
        self.audio_target = target;
        self
    }

    pub fn store(&self) -> &Arc<dyn ArtifactStore> {
        &self.store
    }

    /// Runs [`process`](Self::process) on its own task.
    ///
    /// The work, including failure cleanup, runs to completion even if the
    /// caller stops waiting for it.
    pub async fn submit(
        self: &Arc<Self>,
        request: MediaRequest,
    ) -> Result<PreparedDownload, ProcessError> {
        let this = Arc::clone(self);
        tokio::spawn(async move { this.process(request).await })
            .await
            .map_err(|e| ProcessError::TaskFailed(e.to_string()))?
    }

    /// Produces the final artifact for a request.
    pub async fn process(&self, request: MediaRequest) -> Result<PreparedDownload, ProcessError> {
        let mut ctx = RequestContext::new(Arc::clone(&self.store));
        info!(
            request_id = %ctx.request_id(),
            url = %request.url,
            kind = %request.kind,
            quality = ?request.quality,
            "Processing request"
        );

        let result = match request.kind {
            OutputKind::Audio => self.process_audio(&request.url, &mut ctx).await,
            OutputKind::Video => self.process_video(&request.url, request.quality, &mut ctx).await,
        };

        match result {
            Ok(prepared) => {
                info!(
                    request_id = %ctx.request_id(),
                    file = %prepared.file_name(),
                    "Download ready"
                );
                let _ = ctx.commit();
                Ok(prepared)
            }
            Err(e) => {
                error!(request_id = %ctx.request_id(), error = %e.details(), "Request failed");
                ctx.discard().await;
                Err(e)
            }
        }
    }

    async fn fetch_info(&self, url: &str) -> Result<VideoInfo, ProcessError> {
        let info = self
            .extractor
            .fetch_info(url)
            .await
            .map_err(ProcessError::Metadata)?;
        debug!(
            title = info.title.as_deref().unwrap_or(FALLBACK_BASE_NAME),
            formats = info.formats.len(),
            "Fetched metadata"
        );
        Ok(info)
    }

    async fn process_audio(
        &self,
        url: &str,
        ctx: &mut RequestContext,
    ) -> Result<PreparedDownload, ProcessError> {
        let info = self.fetch_info(url).await?;
        let base_name = info.title.as_deref().unwrap_or(FALLBACK_BASE_NAME);

        let best = select_best_audio(&info.formats).ok_or_else(|| {
            ProcessError::NoSuitableStream("no audio-only stream available".to_string())
        })?;
        let input_ext = best
            .ext
            .as_deref()
            .filter(|e| !e.is_empty())
            .unwrap_or(DEFAULT_AUDIO_INPUT_EXT);

        let input = ctx.allocate(base_name, input_ext, ArtifactRole::Intermediate);
        debug!(
            format_id = best.format_id.as_deref().unwrap_or_default(),
            abr = best.abr.unwrap_or_default(),
            input = %input.file_name(),
            "Selected audio stream"
        );

        self.extractor
            .download(&DownloadRequest {
                source_url: url.to_string(),
                selector: FormatSelector::audio(Some(best)),
                output_path: input.path(),
                merge_output_format: None,
            })
            .await
            .map_err(ProcessError::Download)?;

        let output = ctx.allocate(base_name, AudioTarget::EXTENSION, ArtifactRole::Final);
        let job = ConversionJob {
            job_id: ctx.request_id().to_string(),
            input_path: input.path(),
            output_path: output.path(),
            target: self.audio_target,
            tags: TrackTags {
                title: info.title.clone(),
                artist: info.uploader.clone(),
            },
        };

        let converted = self.transcode(&job).await;

        // The input is consumed whether or not the transcode worked
        let _ = ctx.release(&input).await;
        converted?;

        self.ensure_populated(&output).await?;
        Ok(PreparedDownload::new(output.token(), info.title, OutputKind::Audio))
    }

    async fn transcode(&self, job: &ConversionJob) -> Result<(), ProcessError> {
        let (progress_tx, mut progress_rx) = mpsc::channel::<ConversionProgress>(16);
        let progress_logger = tokio::spawn(async move {
            while let Some(progress) = progress_rx.recv().await {
                debug!(
                    job_id = %progress.job_id,
                    percent = ?progress.percent,
                    out_time_secs = progress.out_time_secs,
                    speed = ?progress.speed,
                    "Conversion progress"
                );
            }
        });

        let result = self
            .converter
            .transcode(job, Some(progress_tx))
            .await
            .map_err(ProcessError::Conversion);
        let _ = progress_logger.await;

        let converted = result?;
        debug!(
            job_id = %converted.job_id,
            elapsed_ms = converted.elapsed_ms,
            output_size_bytes = converted.output_size_bytes,
            "Transcode complete"
        );
        Ok(())
    }

    async fn process_video(
        &self,
        url: &str,
        quality: VideoQuality,
        ctx: &mut RequestContext,
    ) -> Result<PreparedDownload, ProcessError> {
        let info = self.fetch_info(url).await?;
        let base_name = info.title.as_deref().unwrap_or(FALLBACK_BASE_NAME);

        let selector = match select_best_video(&info.formats, quality)
            .and_then(FormatSelector::video_stream)
        {
            Some(selector) => selector,
            None => {
                debug!(?quality, "No listed mp4 stream fits, using yt-dlp fallback selector");
                FormatSelector::video_fallback(quality)
            }
        };

        let output = ctx.allocate(base_name, VIDEO_CONTAINER, ArtifactRole::Final);
        debug!(selector = %selector, output = %output.file_name(), "Selected video streams");

        self.extractor
            .download(&DownloadRequest {
                source_url: url.to_string(),
                selector,
                output_path: output.path(),
                merge_output_format: Some(VIDEO_CONTAINER.to_string()),
            })
            .await
            .map_err(ProcessError::Download)?;

        self.ensure_populated(&output).await?;
        Ok(PreparedDownload::new(output.token(), info.title, OutputKind::Video))
    }

    /// A tool that exits cleanly without writing its output is a failure.
    async fn ensure_populated(&self, artifact: &ArtifactPath) -> Result<(), ProcessError> {
        if self.store.exists(artifact).await {
            Ok(())
        } else {
            Err(ProcessError::MissingOutput {
                file_name: artifact.file_name().to_string(),
            })
        }
    }
}
