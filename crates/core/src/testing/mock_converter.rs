//! Scriptable stand-in for ffmpeg.

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};

use crate::converter::{
    ConversionJob, ConversionProgress, ConversionResult, Converter, ConverterError, ProbeReport,
};

/// Bytes written as the transcoded output.
const MOCK_MP3_BYTES: &[u8] = b"ID3\x04\x00\x00\x00\x00\x00\x00mock-mp3-frames";

/// Duration reported by `probe` and used for progress percentages.
const MOCK_DURATION_SECS: f64 = 180.0;

/// Progress snapshots sent per transcode.
const PROGRESS_STEPS: u32 = 4;

#[derive(Debug, Clone)]
pub struct RecordedConversion {
    pub job: ConversionJob,
    /// Whether the input file was on disk when the transcode started.
    pub input_existed: bool,
    pub success: bool,
}

#[derive(Debug)]
struct Behavior {
    delay: Duration,
    write_output: bool,
    partial_on_failure: bool,
}

/// In-memory [`Converter`] that writes a fixed MP3 payload.
///
/// Injected errors are consumed by the next `transcode`, `probe` or
/// `validate` call.
///
/// ```rust,ignore
/// let converter = MockConverter::new();
/// converter
///     .set_next_error(ConverterError::encode_failed("boom", None))
///     .await;
///
/// assert!(converter.transcode(&job, None).await.is_err());
/// assert_eq!(converter.conversion_count().await, 1);
/// ```
#[derive(Debug)]
pub struct MockConverter {
    conversions: Arc<RwLock<Vec<RecordedConversion>>>,
    next_error: Arc<RwLock<Option<ConverterError>>>,
    behavior: Arc<RwLock<Behavior>>,
}

impl Default for MockConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockConverter {
    pub fn new() -> Self {
        Self {
            conversions: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
            behavior: Arc::new(RwLock::new(Behavior {
                delay: Duration::ZERO,
                write_output: true,
                partial_on_failure: false,
            })),
        }
    }

    pub async fn recorded_conversions(&self) -> Vec<RecordedConversion> {
        self.conversions.read().await.clone()
    }

    pub async fn conversion_count(&self) -> usize {
        self.conversions.read().await.len()
    }

    pub async fn set_next_error(&self, error: ConverterError) {
        *self.next_error.write().await = Some(error);
    }

    /// Sleep this long before finishing each transcode.
    pub async fn set_conversion_duration(&self, delay: Duration) {
        self.behavior.write().await.delay = delay;
    }

    /// When disabled, transcodes report success without writing the output.
    pub async fn set_write_output(&self, write: bool) {
        self.behavior.write().await.write_output = write;
    }

    /// When enabled, failed transcodes leave a truncated output file.
    pub async fn set_partial_on_failure(&self, partial: bool) {
        self.behavior.write().await.partial_on_failure = partial;
    }

    async fn take_error(&self) -> Option<ConverterError> {
        self.next_error.write().await.take()
    }

    async fn record(&self, job: &ConversionJob, input_existed: bool, success: bool) {
        self.conversions.write().await.push(RecordedConversion {
            job: job.clone(),
            input_existed,
            success,
        });
    }
}

#[async_trait]
impl Converter for MockConverter {
    fn name(&self) -> &str {
        "mock"
    }

    async fn probe(&self, _path: &Path) -> Result<ProbeReport, ConverterError> {
        if let Some(err) = self.take_error().await {
            return Err(err);
        }

        Ok(ProbeReport {
            duration_secs: Some(MOCK_DURATION_SECS),
        })
    }

    async fn transcode(
        &self,
        job: &ConversionJob,
        progress: Option<mpsc::Sender<ConversionProgress>>,
    ) -> Result<ConversionResult, ConverterError> {
        let input_existed = tokio::fs::try_exists(&job.input_path)
            .await
            .unwrap_or(false);
        let (delay, write_output, partial_on_failure) = {
            let b = self.behavior.read().await;
            (b.delay, b.write_output, b.partial_on_failure)
        };

        if let Some(tx) = progress {
            for step in 1..=PROGRESS_STEPS {
                let fraction = step as f64 / PROGRESS_STEPS as f64;
                let _ = tx.try_send(ConversionProgress {
                    job_id: job.job_id.clone(),
                    out_time_secs: MOCK_DURATION_SECS * fraction,
                    percent: Some((fraction * 100.0) as f32),
                    speed: Some(25.0),
                });
            }
        }

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.take_error().await {
            if partial_on_failure {
                tokio::fs::write(&job.output_path, &MOCK_MP3_BYTES[..4]).await?;
            }
            self.record(job, input_existed, false).await;
            return Err(err);
        }

        if !input_existed {
            self.record(job, input_existed, false).await;
            return Err(ConverterError::MissingInput {
                path: job.input_path.clone(),
            });
        }

        let output_size_bytes = if write_output {
            tokio::fs::write(&job.output_path, MOCK_MP3_BYTES).await?;
            MOCK_MP3_BYTES.len() as u64
        } else {
            0
        };
        self.record(job, input_existed, true).await;

        Ok(ConversionResult {
            job_id: job.job_id.clone(),
            output_size_bytes,
            elapsed_ms: delay.as_millis() as u64,
        })
    }

    async fn validate(&self) -> Result<String, ConverterError> {
        match self.take_error().await {
            Some(err) => Err(err),
            None => Ok("mock ffmpeg".to_string()),
        }
    }
}
