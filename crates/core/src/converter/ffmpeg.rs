//! ffmpeg-backed audio transcoder.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::VecDeque;
use std::path::Path;
use std::process::Stdio;
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::config::ConverterConfig;
use super::error::ConverterError;
use super::traits::Converter;
use super::types::{ConversionJob, ConversionProgress, ConversionResult, ProbeReport};

/// Diagnostic stderr lines kept for error reports.
const STDERR_TAIL_LINES: usize = 20;

pub struct FfmpegConverter {
    config: ConverterConfig,
}

impl FfmpegConverter {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(ConverterConfig::default())
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    fn encode_args(&self, job: &ConversionJob) -> Vec<String> {
        let mut args = vec![
            "-y".to_string(),
            "-i".to_string(),
            job.input_path.to_string_lossy().into_owned(),
            "-vn".to_string(),
        ];
        args.extend(job.target.ffmpeg_args());
        args.extend(job.tags.ffmpeg_args());
        args.extend([
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
            "-nostats".to_string(),
            "-progress".to_string(),
            "pipe:2".to_string(),
        ]);
        args.extend(self.config.extra_ffmpeg_args.iter().cloned());
        args.push(job.output_path.to_string_lossy().into_owned());
        args
    }
}

fn launch_error(tool: &'static str, path: &Path, err: std::io::Error) -> ConverterError {
    if err.kind() == std::io::ErrorKind::NotFound {
        ConverterError::ToolNotFound {
            tool,
            path: path.to_path_buf(),
        }
    } else {
        ConverterError::Io(err)
    }
}

async fn tool_version(tool: &'static str, path: &Path) -> Result<String, ConverterError> {
    let output = Command::new(path)
        .arg("-version")
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(|e| launch_error(tool, path, e))?;

    if !output.status.success() {
        return Err(ConverterError::Probe(format!(
            "{} -version exited with {}",
            tool, output.status
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .unwrap_or_default()
        .trim()
        .to_string())
}

fn parse_probe(json: &str) -> Result<ProbeReport, ConverterError> {
    #[derive(Deserialize)]
    struct ProbeJson {
        format: FormatJson,
    }

    #[derive(Deserialize)]
    struct FormatJson {
        duration: Option<String>,
    }

    let probe: ProbeJson = serde_json::from_str(json)
        .map_err(|e| ConverterError::Probe(format!("unreadable ffprobe output: {}", e)))?;

    Ok(ProbeReport {
        duration_secs: probe.format.duration.as_deref().and_then(|d| d.parse().ok()),
    })
}

/// Keys ffmpeg writes in a `-progress` block.
const PROGRESS_KEYS: &[&str] = &[
    "frame",
    "fps",
    "bitrate",
    "total_size",
    "out_time_us",
    "out_time_ms",
    "out_time",
    "dup_frames",
    "drop_frames",
    "speed",
    "progress",
];

/// Whether `line` belongs to a `-progress` block rather than diagnostics.
fn is_progress_line(line: &str) -> bool {
    line.split_once('=').is_some_and(|(key, _)| {
        PROGRESS_KEYS.contains(&key) || (key.starts_with("stream_") && key.ends_with("_q"))
    })
}

/// Accumulates one `-progress` block.
#[derive(Debug, Default)]
struct ProgressState {
    out_time_secs: f64,
    speed: Option<f32>,
}

impl ProgressState {
    /// Applies one line. Returns `true` when the block is complete.
    fn apply(&mut self, line: &str) -> bool {
        let Some((key, value)) = line.split_once('=') else {
            return false;
        };
        let value = value.trim();
        match key {
            // Both keys carry microseconds.
            "out_time_us" | "out_time_ms" => {
                if let Ok(us) = value.parse::<f64>() {
                    self.out_time_secs = us / 1_000_000.0;
                }
                false
            }
            "speed" => {
                self.speed = value.trim_end_matches('x').trim().parse().ok();
                false
            }
            "progress" => true,
            _ => false,
        }
    }

    fn snapshot(&self, job_id: &str, duration_secs: Option<f64>) -> ConversionProgress {
        let percent = duration_secs
            .filter(|d| *d > 0.0)
            .map(|d| ((self.out_time_secs / d) * 100.0).clamp(0.0, 100.0) as f32);
        ConversionProgress {
            job_id: job_id.to_string(),
            out_time_secs: self.out_time_secs,
            percent,
            speed: self.speed,
        }
    }
}

#[async_trait]
impl Converter for FfmpegConverter {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn probe(&self, path: &Path) -> Result<ProbeReport, ConverterError> {
        if !tokio::fs::try_exists(path).await.unwrap_or(false) {
            return Err(ConverterError::MissingInput {
                path: path.to_path_buf(),
            });
        }

        let output = Command::new(&self.config.ffprobe_path)
            .args([
                "-v",
                "error",
                "-print_format",
                "json",
                "-show_format",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| launch_error("ffprobe", &self.config.ffprobe_path, e))?;

        if !output.status.success() {
            return Err(ConverterError::Probe(format!(
                "ffprobe exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        parse_probe(&String::from_utf8_lossy(&output.stdout))
    }

    async fn transcode(
        &self,
        job: &ConversionJob,
        progress: Option<mpsc::Sender<ConversionProgress>>,
    ) -> Result<ConversionResult, ConverterError> {
        if !tokio::fs::try_exists(&job.input_path).await.unwrap_or(false) {
            return Err(ConverterError::MissingInput {
                path: job.input_path.clone(),
            });
        }

        // Only percentages need the input duration
        let duration_secs = if progress.is_some() {
            match self.probe(&job.input_path).await {
                Ok(report) => report.duration_secs,
                Err(e) => {
                    debug!(
                        job_id = %job.job_id,
                        error = %e,
                        "Probe failed, progress without percent"
                    );
                    None
                }
            }
        } else {
            None
        };

        let args = self.encode_args(job);
        info!(
            job_id = %job.job_id,
            input = %job.input_path.display(),
            output = %job.output_path.display(),
            vbr_quality = job.target.vbr_quality,
            "Transcoding"
        );
        debug!(?args, "Spawning ffmpeg");

        let started = Instant::now();
        let mut child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| launch_error("ffmpeg", &self.config.ffmpeg_path, e))?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| ConverterError::encode_failed("ffmpeg stderr was not captured", None))?;

        let drive = async {
            let mut lines = BufReader::new(stderr).lines();
            let mut state = ProgressState::default();
            let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);

            while let Some(line) = lines.next_line().await? {
                if is_progress_line(&line) {
                    if state.apply(&line) {
                        if let Some(tx) = &progress {
                            let _ = tx.try_send(state.snapshot(&job.job_id, duration_secs));
                        }
                    }
                } else if !line.trim().is_empty() {
                    if tail.len() == STDERR_TAIL_LINES {
                        tail.pop_front();
                    }
                    tail.push_back(line);
                }
            }

            let status = child.wait().await?;
            Ok::<_, std::io::Error>((status, tail))
        };

        let outcome = timeout(self.config.timeout(), drive).await;
        let (status, tail) = match outcome {
            Ok(result) => result?,
            Err(_) => {
                warn!(
                    job_id = %job.job_id,
                    timeout_secs = self.config.timeout_secs,
                    "ffmpeg timed out, killing"
                );
                let _ = child.kill().await;
                return Err(ConverterError::TimedOut {
                    timeout_secs: self.config.timeout_secs,
                });
            }
        };

        if !status.success() {
            let stderr = (!tail.is_empty()).then(|| Vec::from(tail).join("\n"));
            return Err(ConverterError::encode_failed(
                format!("ffmpeg exited with {}", status),
                stderr,
            ));
        }

        let output_size_bytes = tokio::fs::metadata(&job.output_path)
            .await
            .map(|m| m.len())
            .map_err(|_| {
                ConverterError::encode_failed("ffmpeg exited cleanly but wrote no output", None)
            })?;

        let elapsed_ms = started.elapsed().as_millis() as u64;
        info!(job_id = %job.job_id, elapsed_ms, output_size_bytes, "Transcode finished");

        Ok(ConversionResult {
            job_id: job.job_id.clone(),
            output_size_bytes,
            elapsed_ms,
        })
    }

    async fn validate(&self) -> Result<String, ConverterError> {
        let version = tool_version("ffmpeg", &self.config.ffmpeg_path).await?;
        if let Err(e) = tool_version("ffprobe", &self.config.ffprobe_path).await {
            debug!(error = %e, "ffprobe unavailable, progress will lack percentages");
        }
        Ok(version)
    }
}
