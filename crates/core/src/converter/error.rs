use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConverterError {
    #[error("{tool} not found at {}", .path.display())]
    ToolNotFound { tool: &'static str, path: PathBuf },

    #[error("input file does not exist: {}", .path.display())]
    MissingInput { path: PathBuf },

    #[error("ffmpeg failed: {reason}")]
    EncodeFailed {
        reason: String,
        /// Last diagnostic lines ffmpeg printed.
        stderr: Option<String>,
    },

    #[error("ffmpeg did not finish within {timeout_secs}s")]
    TimedOut { timeout_secs: u64 },

    #[error("probe failed: {0}")]
    Probe(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ConverterError {
    pub fn encode_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::EncodeFailed {
            reason: reason.into(),
            stderr,
        }
    }

    /// Message suitable for a client-facing `details` field.
    pub fn details(&self) -> String {
        match self {
            Self::EncodeFailed {
                reason,
                stderr: Some(stderr),
            } => format!("{}: {}", reason, stderr.trim()),
            other => other.to_string(),
        }
    }
}
