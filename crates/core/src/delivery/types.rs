//! Types for the delivery module.

use serde::Serialize;

use super::scheduler::ScheduledDeletion;
use super::stream::DeliveryStream;

/// How a transfer ended, as observed by the stream that carried it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TransferOutcome {
    /// The whole file was read.
    Completed { bytes_sent: u64 },
    /// The stream was dropped early or hit a read error.
    Aborted {
        bytes_sent: u64,
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
    },
}

impl TransferOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }

    pub fn bytes_sent(&self) -> u64 {
        match self {
            Self::Completed { bytes_sent } | Self::Aborted { bytes_sent, .. } => *bytes_sent,
        }
    }
}

/// A final artifact being handed to a client.
pub struct Delivery {
    pub file_name: String,
    pub size_bytes: u64,
    pub mime_type: &'static str,
    /// File contents. Dropping it ends the transfer.
    pub stream: DeliveryStream,
    /// Deletion that runs once the transfer has ended.
    pub cleanup: ScheduledDeletion,
}

impl std::fmt::Debug for Delivery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Delivery")
            .field("file_name", &self.file_name)
            .field("size_bytes", &self.size_bytes)
            .field("mime_type", &self.mime_type)
            .finish_non_exhaustive()
    }
}

/// Content type for a file extension.
pub fn mime_type_for(extension: Option<&str>) -> &'static str {
    match extension.map(str::to_ascii_lowercase).as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("mp4") => "video/mp4",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_type_for() {
        assert_eq!(mime_type_for(Some("mp3")), "audio/mpeg");
        assert_eq!(mime_type_for(Some("MP4")), "video/mp4");
        assert_eq!(mime_type_for(Some("webm")), "application/octet-stream");
        assert_eq!(mime_type_for(None), "application/octet-stream");
    }

    #[test]
    fn test_transfer_outcome_serialization() {
        let outcome = TransferOutcome::Aborted {
            bytes_sent: 10,
            reason: None,
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["outcome"], "aborted");
        assert_eq!(json["bytes_sent"], 10);
        assert!(json.get("reason").is_none());
        assert!(!outcome.is_completed());
    }
}
