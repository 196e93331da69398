//! Media preparation handler.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use tubegrab_core::{MediaRequest, OutputKind, PreparedDownload, VideoQuality};

use crate::state::AppState;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for preparing a download
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetVideoInfoBody {
    pub youtube_url: Option<String>,
    /// `mp3` or `mp4`
    pub format: Option<String>,
    /// Resolution ceiling for `mp4`, e.g. `720` or `highest`
    pub quality: Option<String>,
}

/// Response for a prepared download
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetVideoInfoResponse {
    pub success: bool,
    pub message: String,
    pub download_url: String,
    pub file_name: String,
    pub title: Option<String>,
    pub mime_type: String,
}

impl From<PreparedDownload> for GetVideoInfoResponse {
    fn from(prepared: PreparedDownload) -> Self {
        let message = match prepared.kind {
            OutputKind::Audio => "MP3 ready for download!",
            OutputKind::Video => "MP4 ready for download!",
        };
        Self {
            success: true,
            message: message.to_string(),
            file_name: prepared.file_name().to_string(),
            download_url: prepared.download_url,
            title: prepared.title,
            mime_type: prepared.mime_type,
        }
    }
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Status and body of a failed request
pub type ApiError = (StatusCode, Json<ErrorResponse>);

impl ErrorResponse {
    fn bad_request(message: &str) -> ApiError {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: message.to_string(),
                details: None,
            }),
        )
    }

    /// Body that is not JSON, lacks the JSON content type or has mistyped fields
    fn unreadable_body(rejection: JsonRejection) -> ApiError {
        let (status, mut body) = Self::bad_request("Invalid request body.");
        body.details = Some(rejection.body_text());
        (status, body)
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// Resolve a source URL and prepare the requested file for download
pub async fn get_video_info(
    State(state): State<Arc<AppState>>,
    body: Result<Json<GetVideoInfoBody>, JsonRejection>,
) -> Result<(StatusCode, Json<GetVideoInfoResponse>), ApiError> {
    let Json(body) = body.map_err(ErrorResponse::unreadable_body)?;
    let request = parse_request(body)?;
    info!(
        url = %request.url,
        kind = %request.kind,
        quality = ?request.quality,
        "Preparing download"
    );

    match state.orchestrator().submit(request).await {
        Ok(prepared) => Ok((StatusCode::OK, Json(prepared.into()))),
        Err(e) => {
            error!(error = %e, "Failed to process the video");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to process the video.".to_string(),
                    details: Some(e.details()),
                }),
            ))
        }
    }
}

fn parse_request(body: GetVideoInfoBody) -> Result<MediaRequest, ApiError> {
    let url = body
        .youtube_url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ErrorResponse::bad_request("YouTube URL is required."))?;

    let kind = body
        .format
        .as_deref()
        .and_then(OutputKind::parse)
        .ok_or_else(|| ErrorResponse::bad_request("Invalid format."))?;

    match kind {
        OutputKind::Audio => Ok(MediaRequest::audio(url)),
        OutputKind::Video => {
            let quality = VideoQuality::parse(body.quality.as_deref())
                .ok_or_else(|| ErrorResponse::bad_request("Invalid quality."))?;
            Ok(MediaRequest::video(url, quality))
        }
    }
}
