//! Download handler for prepared artifacts.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::{debug, error};
use tubegrab_core::Delivery;

use crate::state::AppState;

/// Stream a prepared file to the client.
///
/// The file is deleted a grace delay after the response body is dropped,
/// whether or not the client read all of it.
pub async fn download(
    State(state): State<Arc<AppState>>,
    Path(filename): Path<String>,
) -> Response {
    let delivery = match state.tracker().deliver(&filename).await {
        Ok(delivery) => delivery,
        Err(e) if e.is_not_found() => {
            debug!(file = %filename, "Download requested for unknown file");
            return (StatusCode::NOT_FOUND, "File not found.").into_response();
        }
        Err(e) => {
            error!(file = %filename, error = %e, "Failed to open file for download");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Failed to send the file.").into_response();
        }
    };

    let Delivery {
        file_name,
        size_bytes,
        mime_type,
        stream,
        cleanup,
    } = delivery;
    // The deletion task keeps running once its handle is gone.
    drop(cleanup);

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, mime_type.to_string()),
            (header::CONTENT_LENGTH, size_bytes.to_string()),
            (header::CONTENT_DISPOSITION, content_disposition(&file_name)),
        ],
        Body::from_stream(stream),
    )
        .into_response()
}

/// `attachment` disposition with an ASCII fallback and an RFC 5987 name.
fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(file_name)
    )
}
