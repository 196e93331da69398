use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};

use tubegrab_core::orchestrator::DOWNLOAD_ROUTE_PREFIX;

use super::{downloads, handlers, media};
use crate::state::AppState;

/// Landing page served at `/`.
const INDEX_FILE: &str = "downloader.html";

pub fn create_router(state: Arc<AppState>) -> Router {
    let public_dir = state.config().server.public_dir.clone();

    // Landing page and its assets
    let index = ServeFile::new(public_dir.join(INDEX_FILE));
    let serve_dir = ServeDir::new(&public_dir).append_index_html_on_directories(false);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/get-video-info", post(media::get_video_info))
        .route(
            &format!("{}/{{filename}}", DOWNLOAD_ROUTE_PREFIX),
            get(downloads::download),
        )
        .route_service("/", index)
        .fallback_service(serve_dir)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
