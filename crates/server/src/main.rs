use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tubegrab_core::{
    load_config, load_config_from_env, validate_config, ArtifactStore, Config, Converter,
    FfmpegConverter, FsArtifactStore, MediaExtractor, YtDlpExtractor,
};
use tubegrab_server::{api::create_router, state::AppState};

/// Config file used when `TUBEGRAB_CONFIG` is not set
const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = load()?;
    validate_config(&config).context("Configuration validation failed")?;
    info!("Configuration loaded successfully");
    info!("Artifact directory: {:?}", config.storage.dir);

    FsArtifactStore::new(config.storage.dir.clone())
        .prepare()
        .await
        .with_context(|| format!("Failed to create artifact directory {:?}", config.storage.dir))?;

    check_tools(&config).await;

    let state = Arc::new(AppState::from_config(config.clone()));
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shut down");
    Ok(())
}

/// Reads the config file named by `TUBEGRAB_CONFIG`.
///
/// Without the variable, a missing `config.toml` falls back to defaults
/// plus environment overrides.
fn load() -> Result<Config> {
    let (config_path, explicit) = match std::env::var("TUBEGRAB_CONFIG") {
        Ok(path) => (PathBuf::from(path), true),
        Err(_) => (PathBuf::from(DEFAULT_CONFIG_PATH), false),
    };

    if !explicit && !config_path.exists() {
        info!("No config file at {:?}, using defaults and environment", config_path);
        return load_config_from_env().context("Failed to load config from environment");
    }

    info!("Loading configuration from {:?}", config_path);
    load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))
}

/// Logs whether yt-dlp and ffmpeg are usable. Missing tools do not stop
/// the server; requests needing them fail instead.
async fn check_tools(config: &Config) {
    match YtDlpExtractor::new(config.extractor.clone()).validate().await {
        Ok(version) => info!("yt-dlp available: {}", version),
        Err(e) => warn!("yt-dlp unavailable, downloads will fail: {}", e),
    }

    match FfmpegConverter::new(config.converter.clone()).validate().await {
        Ok(version) => info!(%version, "ffmpeg available"),
        Err(e) => warn!("ffmpeg unavailable, MP3 conversion will fail: {}", e),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
