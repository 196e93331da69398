//! Common test utilities for E2E testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with a mock extractor and converter over a temporary artifact directory,
//! so no yt-dlp or ffmpeg binary is needed.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use tubegrab_core::{
    testing::{MockConverter, MockExtractor},
    ArtifactStore, Config, DeliveryTracker, FsArtifactStore, RequestOrchestrator,
};
use tubegrab_server::{api::create_router, state::AppState};

/// Re-export fixtures for test convenience
pub use tubegrab_core::testing::fixtures;

/// Landing page written into the fixture's public directory.
pub const LANDING_PAGE: &str = "<!doctype html><title>tubegrab</title>";

/// Test fixture for E2E testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_prepare_mp3() {
///     let fixture = TestFixture::new();
///
///     let response = fixture.post("/get-video-info", json!({
///         "youtubeUrl": "https://www.youtube.com/watch?v=abc",
///         "format": "mp3"
///     })).await;
///
///     assert_eq!(response.status, 200);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Mock extractor - configure metadata and downloads
    pub extractor: Arc<MockExtractor>,
    /// Mock converter - control MP3 transcodes
    pub converter: Arc<MockConverter>,
    /// Temporary directory holding artifacts and the public directory
    pub temp_dir: TempDir,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    /// Parsed JSON body, `Null` when the body is not JSON
    pub body: Value,
    pub bytes: Bytes,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).to_string()
    }
}

impl TestFixture {
    /// Create a new test fixture with a short grace delay.
    pub fn new() -> Self {
        Self::with_grace_delay(Duration::from_millis(50))
    }

    pub fn with_grace_delay(grace_delay: Duration) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let artifact_dir = temp_dir.path().join("artifacts");
        let public_dir = temp_dir.path().join("public");
        std::fs::create_dir_all(&artifact_dir).expect("Failed to create artifact dir");
        std::fs::create_dir_all(&public_dir).expect("Failed to create public dir");
        std::fs::write(public_dir.join("downloader.html"), LANDING_PAGE)
            .expect("Failed to write landing page");

        let mut config = Config::default();
        config.storage.dir = artifact_dir.clone();
        config.server.public_dir = public_dir;
        config.delivery.grace_delay_ms = grace_delay.as_millis() as u64;

        let extractor = Arc::new(MockExtractor::with_info(fixtures::video_info(
            "Never Gonna Give You Up",
            fixtures::typical_formats(),
        )));
        let converter = Arc::new(MockConverter::new());

        let store: Arc<dyn ArtifactStore> = Arc::new(FsArtifactStore::new(artifact_dir));
        let orchestrator = Arc::new(RequestOrchestrator::new(
            Arc::clone(&store),
            extractor.clone(),
            converter.clone(),
        ));
        let tracker = DeliveryTracker::new(store, grace_delay);

        let state = Arc::new(AppState::new(config, orchestrator, tracker));
        let router = create_router(state);

        Self {
            router,
            extractor,
            converter,
            temp_dir,
        }
    }

    pub fn artifact_dir(&self) -> PathBuf {
        self.temp_dir.path().join("artifacts")
    }

    /// Names of the files currently in the artifact directory, sorted.
    pub fn artifacts(&self) -> Vec<String> {
        list_dir(&self.artifact_dir())
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request with raw string body (for testing malformed JSON).
    pub async fn post_raw(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Send a POST request with a `text/plain` body.
    pub async fn post_text(&self, path: &str, body: &str) -> TestResponse {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("Content-Type", "text/plain")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(request).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let request_builder = Request::builder().method(method).uri(path);

        let request = match body {
            Some(json) => request_builder
                .header("Content-Type", "application/json")
                .body(Body::from(serde_json::to_string(&json).unwrap()))
                .unwrap(),
            None => request_builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            headers,
            body,
            bytes,
        }
    }

    /// Polls until `path` answers 404 or the timeout expires.
    pub async fn wait_for_not_found(&self, path: &str, timeout: Duration) -> bool {
        let deadline = tokio::time::Instant::now() + timeout;
        while tokio::time::Instant::now() < deadline {
            if self.get(path).await.status == StatusCode::NOT_FOUND {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        false
    }
}

fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .expect("Failed to read dir")
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
