use std::sync::Arc;
use std::time::Duration;

use tubegrab_core::{
    ArtifactStore, Config, DeliveryTracker, FfmpegConverter, FsArtifactStore,
    RequestOrchestrator, YtDlpExtractor,
};

/// Shared application state
pub struct AppState {
    config: Config,
    orchestrator: Arc<RequestOrchestrator>,
    tracker: DeliveryTracker,
}

impl AppState {
    pub fn new(
        config: Config,
        orchestrator: Arc<RequestOrchestrator>,
        tracker: DeliveryTracker,
    ) -> Self {
        Self {
            config,
            orchestrator,
            tracker,
        }
    }

    /// Wires the yt-dlp extractor, the ffmpeg converter and a filesystem
    /// artifact store from configuration.
    pub fn from_config(config: Config) -> Self {
        let store: Arc<dyn ArtifactStore> =
            Arc::new(FsArtifactStore::new(config.storage.dir.clone()));
        let extractor = Arc::new(YtDlpExtractor::new(config.extractor.clone()));
        let converter = Arc::new(FfmpegConverter::new(config.converter.clone()));

        let orchestrator = RequestOrchestrator::new(Arc::clone(&store), extractor, converter)
            .with_audio_target(config.converter.mp3_target());

        let tracker = DeliveryTracker::new(
            store,
            Duration::from_millis(config.delivery.grace_delay_ms),
        );

        Self::new(config, Arc::new(orchestrator), tracker)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn orchestrator(&self) -> &Arc<RequestOrchestrator> {
        &self.orchestrator
    }

    pub fn tracker(&self) -> &DeliveryTracker {
        &self.tracker
    }
}
