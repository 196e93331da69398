pub mod artifact;
pub mod config;
pub mod converter;
pub mod delivery;
pub mod extractor;
pub mod orchestrator;
pub mod testing;

pub use artifact::{
    ArtifactError, ArtifactPath, ArtifactRole, ArtifactStore, CleanupOutcome, DeliveryToken,
    FsArtifactStore,
};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, Config,
    ConfigError,
};
pub use converter::{Converter, ConverterError, FfmpegConverter};
pub use delivery::{
    CleanupScheduler, Delivery, DeliveryError, DeliveryStream, DeliveryTracker,
    ScheduledDeletion, TransferOutcome,
};
pub use extractor::{ExtractorError, MediaExtractor, VideoQuality, YtDlpExtractor};
pub use orchestrator::{
    MediaRequest, OutputKind, PreparedDownload, ProcessError, RequestOrchestrator,
};
