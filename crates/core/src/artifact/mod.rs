//! Artifact store for transient files.
//!
//! Every file produced while serving a request lives here until it is
//! consumed: intermediates are removed as soon as the step reading them
//! finishes, finals once they have been delivered.

mod error;
mod fs_store;
mod traits;
mod types;

pub use error::ArtifactError;
pub use fs_store::FsArtifactStore;
pub use traits::{ArtifactStore, OpenedArtifact};
pub use types::{
    sanitize_base_name, ArtifactPath, ArtifactRole, CleanupOutcome, DeliveryToken,
    FALLBACK_BASE_NAME,
};
