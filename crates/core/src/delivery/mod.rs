//! Delivery of final artifacts.
//!
//! `DeliveryTracker::deliver` opens a final artifact as a `DeliveryStream`.
//! When the stream is dropped it reports whether the client received the
//! whole file; a grace delay later the `CleanupScheduler` deletes the
//! artifact. The returned `ScheduledDeletion` can cancel or await that
//! deletion.

mod error;
mod scheduler;
mod stream;
mod tracker;
mod types;

pub use error::DeliveryError;
pub use scheduler::{CleanupScheduler, ScheduledDeletion};
pub use stream::DeliveryStream;
pub use tracker::DeliveryTracker;
pub use types::{mime_type_for, Delivery, TransferOutcome};
