//! Request orchestrator.
//!
//! Runs one client request end to end: resolve metadata, choose streams,
//! download, transcode when audio was asked for, and hand back a
//! `PreparedDownload`. On failure every artifact the request created is
//! deleted before the error is returned.

mod context;
mod runner;
mod types;

pub use context::RequestContext;
pub use runner::RequestOrchestrator;
pub use types::{MediaRequest, OutputKind, PreparedDownload, ProcessError, DOWNLOAD_ROUTE_PREFIX};
