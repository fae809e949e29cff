//! Shared error types for the services crate.

use thiserror::Error;

use roadmap_core::model::ProgressDecodeError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `ProgressService`.
///
/// Storage failures never appear here: they are logged and the service keeps
/// working in memory.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("unknown roadmap item: {0}")]
    UnknownItem(String),
    #[error("malformed progress input: {0}")]
    MalformedInput(#[source] ProgressDecodeError),
    #[error("failed to encode progress: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
}
