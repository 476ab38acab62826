//! Error types for practicum-sync.

use std::path::PathBuf;

use thiserror::Error;

use practicum_core::{DocumentError, StoreError};
use practicum_renderer::RenderError;
use practicum_roster::RosterError;

/// All errors that can arise from sync operations.
///
/// Problems confined to one student (bad row, unparseable profile) are
/// reported as outcomes, not errors; these variants abort the run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An error from the rendering engine.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// An error from the document store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The roster could not be read or its course resolved.
    #[error(transparent)]
    Roster(#[from] RosterError),

    /// A freshly generated document could not be serialized.
    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON error in a hash store, run summary or course index.
    #[error("JSON error at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

/// Convenience constructor for [`SyncError::Json`].
pub(crate) fn json_err(path: impl Into<PathBuf>, source: serde_json::Error) -> SyncError {
    SyncError::Json {
        path: path.into(),
        source,
    }
}
