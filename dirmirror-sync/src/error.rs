//! Mirror sync error types.

use thiserror::Error;

/// Result type for mirror operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur while mirroring a directory listing into a store.
///
/// Any of these aborts the reconciliation pass in progress. Mutations applied
/// before the failure stay applied.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("listing could not be parsed: {0}")]
    Parse(String),

    #[error("object not found: {0}")]
    NotFound(String),

    #[error("object store operation failed: {0}")]
    Store(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("serialization error")]
    Serialization(#[from] serde_json::Error),
}

/// Discriminant of [`SyncError`], for callers that pick a policy per kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SyncErrorKind {
    Fetch,
    Parse,
    NotFound,
    Store,
    Config,
    Serialization,
}

impl SyncError {
    pub fn kind(&self) -> SyncErrorKind {
        match self {
            SyncError::Fetch(_) => SyncErrorKind::Fetch,
            SyncError::Parse(_) => SyncErrorKind::Parse,
            SyncError::NotFound(_) => SyncErrorKind::NotFound,
            SyncError::Store(_) => SyncErrorKind::Store,
            SyncError::Config(_) => SyncErrorKind::Config,
            SyncError::Serialization(_) => SyncErrorKind::Serialization,
        }
    }

    /// Returns true if the error came from the object store side.
    pub fn is_store_side(&self) -> bool {
        matches!(self, SyncError::Store(_) | SyncError::NotFound(_))
    }
}
