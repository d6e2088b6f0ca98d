use std::path::PathBuf;

use thiserror::Error;

/// Errors from a collection store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt store file {path}: {reason}")]
    Corrupt { path: PathBuf, reason: String },

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("store lock poisoned")]
    LockPoisoned,
}

/// Convenience type alias for store results.
pub type StoreResult<T> = Result<T, StoreError>;
