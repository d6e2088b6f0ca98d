use allot_store::StoreError;
use thiserror::Error;

/// Errors surfaced by an engine run.
///
/// Distribution itself is total over validated inputs; the only failures are
/// at the commit boundary or around the run lock.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("commit failed: {0}")]
    Store(#[from] StoreError),

    #[error("redistribution lock poisoned")]
    LockPoisoned,
}

/// Convenience type alias for engine results.
pub type EngineResult<T> = Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_convert() {
        let err: EngineError = StoreError::LockPoisoned.into();
        assert!(matches!(err, EngineError::Store(_)));
        assert!(err.to_string().starts_with("commit failed"));
    }
}
