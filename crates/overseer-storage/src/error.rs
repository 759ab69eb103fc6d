//! Storage errors.

use thiserror::Error;

/// Errors raised by the session store.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No session exists with the given id.
    #[error("unknown session: {0}")]
    UnknownSession(String),
}

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;
