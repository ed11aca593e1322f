//! Storage error types

use thiserror::Error;

/// Durable key/value storage error
#[derive(Debug, Error)]
pub enum StorageError {
    /// Backend refused or failed the operation (locked keychain, permission
    /// denied, no secret service running, ...)
    #[error("Storage access failed: {0}")]
    AccessFailed(String),

    /// Stored document could not be decoded
    #[error("Corrupt storage document: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

/// Storage result type
pub type StorageResult<T> = Result<T, StorageError>;

impl From<StorageError> for authenhub_domain::AuthenHubError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}
