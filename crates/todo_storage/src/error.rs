//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred (missing file, permission failure, ...).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The backend has no snapshot to read.
    #[error("no snapshot stored")]
    Empty,

    /// The storage location is unusable.
    #[error("storage corrupted: {0}")]
    Corrupted(String),
}

impl StorageError {
    /// Returns true if the error means "nothing has been persisted yet".
    pub fn is_not_found(&self) -> bool {
        match self {
            StorageError::Io(err) => err.kind() == io::ErrorKind::NotFound,
            StorageError::Empty => true,
            StorageError::Corrupted(_) => false,
        }
    }
}
