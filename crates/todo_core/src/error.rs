//! Error types for the item store.

use thiserror::Error;

/// Result type for store operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in item store operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error.
    #[error("storage error: {0}")]
    Storage(#[from] todo_storage::StorageError),

    /// The persisted document could not be encoded or decoded.
    #[error("codec error: {0}")]
    Codec(#[from] todo_codec::CodecError),

    /// The requested operation is not valid in the current configuration.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of what went wrong.
        message: String,
    },
}

impl CoreError {
    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Returns true if the error means nothing has been persisted yet.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Storage(err) if err.is_not_found())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_codec::CodecError;
    use todo_storage::StorageError;

    #[test]
    fn conversions_and_display() {
        let err: CoreError = CodecError::document("not JSON").into();
        assert!(matches!(err, CoreError::Codec(_)));
        assert!(err.to_string().contains("not JSON"));

        let err: CoreError = StorageError::Empty.into();
        assert!(err.is_not_found());

        let err = CoreError::invalid_operation("empty file name");
        assert!(!err.is_not_found());
        assert_eq!(err.to_string(), "invalid operation: empty file name");
    }
}
