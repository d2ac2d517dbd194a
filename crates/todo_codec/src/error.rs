//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during encoding or decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The document as a whole is malformed (not JSON, no CSV header, ...).
    #[error("malformed document: {message}")]
    Document {
        /// Description of the problem.
        message: String,
    },

    /// An item cannot be written in this format without corrupting it.
    #[error("item {id} cannot be encoded: {reason}")]
    Unrepresentable {
        /// Id of the offending item.
        id: String,
        /// Why the item cannot be written.
        reason: String,
    },

    /// A single field value failed to parse.
    #[error("invalid value for {field}: {value:?}")]
    InvalidField {
        /// Field name.
        field: &'static str,
        /// The rejected raw value.
        value: String,
    },

    /// Failed to encode a document.
    #[error("encoding failed: {message}")]
    EncodingFailed {
        /// Description of the encoding error.
        message: String,
    },
}

impl CodecError {
    /// Create a document error.
    pub fn document(message: impl Into<String>) -> Self {
        Self::Document {
            message: message.into(),
        }
    }

    /// Create an unrepresentable item error.
    pub fn unrepresentable(id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unrepresentable {
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid field error.
    pub fn invalid_field(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            value: value.into(),
        }
    }

    /// Create an encoding failed error.
    pub fn encoding_failed(message: impl Into<String>) -> Self {
        Self::EncodingFailed {
            message: message.into(),
        }
    }

    /// Returns true if this error rejects a whole document.
    pub fn is_document_error(&self) -> bool {
        matches!(self, Self::Document { .. })
    }
}
