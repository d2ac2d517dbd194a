//! Protocol error types.

use thiserror::Error;

/// Result type for protocol conversions.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors converting between wire and domain representations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The importance string is not one the client knows.
    #[error("unknown importance {value:?} for item {id}")]
    UnknownImportance {
        /// Item id.
        id: String,
        /// The rejected value.
        value: String,
    },

    /// A time field is outside the representable range.
    #[error("timestamp {field}={value} out of range for item {id}")]
    TimestampOutOfRange {
        /// Item id.
        id: String,
        /// Field name.
        field: &'static str,
        /// The rejected value.
        value: i64,
    },
}
