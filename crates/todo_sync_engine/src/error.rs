//! Error types for the sync engine.

use crate::retry::RetryError;
use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur during sync operations.
#[derive(Error, Debug)]
pub enum SyncError {
    /// Network or transport error.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// Whether the operation can be retried.
        retryable: bool,
    },

    /// The service answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http {
        /// Status code.
        status: u16,
        /// Response body, lossily decoded.
        body: String,
    },

    /// Protocol error (missing or malformed body).
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The local store could not load or save.
    #[error("could not save or load items: {0}")]
    Store(#[from] todo_core::CoreError),

    /// The retry budget ran out.
    #[error("gave up after {attempts} attempts: {source}")]
    RetryExhausted {
        /// Number of attempts made.
        attempts: u32,
        /// The last failure.
        #[source]
        source: Box<SyncError>,
    },

    /// Sync was cancelled.
    #[error("sync cancelled")]
    Cancelled,

    /// Invalid state transition.
    #[error("invalid state transition from {from:?} to {to:?}")]
    InvalidStateTransition {
        /// Current state.
        from: String,
        /// Attempted target state.
        to: String,
    },

    /// No item with the given id.
    #[error("item not found: {0}")]
    NotFound(String),

    /// A background task panicked.
    #[error("background task failed: {0}")]
    Join(String),

    /// The engine was used outside a Tokio runtime.
    #[error("no async runtime: {0}")]
    Runtime(String),
}

impl SyncError {
    /// Creates a retryable transport error.
    pub fn transport_retryable(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a non-retryable transport error.
    pub fn transport_fatal(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: false,
        }
    }

    /// Returns true if this error can be retried.
    ///
    /// Authentication failures and missing resources are final; every other
    /// status, including a revision mismatch, is retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            SyncError::Transport { retryable, .. } => *retryable,
            SyncError::Http { status, .. } => !matches!(status, 401 | 403 | 404),
            SyncError::Protocol(_) => true,
            _ => false,
        }
    }

    /// Returns the HTTP status, if this is a status error.
    pub fn status(&self) -> Option<u16> {
        match self {
            SyncError::Http { status, .. } => Some(*status),
            SyncError::RetryExhausted { source, .. } => source.status(),
            _ => None,
        }
    }
}

impl From<RetryError<SyncError>> for SyncError {
    fn from(err: RetryError<SyncError>) -> Self {
        match err {
            RetryError::Exhausted {
                attempts,
                last_error,
            } => SyncError::RetryExhausted {
                attempts,
                source: Box::new(last_error),
            },
            RetryError::Permanent { error, .. } => error,
        }
    }
}

impl From<tokio::task::JoinError> for SyncError {
    fn from(err: tokio::task::JoinError) -> Self {
        if err.is_cancelled() {
            SyncError::Cancelled
        } else {
            SyncError::Join(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(SyncError::transport_retryable("connection lost").is_retryable());
        assert!(!SyncError::transport_fatal("invalid certificate").is_retryable());
        assert!(SyncError::Http {
            status: 400,
            body: "unsynchronized data".into()
        }
        .is_retryable());
        assert!(SyncError::Http {
            status: 503,
            body: String::new()
        }
        .is_retryable());
        assert!(!SyncError::Http {
            status: 401,
            body: String::new()
        }
        .is_retryable());
        assert!(!SyncError::Cancelled.is_retryable());
        assert!(!SyncError::NotFound("a".into()).is_retryable());
    }

    #[test]
    fn exhaustion_wraps_last_error() {
        let err: SyncError = RetryError::Exhausted {
            attempts: 6,
            last_error: SyncError::Http {
                status: 500,
                body: "boom".into(),
            },
        }
        .into();
        assert!(matches!(err, SyncError::RetryExhausted { attempts: 6, .. }));
        assert_eq!(err.status(), Some(500));
        assert!(err.to_string().contains("6 attempts"));

        let err: SyncError = RetryError::Permanent {
            attempts: 1,
            error: SyncError::NotFound("x".into()),
        }
        .into();
        assert!(matches!(err, SyncError::NotFound(_)));
    }

    #[test]
    fn error_display() {
        let err = SyncError::Http {
            status: 404,
            body: "no such item".into(),
        };
        assert_eq!(err.to_string(), "HTTP 404: no such item");
    }
}
