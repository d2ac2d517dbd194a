//! Bounded-time retry of asynchronous operations.
//!
//! The schedule is fresh for every call: a failed first attempt is followed
//! by waits of `min_delay * factor^n` (each randomised by `±jitter`) while
//! the total waited time stays below `max_delay` and the retry count below
//! `max_retries`, then one last attempt.
//!
//! Cancellation is cooperative: dropping or aborting the returned future
//! stops the schedule wherever it is, including inside an attempt. No
//! outcome is reported in that case.

use crate::config::RetryConfig;
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// A failed retry run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryError<E> {
    /// Every attempt failed and the delay budget is used up.
    Exhausted {
        /// Number of attempts made.
        attempts: u32,
        /// The error of the final attempt.
        last_error: E,
    },
    /// An attempt failed with an error the caller marked as final.
    Permanent {
        /// Number of attempts made.
        attempts: u32,
        /// The final error.
        error: E,
    },
}

impl<E> RetryError<E> {
    /// Number of attempts made before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            RetryError::Exhausted { attempts, .. } | RetryError::Permanent { attempts, .. } => {
                *attempts
            }
        }
    }

    /// The last error observed.
    pub fn into_inner(self) -> E {
        match self {
            RetryError::Exhausted { last_error, .. } => last_error,
            RetryError::Permanent { error, .. } => error,
        }
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RetryError::Exhausted {
                attempts,
                last_error,
            } => write!(f, "retry budget exhausted after {attempts} attempts: {last_error}"),
            RetryError::Permanent { attempts, error } => {
                write!(f, "permanent failure on attempt {attempts}: {error}")
            }
        }
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for RetryError<E> {}

/// Runs fallible async operations under a [`RetryConfig`].
#[derive(Debug, Clone, Default)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    /// Creates a policy from `config`.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Runs `op` until it succeeds or the schedule is exhausted.
    ///
    /// Every error is treated as transient.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError::Exhausted`] with the last error when the final
    /// attempt fails.
    pub async fn run<T, E, F, Fut>(&self, op: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
    {
        self.run_if(op, |_| true).await
    }

    /// Runs `op`, retrying only errors for which `should_retry` is true.
    ///
    /// # Errors
    ///
    /// Returns [`RetryError::Permanent`] as soon as an attempt fails with a
    /// non-retryable error, or [`RetryError::Exhausted`] when the final
    /// attempt fails.
    pub async fn run_if<T, E, F, Fut, P>(
        &self,
        mut op: F,
        should_retry: P,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
        P: Fn(&E) -> bool,
    {
        let mut attempts = 1u32;
        let mut last_error = match op().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        let mut waited = Duration::ZERO;
        let mut retry = 0u32;
        while waited < self.config.max_delay && retry < self.config.max_retries {
            if !should_retry(&last_error) {
                return Err(RetryError::Permanent {
                    attempts,
                    error: last_error,
                });
            }

            let delay = self.config.delay_for_attempt(retry);
            tracing::debug!(
                attempt = attempts,
                delay_ms = delay.as_millis() as u64,
                error = %last_error,
                "operation failed, retrying"
            );
            tokio::time::sleep(delay).await;
            waited += delay;
            retry += 1;

            attempts += 1;
            match op().await {
                Ok(value) => return Ok(value),
                Err(error) => last_error = error,
            }
        }

        if !should_retry(&last_error) {
            return Err(RetryError::Permanent {
                attempts,
                error: last_error,
            });
        }

        tracing::debug!(attempt = attempts, error = %last_error, "retry budget spent, final attempt");
        attempts += 1;
        match op().await {
            Ok(value) => Ok(value),
            Err(error) => Err(RetryError::Exhausted {
                attempts,
                last_error: error,
            }),
        }
    }

    /// Callback form of [`run`](Self::run).
    ///
    /// Returns the value on success. On failure `on_failure` is invoked
    /// exactly once with the error and `None` is returned.
    pub async fn run_or_else<T, E, F, Fut, C>(&self, op: F, on_failure: C) -> Option<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: fmt::Display,
        C: FnOnce(RetryError<E>),
    {
        match self.run(op).await {
            Ok(value) => Some(value),
            Err(err) => {
                on_failure(err);
                None
            }
        }
    }
}
