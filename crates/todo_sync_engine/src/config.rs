//! Configuration for the sync engine.

use rand::Rng;
use std::time::Duration;

/// Device id sent as `last_updated_by` when none is configured.
pub const DEFAULT_DEVICE_ID: &str = "todo-sync";

/// Configuration for sync operations.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Base URL of the remote service.
    pub base_url: String,
    /// Bearer token.
    pub token: String,
    /// Identifier reported as the author of pushed changes.
    pub device_id: String,
    /// Retry configuration for every network call.
    pub retry: RetryConfig,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl SyncConfig {
    /// Creates a new sync configuration.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            device_id: DEFAULT_DEVICE_ID.to_string(),
            retry: RetryConfig::default(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Sets the device id.
    pub fn with_device_id(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = device_id.into();
        self
    }

    /// Sets the retry configuration.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new("", "")
    }
}

/// Default cap on the number of retries before the final attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 32;

/// Configuration for retry behavior.
///
/// After a failure the policy waits `min_delay * factor^n` (randomised by
/// `±jitter`) before attempt `n + 2`, and keeps going while the total time
/// waited is below `max_delay` and fewer than `max_retries` retries were
/// made. One final attempt follows.
///
/// A `factor` below 1 (or NaN) is treated as 1 so the delays never shrink.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Delay before the first retry.
    pub min_delay: Duration,
    /// Budget for the cumulative time spent waiting.
    pub max_delay: Duration,
    /// Growth factor applied per retry.
    pub factor: f64,
    /// Amplitude of the random offset applied to each delay.
    pub jitter: Duration,
    /// Hard cap on retries, for schedules whose delays are zero.
    pub max_retries: u32,
}

impl RetryConfig {
    /// Creates a configuration with the given delay bounds.
    pub fn new(min_delay: Duration, max_delay: Duration) -> Self {
        Self {
            min_delay,
            max_delay,
            ..Self::default()
        }
    }

    /// Creates a configuration that makes exactly two attempts with no wait.
    pub fn no_retry() -> Self {
        Self {
            min_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            factor: 1.0,
            jitter: Duration::ZERO,
            max_retries: 0,
        }
    }

    /// Sets the minimum delay.
    pub fn with_min_delay(mut self, delay: Duration) -> Self {
        self.min_delay = delay;
        self
    }

    /// Sets the cumulative delay budget.
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Sets the growth factor.
    pub fn with_factor(mut self, factor: f64) -> Self {
        self.factor = factor;
        self
    }

    /// Sets the jitter amplitude.
    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Sets the retry cap.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Growth factor actually applied, never below 1.
    pub fn effective_factor(&self) -> f64 {
        if self.factor >= 1.0 {
            self.factor
        } else {
            1.0
        }
    }

    /// Calculates the wait before retry `attempt` (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let target = self.min_delay.as_secs_f64() * self.effective_factor().powi(exponent);
        if !target.is_finite() {
            return self.max_delay;
        }

        let jitter = self.jitter.as_secs_f64();
        let delay = if jitter > 0.0 {
            rand::thread_rng().gen_range(target - jitter..=target + jitter)
        } else {
            target
        };
        Duration::try_from_secs_f64(delay.max(0.0)).unwrap_or(self.max_delay)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(10),
            factor: 1.5,
            jitter: Duration::from_millis(50),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}
