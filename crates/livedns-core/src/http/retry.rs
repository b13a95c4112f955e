//! Retry policy for the shared HTTP client
//!
//! Decides which failures are transient and how long to wait before the
//! next attempt. The policy itself holds no per-request state, so one value
//! can be shared by every request of a run.

use crate::config::RetryConfig;
use std::time::Duration;

/// Response statuses treated as transient
pub const RETRY_STATUSES: &[u16] = &[403, 500, 502, 503];

/// Statuses whose `Retry-After` header replaces the computed backoff
///
/// Of the retried statuses only 503 qualifies; on 403/500/502 the header is
/// ignored.
pub const RETRY_AFTER_STATUSES: &[u16] = &[413, 429, 503];

/// Bounded exponential-backoff retry policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_factor: Duration,
    max_backoff: Duration,
}

impl RetryPolicy {
    /// Create a policy retrying [`RETRY_STATUSES`]
    ///
    /// # Parameters
    ///
    /// - `max_attempts`: total attempts per request, including the first (min 1)
    /// - `backoff_factor`: base delay; retry n waits `factor * 2^(n-1)`
    /// - `max_backoff`: upper bound for any single delay
    pub fn new(max_attempts: u32, backoff_factor: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_factor,
            max_backoff,
        }
    }

    /// Build the policy described by a [`RetryConfig`]
    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_secs(config.backoff_factor_secs),
            Duration::from_secs(config.max_backoff_secs),
        )
    }

    /// Total attempts allowed per request
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Upper bound for a single delay
    pub fn max_backoff(&self) -> Duration {
        self.max_backoff
    }

    /// Whether a response with this status should be retried
    pub fn should_retry_status(&self, status: u16) -> bool {
        RETRY_STATUSES.contains(&status)
    }

    /// Delay before retry number `retry` (1-based), capped at `max_backoff`
    pub fn backoff(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1);
        let multiplier = 2u32.checked_pow(exponent).unwrap_or(u32::MAX);

        self.backoff_factor
            .checked_mul(multiplier)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }

    /// Delay before retry number `retry` after a retryable status
    ///
    /// A `Retry-After` value is honored only for [`RETRY_AFTER_STATUSES`],
    /// and never beyond `max_backoff`.
    pub fn status_delay(&self, retry: u32, status: u16, retry_after: Option<Duration>) -> Duration {
        match retry_after {
            Some(delay) if RETRY_AFTER_STATUSES.contains(&status) => delay.min(self.max_backoff),
            _ => self.backoff(retry),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

/// Whether a `reqwest` failure is worth another attempt
///
/// Connection failures, timeouts and errors while sending the request or
/// reading the body are transient. Builder errors (bad URL, bad header) are
/// not: repeating them cannot succeed.
pub fn is_transient(err: &reqwest::Error) -> bool {
    if err.is_builder() {
        return false;
    }
    err.is_connect() || err.is_timeout() || err.is_request() || err.is_body()
}

/// Parse a `Retry-After` header given in delta-seconds
///
/// HTTP-date values are ignored; the computed backoff applies instead.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
