// crates/storefront-client/src/retry.rs
// ============================================================================
// Module: Transient Retry Policy
// Description: Bounded retry with capped exponential backoff.
// Purpose: Retry connection-level failures uniformly across operations.
// Dependencies: reqwest, storefront-config
// ============================================================================

//! ## Overview
//! Only transport failures that look transient are retried: connect errors,
//! timeouts, and connections reset or closed mid-flight. A response with any
//! status code is never retried. Waits start at `base_wait`, double per
//! attempt, and never exceed `max_wait`.

use std::time::Duration;

use storefront_config::ApiConfig;

/// Coarse classification of a send failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Could not connect.
    Connect,
    /// The per-call timeout elapsed.
    Timeout,
    /// The connection dropped mid-request.
    Interrupted,
    /// Anything else (TLS, body, decode, redirect).
    Other,
}

impl FailureKind {
    /// Classifies a reqwest failure.
    #[must_use]
    pub fn classify(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::Timeout;
        }
        if err.is_connect() {
            return Self::Connect;
        }
        if !err.is_request() && !err.is_body() {
            return Self::Other;
        }
        let msg = err.to_string().to_ascii_lowercase();
        let interrupted = msg.contains("connection reset")
            || msg.contains("connection closed")
            || msg.contains("broken pipe")
            || msg.contains("connection aborted")
            || msg.contains("eof");
        if interrupted { Self::Interrupted } else { Self::Other }
    }

    /// Returns true when the failure is worth another attempt.
    #[must_use]
    pub const fn is_transient(self) -> bool {
        !matches!(self, Self::Other)
    }
}

/// Retry policy applied to every operation of a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Wait before the first retry.
    pub base_wait: Duration,
    /// Cap on any single wait.
    pub max_wait: Duration,
}

impl RetryPolicy {
    /// A policy that never retries.
    pub const NONE: Self = Self {
        max_retries: 0,
        base_wait: Duration::ZERO,
        max_wait: Duration::ZERO,
    };

    /// Builds the policy described by the API configuration.
    #[must_use]
    pub const fn from_config(config: &ApiConfig) -> Self {
        Self {
            max_retries: config.retry_count,
            base_wait: config.retry_wait(),
            max_wait: config.retry_max_wait(),
        }
    }

    /// Total attempts allowed, including the first.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Returns true when a failure of `kind` on `attempt` (1-based) should be
    /// retried.
    #[must_use]
    pub const fn should_retry(&self, kind: FailureKind, attempt: u32) -> bool {
        kind.is_transient() && attempt < self.max_attempts()
    }

    /// Wait before the retry that follows `attempt` (1-based).
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let factor = 1u32.checked_shl(exponent).unwrap_or(u32::MAX);
        self.base_wait.saturating_mul(factor).min(self.max_wait)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&ApiConfig::default())
    }
}
