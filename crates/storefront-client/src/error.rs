// crates/storefront-client/src/error.rs
// ============================================================================
// Module: Storefront Client Errors
// Description: Transport and request-construction failures.
// Purpose: Keep protocol outcomes (status, body) out of the error channel.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! A [`ClientError`] means no usable HTTP exchange happened: the client
//! could not be built, a URL or body could not be formed, or every attempt
//! failed in transport. [`ClientError::is_transport`] separates the last
//! group, which a scenario may treat as "the resource is unreachable".

use thiserror::Error;

/// Failures surfaced by [`crate::StoreClient`].
///
/// Non-2xx statuses and undecodable bodies are not represented here; they
/// arrive as an [`crate::ApiResponse`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// The HTTP client could not be constructed.
    #[error("http client construction failed: {0}")]
    Build(String),
    /// The request URL could not be formed from the base URL.
    #[error("invalid request url: {0}")]
    InvalidUrl(String),
    /// The request body could not be serialized.
    #[error("request body encoding failed: {0}")]
    Encode(String),
    /// The call exceeded the configured timeout on every attempt.
    #[error("request timed out after {attempts} attempt(s): {message}")]
    Timeout {
        /// Attempts made, including the first.
        attempts: u32,
        /// Transport message from the last attempt.
        message: String,
    },
    /// Connection-level failure (refused, reset, TLS, DNS).
    #[error("transport failure after {attempts} attempt(s): {message}")]
    Transport {
        /// Attempts made, including the first.
        attempts: u32,
        /// Transport message from the last attempt.
        message: String,
    },
}

impl ClientError {
    /// Returns true for failures raised by the network rather than by request
    /// construction.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Transport { .. })
    }

    /// Returns true when the failure was a timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns the number of attempts made, when the network was reached.
    #[must_use]
    pub const fn attempts(&self) -> Option<u32> {
        match self {
            Self::Timeout {
                attempts, ..
            }
            | Self::Transport {
                attempts, ..
            } => Some(*attempts),
            Self::Build(_) | Self::InvalidUrl(_) | Self::Encode(_) => None,
        }
    }

    /// Wraps a reqwest failure from the final attempt.
    pub(crate) fn from_send(err: &reqwest::Error, attempts: u32) -> Self {
        let message = err.to_string();
        if err.is_timeout() {
            Self::Timeout {
                attempts,
                message,
            }
        } else {
            Self::Transport {
                attempts,
                message,
            }
        }
    }
}
