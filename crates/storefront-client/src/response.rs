// crates/storefront-client/src/response.rs
// ============================================================================
// Module: Response Metadata
// Description: Decoded payloads paired with raw response metadata.
// Purpose: Let callers judge status, timing, and body themselves.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! [`ResponseMeta`] is the raw exchange: status, elapsed time, flattened
//! headers and body bytes. [`ApiResponse`] pairs it with the payload decoded
//! from that body. An empty or `null` body decodes to `None`; a body that
//! does not decode keeps the reason in `decode_error` instead of failing.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ClientError;

/// Result of a client operation.
pub type ApiResult<T> = Result<ApiResponse<T>, ClientError>;

/// Raw metadata captured for one completed call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseMeta {
    /// HTTP method.
    pub method: String,
    /// Absolute request URL.
    pub url: String,
    /// Response status code.
    pub status: u16,
    /// Time from sending the final attempt to reading the full body.
    pub elapsed: Duration,
    /// Response headers, lowercase names, first value per name.
    pub headers: BTreeMap<String, String>,
    /// Raw response body.
    pub body: Vec<u8>,
    /// Attempts made, including the first.
    pub attempts: u32,
}

impl ResponseMeta {
    /// Returns true for a 2xx status.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Returns the canonical reason phrase for the status, if known.
    #[must_use]
    pub fn status_text(&self) -> &'static str {
        reqwest::StatusCode::from_u16(self.status)
            .ok()
            .and_then(|status| status.canonical_reason())
            .unwrap_or("Unknown")
    }

    /// Looks up a header case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// Returns true when the body is empty or whitespace.
    #[must_use]
    pub fn is_body_empty(&self) -> bool {
        self.body.iter().all(u8::is_ascii_whitespace)
    }

    /// Returns the body as text, replacing invalid UTF-8.
    #[must_use]
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Decodes the body as an untyped JSON document.
    ///
    /// # Errors
    ///
    /// Returns the JSON error when the body is not valid JSON.
    pub fn json_value(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

/// Decoded payload plus the metadata it was decoded from.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    /// Decoded payload; `None` for an empty or `null` body or a decode failure.
    pub value: Option<T>,
    /// Why decoding failed, when it did.
    pub decode_error: Option<String>,
    /// Raw metadata.
    pub meta: ResponseMeta,
}

impl<T> ApiResponse<T> {
    /// Returns the decoded payload.
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Consumes the response and returns the decoded payload.
    #[must_use]
    pub fn into_value(self) -> Option<T> {
        self.value
    }

    /// Returns the status code.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.meta.status
    }

    /// Returns the elapsed time.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.meta.elapsed
    }
}

impl<T: DeserializeOwned> ApiResponse<T> {
    /// Decodes `meta.body` into `T`. Decode failures are recorded, not raised.
    #[must_use]
    pub fn decode(meta: ResponseMeta) -> Self {
        if meta.is_body_empty() {
            return Self {
                value: None,
                decode_error: None,
                meta,
            };
        }
        match serde_json::from_slice::<Option<T>>(&meta.body) {
            Ok(value) => Self {
                value,
                decode_error: None,
                meta,
            },
            Err(err) => Self {
                value: None,
                decode_error: Some(err.to_string()),
                meta,
            },
        }
    }
}
