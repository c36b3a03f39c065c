// crates/storefront-client/src/lib.rs
// ============================================================================
// Module: Storefront Client Library
// Description: Typed client for the storefront products/carts/users/auth API.
// Purpose: Issue one HTTP call per resource operation and expose metadata.
// Dependencies: reqwest, serde, storefront-config, thiserror, time, tokio, url
// ============================================================================

//! ## Overview
//! [`StoreClient`] turns semantic operations ("get product 1", "login") into
//! HTTP requests against a configured base URL. Every operation returns an
//! [`ApiResponse`] carrying both the decoded payload and the raw
//! [`ResponseMeta`] (status, elapsed time, headers, body).
//!
//! Only transport failures are errors. A non-2xx status or a body that does
//! not decode is reported as data; deciding pass or fail is the caller's job.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod client;
pub mod error;
pub mod models;
pub mod response;
pub mod retry;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use client::OutgoingRequest;
pub use client::RequestObserver;
pub use client::StoreClient;
pub use error::ClientError;
pub use models::*;
pub use response::ApiResponse;
pub use response::ApiResult;
pub use response::ResponseMeta;
pub use retry::FailureKind;
pub use retry::RetryPolicy;
