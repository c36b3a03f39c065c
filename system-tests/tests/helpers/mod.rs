// system-tests/tests/helpers/mod.rs
// ============================================================================
// Module: System Test Helpers
// Description: Shared helpers for storefront system-tests.
// Purpose: Provide the seeded store stub, run helpers, and artifact utilities.
// Dependencies: system-tests, storefront-harness
// ============================================================================

//! ## Overview
//! Shared helpers for storefront system-tests. Every suite runs real catalog
//! scenarios; the stub decides what the API looks like.

#![allow(dead_code, reason = "Shared helpers are reused across multiple test suites.")]

pub mod artifacts;
pub mod readiness;
pub mod run;
pub mod store_stub;
pub mod timeouts;
