// system-tests/src/lib.rs
// ============================================================================
// Module: Storefront System Tests Library
// Description: Shared configuration for system test binaries.
// Purpose: Provide common settings for the storefront system-test suites.
// Dependencies: storefront-config, url
// ============================================================================

//! ## Overview
//! This crate hosts shared configuration used by the storefront system-test
//! binaries in `system-tests/tests`. Suites run the conformance catalog
//! against a local seeded store; the `live` feature points them at a real
//! deployment instead.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
