// system-tests/src/config/mod.rs
// ============================================================================
// Module: System Test Configuration
// Description: Centralized configuration for storefront system tests.
// Purpose: Provide typed access to test environment settings and defaults.
// Dependencies: storefront-config, url
// ============================================================================

//! ## Overview
//! System-test settings are read from environment variables into
//! [`SystemTestConfig`] for the helpers and the live suite.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::SystemTestConfig;
pub use env::SystemTestEnv;
