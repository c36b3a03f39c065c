// crates/storefront-config/src/lib.rs
// ============================================================================
// Module: Storefront Config Library
// Description: Configuration model and loading for the conformance suite.
// Purpose: Single source of truth for storefront.toml semantics.
// Dependencies: serde, toml, thiserror, url
// ============================================================================

//! ## Overview
//! `storefront-config` defines the configuration consumed by the storefront
//! conformance suite: API endpoint and retry policy, reporting directories and
//! backend selection, execution flags, and logging.
//!
//! Configuration is an explicit value. It is loaded once at process start by
//! [`StorefrontConfig::load`] and passed by reference into the client and
//! runner constructors; there is no global instance.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod env;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use env::StorefrontEnv;
pub use env::read_env_strict;
