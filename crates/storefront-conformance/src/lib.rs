// crates/storefront-conformance/src/lib.rs
// ============================================================================
// Module: Storefront Conformance Library
// Description: Scenario catalog for the storefront REST API.
// Purpose: Expose the scenarios the runner binary and system tests execute.
// Dependencies: storefront-client, storefront-harness
// ============================================================================

//! ## Overview
//! Scenarios are grouped by resource (products, categories, carts, users) and
//! collected by [`catalog`]. Each one is a plain async function over a
//! [`storefront_harness::ScenarioContext`]; cross-resource rules live in
//! [`analysis`] so they can be tested without a server.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod analysis;
pub mod carts;
pub mod catalog;
pub mod categories;
pub mod products;
pub mod support;
pub mod users;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use analysis::CategoryMismatch;
pub use analysis::ReferenceIntegrity;
pub use catalog::catalog;
pub use catalog::find;
