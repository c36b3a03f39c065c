// crates/storefront-conformance/src/catalog.rs
// ============================================================================
// Module: Scenario Catalog
// Description: The full ordered list of storefront scenarios.
// Purpose: One place the runner and the CLI select scenarios from.
// Dependencies: storefront-harness
// ============================================================================

//! ## Overview
//! Scenario order is products, categories, carts, users.

use storefront_harness::Scenario;

use crate::carts;
use crate::categories;
use crate::products;
use crate::users;

/// Every scenario, grouped by resource: products, categories, carts, users.
#[must_use]
pub fn catalog() -> Vec<Scenario> {
    let mut scenarios = products::scenarios();
    scenarios.extend(categories::scenarios());
    scenarios.extend(carts::scenarios());
    scenarios.extend(users::scenarios());
    scenarios
}

/// Looks up a scenario by exact name.
#[must_use]
pub fn find(name: &str) -> Option<Scenario> {
    catalog().into_iter().find(|scenario| scenario.name == name)
}
