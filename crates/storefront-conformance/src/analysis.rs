// crates/storefront-conformance/src/analysis.rs
// ============================================================================
// Module: Cross-Resource Analysis
// Description: Pure data checks spanning more than one resource.
// Purpose: Keep reference-integrity and consistency rules testable offline.
// Dependencies: serde, storefront-client
// ============================================================================

//! ## Overview
//! These helpers look only at decoded models. Scenarios fetch the data, call
//! into this module, and turn the findings into checks and attachments.

use std::collections::BTreeSet;

use serde::Serialize;
use storefront_client::Cart;
use storefront_client::Product;
use storefront_client::User;

/// Largest quantity a single cart line may plausibly carry.
pub const MAX_LINE_QUANTITY: i64 = 100;

// ============================================================================
// SECTION: Reference Integrity
// ============================================================================

/// How many cart line items point at a product that exists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReferenceIntegrity {
    /// Line items inspected.
    pub total: usize,
    /// Line items whose product id is in the catalog.
    pub resolved: usize,
    /// Distinct product ids that did not resolve, ascending.
    pub dangling: Vec<i64>,
}

impl ReferenceIntegrity {
    /// Measures every cart line against the product catalog.
    #[must_use]
    pub fn measure(carts: &[Cart], products: &[Product]) -> Self {
        let known: BTreeSet<i64> = products.iter().map(|product| product.id).collect();
        let mut dangling = BTreeSet::new();
        let mut total = 0;
        let mut resolved = 0;
        for line in carts.iter().flat_map(|cart| &cart.products) {
            total += 1;
            if known.contains(&line.product_id) {
                resolved += 1;
            } else {
                dangling.insert(line.product_id);
            }
        }
        Self {
            total,
            resolved,
            dangling: dangling.into_iter().collect(),
        }
    }

    /// Share of resolved references in `[0, 1]`; `None` with no references.
    #[must_use]
    pub fn ratio(&self) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        let resolved = f64::from(u32::try_from(self.resolved).unwrap_or(u32::MAX));
        let total = f64::from(u32::try_from(self.total).unwrap_or(u32::MAX));
        Some(resolved / total)
    }

    /// Returns true when the ratio reaches `minimum`. Vacuously true without
    /// references.
    #[must_use]
    pub fn meets(&self, minimum: f64) -> bool {
        self.ratio().is_none_or(|ratio| ratio >= minimum)
    }
}

// ============================================================================
// SECTION: Consistency
// ============================================================================

/// Product listed under a category it does not report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryMismatch {
    /// Product id.
    pub product_id: i64,
    /// Category the product was listed under.
    pub listed_under: String,
    /// Category the product reports.
    pub reported: String,
}

/// Products from `/products/category/{category}` whose own category differs.
#[must_use]
pub fn category_mismatches(category: &str, products: &[Product]) -> Vec<CategoryMismatch> {
    products
        .iter()
        .filter(|product| product.category != category)
        .map(|product| CategoryMismatch {
            product_id: product.id,
            listed_under: category.to_string(),
            reported: product.category.clone(),
        })
        .collect()
}

/// Names of required user fields that are empty or malformed.
#[must_use]
pub fn user_field_problems(user: &User) -> Vec<&'static str> {
    let mut problems = Vec::new();
    let required = [
        ("username", user.username.as_str()),
        ("email", user.email.as_str()),
        ("phone", user.phone.as_str()),
        ("name.firstname", user.name.firstname.as_str()),
        ("name.lastname", user.name.lastname.as_str()),
        ("address.city", user.address.city.as_str()),
        ("address.street", user.address.street.as_str()),
        ("address.zipcode", user.address.zipcode.as_str()),
        ("address.geolocation.lat", user.address.geolocation.lat.as_str()),
        ("address.geolocation.long", user.address.geolocation.long.as_str()),
    ];
    if user.id <= 0 {
        problems.push("id");
    }
    problems.extend(
        required.iter().filter(|(_, value)| value.trim().is_empty()).map(|(field, _)| *field),
    );
    if !user.email.is_empty() && !user.email.contains('@') {
        problems.push("email format");
    }
    problems
}

/// Cart lines with a non-positive product id or a quantity outside
/// `1..=MAX_LINE_QUANTITY`, as `(product_id, quantity)`.
#[must_use]
pub fn implausible_lines(cart: &Cart) -> Vec<(i64, i64)> {
    cart.products
        .iter()
        .filter(|line| {
            line.product_id <= 0 || !(1..=MAX_LINE_QUANTITY).contains(&line.quantity)
        })
        .map(|line| (line.product_id, line.quantity))
        .collect()
}
