// crates/storefront-conformance/src/categories.rs
// ============================================================================
// Module: Category Scenarios
// Description: Category listing, per-category products, and consistency.
// Purpose: Verify /products/categories and /products/category/{name}.
// Dependencies: storefront-client, storefront-harness
// ============================================================================

//! ## Overview
//! Category scenarios list the category names, fetch the products of each
//! one, and check that every product's `category` matches the category it
//! was listed under. An unknown category may answer 404 or an empty list.

use std::time::Duration;

use storefront_harness::Check;
use storefront_harness::Scenario;
use storefront_harness::ScenarioAbort;
use storefront_harness::ScenarioContext;
use storefront_harness::Severity;
use storefront_harness::scenario_fn;

use crate::analysis::category_mismatches;
use crate::support::require_payload;

/// Category known to hold products.
const KNOWN_CATEGORY: &str = "electronics";
/// Category that does not exist.
const UNKNOWN_CATEGORY: &str = "nonexistent";

/// Category scenarios in catalog order.
#[must_use]
pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "categories_list",
            title: "List categories",
            description: "Lists every category; none may be blank.",
            tags: &["api", "categories", "smoke"],
            severity: Severity::Critical,
            run: scenario_fn!(list),
        },
        Scenario {
            name: "categories_products",
            title: "Products in a category",
            description: "The electronics category holds products.",
            tags: &["api", "categories", "products"],
            severity: Severity::Normal,
            run: scenario_fn!(products_in_category),
        },
        Scenario {
            name: "categories_invalid",
            title: "Products in an unknown category",
            description: "An unknown category yields 404, an error, or an empty list.",
            tags: &["api", "categories", "negative"],
            severity: Severity::Normal,
            run: scenario_fn!(invalid_category),
        },
        Scenario {
            name: "categories_consistency",
            title: "Category consistency",
            description: "Every product listed under a category reports that category.",
            tags: &["api", "categories", "consistency"],
            severity: Severity::Critical,
            run: scenario_fn!(consistency),
        },
        Scenario {
            name: "categories_performance",
            title: "Category performance",
            description: "Category endpoints answer within their time budgets.",
            tags: &["api", "categories", "performance"],
            severity: Severity::Normal,
            run: scenario_fn!(performance),
        },
    ]
}

/// Lists categories.
async fn list(ctx: &mut ScenarioContext) -> Result<(), ScenarioAbort> {
    let client = ctx.client().clone();
    ctx.step("Request all categories");
    let result = client.list_categories().await;

    ctx.step("Validate response");
    let (categories, elapsed) = require_payload(ctx, "list categories", result)?;
    ctx.check_response_time(Duration::from_secs(3), elapsed);

    ctx.step("Validate categories");
    ctx.require_not_empty("category list", &categories)?;
    for (index, category) in categories.iter().enumerate() {
        ctx.check_not_empty(&format!("category {}", index + 1), category);
    }
    Ok(())
}

/// Lists the products of a known category.
async fn products_in_category(ctx: &mut ScenarioContext) -> Result<(), ScenarioAbort> {
    let client = ctx.client().clone();
    ctx.step("Request electronics products");
    let result = client.list_products_in_category(KNOWN_CATEGORY).await;

    ctx.step("Validate products");
    let (products, elapsed) = require_payload(ctx, "list electronics products", result)?;
    ctx.check_response_time(Duration::from_secs(5), elapsed);
    ctx.require_not_empty("electronics products", &products)?;
    Ok(())
}

/// Lists the products of a category that does not exist.
async fn invalid_category(ctx: &mut ScenarioContext) -> Result<(), ScenarioAbort> {
    let client = ctx.client().clone();
    ctx.step("Request unknown category");
    let result = client.list_products_in_category(UNKNOWN_CATEGORY).await;

    ctx.step("Validate error handling");
    let expected = "transport error, 404, or empty list";
    let check = match &result {
        Err(err) if err.is_transport() => {
            Check::new("unknown category", expected, format!("transport error: {err}"), true)
        }
        Err(err) => {
            Check::new("unknown category", expected, format!("request error: {err}"), false)
        }
        Ok(response) => {
            ctx.log_response(&response.meta);
            let count = response.value().map_or(0, Vec::len);
            let passed = response.status() == 404 || (response.status() == 200 && count == 0);
            Check::new(
                "unknown category",
                expected,
                format!("{} with {count} product(s)", response.status()),
                passed,
            )
        }
    };
    ctx.check(check);
    Ok(())
}

/// Checks every category's products against their reported category.
async fn consistency(ctx: &mut ScenarioContext) -> Result<(), ScenarioAbort> {
    let client = ctx.client().clone();
    ctx.step("Fetch categories");
    let (categories, _) =
        require_payload(ctx, "list categories", client.list_categories().await)?;
    ctx.require_not_empty("category list", &categories)?;

    ctx.step("Fetch products");
    let (products, _) = require_payload(ctx, "list products", client.list_products().await)?;
    ctx.require_not_empty("product list", &products)?;

    ctx.step("Compare categories");
    for category in &categories {
        let result = client.list_products_in_category(category).await;
        let (listed, _) = require_payload(ctx, &format!("products in {category}"), result)?;
        let mismatches = category_mismatches(category, &listed);
        if !mismatches.is_empty() {
            ctx.attach_json(format!("category mismatches: {category}"), &mismatches);
        }
        ctx.check_eq(&format!("mismatched products in {category}"), &0, &mismatches.len());
    }
    Ok(())
}

/// Times the category endpoints.
async fn performance(ctx: &mut ScenarioContext) -> Result<(), ScenarioAbort> {
    let client = ctx.client().clone();
    ctx.step("Time category list");
    let (categories, elapsed) =
        require_payload(ctx, "list categories", client.list_categories().await)?;
    ctx.check_response_time(Duration::from_secs(2), elapsed);

    let Some(first) = categories.first() else {
        return Ok(());
    };
    ctx.step("Time category products");
    let result = client.list_products_in_category(first).await;
    let (products, elapsed) = require_payload(ctx, &format!("products in {first}"), result)?;
    ctx.check_response_time(Duration::from_secs(3), elapsed);
    ctx.check_not_empty("category products", &products);
    Ok(())
}
