// crates/storefront-conformance/src/carts.rs
// ============================================================================
// Module: Cart Scenarios
// Description: Cart listing, lookup, and product reference integrity.
// Purpose: Verify /carts and its links into the product catalog.
// Dependencies: storefront-client, storefront-harness
// ============================================================================

//! ## Overview
//! Cart scenarios read `/carts` and check line items. The reference check
//! resolves every cart line against the product list and fails when the
//! resolved share drops below `min_reference_ratio`.

use std::time::Duration;

use storefront_client::Cart;
use storefront_harness::Check;
use storefront_harness::Scenario;
use storefront_harness::ScenarioAbort;
use storefront_harness::ScenarioContext;
use storefront_harness::Severity;
use storefront_harness::scenario_fn;

use crate::analysis::ReferenceIntegrity;
use crate::analysis::implausible_lines;
use crate::support::MISSING_ID;
use crate::support::require_payload;

/// Cart scenarios in catalog order.
#[must_use]
pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "carts_get_all",
            title: "Get all carts",
            description: "Lists every cart and validates the first cart's structure.",
            tags: &["api", "carts", "get", "smoke"],
            severity: Severity::Normal,
            run: scenario_fn!(get_all),
        },
        Scenario {
            name: "carts_get_by_id",
            title: "Get cart by id",
            description: "Fetches cart 1 and validates each line item.",
            tags: &["api", "carts", "get"],
            severity: Severity::Normal,
            run: scenario_fn!(get_by_id),
        },
        Scenario {
            name: "carts_get_invalid_id",
            title: "Get cart by invalid id",
            description: "A cart that does not exist yields 404, an error, or an empty 200.",
            tags: &["api", "carts", "negative"],
            severity: Severity::Normal,
            run: scenario_fn!(get_invalid_id),
        },
        Scenario {
            name: "carts_reference_integrity",
            title: "Cart product references",
            description: "Enough cart line items reference products that exist.",
            tags: &["api", "carts", "consistency"],
            severity: Severity::Critical,
            run: scenario_fn!(reference_integrity),
        },
        Scenario {
            name: "carts_performance",
            title: "Cart performance",
            description: "Cart endpoints answer within their time budgets.",
            tags: &["api", "carts", "performance"],
            severity: Severity::Minor,
            run: scenario_fn!(performance),
        },
    ]
}

/// Soft checks over a cart's header fields.
fn check_cart_header(ctx: &mut ScenarioContext, cart: &Cart) {
    ctx.check_that("cart id > 0", cart.id > 0);
    ctx.check_that("cart user id > 0", cart.user_id > 0);
    ctx.check_that("cart date present", cart.has_date());
}

/// Lists carts and inspects the first one.
async fn get_all(ctx: &mut ScenarioContext) -> Result<(), ScenarioAbort> {
    let client = ctx.client().clone();
    let result = client.list_carts().await;
    let (carts, elapsed) = require_payload(ctx, "list carts", result)?;
    ctx.check_response_time(Duration::from_secs(5), elapsed);
    ctx.require_not_empty("cart list", &carts)?;

    if let Some(cart) = carts.first() {
        check_cart_header(ctx, cart);
        if let Some(line) = cart.products.first() {
            ctx.check_that("line product id > 0", line.product_id > 0);
            ctx.check_that("line quantity > 0", line.quantity > 0);
        }
    }
    Ok(())
}

/// Fetches cart 1.
async fn get_by_id(ctx: &mut ScenarioContext) -> Result<(), ScenarioAbort> {
    let client = ctx.client().clone();
    let result = client.get_cart(1).await;
    let (cart, elapsed) = require_payload(ctx, "get cart 1", result)?;
    ctx.check_response_time(Duration::from_secs(3), elapsed);

    ctx.check_eq("cart id", &1, &cart.id);
    check_cart_header(ctx, &cart);
    let implausible = implausible_lines(&cart);
    if !implausible.is_empty() {
        ctx.attach_json("implausible cart lines", &implausible);
    }
    ctx.check_eq("implausible cart lines", &0, &implausible.len());
    Ok(())
}

/// Looks up a cart that does not exist.
async fn get_invalid_id(ctx: &mut ScenarioContext) -> Result<(), ScenarioAbort> {
    let client = ctx.client().clone();
    let result = client.get_cart(MISSING_ID).await;
    ctx.check_missing_resource("cart 99999 absent", &result);
    Ok(())
}

/// Resolves every cart line against the product list.
async fn reference_integrity(ctx: &mut ScenarioContext) -> Result<(), ScenarioAbort> {
    let client = ctx.client().clone();
    ctx.step("Fetch carts");
    let (carts, _) = require_payload(ctx, "list carts", client.list_carts().await)?;

    ctx.step("Fetch products");
    let (products, _) = require_payload(ctx, "list products", client.list_products().await)?;

    ctx.step("Resolve references");
    let integrity = ReferenceIntegrity::measure(&carts, &products);
    ctx.attach_json("reference integrity", &integrity);
    let minimum = ctx.settings().min_reference_ratio;
    let actual = integrity.ratio().map_or_else(
        || "no references".to_string(),
        |ratio| format!("{:.1}% ({}/{})", ratio * 100.0, integrity.resolved, integrity.total),
    );
    ctx.check(Check::new(
        "resolvable cart product references",
        format!(">= {:.1}%", minimum * 100.0),
        actual,
        integrity.meets(minimum),
    ));
    Ok(())
}

/// Times the cart endpoints.
async fn performance(ctx: &mut ScenarioContext) -> Result<(), ScenarioAbort> {
    let client = ctx.client().clone();
    ctx.step("Time cart list");
    let (carts, elapsed) = require_payload(ctx, "list carts", client.list_carts().await)?;
    ctx.check_response_time(Duration::from_secs(5), elapsed);

    let Some(first) = carts.first() else {
        return Ok(());
    };
    ctx.step("Time single cart");
    let result = client.get_cart(first.id).await;
    let (_, elapsed) = require_payload(ctx, "get first cart", result)?;
    ctx.check_response_time(Duration::from_secs(2), elapsed);
    Ok(())
}
