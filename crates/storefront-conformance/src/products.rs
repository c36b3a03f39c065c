// crates/storefront-conformance/src/products.rs
// ============================================================================
// Module: Product Scenarios
// Description: Reads, writes, and document structure of /products.
// Purpose: Verify the product resource end to end.
// Dependencies: storefront-client, storefront-harness
// ============================================================================

//! ## Overview
//! Product scenarios cover listing (plain, limited, sorted), lookup by id,
//! a missing id, the write endpoints (POST, PUT, PATCH, DELETE), and the
//! JSON shape of a product document. Writes against the public storefront
//! are not persisted, so they check the echoed payload rather than a re-read.

use std::time::Duration;

use storefront_client::CreateProductRequest;
use storefront_client::Product;
use storefront_client::UpdateProductRequest;
use storefront_harness::JsonKind;
use storefront_harness::Scenario;
use storefront_harness::ScenarioAbort;
use storefront_harness::ScenarioContext;
use storefront_harness::Severity;
use storefront_harness::scenario_fn;

use crate::support::MISSING_ID;
use crate::support::require_payload;
use crate::support::require_success;

/// Product scenarios in catalog order.
#[must_use]
pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "products_get_all",
            title: "Get all products",
            description: "Lists every product and validates the first product's structure.",
            tags: &["api", "products", "get", "smoke"],
            severity: Severity::Normal,
            run: scenario_fn!(get_all),
        },
        Scenario {
            name: "products_get_by_id",
            title: "Get product by id",
            description: "Fetches product 1 and validates every field.",
            tags: &["api", "products", "get"],
            severity: Severity::Critical,
            run: scenario_fn!(get_by_id),
        },
        Scenario {
            name: "products_get_invalid_id",
            title: "Get product by invalid id",
            description: "A product that does not exist yields 404, an error, or an empty 200.",
            tags: &["api", "products", "negative"],
            severity: Severity::Normal,
            run: scenario_fn!(get_invalid_id),
        },
        Scenario {
            name: "products_limit",
            title: "Limit product list",
            description: "`limit=5` returns between one and five products.",
            tags: &["api", "products", "query"],
            severity: Severity::Normal,
            run: scenario_fn!(limit),
        },
        Scenario {
            name: "products_sort",
            title: "Sort product list",
            description: "`sort=desc` returns products.",
            tags: &["api", "products", "query"],
            severity: Severity::Minor,
            run: scenario_fn!(sort),
        },
        Scenario {
            name: "products_create",
            title: "Create product",
            description: "A created product echoes its fields and receives an id.",
            tags: &["api", "products", "write"],
            severity: Severity::Critical,
            run: scenario_fn!(create),
        },
        Scenario {
            name: "products_update",
            title: "Update product",
            description: "PUT replaces product 1's fields and keeps its id.",
            tags: &["api", "products", "write"],
            severity: Severity::Normal,
            run: scenario_fn!(update),
        },
        Scenario {
            name: "products_patch",
            title: "Patch product",
            description: "PATCH changes product 1's title.",
            tags: &["api", "products", "write"],
            severity: Severity::Normal,
            run: scenario_fn!(patch),
        },
        Scenario {
            name: "products_delete",
            title: "Delete product",
            description: "DELETE returns the deleted product.",
            tags: &["api", "products", "write"],
            severity: Severity::Normal,
            run: scenario_fn!(delete),
        },
        Scenario {
            name: "products_document_structure",
            title: "Product document structure",
            description: "The raw product document carries every field with the right JSON type.",
            tags: &["api", "products", "schema"],
            severity: Severity::Normal,
            run: scenario_fn!(document_structure),
        },
    ]
}

/// Soft checks over one product's fields.
fn check_product_fields(ctx: &mut ScenarioContext, product: &Product) {
    ctx.check_that("product id > 0", product.id > 0);
    ctx.check_not_empty("product title", &product.title);
    ctx.check_that("product price > 0", product.price > 0.0);
    ctx.check_not_empty("product category", &product.category);
    ctx.check_not_empty("product image", &product.image);
}

/// Lists products and inspects the first one.
async fn get_all(ctx: &mut ScenarioContext) -> Result<(), ScenarioAbort> {
    let client = ctx.client().clone();
    ctx.step("Send GET request to /products");
    let result = client.list_products().await;

    ctx.step("Validate response");
    let (products, elapsed) = require_payload(ctx, "list products", result)?;
    ctx.check_response_time(Duration::from_secs(5), elapsed);

    ctx.step("Validate products data");
    ctx.require_not_empty("product list", &products)?;
    if let Some(first) = products.first() {
        check_product_fields(ctx, first);
    }
    Ok(())
}

/// Fetches product 1.
async fn get_by_id(ctx: &mut ScenarioContext) -> Result<(), ScenarioAbort> {
    let client = ctx.client().clone();
    let result = client.get_product(1).await;
    let (product, elapsed) = require_payload(ctx, "get product 1", result)?;
    ctx.check_response_time(Duration::from_secs(3), elapsed);

    ctx.check_eq("product id", &1, &product.id);
    check_product_fields(ctx, &product);
    ctx.check_not_empty("product description", &product.description);
    ctx.check_that("rating rate >= 0", product.rating.rate >= 0.0);
    ctx.check_that("rating count >= 0", product.rating.count >= 0);
    Ok(())
}

/// Looks up a product that does not exist.
async fn get_invalid_id(ctx: &mut ScenarioContext) -> Result<(), ScenarioAbort> {
    let client = ctx.client().clone();
    let result = client.get_product(MISSING_ID).await;
    ctx.check_missing_resource("product 99999 absent", &result);
    Ok(())
}

/// Lists at most five products.
async fn limit(ctx: &mut ScenarioContext) -> Result<(), ScenarioAbort> {
    let client = ctx.client().clone();
    let result = client.list_products_limited(5).await;
    let (products, _) = require_payload(ctx, "list products limit=5", result)?;
    ctx.check_that("at most 5 products", products.len() <= 5);
    ctx.check_not_empty("limited product list", &products);
    Ok(())
}

/// Lists products in descending order.
async fn sort(ctx: &mut ScenarioContext) -> Result<(), ScenarioAbort> {
    let client = ctx.client().clone();
    let result = client.list_products_sorted("desc").await;
    let (products, _) = require_payload(ctx, "list products sort=desc", result)?;
    ctx.check_not_empty("sorted product list", &products);
    Ok(())
}

/// Creates a product and compares the echo.
async fn create(ctx: &mut ScenarioContext) -> Result<(), ScenarioAbort> {
    let client = ctx.client().clone();
    let request = CreateProductRequest {
        title: "T".to_string(),
        price: 9.99,
        description: "conformance fixture".to_string(),
        image: "https://example.com/fixture.jpg".to_string(),
        category: "test".to_string(),
    };
    let result = client.create_product(&request).await;
    let response = require_success(ctx, "create product", result, &[200, 201])?;
    let created = ctx.require_value("created product", &response)?;

    ctx.check_that("created id > 0", created.id > 0);
    ctx.check_eq("created title", &request.title, &created.title);
    ctx.check_eq("created price", &request.price, &created.price);
    ctx.check_eq("created category", &request.category, &created.category);
    Ok(())
}

/// Replaces product 1.
async fn update(ctx: &mut ScenarioContext) -> Result<(), ScenarioAbort> {
    let client = ctx.client().clone();
    let request = UpdateProductRequest {
        title: Some("Updated title".to_string()),
        price: Some(199.99),
        description: Some("updated by the conformance suite".to_string()),
        image: Some("https://example.com/updated.jpg".to_string()),
        category: Some("updated".to_string()),
    };
    let result = client.update_product(1, &request).await;
    let (updated, _) = require_payload(ctx, "update product 1", result)?;

    ctx.check_eq("id unchanged", &1, &updated.id);
    ctx.check_eq("updated title", &request.title, &Some(updated.title));
    ctx.check_eq("updated price", &request.price, &Some(updated.price));
    ctx.check_eq("updated category", &request.category, &Some(updated.category));
    Ok(())
}

/// Changes only product 1's title.
async fn patch(ctx: &mut ScenarioContext) -> Result<(), ScenarioAbort> {
    let client = ctx.client().clone();
    let request = UpdateProductRequest {
        title: Some("Patched title".to_string()),
        ..UpdateProductRequest::default()
    };
    let result = client.patch_product(1, &request).await;
    let (patched, _) = require_payload(ctx, "patch product 1", result)?;
    ctx.check_eq("patched title", &request.title, &Some(patched.title));
    Ok(())
}

/// Deletes product 1.
async fn delete(ctx: &mut ScenarioContext) -> Result<(), ScenarioAbort> {
    let client = ctx.client().clone();
    let result = client.delete_product(1).await;
    let (deleted, _) = require_payload(ctx, "delete product 1", result)?;
    ctx.check_eq("deleted id", &1, &deleted.id);
    Ok(())
}

/// Walks the untyped product document.
async fn document_structure(ctx: &mut ScenarioContext) -> Result<(), ScenarioAbort> {
    let client = ctx.client().clone();
    let result = client.get_product(1).await;
    let response = require_success(ctx, "get product 1", result, &[200])?;
    let document = ctx.require_json(&response.meta)?;
    ctx.require_field_kind(&document, "", JsonKind::Object)?;

    let fields = [
        ("id", JsonKind::Number),
        ("title", JsonKind::String),
        ("price", JsonKind::Number),
        ("description", JsonKind::String),
        ("category", JsonKind::String),
        ("image", JsonKind::String),
        ("rating", JsonKind::Object),
        ("rating.rate", JsonKind::Number),
        ("rating.count", JsonKind::Number),
    ];
    for (path, kind) in fields {
        ctx.check_field_kind(&document, path, kind);
    }
    Ok(())
}
