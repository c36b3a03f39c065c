// system-tests/tests/suites/catalog_stub.rs
// ============================================================================
// Module: Catalog Conformance Tests
// Description: The full scenario catalog against a well-behaved store.
// Purpose: Prove every scenario passes when the API behaves.
// Dependencies: system-tests helpers
// ============================================================================

//! ## Overview
//! A seeded store that follows the storefront contract must pass every
//! scenario, in parallel and in serial runs, whatever shape its "not found"
//! answers take.

use std::time::Duration;

use storefront_conformance::catalog;
use storefront_harness::ScenarioStatus;

use crate::helpers::artifacts::TestRun;
use crate::helpers::readiness::wait_for_store_ready;
use crate::helpers::run::describe_failures;
use crate::helpers::run::quiet;
use crate::helpers::run::run_catalog;
use crate::helpers::run::run_named;
use crate::helpers::run::settings;
use crate::helpers::run::status_of;
use crate::helpers::store_stub::DEMO_TOKEN;
use crate::helpers::store_stub::MissingStyle;
use crate::helpers::store_stub::StoreFaults;
use crate::helpers::store_stub::spawn_store;
use crate::helpers::store_stub::spawn_store_with_faults;
use crate::helpers::timeouts::resolve_timeout;

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[tokio::test(flavor = "multi_thread")]
async fn full_catalog_passes_against_seeded_store() -> TestResult {
    let mut run = TestRun::start("full_catalog_passes_against_seeded_store")?;
    let store = spawn_store()?;
    wait_for_store_ready(store.base_url(), resolve_timeout(Duration::from_secs(5))).await?;

    let summary = run_catalog(store.base_url(), &settings(&[], true), quiet()).await;
    run.record(&summary, "parallel run against the seeded store")?;
    assert!(summary.all_passed(), "{}", describe_failures(&summary));
    assert_eq!(summary.total, catalog().len());
    assert_eq!(summary.passed, summary.total);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn serial_run_passes_in_catalog_order() -> TestResult {
    let store = spawn_store()?;
    wait_for_store_ready(store.base_url(), resolve_timeout(Duration::from_secs(5))).await?;

    let summary = run_catalog(store.base_url(), &settings(&[], false), quiet()).await;
    assert!(summary.all_passed(), "{}", describe_failures(&summary));
    let ran: Vec<&str> = summary.scenarios.iter().map(|scenario| scenario.name.as_str()).collect();
    let expected: Vec<&str> = catalog().iter().map(|scenario| scenario.name).collect();
    assert_eq!(ran, expected);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn every_tolerated_missing_shape_passes_negative_scenarios() -> TestResult {
    let tolerated = [
        MissingStyle::EmptyBody,
        MissingStyle::Null,
        MissingStyle::EmptyObject,
        MissingStyle::NotFound,
    ];
    for style in tolerated {
        let store = spawn_store_with_faults(StoreFaults {
            missing: style,
            ..StoreFaults::default()
        })?;
        let summary = run_catalog(store.base_url(), &settings(&["negative"], true), quiet()).await;
        assert_eq!(summary.total, 5);
        assert!(summary.all_passed(), "{}", describe_failures(&summary));
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn server_errors_for_missing_resources_fail_negative_scenarios() -> TestResult {
    let store = spawn_store_with_faults(StoreFaults {
        missing: MissingStyle::ServerError,
        ..StoreFaults::default()
    })?;
    let summary = run_catalog(store.base_url(), &settings(&["negative"], true), quiet()).await;

    let failing = [
        "products_get_invalid_id",
        "categories_invalid",
        "carts_get_invalid_id",
        "users_get_invalid_id",
    ];
    for name in failing {
        assert_eq!(status_of(&summary, name), ScenarioStatus::Failed, "{name}");
    }
    assert_eq!(status_of(&summary, "users_login_invalid"), ScenarioStatus::Passed);
    assert_eq!(summary.broken, 0);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn authenticated_session_sends_the_login_token() -> TestResult {
    let store = spawn_store()?;
    let report = run_named(store.base_url(), "users_authenticated_session").await;
    assert_eq!(
        report.status,
        ScenarioStatus::Passed,
        "{}",
        report.failure.as_deref().unwrap_or_default()
    );

    let requests = store.requests();
    let login = requests.iter().position(|request| request.path == "/auth/login");
    let login = login.expect("login request recorded");
    let authorized = requests
        .iter()
        .skip(login + 1)
        .find(|request| request.method == "GET" && request.path == "/users/1")
        .expect("user fetch after login");
    let bearer = format!("Bearer {DEMO_TOKEN}");
    assert_eq!(authorized.authorization.as_deref(), Some(bearer.as_str()));
    assert!(requests[login].authorization.is_none());
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn write_scenarios_use_each_method_once() -> TestResult {
    let store = spawn_store()?;
    let summary = run_catalog(store.base_url(), &settings(&["write"], false), quiet()).await;
    assert!(summary.all_passed(), "{}", describe_failures(&summary));

    let calls: Vec<(String, String)> = store
        .requests()
        .into_iter()
        .map(|request| (request.method, request.path))
        .collect();
    let expected = [
        ("POST", "/products"),
        ("PUT", "/products/1"),
        ("PATCH", "/products/1"),
        ("DELETE", "/products/1"),
    ];
    let expected: Vec<(String, String)> = expected
        .iter()
        .map(|(method, path)| ((*method).to_string(), (*path).to_string()))
        .collect();
    assert_eq!(calls, expected);
    Ok(())
}
