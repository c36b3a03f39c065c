// system-tests/tests/suites/store_faults.rs
// ============================================================================
// Module: Store Fault Detection Tests
// Description: Scenarios against stores that break one rule each.
// Purpose: Prove each broken rule surfaces as a failed scenario.
// Dependencies: system-tests helpers
// ============================================================================

use std::net::TcpListener;
use std::time::Duration;

use storefront_harness::CheckMode;
use storefront_harness::ScenarioReport;
use storefront_harness::ScenarioStatus;

use crate::helpers::run::quiet;
use crate::helpers::run::run_catalog;
use crate::helpers::run::run_named;
use crate::helpers::run::settings;
use crate::helpers::run::status_of;
use crate::helpers::store_stub::StoreFaults;
use crate::helpers::store_stub::spawn_store_with_faults;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn failure(report: &ScenarioReport) -> &str {
    report.failure.as_deref().unwrap_or_default()
}

fn attachment_names(report: &ScenarioReport) -> Vec<&str> {
    report.attachments.iter().map(|attachment| attachment.name.as_str()).collect()
}

#[tokio::test(flavor = "multi_thread")]
async fn mislabeled_category_fails_consistency() -> TestResult {
    let store = spawn_store_with_faults(StoreFaults {
        mislabel_category: true,
        ..StoreFaults::default()
    })?;

    let report = run_named(store.base_url(), "categories_consistency").await;
    assert_eq!(report.status, ScenarioStatus::Failed);
    let message = failure(&report);
    assert!(message.contains("mismatched products in electronics"), "{message}");
    assert!(attachment_names(&report).contains(&"category mismatches: electronics"));

    let listing = run_named(store.base_url(), "categories_list").await;
    assert_eq!(listing.status, ScenarioStatus::Passed, "{}", failure(&listing));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn dangling_cart_references_fail_integrity() -> TestResult {
    let store = spawn_store_with_faults(StoreFaults {
        dangling_cart_refs: true,
        ..StoreFaults::default()
    })?;

    let report = run_named(store.base_url(), "carts_reference_integrity").await;
    assert_eq!(report.status, ScenarioStatus::Failed);
    let check = report
        .assertions
        .iter()
        .find(|record| record.description == "resolvable cart product references")
        .expect("integrity check recorded");
    assert!(!check.passed);
    assert_eq!(check.mode, CheckMode::Soft);
    assert_eq!(check.expected, ">= 80.0%");
    assert_eq!(check.actual, "37.5% (3/8)");
    assert!(attachment_names(&report).contains(&"reference integrity"));

    let first_cart = run_named(store.base_url(), "carts_get_by_id").await;
    assert_eq!(first_cart.status, ScenarioStatus::Passed, "{}", failure(&first_cart));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn refused_logins_fail_login_scenarios_only() -> TestResult {
    let store = spawn_store_with_faults(StoreFaults {
        reject_logins: true,
        ..StoreFaults::default()
    })?;

    let summary = run_catalog(store.base_url(), &settings(&["auth"], true), quiet()).await;
    assert_eq!(summary.total, 3);
    assert_eq!(status_of(&summary, "users_login"), ScenarioStatus::Failed);
    assert_eq!(status_of(&summary, "users_authenticated_session"), ScenarioStatus::Failed);
    assert_eq!(status_of(&summary, "users_login_invalid"), ScenarioStatus::Passed);

    let report = run_named(store.base_url(), "users_login").await;
    assert!(failure(&report).contains("status code"), "{}", failure(&report));
    assert!(failure(&report).contains("401"), "{}", failure(&report));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_email_fails_data_validation() -> TestResult {
    let store = spawn_store_with_faults(StoreFaults {
        malformed_user_email: true,
        ..StoreFaults::default()
    })?;

    let report = run_named(store.base_url(), "users_data_validation").await;
    assert_eq!(report.status, ScenarioStatus::Failed);
    assert!(failure(&report).contains("user 2 field problems"), "{}", failure(&report));
    assert!(failure(&report).contains("email format"), "{}", failure(&report));

    let first_user = run_named(store.base_url(), "users_get_by_id").await;
    assert_eq!(first_user.status, ScenarioStatus::Passed, "{}", failure(&first_user));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn slow_store_fails_performance_without_aborting() -> TestResult {
    let store = spawn_store_with_faults(StoreFaults {
        latency: Duration::from_millis(2_100),
        ..StoreFaults::default()
    })?;

    let report = run_named(store.base_url(), "categories_performance").await;
    assert_eq!(report.status, ScenarioStatus::Failed);
    let slow: Vec<_> = report
        .assertions
        .iter()
        .filter(|record| record.description == "response time" && !record.passed)
        .collect();
    assert_eq!(slow.len(), 1);
    assert_eq!(slow[0].expected, "<= 2000ms");
    let steps: Vec<&str> = report.steps.iter().map(|step| step.name.as_str()).collect();
    assert_eq!(steps, ["Time category list", "Time category products"]);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_store_fails_smoke_scenarios() -> TestResult {
    let addr = TcpListener::bind("127.0.0.1:0")?.local_addr()?;
    let base_url = format!("http://{addr}/");

    let summary = run_catalog(&base_url, &settings(&["smoke"], true), quiet()).await;
    assert_eq!(summary.total, 5);
    assert_eq!(summary.failed, 5);
    assert_eq!(summary.broken, 0);
    for scenario in &summary.scenarios {
        let message = scenario.failure.as_deref().unwrap_or_default();
        assert!(message.contains("attempt(s)"), "{}: {message}", scenario.name);
    }
    Ok(())
}
