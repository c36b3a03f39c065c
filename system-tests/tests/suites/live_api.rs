// system-tests/tests/suites/live_api.rs
// ============================================================================
// Module: Live API Tests
// Description: The catalog against a real storefront deployment.
// Purpose: Confirm the suite holds against the service it was written for.
// Dependencies: system-tests helpers, storefront-config
// ============================================================================

//! ## Overview
//! Targets `STOREFRONT_SYSTEM_TEST_LIVE_URL`, defaulting to the public
//! deployment. Network access is required; the suite only builds with the
//! `live` feature.

use std::time::Duration;

use storefront_config::ApiConfig;
use storefront_config::ReportBackend;
use storefront_conformance::catalog;
use storefront_harness::client_factory;
use storefront_harness::reporter_for;
use storefront_harness::run_scenarios;
use system_tests::config::SystemTestConfig;

use crate::helpers::artifacts::TestRun;
use crate::helpers::readiness::wait_for_store_ready;
use crate::helpers::run::describe_failures;
use crate::helpers::run::settings;
use crate::helpers::timeouts::resolve_timeout;
use crate::helpers::timeouts::resolve_timeout_secs;

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn live_api() -> Result<ApiConfig, Box<dyn std::error::Error>> {
    let config = SystemTestConfig::load()?;
    Ok(ApiConfig {
        base_url: config.live_url_or_default(),
        timeout_secs: resolve_timeout_secs(Duration::from_secs(30)),
        ..ApiConfig::default()
    })
}

#[tokio::test(flavor = "multi_thread")]
async fn live_smoke_scenarios_pass() -> TestResult {
    let mut run = TestRun::start("live_smoke_scenarios_pass")?;
    let api = live_api()?;
    wait_for_store_ready(&api.base_url, resolve_timeout(Duration::from_secs(30))).await?;

    let backend = reporter_for(ReportBackend::Both, &run.results_dir())?;
    let summary =
        run_scenarios(&catalog(), &settings(&["smoke"], true), client_factory(api), backend).await;
    run.record(&summary, "smoke scenarios against the live deployment")?;
    assert!(summary.all_passed(), "{}", describe_failures(&summary));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn live_catalog_has_no_broken_scenarios() -> TestResult {
    let mut run = TestRun::start("live_catalog_has_no_broken_scenarios")?;
    let api = live_api()?;
    let backend = reporter_for(ReportBackend::Structured, &run.results_dir())?;
    let summary =
        run_scenarios(&catalog(), &settings(&[], true), client_factory(api), backend).await;
    run.record(&summary, &describe_failures(&summary))?;
    assert_eq!(summary.total, catalog().len());
    assert_eq!(summary.broken, 0, "{}", describe_failures(&summary));
    Ok(())
}
