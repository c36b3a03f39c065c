// system-tests/tests/helpers/run.rs
// ============================================================================
// Module: Run Helpers
// Description: Run catalog selections against a store URL.
// Purpose: Keep suites focused on outcomes rather than wiring.
// Dependencies: storefront-config, storefront-conformance, storefront-harness
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use storefront_config::ApiConfig;
use storefront_conformance::catalog;
use storefront_conformance::find;
use storefront_harness::NoopReporter;
use storefront_harness::RunSettings;
use storefront_harness::RunSummary;
use storefront_harness::ScenarioReport;
use storefront_harness::ScenarioSettings;
use storefront_harness::ScenarioStatus;
use storefront_harness::SharedReporter;
use storefront_harness::client_factory;
use storefront_harness::run_scenario;
use storefront_harness::run_scenarios;

use super::timeouts::resolve_timeout_secs;

/// API configuration for `base_url` without retries.
pub fn api_config(base_url: &str) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        timeout_secs: resolve_timeout_secs(Duration::from_secs(10)),
        retry_count: 0,
        ..ApiConfig::default()
    }
}

/// Run settings selecting `tags` (all scenarios when empty).
pub fn settings(tags: &[&str], parallel: bool) -> RunSettings {
    RunSettings {
        parallel,
        tags: tags.iter().map(ToString::to_string).collect(),
        ..RunSettings::default()
    }
}

/// Reporter that discards every event.
pub fn quiet() -> SharedReporter {
    Arc::new(NoopReporter)
}

/// Runs the selected catalog scenarios against `base_url`.
pub async fn run_catalog(
    base_url: &str,
    settings: &RunSettings,
    reporter: SharedReporter,
) -> RunSummary {
    run_scenarios(&catalog(), settings, client_factory(api_config(base_url)), reporter).await
}

/// Runs one named catalog scenario and returns its full report.
pub async fn run_named(base_url: &str, name: &str) -> ScenarioReport {
    let scenario = find(name).unwrap_or_else(|| panic!("no scenario named {name}"));
    run_scenario(
        scenario,
        ScenarioSettings::default(),
        client_factory(api_config(base_url)),
        quiet(),
    )
    .await
}

/// Status recorded for `name` in a summary.
pub fn status_of(summary: &RunSummary, name: &str) -> ScenarioStatus {
    summary
        .scenarios
        .iter()
        .find(|scenario| scenario.name == name)
        .map(|scenario| scenario.status)
        .unwrap_or_else(|| panic!("{name} missing from summary"))
}

/// One line per scenario that did not pass, for assertion messages.
pub fn describe_failures(summary: &RunSummary) -> String {
    summary
        .scenarios
        .iter()
        .filter(|scenario| scenario.status != ScenarioStatus::Passed)
        .map(|scenario| {
            format!(
                "{} [{}]: {}",
                scenario.name,
                scenario.status.as_str(),
                scenario.failure.as_deref().unwrap_or("no failure recorded")
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
