// crates/storefront-harness/src/runner.rs
// ============================================================================
// Module: Scenario Runner
// Description: Scenario descriptors, selection, and concurrent execution.
// Purpose: Run independent scenarios and aggregate their verdicts.
// Dependencies: storefront-client, storefront-config, tokio, tracing
// ============================================================================

//! ## Overview
//! A [`Scenario`] pairs static metadata with an async body. Each selected
//! scenario gets a fresh client from the [`ClientFactory`] and its own
//! [`ScenarioContext`], and runs on its own tokio task so a panic is reported
//! as [`crate::report::ScenarioStatus::Broken`] without disturbing the others.
//!
//! With `parallel` set, all scenarios are spawned into a `JoinSet` at once;
//! otherwise they run one after another. Either way the summary lists them in
//! catalog order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::any::Any;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use storefront_client::ClientError;
use storefront_client::StoreClient;
use storefront_config::ApiConfig;
use storefront_config::StorefrontConfig;
use tokio::task::JoinError;
use tokio::task::JoinSet;
use tracing::warn;

use crate::assertions::ScenarioAbort;
use crate::context::ScenarioContext;
use crate::context::ScenarioSettings;
use crate::report::RunSummary;
use crate::report::ScenarioInfo;
use crate::report::ScenarioReport;
use crate::report::Severity;
use crate::report::SharedReporter;
use crate::report::now_millis;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Future returned by a scenario body.
pub type ScenarioFuture<'a> = Pin<Box<dyn Future<Output = Result<(), ScenarioAbort>> + Send + 'a>>;

/// Scenario body.
pub type ScenarioFn = for<'a> fn(&'a mut ScenarioContext) -> ScenarioFuture<'a>;

/// Builds one client per scenario.
pub type ClientFactory = Arc<dyn Fn() -> Result<StoreClient, ClientError> + Send + Sync>;

/// Adapts `async fn(&mut ScenarioContext) -> Result<(), ScenarioAbort>` into a
/// [`ScenarioFn`].
///
/// ```ignore
/// async fn smoke(ctx: &mut ScenarioContext) -> Result<(), ScenarioAbort> {
///     ctx.require_that("always", true)
/// }
/// let run: ScenarioFn = scenario_fn!(smoke);
/// ```
#[macro_export]
macro_rules! scenario_fn {
    ($body:path) => {{
        fn adapter(
            ctx: &mut $crate::context::ScenarioContext,
        ) -> $crate::runner::ScenarioFuture<'_> {
            ::std::boxed::Box::pin($body(ctx))
        }
        adapter as $crate::runner::ScenarioFn
    }};
}

/// Static scenario descriptor.
#[derive(Debug, Clone, Copy)]
pub struct Scenario {
    /// Stable name, used for selection and result file names.
    pub name: &'static str,
    /// Human-readable title.
    pub title: &'static str,
    /// What the scenario verifies.
    pub description: &'static str,
    /// Tags used for selection.
    pub tags: &'static [&'static str],
    /// Severity label.
    pub severity: Severity,
    /// Scenario body.
    pub run: ScenarioFn,
}

impl Scenario {
    /// Returns the metadata as an owned [`ScenarioInfo`].
    #[must_use]
    pub fn info(&self) -> ScenarioInfo {
        ScenarioInfo {
            name: self.name.to_string(),
            title: self.title.to_string(),
            description: self.description.to_string(),
            tags: self.tags.iter().map(|tag| (*tag).to_string()).collect(),
            severity: self.severity,
        }
    }

    /// Returns true when the scenario carries `tag` (case-insensitive).
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|candidate| candidate.eq_ignore_ascii_case(tag))
    }

    /// Returns true when the name or title contains `filter` (case-insensitive).
    #[must_use]
    pub fn matches_filter(&self, filter: &str) -> bool {
        let needle = filter.to_ascii_lowercase();
        self.name.to_ascii_lowercase().contains(&needle)
            || self.title.to_ascii_lowercase().contains(&needle)
    }
}

/// Selection and execution settings for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSettings {
    /// Run selected scenarios concurrently.
    pub parallel: bool,
    /// Name/title substring filter.
    pub filter: Option<String>,
    /// Scenario must carry at least one of these tags, when non-empty.
    pub tags: Vec<String>,
    /// Settings handed to every scenario.
    pub scenario: ScenarioSettings,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            parallel: true,
            filter: None,
            tags: Vec::new(),
            scenario: ScenarioSettings::default(),
        }
    }
}

impl RunSettings {
    /// Derives run settings from configuration.
    #[must_use]
    pub fn from_config(config: &StorefrontConfig) -> Self {
        Self {
            parallel: config.test.parallel,
            filter: None,
            tags: Vec::new(),
            scenario: ScenarioSettings {
                verbose: config.test.verbose,
                min_reference_ratio: config.test.min_reference_ratio,
            },
        }
    }

    /// Returns true when `scenario` passes the filter and tag selection.
    #[must_use]
    pub fn selects(&self, scenario: &Scenario) -> bool {
        let filter_ok = self.filter.as_deref().is_none_or(|filter| scenario.matches_filter(filter));
        let tags_ok = self.tags.is_empty() || self.tags.iter().any(|tag| scenario.has_tag(tag));
        filter_ok && tags_ok
    }

    /// Returns the selected scenarios in catalog order.
    #[must_use]
    pub fn select(&self, scenarios: &[Scenario]) -> Vec<Scenario> {
        scenarios.iter().filter(|scenario| self.selects(scenario)).copied().collect()
    }
}

/// Factory building clients from API configuration.
#[must_use]
pub fn client_factory(config: ApiConfig) -> ClientFactory {
    Arc::new(move || StoreClient::from_config(&config))
}

// ============================================================================
// SECTION: Execution
// ============================================================================

/// Runs the selected scenarios and reports the summary.
pub async fn run_scenarios(
    scenarios: &[Scenario],
    settings: &RunSettings,
    factory: ClientFactory,
    reporter: SharedReporter,
) -> RunSummary {
    let started_at_ms = now_millis();
    let selected = settings.select(scenarios);
    let reports = if settings.parallel {
        run_parallel(&selected, settings.scenario, &factory, &reporter).await
    } else {
        let mut reports = Vec::with_capacity(selected.len());
        for scenario in &selected {
            let factory = Arc::clone(&factory);
            let reporter = Arc::clone(&reporter);
            reports.push(run_scenario(*scenario, settings.scenario, factory, reporter).await);
        }
        reports
    };
    let summary = RunSummary::from_reports(&reports, started_at_ms);
    reporter.finish(&summary);
    summary
}

/// Spawns every scenario into a `JoinSet` and collects reports in order.
async fn run_parallel(
    selected: &[Scenario],
    settings: ScenarioSettings,
    factory: &ClientFactory,
    reporter: &SharedReporter,
) -> Vec<ScenarioReport> {
    let mut set = JoinSet::new();
    for (index, scenario) in selected.iter().copied().enumerate() {
        let factory = Arc::clone(factory);
        let reporter = Arc::clone(reporter);
        set.spawn(async move {
            let report = run_scenario(scenario, settings, factory, reporter).await;
            (index, report)
        });
    }
    let mut slots: Vec<Option<ScenarioReport>> = vec![None; selected.len()];
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((index, report)) => {
                if let Some(slot) = slots.get_mut(index) {
                    *slot = Some(report);
                }
            }
            Err(err) => warn!(error = %err, "scenario task failed to join"),
        }
    }
    selected
        .iter()
        .zip(slots)
        .map(|(scenario, slot)| {
            slot.unwrap_or_else(|| {
                let report = ScenarioReport::broken(
                    scenario.info(),
                    "scenario task did not complete".to_string(),
                    now_millis(),
                );
                reporter.end_scenario(&report);
                report
            })
        })
        .collect()
}

/// Runs one scenario on its own task and reports it.
pub async fn run_scenario(
    scenario: Scenario,
    settings: ScenarioSettings,
    factory: ClientFactory,
    reporter: SharedReporter,
) -> ScenarioReport {
    let info = scenario.info();
    let started_at_ms = now_millis();
    reporter.begin_scenario(&info);

    let client = match factory() {
        Ok(client) => client,
        Err(err) => {
            let report =
                ScenarioReport::broken(info, format!("client setup failed: {err}"), started_at_ms);
            reporter.end_scenario(&report);
            return report;
        }
    };

    let ctx = ScenarioContext::new(info.clone(), client, Arc::clone(&reporter), settings);
    let body = scenario.run;
    let task = tokio::spawn(async move {
        let mut ctx = ctx;
        let outcome = body(&mut ctx).await;
        ctx.finish(outcome.as_ref().err())
    });
    let report = match task.await {
        Ok(report) => report,
        Err(err) => ScenarioReport::broken(info, join_failure(err), started_at_ms),
    };
    reporter.end_scenario(&report);
    report
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Describes why a scenario task ended without a report.
fn join_failure(err: JoinError) -> String {
    if err.is_panic() {
        format!("scenario panicked: {}", panic_message(&*err.into_panic()))
    } else {
        "scenario task was cancelled".to_string()
    }
}

/// Extracts a panic payload's message.
fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
