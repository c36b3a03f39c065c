// crates/storefront-harness/src/report.rs
// ============================================================================
// Module: Scenario Reporting
// Description: Report payloads and the reporter interface with log backends.
// Purpose: Route scenario lifecycle events to interchangeable backends.
// Dependencies: serde, tracing
// ============================================================================

//! ## Overview
//! The runner and the scenario context emit lifecycle events through
//! [`Reporter`]. Backends are shared across concurrently running scenarios,
//! so every method takes `&self` and implementations synchronize internally.
//!
//! Reporting never fails a scenario: backends swallow their own I/O errors
//! after logging them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;
use tracing::info;
use tracing::warn;

use crate::assertions::AssertionRecord;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Scenario severity, in the labels report viewers understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks any further use of the API.
    Blocker,
    /// Core functionality.
    Critical,
    /// Regular functionality.
    #[default]
    Normal,
    /// Secondary functionality.
    Minor,
    /// Cosmetic.
    Trivial,
}

impl Severity {
    /// Returns the lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blocker => "blocker",
            Self::Critical => "critical",
            Self::Normal => "normal",
            Self::Minor => "minor",
            Self::Trivial => "trivial",
        }
    }
}

/// Descriptive metadata for a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ScenarioInfo {
    /// Stable scenario name.
    pub name: String,
    /// Human-readable title.
    pub title: String,
    /// What the scenario verifies.
    pub description: String,
    /// Free-form tags (resource, smoke, performance).
    pub tags: Vec<String>,
    /// Severity label.
    pub severity: Severity,
}

/// Final status of a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    /// Every check passed.
    Passed,
    /// At least one check failed.
    Failed,
    /// The scenario could not run to a verdict (setup failure or panic).
    Broken,
}

impl ScenarioStatus {
    /// Returns the lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Broken => "broken",
        }
    }
}

/// A named step within a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    /// Step name.
    pub name: String,
    /// Passed unless a check failed while the step was open.
    pub status: ScenarioStatus,
    /// Start time, milliseconds since the epoch.
    pub started_at_ms: u128,
    /// Step duration in milliseconds.
    pub duration_ms: u128,
}

/// Diagnostic payload attached to a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    /// Attachment name.
    pub name: String,
    /// MIME type of `content`.
    pub content_type: String,
    /// Attachment body.
    pub content: String,
}

/// Everything recorded for one scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioReport {
    /// Scenario metadata.
    pub info: ScenarioInfo,
    /// Final status.
    pub status: ScenarioStatus,
    /// Failure summary for failed or broken scenarios.
    pub failure: Option<String>,
    /// Checks in evaluation order.
    pub assertions: Vec<AssertionRecord>,
    /// Steps in execution order.
    pub steps: Vec<StepRecord>,
    /// Diagnostics.
    pub attachments: Vec<Attachment>,
    /// Start time, milliseconds since the epoch.
    pub started_at_ms: u128,
    /// Scenario duration in milliseconds.
    pub duration_ms: u128,
}

impl ScenarioReport {
    /// Report for a scenario that could not produce a verdict.
    #[must_use]
    pub fn broken(info: ScenarioInfo, reason: String, started_at_ms: u128) -> Self {
        Self {
            info,
            status: ScenarioStatus::Broken,
            failure: Some(reason),
            assertions: Vec::new(),
            steps: Vec::new(),
            attachments: Vec::new(),
            started_at_ms,
            duration_ms: now_millis().saturating_sub(started_at_ms),
        }
    }

    /// Failed assertions in evaluation order.
    pub fn failures(&self) -> impl Iterator<Item = &AssertionRecord> {
        self.assertions.iter().filter(|record| !record.passed)
    }
}

/// One line of the run summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioSummary {
    /// Scenario name.
    pub name: String,
    /// Scenario title.
    pub title: String,
    /// Final status.
    pub status: ScenarioStatus,
    /// Failure summary, if any.
    pub failure: Option<String>,
    /// Duration in milliseconds.
    pub duration_ms: u128,
}

/// Aggregate outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RunSummary {
    /// Scenarios executed.
    pub total: usize,
    /// Scenarios that passed.
    pub passed: usize,
    /// Scenarios with failed checks.
    pub failed: usize,
    /// Scenarios that could not produce a verdict.
    pub broken: usize,
    /// Run start time, milliseconds since the epoch.
    pub started_at_ms: u128,
    /// Run duration in milliseconds.
    pub duration_ms: u128,
    /// Per-scenario lines in catalog order.
    pub scenarios: Vec<ScenarioSummary>,
}

impl RunSummary {
    /// Builds a summary from reports in catalog order.
    #[must_use]
    pub fn from_reports(reports: &[ScenarioReport], started_at_ms: u128) -> Self {
        let count = |status| reports.iter().filter(|report| report.status == status).count();
        Self {
            total: reports.len(),
            passed: count(ScenarioStatus::Passed),
            failed: count(ScenarioStatus::Failed),
            broken: count(ScenarioStatus::Broken),
            started_at_ms,
            duration_ms: now_millis().saturating_sub(started_at_ms),
            scenarios: reports
                .iter()
                .map(|report| ScenarioSummary {
                    name: report.info.name.clone(),
                    title: report.info.title.clone(),
                    status: report.status,
                    failure: report.failure.clone(),
                    duration_ms: report.duration_ms,
                })
                .collect(),
        }
    }

    /// Returns true when every scenario passed.
    #[must_use]
    pub const fn all_passed(&self) -> bool {
        self.passed == self.total
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Receives scenario lifecycle events.
pub trait Reporter: Send + Sync {
    /// A scenario is starting.
    fn begin_scenario(&self, info: &ScenarioInfo);

    /// A step is starting.
    fn begin_step(&self, _scenario: &str, _step: &str) {}

    /// A check was evaluated.
    fn record_assertion(&self, scenario: &str, record: &AssertionRecord);

    /// Diagnostics were attached.
    fn attach(&self, _scenario: &str, _attachment: &Attachment) {}

    /// A step ended.
    fn end_step(&self, _scenario: &str, _step: &StepRecord) {}

    /// A scenario finished with a verdict.
    fn end_scenario(&self, report: &ScenarioReport);

    /// The run finished.
    fn finish(&self, _summary: &RunSummary) {}
}

/// Shared reporter handle.
pub type SharedReporter = Arc<dyn Reporter>;

// ============================================================================
// SECTION: Backends
// ============================================================================

/// Reporter that emits `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn begin_scenario(&self, info: &ScenarioInfo) {
        info!(
            scenario = %info.name,
            title = %info.title,
            severity = info.severity.as_str(),
            tags = %info.tags.join(","),
            "scenario started"
        );
    }

    fn begin_step(&self, scenario: &str, step: &str) {
        info!(scenario, step, "step started");
    }

    fn record_assertion(&self, scenario: &str, record: &AssertionRecord) {
        if record.passed {
            info!(
                scenario,
                check = %record.description,
                expected = %record.expected,
                actual = %record.actual,
                "check passed"
            );
        } else {
            warn!(
                scenario,
                check = %record.description,
                mode = record.mode.as_str(),
                expected = %record.expected,
                actual = %record.actual,
                "check failed"
            );
        }
    }

    fn attach(&self, scenario: &str, attachment: &Attachment) {
        info!(
            scenario,
            attachment = %attachment.name,
            content_type = %attachment.content_type,
            bytes = attachment.content.len(),
            "attachment recorded"
        );
    }

    fn end_step(&self, scenario: &str, step: &StepRecord) {
        info!(
            scenario,
            step = %step.name,
            status = step.status.as_str(),
            duration_ms = step.duration_ms,
            "step finished"
        );
    }

    fn end_scenario(&self, report: &ScenarioReport) {
        match report.status {
            ScenarioStatus::Passed => info!(
                scenario = %report.info.name,
                status = report.status.as_str(),
                checks = report.assertions.len(),
                duration_ms = report.duration_ms,
                "scenario finished"
            ),
            ScenarioStatus::Failed | ScenarioStatus::Broken => warn!(
                scenario = %report.info.name,
                status = report.status.as_str(),
                failure = report.failure.as_deref().unwrap_or(""),
                failed_checks = report.failures().count(),
                duration_ms = report.duration_ms,
                "scenario finished"
            ),
        }
    }

    fn finish(&self, summary: &RunSummary) {
        info!(
            total = summary.total,
            passed = summary.passed,
            failed = summary.failed,
            broken = summary.broken,
            duration_ms = summary.duration_ms,
            "run finished"
        );
    }
}

/// Reporter that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl Reporter for NoopReporter {
    fn begin_scenario(&self, _info: &ScenarioInfo) {}

    fn record_assertion(&self, _scenario: &str, _record: &AssertionRecord) {}

    fn end_scenario(&self, _report: &ScenarioReport) {}
}

/// Reporter that forwards every event to each backend in order.
#[derive(Clone, Default)]
pub struct FanOutReporter {
    /// Downstream backends.
    backends: Vec<SharedReporter>,
}

impl FanOutReporter {
    /// Builds a fan-out over the given backends.
    #[must_use]
    pub fn new(backends: Vec<SharedReporter>) -> Self {
        Self {
            backends,
        }
    }

    /// Number of backends.
    #[must_use]
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Returns true when there are no backends.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

impl Reporter for FanOutReporter {
    fn begin_scenario(&self, info: &ScenarioInfo) {
        self.backends.iter().for_each(|backend| backend.begin_scenario(info));
    }

    fn begin_step(&self, scenario: &str, step: &str) {
        self.backends.iter().for_each(|backend| backend.begin_step(scenario, step));
    }

    fn record_assertion(&self, scenario: &str, record: &AssertionRecord) {
        self.backends.iter().for_each(|backend| backend.record_assertion(scenario, record));
    }

    fn attach(&self, scenario: &str, attachment: &Attachment) {
        self.backends.iter().for_each(|backend| backend.attach(scenario, attachment));
    }

    fn end_step(&self, scenario: &str, step: &StepRecord) {
        self.backends.iter().for_each(|backend| backend.end_step(scenario, step));
    }

    fn end_scenario(&self, report: &ScenarioReport) {
        self.backends.iter().for_each(|backend| backend.end_scenario(report));
    }

    fn finish(&self, summary: &RunSummary) {
        self.backends.iter().for_each(|backend| backend.finish(summary));
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Milliseconds since the Unix epoch.
#[must_use]
pub fn now_millis() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}
