// crates/storefront-harness/src/lib.rs
// ============================================================================
// Module: Storefront Harness Library
// Description: Checks, scenario context, reporters, and the scenario runner.
// Purpose: Turn client responses into recorded verdicts and reports.
// Dependencies: storefront-client, storefront-config, tokio, tracing
// ============================================================================

//! ## Overview
//! A scenario is an async function over a [`ScenarioContext`]. The context
//! offers hard checks (`require_*`, failing aborts the scenario through `?`)
//! and soft checks (`check_*`, failing is recorded and the scenario goes on).
//! Every check, step, and attachment flows to a [`Reporter`]; the runner
//! executes scenarios, optionally in parallel, and aggregates a
//! [`RunSummary`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod assertions;
pub mod context;
pub mod document;
pub mod report;
pub mod runner;
pub mod structured;
pub mod telemetry;


// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use assertions::AssertionRecord;
pub use assertions::Check;
pub use assertions::CheckMode;
pub use assertions::Countable;
pub use assertions::ScenarioAbort;
pub use context::ScenarioContext;
pub use context::ScenarioSettings;
pub use document::JsonDocument;
pub use document::JsonKind;
pub use report::Attachment;
pub use report::FanOutReporter;
pub use report::LogReporter;
pub use report::NoopReporter;
pub use report::Reporter;
pub use report::RunSummary;
pub use report::ScenarioInfo;
pub use report::ScenarioReport;
pub use report::ScenarioStatus;
pub use report::Severity;
pub use report::SharedReporter;
pub use report::StepRecord;
pub use runner::ClientFactory;
pub use runner::RunSettings;
pub use runner::Scenario;
pub use runner::ScenarioFn;
pub use runner::ScenarioFuture;
pub use runner::client_factory;
pub use runner::run_scenario;
pub use runner::run_scenarios;
pub use structured::StructuredReporter;
pub use structured::clean_results_dir;
pub use structured::reporter_for;
pub use telemetry::TelemetryError;
pub use telemetry::init_tracing;
