// crates/storefront-harness/src/structured.rs
// ============================================================================
// Module: Structured Report Backend
// Description: Per-scenario JSON result files plus run summaries.
// Purpose: Leave machine-readable results behind for report tooling.
// Dependencies: serde_json, tracing
// ============================================================================

//! ## Overview
//! Each finished scenario is written to `<results_dir>/<slug>-result.json`.
//! When the run finishes, `summary.json` and `summary.md` are written next to
//! them. File writes are serialized through one mutex so concurrent scenarios
//! never interleave output.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use serde::Serialize;
use storefront_config::ReportBackend;
use tracing::warn;

use crate::assertions::AssertionRecord;
use crate::report::FanOutReporter;
use crate::report::LogReporter;
use crate::report::Reporter;
use crate::report::RunSummary;
use crate::report::ScenarioInfo;
use crate::report::ScenarioReport;
use crate::report::SharedReporter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Summary file name (JSON).
pub const SUMMARY_JSON: &str = "summary.json";
/// Summary file name (Markdown).
pub const SUMMARY_MARKDOWN: &str = "summary.md";
/// Suffix of per-scenario result files.
pub const RESULT_SUFFIX: &str = "-result.json";

// ============================================================================
// SECTION: Reporter
// ============================================================================

/// Reporter that writes JSON result files into a directory.
#[derive(Debug)]
pub struct StructuredReporter {
    /// Results directory.
    dir: PathBuf,
    /// Result files written so far; also serializes writes.
    written: Mutex<Vec<String>>,
}

impl StructuredReporter {
    /// Creates the results directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error when the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            written: Mutex::new(Vec::new()),
        })
    }

    /// Returns the results directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the result path for a scenario name.
    #[must_use]
    pub fn result_path(&self, scenario: &str) -> PathBuf {
        self.dir.join(format!("{}{RESULT_SUFFIX}", slug(scenario)))
    }

    /// Serializes `value` as pretty JSON into `path`.
    fn write_json<T: Serialize>(path: &Path, value: &T) -> io::Result<()> {
        let bytes = serde_json::to_vec_pretty(value).map_err(io::Error::other)?;
        fs::write(path, bytes)
    }
}

impl Reporter for StructuredReporter {
    fn begin_scenario(&self, _info: &ScenarioInfo) {}

    fn record_assertion(&self, _scenario: &str, _record: &AssertionRecord) {}

    fn end_scenario(&self, report: &ScenarioReport) {
        let path = self.result_path(&report.info.name);
        let Ok(mut written) = self.written.lock() else {
            warn!(scenario = %report.info.name, "result writer lock poisoned");
            return;
        };
        match Self::write_json(&path, report) {
            Ok(()) => {
                if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
                    written.push(name.to_string());
                }
            }
            Err(err) => {
                warn!(
                    scenario = %report.info.name,
                    path = %path.display(),
                    error = %err,
                    "failed to write scenario result"
                );
            }
        }
    }

    fn finish(&self, summary: &RunSummary) {
        let Ok(written) = self.written.lock() else {
            warn!("result writer lock poisoned");
            return;
        };
        let json_path = self.dir.join(SUMMARY_JSON);
        if let Err(err) = Self::write_json(&json_path, summary) {
            warn!(path = %json_path.display(), error = %err, "failed to write run summary");
        }
        let md_path = self.dir.join(SUMMARY_MARKDOWN);
        if let Err(err) = fs::write(&md_path, summary_markdown(summary, &written)) {
            warn!(path = %md_path.display(), error = %err, "failed to write run summary");
        }
    }
}

// ============================================================================
// SECTION: Selection
// ============================================================================

/// Builds the reporter for a configured backend.
///
/// # Errors
///
/// Returns an error when the structured backend cannot create `results_dir`.
pub fn reporter_for(backend: ReportBackend, results_dir: &Path) -> io::Result<SharedReporter> {
    let mut backends: Vec<SharedReporter> = Vec::new();
    if backend.includes_log() {
        backends.push(Arc::new(LogReporter));
    }
    if backend.includes_structured() {
        backends.push(Arc::new(StructuredReporter::new(results_dir)?));
    }
    if backends.len() == 1
        && let Some(only) = backends.pop()
    {
        return Ok(only);
    }
    Ok(Arc::new(FanOutReporter::new(backends)))
}

/// Removes result and summary files left by a previous run.
///
/// Other files in the directory are left alone. Returns the number of files
/// removed; a missing directory removes nothing.
///
/// # Errors
///
/// Returns an error when the directory cannot be read or a file cannot be
/// removed.
pub fn clean_results_dir(dir: &Path) -> io::Result<usize> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(0),
        Err(err) => return Err(err),
    };
    let mut removed = 0;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let stale =
            name.ends_with(RESULT_SUFFIX) || name == SUMMARY_JSON || name == SUMMARY_MARKDOWN;
        if stale && entry.file_type()?.is_file() {
            fs::remove_file(entry.path())?;
            removed += 1;
        }
    }
    Ok(removed)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Lowercases and replaces anything outside `[a-z0-9]` with single dashes.
#[must_use]
pub fn slug(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    if out.is_empty() { "scenario".to_string() } else { out }
}

/// Renders the Markdown run summary.
fn summary_markdown(summary: &RunSummary, results: &[String]) -> String {
    let mut out = String::new();
    out.push_str("# Conformance Run Summary\n\n");
    out.push_str("## Totals\n\n");
    let _ = writeln!(out, "- Total: {}", summary.total);
    let _ = writeln!(out, "- Passed: {}", summary.passed);
    let _ = writeln!(out, "- Failed: {}", summary.failed);
    let _ = writeln!(out, "- Broken: {}", summary.broken);
    let _ = writeln!(out, "- Duration (ms): {}", summary.duration_ms);
    out.push_str("\n## Scenarios\n\n");
    if summary.scenarios.is_empty() {
        out.push_str("- None\n");
    }
    for scenario in &summary.scenarios {
        let _ = write!(
            out,
            "- [{}] {} ({} ms)",
            scenario.status.as_str(),
            scenario.name,
            scenario.duration_ms
        );
        if let Some(failure) = &scenario.failure {
            let _ = write!(out, ": {failure}");
        }
        out.push('\n');
    }
    out.push_str("\n## Result Files\n\n");
    if results.is_empty() {
        out.push_str("- None\n");
    }
    for result in results {
        let _ = writeln!(out, "- {result}");
    }
    out
}
