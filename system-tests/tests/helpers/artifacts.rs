// system-tests/tests/helpers/artifacts.rs
// ============================================================================
// Module: Test Run Artifacts
// Description: Per-test directories holding scenario results and run records.
// Purpose: Leave an inspectable trail for every system-test run.
// Dependencies: serde, serde_json, storefront-harness, system-tests, time
// ============================================================================

//! ## Overview
//! Each test owns `run_root/<test name>` (or a timestamped directory under
//! `target/system-tests`). Structured results land in `results/`, and
//! `test-run.json` records the run outcome. A test that ends without
//! recording writes an `incomplete` or `panicked` record on drop.

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use serde::Serialize;
use storefront_harness::RunSummary;
use system_tests::config::SystemTestConfig;
use time::OffsetDateTime;

/// File name of the per-test run record.
const RECORD_FILE: &str = "test-run.json";

/// Outcome record written once per test.
#[derive(Serialize)]
struct RunRecord<'a> {
    /// Test function name.
    test: &'a str,
    /// `pass`, `fail`, `incomplete`, or `panicked`.
    outcome: &'a str,
    /// Free-form context for the run.
    note: &'a str,
    /// Wall time since the directory was created.
    elapsed_ms: u128,
    /// Aggregate scenario verdicts, when a run completed.
    run: Option<&'a RunSummary>,
    /// Files present in `results/` at record time.
    result_files: Vec<String>,
}

/// Artifact directory for one system test.
pub struct TestRun {
    /// Directory owned by this test.
    root: PathBuf,
    /// Test function name.
    test: String,
    /// Creation time.
    started: Instant,
    /// Whether a record has been written.
    recorded: bool,
}

impl TestRun {
    /// Creates the artifact directory for `test`.
    ///
    /// Under a configured run root an existing directory is an error unless
    /// overwrites are allowed.
    pub fn start(test: &str) -> io::Result<Self> {
        let config = SystemTestConfig::load().map_err(io::Error::other)?;
        let root = match config.run_root {
            Some(run_root) => {
                let root = run_root.join(test);
                if root.exists() && !config.allow_overwrite {
                    return Err(io::Error::new(
                        io::ErrorKind::AlreadyExists,
                        format!("{} already holds a previous run", root.display()),
                    ));
                }
                root
            }
            None => {
                let stamp = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
                PathBuf::from("target/system-tests").join(stamp.to_string()).join(test)
            }
        };
        fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            test: test.to_string(),
            started: Instant::now(),
            recorded: false,
        })
    }

    /// Directory structured reporters write scenario results to.
    pub fn results_dir(&self) -> PathBuf {
        self.root.join("results")
    }

    /// Path of the run record.
    pub fn record_path(&self) -> PathBuf {
        self.root.join(RECORD_FILE)
    }

    /// Records a completed conformance run; the outcome follows the summary.
    pub fn record(&mut self, summary: &RunSummary, note: &str) -> io::Result<()> {
        let outcome = if summary.all_passed() { "pass" } else { "fail" };
        self.write_record(outcome, note, Some(summary))
    }

    /// Writes `test-run.json`.
    fn write_record(
        &mut self,
        outcome: &str,
        note: &str,
        run: Option<&RunSummary>,
    ) -> io::Result<()> {
        let record = RunRecord {
            test: &self.test,
            outcome,
            note,
            elapsed_ms: self.started.elapsed().as_millis(),
            run,
            result_files: list_files(&self.results_dir())?,
        };
        let bytes = serde_json::to_vec_pretty(&record).map_err(io::Error::other)?;
        fs::write(self.record_path(), bytes)?;
        self.recorded = true;
        Ok(())
    }
}

impl Drop for TestRun {
    fn drop(&mut self) {
        if self.recorded {
            return;
        }
        let outcome = if std::thread::panicking() { "panicked" } else { "incomplete" };
        let _ = self.write_record(outcome, "no run was recorded", None);
    }
}

/// Sorted file names in `dir`; a missing directory is empty.
fn list_files(dir: &Path) -> io::Result<Vec<String>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err),
    };
    let mut names = Vec::new();
    for entry in entries {
        names.push(entry?.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}
