// system-tests/tests/suites/structured_reports.rs
// ============================================================================
// Module: Structured Report Tests
// Description: Result files written by real runs.
// Purpose: Validate per-scenario results, summaries, and cleanup on disk.
// Dependencies: system-tests helpers, serde_json
// ============================================================================

use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use storefront_config::ReportBackend;
use storefront_harness::RunSettings;
use storefront_harness::StructuredReporter;
use storefront_harness::clean_results_dir;
use storefront_harness::reporter_for;

use crate::helpers::artifacts::TestRun;
use crate::helpers::run::run_catalog;
use crate::helpers::run::settings;
use crate::helpers::store_stub::StoreFaults;
use crate::helpers::store_stub::spawn_store;
use crate::helpers::store_stub::spawn_store_with_faults;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const SMOKE: [&str; 5] =
    ["products_get_all", "categories_list", "carts_get_all", "users_get_all", "users_login"];

fn read_json(path: &Path) -> Result<Value, Box<dyn std::error::Error>> {
    Ok(serde_json::from_slice(&fs::read(path)?)?)
}

fn file_names(dir: &Path) -> Result<Vec<String>, Box<dyn std::error::Error>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        names.push(entry?.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

#[tokio::test(flavor = "multi_thread")]
async fn structured_run_writes_result_per_scenario() -> TestResult {
    let mut run = TestRun::start("structured_run_writes_result_per_scenario")?;
    let dir = run.results_dir();
    let store = spawn_store()?;
    let structured = Arc::new(StructuredReporter::new(&dir)?);

    let smoke = settings(&["smoke"], true);
    let summary = run_catalog(store.base_url(), &smoke, Arc::<StructuredReporter>::clone(&structured)).await;
    assert!(summary.all_passed());

    for name in SMOKE {
        let result = read_json(&structured.result_path(name))?;
        assert_eq!(result["info"]["name"], name);
        assert_eq!(result["status"], "passed");
        let assertions = result["assertions"].as_array().expect("assertions array");
        assert!(!assertions.is_empty(), "{name} recorded no checks");
        assert!(assertions.iter().all(|record| record["passed"] == true));
    }
    let totals = read_json(&dir.join("summary.json"))?;
    assert_eq!(totals["total"], 5);
    assert_eq!(totals["passed"], 5);
    let markdown = fs::read_to_string(dir.join("summary.md"))?;
    assert!(markdown.starts_with("# Conformance Run Summary"));
    assert!(markdown.contains("- Passed: 5"));

    run.record(&summary, "structured smoke run")?;
    let record = read_json(&run.record_path())?;
    assert_eq!(record["outcome"], "pass");
    assert_eq!(record["run"]["total"], 5);
    let listed = record["result_files"].as_array().expect("result files");
    assert_eq!(listed.len(), file_names(&dir)?.len());
    assert!(listed.iter().any(|name| name == "summary.json"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_result_carries_failure_and_diagnostics() -> TestResult {
    let temp = tempfile::tempdir()?;
    let store = spawn_store_with_faults(StoreFaults {
        mislabel_category: true,
        ..StoreFaults::default()
    })?;
    let structured = Arc::new(StructuredReporter::new(temp.path())?);
    let settings = RunSettings {
        filter: Some("categories_consistency".to_string()),
        ..RunSettings::default()
    };

    let summary = run_catalog(store.base_url(), &settings, Arc::<StructuredReporter>::clone(&structured)).await;
    assert_eq!(summary.failed, 1);

    let result = read_json(&structured.result_path("categories_consistency"))?;
    assert_eq!(result["status"], "failed");
    let failure = result["failure"].as_str().expect("failure message");
    assert!(failure.contains("electronics"), "{failure}");
    let attachments = result["attachments"].as_array().expect("attachments array");
    let names: Vec<&str> =
        attachments.iter().filter_map(|attachment| attachment["name"].as_str()).collect();
    assert!(names.contains(&"category mismatches: electronics"), "{}", names.join(", "));
    let failed_check = result["assertions"]
        .as_array()
        .expect("assertions array")
        .iter()
        .find(|record| record["passed"] == false)
        .expect("failed check");
    assert_eq!(failed_check["mode"], "soft");
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn cleanup_removes_previous_results_only() -> TestResult {
    let temp = tempfile::tempdir()?;
    let store = spawn_store()?;
    fs::write(temp.path().join("notes.txt"), "keep me")?;

    let reporter = reporter_for(ReportBackend::Structured, temp.path())?;
    run_catalog(store.base_url(), &settings(&["smoke"], true), reporter).await;
    assert_eq!(file_names(temp.path())?.len(), 8);

    assert_eq!(clean_results_dir(temp.path())?, 7);
    assert_eq!(file_names(temp.path())?, vec!["notes.txt".to_string()]);

    let reporter = reporter_for(ReportBackend::Both, temp.path())?;
    let settings = RunSettings {
        filter: Some("products_get_all".to_string()),
        ..RunSettings::default()
    };
    run_catalog(store.base_url(), &settings, reporter).await;
    assert_eq!(
        file_names(temp.path())?,
        vec![
            "notes.txt".to_string(),
            "products-get-all-result.json".to_string(),
            "summary.json".to_string(),
            "summary.md".to_string(),
        ]
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn log_backend_leaves_no_files() -> TestResult {
    let temp = tempfile::tempdir()?;
    let store = spawn_store()?;
    let reporter = reporter_for(ReportBackend::Log, temp.path())?;
    let summary = run_catalog(store.base_url(), &settings(&["smoke"], true), reporter).await;
    assert!(summary.all_passed());
    assert!(file_names(temp.path())?.is_empty());
    Ok(())
}
