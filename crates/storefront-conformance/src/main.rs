// crates/storefront-conformance/src/main.rs
// ============================================================================
// Module: Storefront Conformance CLI Entry Point
// Description: Runs, lists, and configures the storefront scenario catalog.
// Purpose: Provide the process-level runner with meaningful exit codes.
// Dependencies: clap, storefront-config, storefront-harness, thiserror, tokio
// ============================================================================

//! ## Overview
//! `run` loads configuration, installs logging, prepares the results
//! directory, and executes the selected scenarios. The process exits 0 when
//! every selected scenario passed, 1 when any failed or broke, and 2 for
//! configuration and usage errors.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use storefront_config::ConfigSource;
use storefront_config::ReportBackend;
use storefront_config::StorefrontConfig;
use storefront_conformance::catalog;
use storefront_harness::RunSettings;
use storefront_harness::RunSummary;
use storefront_harness::ScenarioStatus;
use storefront_harness::clean_results_dir;
use storefront_harness::client_factory;
use storefront_harness::init_tracing;
use storefront_harness::reporter_for;
use storefront_harness::run_scenarios;
use thiserror::Error;
use tracing::info;
use tracing::warn;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Exit code when every selected scenario passed.
const EXIT_PASSED: u8 = 0;
/// Exit code when any selected scenario failed or broke.
const EXIT_FAILED: u8 = 1;
/// Exit code for configuration and usage errors.
const EXIT_USAGE: u8 = 2;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "storefront-conformance", version, disable_help_subcommand = true)]
struct Cli {
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Commands,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the scenario catalog against the configured API.
    Run(RunCommand),
    /// List scenarios without running them.
    List(ListCommand),
    /// Print the effective configuration as TOML.
    Config(ConfigCommand),
}

/// Arguments for the `run` command.
#[derive(Args, Debug, Default)]
struct RunCommand {
    /// Config file path (defaults to storefront.toml or `STOREFRONT_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Override the API base URL.
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,
    /// Only run scenarios whose name or title contains this text.
    #[arg(long, value_name = "TEXT")]
    filter: Option<String>,
    /// Only run scenarios carrying one of these tags.
    #[arg(long = "tag", value_name = "TAG")]
    tags: Vec<String>,
    /// Run scenarios one after another.
    #[arg(long, action = ArgAction::SetTrue)]
    serial: bool,
    /// Override the reporter backend.
    #[arg(long, value_enum, value_name = "BACKEND")]
    reporter: Option<ReporterArg>,
}

/// Arguments for the `list` command.
#[derive(Args, Debug)]
struct ListCommand {
    /// Only list scenarios carrying one of these tags.
    #[arg(long = "tag", value_name = "TAG")]
    tags: Vec<String>,
}

/// Arguments for the `config` command.
#[derive(Args, Debug)]
struct ConfigCommand {
    /// Config file path (defaults to storefront.toml or `STOREFRONT_CONFIG`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// Reporter backend selection on the command line.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum ReporterArg {
    /// Log lines only.
    Log,
    /// Result files only.
    Structured,
    /// Both.
    Both,
}

impl From<ReporterArg> for ReportBackend {
    fn from(value: ReporterArg) -> Self {
        match value {
            ReporterArg::Log => Self::Log,
            ReporterArg::Structured => Self::Structured,
            ReporterArg::Both => Self::Both,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration or usage failure; maps to exit code 2.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match dispatch(Cli::parse()).await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the selected subcommand.
async fn dispatch(cli: Cli) -> CliResult<ExitCode> {
    match cli.command {
        Commands::Run(command) => command_run(command).await,
        Commands::List(command) => command_list(&command),
        Commands::Config(command) => command_config(&command),
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Runs the selected scenarios.
async fn command_run(command: RunCommand) -> CliResult<ExitCode> {
    let loaded = StorefrontConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(err.to_string()))?;
    let mut config = loaded.config;
    apply_overrides(&mut config, &command)?;
    init_tracing(&config.logging).map_err(|err| CliError::new(err.to_string()))?;
    match &loaded.source {
        ConfigSource::File(path) => info!(path = %path.display(), "configuration loaded"),
        ConfigSource::Defaults {
            reason,
        } => warn!(reason = %reason, "using default configuration"),
    }

    let settings = run_settings(&config, &command);
    let summary = execute_run(&config, &settings).await?;
    write_summary(&summary)?;
    Ok(ExitCode::from(exit_status(&summary)))
}

/// Prepares the results directory and runs the selected scenarios.
async fn execute_run(config: &StorefrontConfig, settings: &RunSettings) -> CliResult<RunSummary> {
    let scenarios = catalog();
    if settings.select(&scenarios).is_empty() {
        return Err(CliError::new("no scenarios match the selection"));
    }

    let results_dir = &config.reporting.results_dir;
    prepare_results_dir(results_dir, config.test.cleanup)?;
    let reporter = reporter_for(config.reporting.backend, results_dir).map_err(|err| {
        CliError::new(format!("cannot prepare {}: {err}", results_dir.display()))
    })?;

    info!(
        base_url = %config.api.base_url,
        parallel = settings.parallel,
        log_reporter = config.reporting.backend.includes_log(),
        structured_reporter = config.reporting.backend.includes_structured(),
        "starting run"
    );
    let factory = client_factory(config.api.clone());
    Ok(run_scenarios(&scenarios, settings, factory, reporter).await)
}

/// Lists scenarios.
fn command_list(command: &ListCommand) -> CliResult<ExitCode> {
    let settings = RunSettings {
        tags: command.tags.clone(),
        ..RunSettings::default()
    };
    for scenario in settings.select(&catalog()) {
        write_line(&format!(
            "{:<32} {:<10} [{}] {}",
            scenario.name,
            scenario.severity.as_str(),
            scenario.tags.join(","),
            scenario.title
        ))?;
    }
    Ok(ExitCode::SUCCESS)
}

/// Prints the effective configuration.
fn command_config(command: &ConfigCommand) -> CliResult<ExitCode> {
    let loaded = StorefrontConfig::load(command.config.as_deref())
        .map_err(|err| CliError::new(err.to_string()))?;
    let source = match &loaded.source {
        ConfigSource::File(path) => format!("# source: {}", path.display()),
        ConfigSource::Defaults {
            reason,
        } => format!("# source: defaults ({reason})"),
    };
    let rendered = loaded.config.to_toml_string().map_err(|err| CliError::new(err.to_string()))?;
    write_line(&source)?;
    write_line(rendered.trim_end())?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Applies command-line overrides on top of the loaded configuration.
fn apply_overrides(config: &mut StorefrontConfig, command: &RunCommand) -> CliResult<()> {
    if let Some(base_url) = &command.base_url {
        config.api.base_url.clone_from(base_url);
    }
    if let Some(reporter) = command.reporter {
        config.reporting.backend = reporter.into();
    }
    config.validate().map_err(|err| CliError::new(err.to_string()))
}

/// Creates the results directory, clearing stale results when `cleanup` is set.
fn prepare_results_dir(dir: &Path, cleanup: bool) -> CliResult<()> {
    fs::create_dir_all(dir)
        .map_err(|err| CliError::new(format!("cannot create {}: {err}", dir.display())))?;
    if cleanup {
        let removed = clean_results_dir(dir)
            .map_err(|err| CliError::new(format!("cannot clean {}: {err}", dir.display())))?;
        info!(dir = %dir.display(), removed, "stale results removed");
    }
    Ok(())
}

/// Process exit status for a finished run.
const fn exit_status(summary: &RunSummary) -> u8 {
    if summary.all_passed() { EXIT_PASSED } else { EXIT_FAILED }
}

/// Builds run settings from configuration and selection flags.
fn run_settings(config: &StorefrontConfig, command: &RunCommand) -> RunSettings {
    let mut settings = RunSettings::from_config(config);
    settings.filter.clone_from(&command.filter);
    settings.tags.clone_from(&command.tags);
    if command.serial {
        settings.parallel = false;
    }
    settings
}

/// Prints the run summary.
fn write_summary(summary: &RunSummary) -> CliResult<()> {
    for scenario in &summary.scenarios {
        let mut line = format!("{:<7} {}", scenario.status.as_str(), scenario.name);
        if scenario.status != ScenarioStatus::Passed
            && let Some(failure) = &scenario.failure
        {
            line.push_str(": ");
            line.push_str(failure);
        }
        write_line(&line)?;
    }
    write_line(&format!(
        "{} scenario(s): {} passed, {} failed, {} broken in {} ms",
        summary.total, summary.passed, summary.failed, summary.broken, summary.duration_ms
    ))
}

/// Writes a line to stdout.
fn write_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
        .map_err(|err| CliError::new(format!("failed to write to stdout: {err}")))
}

/// Emits an error message to stderr and returns the usage exit code.
fn emit_error(message: &str) -> ExitCode {
    let mut stderr = std::io::stderr();
    let _ = writeln!(&mut stderr, "error: {message}");
    ExitCode::from(EXIT_USAGE)
}
