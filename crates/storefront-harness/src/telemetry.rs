// crates/storefront-harness/src/telemetry.rs
// ============================================================================
// Module: Log Subscriber Setup
// Description: Installs the tracing subscriber from logging configuration.
// Purpose: Route client, check, and reporter events to the configured sink.
// Dependencies: storefront-config, tracing-subscriber
// ============================================================================

//! ## Overview
//! `RUST_LOG` wins over the configured level when set. Output goes to stdout,
//! stderr, or a file opened in append mode; ANSI colors are only used for the
//! console streams.

use std::fs;
use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use storefront_config::LogFormat;
use storefront_config::LogTarget;
use storefront_config::LoggingConfig;
use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Subscriber installation failures.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The configured level did not form a valid filter.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// The log file could not be opened.
    #[error("cannot open log file {path}: {source}")]
    File {
        /// Log file path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// A global subscriber is already installed.
    #[error("log subscriber already installed: {0}")]
    Install(String),
}

/// Builds the level filter, preferring `RUST_LOG`.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] when the configured level is rejected.
pub fn build_filter(config: &LoggingConfig) -> Result<EnvFilter, TelemetryError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(config.level.as_str())
            .map_err(|err| TelemetryError::Filter(err.to_string())),
    }
}

/// Opens the writer for a log target.
///
/// # Errors
///
/// Returns [`TelemetryError::File`] when a log file cannot be opened.
pub fn make_writer(target: &LogTarget) -> Result<BoxMakeWriter, TelemetryError> {
    match target {
        LogTarget::Stdout => Ok(BoxMakeWriter::new(io::stdout)),
        LogTarget::Stderr => Ok(BoxMakeWriter::new(io::stderr)),
        LogTarget::File(path) => {
            let open = || {
                if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty())
                {
                    fs::create_dir_all(parent)?;
                }
                OpenOptions::new().create(true).append(true).open(path)
            };
            let file = open().map_err(|source| TelemetryError::File {
                path: path.clone(),
                source,
            })?;
            Ok(BoxMakeWriter::new(Mutex::new(file)))
        }
    }
}

/// Installs the global subscriber.
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter or writer cannot be built, or a
/// subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let filter = build_filter(config)?;
    let target = config.target();
    let ansi = !matches!(target, LogTarget::File(_));
    let writer = make_writer(&target)?;
    let registry = tracing_subscriber::registry().with(filter);
    let installed = match config.format {
        LogFormat::Json => registry.with(fmt::layer().json().with_writer(writer)).try_init(),
        LogFormat::Pretty => {
            registry.with(fmt::layer().pretty().with_ansi(ansi).with_writer(writer)).try_init()
        }
        LogFormat::Compact => {
            registry.with(fmt::layer().compact().with_ansi(ansi).with_writer(writer)).try_init()
        }
    };
    installed.map_err(|err| TelemetryError::Install(err.to_string()))
}
