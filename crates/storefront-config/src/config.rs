// crates/storefront-config/src/config.rs
// ============================================================================
// Module: Storefront Configuration
// Description: Configuration loading and validation for the conformance suite.
// Purpose: Tolerate a missing config file, fail closed on a malformed one.
// Dependencies: serde, toml, url
// ============================================================================

//! ## Overview
//! Configuration is read from a TOML file when one can be found, then
//! environment overrides are applied and the result is validated.
//!
//! A config file that is absent or unreadable is not an error: defaults are
//! used and the reason is reported through [`ConfigSource::Defaults`] so the
//! caller can log it once logging is installed. A file that is present but
//! does not parse or validate is fatal.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use crate::env::StorefrontEnv;
use crate::env::read_env_strict;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
pub const DEFAULT_CONFIG_NAME: &str = "storefront.toml";
/// Directory searched after the working directory.
const CONFIG_SUBDIR: &str = "config";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 256 * 1024;
/// Upper bound on transparent retries per call.
pub(crate) const MAX_RETRY_COUNT: u32 = 10;
/// Upper bound on the per-call timeout in seconds.
pub(crate) const MAX_TIMEOUT_SECS: u64 = 600;

/// Default base URL of the storefront API.
pub const DEFAULT_BASE_URL: &str = "https://fakestoreapi.com";
/// Default per-call timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// Default number of transparent retries.
const DEFAULT_RETRY_COUNT: u32 = 3;
/// Default first retry wait in milliseconds.
const DEFAULT_RETRY_WAIT_MS: u64 = 1_000;
/// Default retry wait cap in milliseconds.
const DEFAULT_RETRY_MAX_WAIT_MS: u64 = 5_000;
/// Default minimum ratio of resolvable cart product references.
const DEFAULT_MIN_REFERENCE_RATIO: f64 = 0.8;

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Storefront conformance configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorefrontConfig {
    /// Storefront API endpoint and transport policy.
    #[serde(default)]
    pub api: ApiConfig,
    /// Result and report output settings.
    #[serde(default)]
    pub reporting: ReportingConfig,
    /// Scenario execution settings.
    #[serde(default)]
    pub test: TestConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the effective configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from the given file.
    File(PathBuf),
    /// No usable file; built-in defaults were used.
    Defaults {
        /// Why no file was used.
        reason: String,
    },
}

/// A validated configuration together with its origin.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    /// Effective configuration after overrides.
    pub config: StorefrontConfig,
    /// Origin of the file layer.
    pub source: ConfigSource,
}

impl StorefrontConfig {
    /// Loads configuration using the default resolution rules.
    ///
    /// Resolution order: `path`, then `STOREFRONT_CONFIG`, then
    /// `./storefront.toml`, then `./config/storefront.toml`. Environment
    /// overrides are applied on top of whichever layer was used.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a config file exists but cannot be parsed,
    /// when an environment override is invalid, or when validation fails.
    pub fn load(path: Option<&Path>) -> Result<LoadedConfig, ConfigError> {
        let (mut config, source) = match resolve_path(path)? {
            Some(resolved) => match read_config_file(&resolved) {
                Ok(content) => (Self::from_toml_str(&content)?, ConfigSource::File(resolved)),
                Err(FileProblem::Unreadable(reason)) => (
                    Self::default(),
                    ConfigSource::Defaults {
                        reason: format!("could not read {}: {reason}", resolved.display()),
                    },
                ),
                Err(FileProblem::Invalid(reason)) => return Err(ConfigError::Invalid(reason)),
            },
            None => (
                Self::default(),
                ConfigSource::Defaults {
                    reason: format!("no {DEFAULT_CONFIG_NAME} found"),
                },
            ),
        };
        config.apply_env_overrides(read_env_strict)?;
        config.validate()?;
        Ok(LoadedConfig {
            config,
            source,
        })
    }

    /// Parses configuration from TOML text without validating it.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the text is not valid TOML or does
    /// not match the configuration schema.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Renders the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when serialization fails.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|err| ConfigError::Invalid(err.to_string()))
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] describing the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api.validate()?;
        self.reporting.validate()?;
        self.test.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Applies environment overrides read through `lookup`.
    ///
    /// `lookup` returns the raw value for a variable name, `None` when unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] when a variable is set but empty, not
    /// valid UTF-8, or cannot be parsed.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Result<Option<String>, String>,
    {
        crate::env::apply_overrides(self, lookup)
    }
}

/// Storefront API endpoint and transport policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL every resource path is joined onto.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-call timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Transparent retries for transient transport failures.
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    /// First retry wait in milliseconds.
    #[serde(default = "default_retry_wait_ms")]
    pub retry_wait_ms: u64,
    /// Cap on any single retry wait in milliseconds.
    #[serde(default = "default_retry_max_wait_ms")]
    pub retry_max_wait_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            retry_count: DEFAULT_RETRY_COUNT,
            retry_wait_ms: DEFAULT_RETRY_WAIT_MS,
            retry_max_wait_ms: DEFAULT_RETRY_MAX_WAIT_MS,
        }
    }
}

impl ApiConfig {
    /// Returns the per-call timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns the first retry wait.
    #[must_use]
    pub const fn retry_wait(&self) -> Duration {
        Duration::from_millis(self.retry_wait_ms)
    }

    /// Returns the retry wait cap.
    #[must_use]
    pub const fn retry_max_wait(&self) -> Duration {
        Duration::from_millis(self.retry_max_wait_ms)
    }

    /// Parses the base URL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the URL does not parse or is not
    /// http(s).
    pub fn parsed_base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(self.base_url.trim())
            .map_err(|err| ConfigError::Invalid(format!("api.base_url is invalid: {err}")))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::Invalid(format!(
                "api.base_url must use http or https, got {other}"
            ))),
        }
    }

    /// Validates API settings.
    fn validate(&self) -> Result<(), ConfigError> {
        self.parsed_base_url()?;
        if self.timeout_secs == 0 {
            return Err(ConfigError::Invalid("api.timeout_secs must be greater than zero".into()));
        }
        if self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ConfigError::Invalid(format!(
                "api.timeout_secs must be at most {MAX_TIMEOUT_SECS}"
            )));
        }
        if self.retry_count > MAX_RETRY_COUNT {
            return Err(ConfigError::Invalid(format!(
                "api.retry_count must be at most {MAX_RETRY_COUNT}"
            )));
        }
        if self.retry_wait_ms > self.retry_max_wait_ms {
            return Err(ConfigError::Invalid(
                "api.retry_wait_ms must not exceed api.retry_max_wait_ms".into(),
            ));
        }
        Ok(())
    }
}

/// Result and report output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportingConfig {
    /// Directory receiving per-scenario result files.
    #[serde(default = "default_results_dir")]
    pub results_dir: PathBuf,
    /// Directory reserved for rendered reports.
    #[serde(default = "default_report_dir")]
    pub report_dir: PathBuf,
    /// Reporter backend selection.
    #[serde(default)]
    pub backend: ReportBackend,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            results_dir: default_results_dir(),
            report_dir: default_report_dir(),
            backend: ReportBackend::default(),
        }
    }
}

impl ReportingConfig {
    /// Validates reporting settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.results_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("reporting.results_dir must be set".into()));
        }
        if self.report_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("reporting.report_dir must be set".into()));
        }
        Ok(())
    }
}

/// Reporter backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportBackend {
    /// Plain log lines through `tracing`.
    Log,
    /// Structured JSON result files.
    Structured,
    /// Both backends.
    #[default]
    Both,
}

impl ReportBackend {
    /// Returns true when the log backend is selected.
    #[must_use]
    pub const fn includes_log(self) -> bool {
        matches!(self, Self::Log | Self::Both)
    }

    /// Returns true when the structured backend is selected.
    #[must_use]
    pub const fn includes_structured(self) -> bool {
        matches!(self, Self::Structured | Self::Both)
    }
}

/// Scenario execution settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestConfig {
    /// Run scenarios concurrently.
    #[serde(default = "default_true")]
    pub parallel: bool,
    /// Emit request/response diagnostics for every call.
    #[serde(default = "default_true")]
    pub verbose: bool,
    /// Remove stale result files before a run.
    #[serde(default = "default_true")]
    pub cleanup: bool,
    /// Minimum fraction of cart product references that must resolve.
    #[serde(default = "default_min_reference_ratio")]
    pub min_reference_ratio: f64,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            verbose: true,
            cleanup: true,
            min_reference_ratio: DEFAULT_MIN_REFERENCE_RATIO,
        }
    }
}

impl TestConfig {
    /// Validates execution settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.min_reference_ratio.is_finite() || !(0.0..=1.0).contains(&self.min_reference_ratio)
        {
            return Err(ConfigError::Invalid(
                "test.min_reference_ratio must be between 0 and 1".into(),
            ));
        }
        Ok(())
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Minimum level emitted.
    #[serde(default)]
    pub level: LogLevel,
    /// Line format.
    #[serde(default)]
    pub format: LogFormat,
    /// `console`/`stdout`, `stderr`, or a file path.
    #[serde(default = "default_log_output")]
    pub output: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::default(),
            format: LogFormat::default(),
            output: default_log_output(),
        }
    }
}

impl LoggingConfig {
    /// Resolves the output setting into a destination.
    #[must_use]
    pub fn target(&self) -> LogTarget {
        let output = self.output.trim();
        if output.eq_ignore_ascii_case("console") || output.eq_ignore_ascii_case("stdout") {
            LogTarget::Stdout
        } else if output.eq_ignore_ascii_case("stderr") {
            LogTarget::Stderr
        } else {
            LogTarget::File(PathBuf::from(output))
        }
    }

    /// Validates logging settings.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.output.trim().is_empty() {
            return Err(ConfigError::Invalid("logging.output must not be empty".into()));
        }
        Ok(())
    }
}

/// Minimum log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Everything.
    Trace,
    /// Debug and above.
    Debug,
    /// Info and above.
    #[default]
    Info,
    /// Warnings and errors.
    Warn,
    /// Errors only.
    Error,
}

impl LogLevel {
    /// Returns the filter directive for this level.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    /// Parses a level name, case-insensitively.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Multi-line human-readable output.
    Pretty,
    /// Single-line human-readable output.
    Compact,
}

/// Resolved log destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
    /// Append to a file.
    File(PathBuf),
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
    /// Invalid environment override.
    #[error("invalid environment override: {0}")]
    Env(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reasons a resolved config file was not used.
enum FileProblem {
    /// The file could not be read; defaults apply.
    Unreadable(String),
    /// The file was read but is unusable; fatal.
    Invalid(String),
}

/// Resolves the config path from the caller, the environment, or the
/// well-known locations. Returns `None` when nothing was found.
fn resolve_path(path: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = path {
        return Ok(Some(path.to_path_buf()));
    }
    let from_env = read_env_strict(StorefrontEnv::ConfigPath.as_str()).map_err(ConfigError::Env)?;
    if let Some(value) = from_env {
        if value.trim().is_empty() {
            return Err(ConfigError::Env(format!(
                "{} must not be empty",
                StorefrontEnv::ConfigPath.as_str()
            )));
        }
        return Ok(Some(PathBuf::from(value)));
    }
    let candidates =
        [PathBuf::from(DEFAULT_CONFIG_NAME), Path::new(CONFIG_SUBDIR).join(DEFAULT_CONFIG_NAME)];
    Ok(candidates.into_iter().find(|candidate| candidate.is_file()))
}

/// Reads a config file, enforcing size and encoding limits.
fn read_config_file(path: &Path) -> Result<String, FileProblem> {
    let bytes = fs::read(path).map_err(|err| FileProblem::Unreadable(err.to_string()))?;
    if bytes.len() > MAX_CONFIG_FILE_SIZE {
        return Err(FileProblem::Invalid("config file exceeds size limit".to_string()));
    }
    String::from_utf8(bytes)
        .map_err(|_| FileProblem::Invalid("config file must be utf-8".to_string()))
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

const fn default_retry_count() -> u32 {
    DEFAULT_RETRY_COUNT
}

const fn default_retry_wait_ms() -> u64 {
    DEFAULT_RETRY_WAIT_MS
}

const fn default_retry_max_wait_ms() -> u64 {
    DEFAULT_RETRY_MAX_WAIT_MS
}

fn default_results_dir() -> PathBuf {
    PathBuf::from("allure-results")
}

fn default_report_dir() -> PathBuf {
    PathBuf::from("allure-report")
}

const fn default_true() -> bool {
    true
}

const fn default_min_reference_ratio() -> f64 {
    DEFAULT_MIN_REFERENCE_RATIO
}

fn default_log_output() -> String {
    "console".to_string()
}
