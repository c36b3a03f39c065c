// crates/storefront-config/src/env.rs
// ============================================================================
// Module: Storefront Environment Overrides
// Description: Environment-backed overrides for the conformance config.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Set-but-empty values and unparsable values fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use crate::config::ConfigError;
use crate::config::LogLevel;
use crate::config::StorefrontConfig;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Environment keys understood by the conformance suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorefrontEnv {
    /// Config file path.
    ConfigPath,
    /// Base URL override.
    BaseUrl,
    /// Per-call timeout override in seconds (positive integer).
    TimeoutSeconds,
    /// Retry count override.
    RetryCount,
    /// Results directory override.
    ResultsDir,
    /// Parallel execution override (`true`/`false` or `1`/`0`).
    Parallel,
    /// Log level override.
    LogLevel,
}

impl StorefrontEnv {
    /// Every override key, in application order.
    pub const OVERRIDES: [Self; 6] = [
        Self::BaseUrl,
        Self::TimeoutSeconds,
        Self::RetryCount,
        Self::ResultsDir,
        Self::Parallel,
        Self::LogLevel,
    ];

    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ConfigPath => "STOREFRONT_CONFIG",
            Self::BaseUrl => "STOREFRONT_BASE_URL",
            Self::TimeoutSeconds => "STOREFRONT_TIMEOUT_SEC",
            Self::RetryCount => "STOREFRONT_RETRY_COUNT",
            Self::ResultsDir => "STOREFRONT_RESULTS_DIR",
            Self::Parallel => "STOREFRONT_PARALLEL",
            Self::LogLevel => "STOREFRONT_LOG_LEVEL",
        }
    }
}

// ============================================================================
// SECTION: Overrides
// ============================================================================

/// Applies every override found through `lookup` onto `config`.
pub(crate) fn apply_overrides<F>(
    config: &mut StorefrontConfig,
    lookup: F,
) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Result<Option<String>, String>,
{
    for key in StorefrontEnv::OVERRIDES {
        let name = key.as_str();
        let Some(value) = read_nonempty(&lookup, name)? else {
            continue;
        };
        match key {
            StorefrontEnv::BaseUrl => config.api.base_url = value.trim().to_string(),
            StorefrontEnv::TimeoutSeconds => {
                config.api.timeout_secs = parse_positive_u64(name, &value)?;
            }
            StorefrontEnv::RetryCount => {
                config.api.retry_count = value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::Env(format!("{name} must be a whole number")))?;
            }
            StorefrontEnv::ResultsDir => config.reporting.results_dir = PathBuf::from(value),
            StorefrontEnv::Parallel => config.test.parallel = parse_bool(name, &value)?,
            StorefrontEnv::LogLevel => {
                config.logging.level = LogLevel::parse(&value).ok_or_else(|| {
                    ConfigError::Env(format!("{name} must be trace, debug, info, warn, or error"))
                })?;
            }
            StorefrontEnv::ConfigPath => {}
        }
    }
    Ok(())
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, String> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}

/// Reads a value through `lookup` and rejects empty values.
fn read_nonempty<F>(lookup: &F, name: &str) -> Result<Option<String>, ConfigError>
where
    F: Fn(&str) -> Result<Option<String>, String>,
{
    match lookup(name).map_err(ConfigError::Env)? {
        Some(value) if value.trim().is_empty() => {
            Err(ConfigError::Env(format!("{name} must not be empty")))
        }
        other => Ok(other),
    }
}

/// Parses a positive integer.
fn parse_positive_u64(name: &str, raw: &str) -> Result<u64, ConfigError> {
    let value: u64 = raw
        .trim()
        .parse()
        .map_err(|_| ConfigError::Env(format!("{name} must be a positive integer")))?;
    if value == 0 {
        return Err(ConfigError::Env(format!("{name} must be greater than zero")));
    }
    Ok(value)
}

/// Parses a boolean literal.
fn parse_bool(name: &str, raw: &str) -> Result<bool, ConfigError> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        return Ok(false);
    }
    Err(ConfigError::Env(format!("{name} must be 1, 0, true, or false")))
}
