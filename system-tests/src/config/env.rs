// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: Environment-backed settings for the storefront system tests.
// Purpose: Resolve run roots, timeouts, and the live deployment URL.
// Dependencies: storefront-config, url
// ============================================================================

//! ## Overview
//! Settings come from `STOREFRONT_SYSTEM_TEST_*` variables read through
//! [`read_env_strict`]. Parsing goes through a lookup function so the rules
//! can be exercised without touching the process environment. Set-but-empty
//! and unparsable values fail closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use storefront_config::ApiConfig;
use storefront_config::DEFAULT_BASE_URL;
use storefront_config::read_env_strict;
use url::Url;

// ============================================================================
// SECTION: Environment Keys
// ============================================================================

/// Environment keys read by the system tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTestEnv {
    /// Shared root for per-test artifact directories.
    RunRoot,
    /// Deployment targeted by the live suite.
    LiveUrl,
    /// Minimum timeout in whole seconds.
    TimeoutSeconds,
    /// Reuse an existing per-test directory under the run root.
    AllowOverwrite,
}

impl SystemTestEnv {
    /// Every key, in the order they are read.
    pub const ALL: [Self; 4] =
        [Self::RunRoot, Self::LiveUrl, Self::TimeoutSeconds, Self::AllowOverwrite];

    /// Returns the environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RunRoot => "STOREFRONT_SYSTEM_TEST_RUN_ROOT",
            Self::LiveUrl => "STOREFRONT_SYSTEM_TEST_LIVE_URL",
            Self::TimeoutSeconds => "STOREFRONT_SYSTEM_TEST_TIMEOUT_SEC",
            Self::AllowOverwrite => "STOREFRONT_SYSTEM_TEST_ALLOW_OVERWRITE",
        }
    }
}

// ============================================================================
// SECTION: Settings
// ============================================================================

/// System-test settings; every field is optional in the environment.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SystemTestConfig {
    /// Shared artifact root; each test writes below `run_root/<test name>`.
    pub run_root: Option<PathBuf>,
    /// Live deployment, validated as an http(s) base URL.
    pub live_url: Option<Url>,
    /// Lower bound applied to test and per-call timeouts.
    pub timeout: Option<Duration>,
    /// Reuse an existing per-test directory instead of failing.
    pub allow_overwrite: bool,
}

impl SystemTestConfig {
    /// Reads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a message naming the variable when a value is not UTF-8, is
    /// empty, or does not parse.
    pub fn load() -> Result<Self, String> {
        Self::from_lookup(read_env_strict)
    }

    /// Reads settings through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    ///
    /// Returns a message naming the variable when `lookup` fails or a value
    /// is empty or does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Result<Option<String>, String>,
    {
        let mut config = Self::default();
        for key in SystemTestEnv::ALL {
            let name = key.as_str();
            let Some(raw) = lookup(name)? else {
                continue;
            };
            let value = raw.trim();
            if value.is_empty() {
                return Err(format!("{name} must not be empty"));
            }
            match key {
                SystemTestEnv::RunRoot => config.run_root = Some(PathBuf::from(value)),
                SystemTestEnv::LiveUrl => config.live_url = Some(parse_live_url(name, value)?),
                SystemTestEnv::TimeoutSeconds => {
                    config.timeout = Some(parse_timeout(name, value)?);
                }
                SystemTestEnv::AllowOverwrite => config.allow_overwrite = parse_flag(name, value)?,
            }
        }
        Ok(config)
    }

    /// Live deployment base URL, defaulting to the public storefront.
    #[must_use]
    pub fn live_url_or_default(&self) -> String {
        self.live_url.as_ref().map_or_else(|| DEFAULT_BASE_URL.to_string(), Url::to_string)
    }
}

// ============================================================================
// SECTION: Parsers
// ============================================================================

/// Validates a live URL with the same rules as `api.base_url`.
fn parse_live_url(name: &str, value: &str) -> Result<Url, String> {
    let api = ApiConfig {
        base_url: value.to_string(),
        ..ApiConfig::default()
    };
    api.parsed_base_url().map_err(|err| format!("{name} is not a usable base URL: {err}"))
}

/// Parses a positive number of seconds.
fn parse_timeout(name: &str, value: &str) -> Result<Duration, String> {
    value
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("{name} must be a positive number of seconds"))
}

/// Parses `true`/`false` or `1`/`0`.
fn parse_flag(name: &str, value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(format!("{name} must be 1, 0, true, or false")),
    }
}
