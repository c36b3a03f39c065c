// system-tests/tests/helpers/timeouts.rs
// ============================================================================
// Module: System Test Timeouts
// Description: Centralized timeout configuration with env overrides.
// Purpose: Keep system-test timeouts consistent and configurable across suites.
// ============================================================================

use std::time::Duration;

use system_tests::config::SystemTestConfig;

/// Returns the effective timeout, honoring `STOREFRONT_SYSTEM_TEST_TIMEOUT_SEC`
/// when set. The override acts as a minimum so explicitly longer test
/// timeouts are never shortened.
#[must_use]
pub fn resolve_timeout(requested: Duration) -> Duration {
    let config = SystemTestConfig::load().unwrap_or_else(|err| panic!("{err}"));
    config.timeout.map_or(requested, |override_timeout| requested.max(override_timeout))
}

/// Per-call timeout in whole seconds for API configuration.
#[must_use]
pub fn resolve_timeout_secs(requested: Duration) -> u64 {
    resolve_timeout(requested).as_secs().max(1)
}
