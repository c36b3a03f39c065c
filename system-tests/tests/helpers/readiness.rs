// system-tests/tests/helpers/readiness.rs
// ============================================================================
// Module: Readiness Helpers
// Description: Readiness polling for store servers.
// Purpose: Ensure servers are ready without arbitrary sleeps.
// Dependencies: storefront-client, tokio
// ============================================================================

use std::time::Duration;
use std::time::Instant;

use storefront_client::RetryPolicy;
use storefront_client::StoreClient;
use storefront_config::ApiConfig;
use tokio::time::sleep;

/// Polls the category list until the store answers 200 or timeout expires.
pub async fn wait_for_store_ready(base_url: &str, timeout: Duration) -> Result<(), String> {
    let config = ApiConfig {
        base_url: base_url.to_string(),
        ..ApiConfig::default()
    };
    let base = config.parsed_base_url().map_err(|err| err.to_string())?;
    let client =
        StoreClient::new(base, timeout, RetryPolicy::NONE).map_err(|err| err.to_string())?;
    let start = Instant::now();
    let mut attempts = 0u32;
    loop {
        attempts = attempts.saturating_add(1);
        let outcome = match client.list_categories().await {
            Ok(response) if response.status() == 200 => return Ok(()),
            Ok(response) => format!("status {}", response.status()),
            Err(err) => err.to_string(),
        };
        if start.elapsed() > timeout {
            return Err(format!("store readiness timeout after {attempts} attempts: {outcome}"));
        }
        sleep(Duration::from_millis(50)).await;
    }
}
