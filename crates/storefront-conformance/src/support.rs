// crates/storefront-conformance/src/support.rs
// ============================================================================
// Module: Scenario Support
// Description: Shared fixtures and the common "call succeeded" prologue.
// Purpose: Keep scenario bodies focused on what they verify.
// Dependencies: storefront-client, storefront-harness
// ============================================================================

//! ## Overview
//! Demo credentials, the identifier no fixture uses, and the prologue most
//! scenarios open with: require a transport success, a listed status, and
//! (for [`require_payload`]) a decoded body. Request logging happens in the
//! client observer the scenario context installs.

use std::time::Duration;

use storefront_client::ApiResponse;
use storefront_client::ApiResult;
use storefront_harness::ScenarioAbort;
use storefront_harness::ScenarioContext;

/// Demo account served by the public storefront.
pub const DEMO_USERNAME: &str = "mor_2314";
/// Password of the demo account.
pub const DEMO_PASSWORD: &str = "83r5^_";
/// Identifier no seeded resource uses.
pub const MISSING_ID: i64 = 99_999;

/// Requires that the call completed with one of `statuses`.
///
/// # Errors
///
/// Returns [`ScenarioAbort`] on a transport failure or another status.
pub fn require_success<T>(
    ctx: &mut ScenarioContext,
    description: &str,
    result: ApiResult<T>,
    statuses: &[u16],
) -> Result<ApiResponse<T>, ScenarioAbort> {
    let response = ctx.require_ok(description, result)?;
    match statuses {
        [single] => ctx.require_status(*single, response.status())?,
        _ => ctx.require_status_in(statuses, response.status())?,
    }
    Ok(response)
}

/// Requires a 200 and a decoded payload.
///
/// # Errors
///
/// Returns [`ScenarioAbort`] on a transport failure, another status, or an
/// undecodable body.
pub fn require_payload<T: Clone>(
    ctx: &mut ScenarioContext,
    description: &str,
    result: ApiResult<T>,
) -> Result<(T, Duration), ScenarioAbort> {
    let response = require_success(ctx, description, result, &[200])?;
    let value = ctx.require_value(description, &response)?;
    Ok((value, response.elapsed()))
}
