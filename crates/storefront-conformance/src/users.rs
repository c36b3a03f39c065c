// crates/storefront-conformance/src/users.rs
// ============================================================================
// Module: User Scenarios
// Description: User listing, lookup, login, and authenticated access.
// Purpose: Verify /users and /auth/login.
// Dependencies: storefront-client, storefront-harness, tracing
// ============================================================================

//! ## Overview
//! User scenarios read `/users` and exercise `/auth/login` with the demo
//! account and with unknown credentials. The authenticated session attaches
//! the issued token to the scenario client and reads a user with it.

use std::time::Duration;

use storefront_client::LoginRequest;
use storefront_client::User;
use storefront_harness::Check;
use storefront_harness::Scenario;
use storefront_harness::ScenarioAbort;
use storefront_harness::ScenarioContext;
use storefront_harness::Severity;
use storefront_harness::scenario_fn;
use tracing::info;

use crate::analysis::user_field_problems;
use crate::support::DEMO_PASSWORD;
use crate::support::DEMO_USERNAME;
use crate::support::MISSING_ID;
use crate::support::require_payload;

/// User scenarios in catalog order.
#[must_use]
pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "users_get_all",
            title: "Get all users",
            description: "Lists every user and validates the first user's structure.",
            tags: &["api", "users", "get", "smoke"],
            severity: Severity::Normal,
            run: scenario_fn!(get_all),
        },
        Scenario {
            name: "users_get_by_id",
            title: "Get user by id",
            description: "Fetches user 1 including nested name, address and coordinates.",
            tags: &["api", "users", "get"],
            severity: Severity::Normal,
            run: scenario_fn!(get_by_id),
        },
        Scenario {
            name: "users_get_invalid_id",
            title: "Get user by invalid id",
            description: "A user that does not exist yields 404, an error, or an empty 200.",
            tags: &["api", "users", "negative"],
            severity: Severity::Normal,
            run: scenario_fn!(get_invalid_id),
        },
        Scenario {
            name: "users_login",
            title: "Login",
            description: "The demo account logs in and receives a token.",
            tags: &["api", "users", "auth", "smoke"],
            severity: Severity::Blocker,
            run: scenario_fn!(login),
        },
        Scenario {
            name: "users_login_invalid",
            title: "Login with invalid credentials",
            description: "Unknown credentials are answered; the outcome is recorded.",
            tags: &["api", "users", "auth", "negative"],
            severity: Severity::Normal,
            run: scenario_fn!(login_invalid),
        },
        Scenario {
            name: "users_data_validation",
            title: "User data validation",
            description: "Every user carries every required field and a plausible email.",
            tags: &["api", "users", "consistency"],
            severity: Severity::Normal,
            run: scenario_fn!(data_validation),
        },
        Scenario {
            name: "users_authenticated_session",
            title: "Authenticated session",
            description: "A token from login is attached to later requests of the same client.",
            tags: &["api", "users", "auth"],
            severity: Severity::Critical,
            run: scenario_fn!(authenticated_session),
        },
        Scenario {
            name: "users_performance",
            title: "User performance",
            description: "User and login endpoints answer within their time budgets.",
            tags: &["api", "users", "performance"],
            severity: Severity::Minor,
            run: scenario_fn!(performance),
        },
    ]
}

/// Soft checks over the fields every user must carry.
fn check_user_fields(ctx: &mut ScenarioContext, label: &str, user: &User) {
    let problems = user_field_problems(user);
    ctx.check_eq(&format!("{label} field problems"), &Vec::<&str>::new(), &problems);
}

/// Lists users and inspects the first one.
async fn get_all(ctx: &mut ScenarioContext) -> Result<(), ScenarioAbort> {
    let client = ctx.client().clone();
    ctx.step("Send GET request to /users");
    let result = client.list_users().await;
    let (users, elapsed) = require_payload(ctx, "list users", result)?;
    ctx.check_response_time(Duration::from_secs(5), elapsed);

    ctx.step("Validate users data");
    ctx.require_not_empty("user list", &users)?;
    if let Some(first) = users.first() {
        check_user_fields(ctx, "first user", first);
    }
    Ok(())
}

/// Fetches user 1.
async fn get_by_id(ctx: &mut ScenarioContext) -> Result<(), ScenarioAbort> {
    let client = ctx.client().clone();
    ctx.step("Send GET request to /users/1");
    let result = client.get_user(1).await;
    let (user, elapsed) = require_payload(ctx, "get user 1", result)?;
    ctx.check_response_time(Duration::from_secs(3), elapsed);

    ctx.step("Validate user data");
    ctx.check_eq("user id", &1, &user.id);
    check_user_fields(ctx, "user 1", &user);
    Ok(())
}

/// Looks up a user that does not exist.
async fn get_invalid_id(ctx: &mut ScenarioContext) -> Result<(), ScenarioAbort> {
    let client = ctx.client().clone();
    let result = client.get_user(MISSING_ID).await;
    ctx.check_missing_resource("user 99999 absent", &result);
    Ok(())
}

/// Logs in with the demo account.
async fn login(ctx: &mut ScenarioContext) -> Result<(), ScenarioAbort> {
    let request = LoginRequest::new(DEMO_USERNAME, DEMO_PASSWORD);
    let result = ctx.client().login(&request).await;
    let response = ctx.require_ok("login", result)?;
    ctx.require_status_in(&[200, 201], response.status())?;
    ctx.check_response_time(Duration::from_secs(3), response.elapsed());
    let token = ctx.require_value("login payload", &response)?.token;
    ctx.check_not_empty("login token", &token);
    Ok(())
}

/// Logs in with credentials nobody owns. Any answer is acceptable; it is
/// recorded for the report.
async fn login_invalid(ctx: &mut ScenarioContext) -> Result<(), ScenarioAbort> {
    let request = LoginRequest::new("invalid_user", "invalid_password");
    let result = ctx.client().login(&request).await;
    let expected = "error, 401, or any other status";
    let actual = match &result {
        Err(err) => format!("transport error: {err}"),
        Ok(response) => {
            ctx.log_response(&response.meta);
            format!("{} {}", response.status(), response.meta.status_text())
        }
    };
    info!(scenario = %ctx.info().name, outcome = %actual, "invalid login answered");
    ctx.check(Check::new("invalid login outcome", expected, actual, true));
    Ok(())
}

/// Validates every user.
async fn data_validation(ctx: &mut ScenarioContext) -> Result<(), ScenarioAbort> {
    let client = ctx.client().clone();
    let (users, _) = require_payload(ctx, "list users", client.list_users().await)?;
    ctx.require_not_empty("user list", &users)?;
    for (index, user) in users.iter().enumerate() {
        check_user_fields(ctx, &format!("user {}", index + 1), user);
    }
    Ok(())
}

/// Logs in, attaches the token, and reads user 1 with it.
async fn authenticated_session(ctx: &mut ScenarioContext) -> Result<(), ScenarioAbort> {
    let client = ctx.client().clone();
    ctx.step("Log in");
    let request = LoginRequest::new(DEMO_USERNAME, DEMO_PASSWORD);
    let result = ctx.client().login(&request).await;
    let response = ctx.require_ok("login", result)?;
    ctx.require_status_in(&[200, 201], response.status())?;
    let token = ctx.require_value("login payload", &response)?.token;
    ctx.require_not_empty("login token", &token)?;

    ctx.step("Attach token");
    ctx.client().set_auth_token(token.clone());
    let held = client.auth_token();
    ctx.require_eq("token shared with scenario client", &Some(token), &held)?;

    ctx.step("Fetch user 1 with token");
    let (user, _) = require_payload(ctx, "get user 1", client.get_user(1).await)?;
    ctx.check_eq("user id", &1, &user.id);
    Ok(())
}

/// Times the user and login endpoints.
async fn performance(ctx: &mut ScenarioContext) -> Result<(), ScenarioAbort> {
    let client = ctx.client().clone();
    ctx.step("Time user list");
    let (users, elapsed) = require_payload(ctx, "list users", client.list_users().await)?;
    ctx.check_response_time(Duration::from_secs(3), elapsed);

    if let Some(first) = users.first() {
        ctx.step("Time single user");
        let result = client.get_user(first.id).await;
        let (_, elapsed) = require_payload(ctx, "get first user", result)?;
        ctx.check_response_time(Duration::from_secs(2), elapsed);
    }

    ctx.step("Time login");
    let request = LoginRequest::new(DEMO_USERNAME, DEMO_PASSWORD);
    let result = ctx.client().login(&request).await;
    let response = ctx.require_ok("login", result)?;
    ctx.require_status_in(&[200, 201], response.status())?;
    ctx.check_response_time(Duration::from_secs(2), response.elapsed());
    Ok(())
}
