// crates/storefront-harness/src/context.rs
// ============================================================================
// Module: Scenario Context
// Description: Per-scenario check recording, steps, and diagnostics.
// Purpose: Give scenarios hard and soft checks over client responses.
// Dependencies: serde, serde_json, storefront-client, tracing
// ============================================================================

//! ## Overview
//! One [`ScenarioContext`] exists per running scenario. It owns the
//! scenario's client and accumulates everything the report needs: checks,
//! steps, and attachments.
//!
//! Checks come in two flavors:
//! - `require_*` returns `Err(ScenarioAbort)` on failure. Scenarios propagate
//!   it with `?`, so nothing after a failed hard check runs.
//! - `check_*` records the failure, returns `false`, and lets the scenario
//!   carry on.
//!
//! Either way the failure is recorded, and any check failing after a logged
//! response attaches that response's diagnostics (status, timing, headers,
//! body) once.
//!
//! The context installs a request observer on its client, so every call the
//! scenario makes is logged with the URL and body that were actually sent.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use storefront_client::ApiResponse;
use storefront_client::ApiResult;
use storefront_client::OutgoingRequest;
use storefront_client::RequestObserver;
use storefront_client::ResponseMeta;
use storefront_client::StoreClient;
use tracing::info;

use crate::assertions::AssertionRecord;
use crate::assertions::Check;
use crate::assertions::CheckMode;
use crate::assertions::Countable;
use crate::assertions::ScenarioAbort;
use crate::document::JsonDocument;
use crate::document::JsonKind;
use crate::report::Attachment;
use crate::report::ScenarioInfo;
use crate::report::ScenarioReport;
use crate::report::ScenarioStatus;
use crate::report::Severity;
use crate::report::SharedReporter;
use crate::report::StepRecord;
use crate::report::now_millis;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Knobs a scenario may consult.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioSettings {
    /// Log request and response bodies.
    pub verbose: bool,
    /// Minimum share of cart product references that must resolve.
    pub min_reference_ratio: f64,
}

impl Default for ScenarioSettings {
    fn default() -> Self {
        Self {
            verbose: true,
            min_reference_ratio: 0.8,
        }
    }
}

/// Step currently open.
#[derive(Debug, Clone)]
struct OpenStep {
    /// Step name.
    name: String,
    /// Start time, milliseconds since the epoch.
    started_at_ms: u128,
    /// Whether a check failed while open.
    failed: bool,
}

/// Mutable state of one running scenario.
pub struct ScenarioContext {
    /// Scenario metadata; updatable from inside the scenario.
    info: ScenarioInfo,
    /// Client owned by this scenario.
    client: StoreClient,
    /// Event sink.
    reporter: SharedReporter,
    /// Settings.
    settings: ScenarioSettings,
    /// Checks in evaluation order.
    assertions: Vec<AssertionRecord>,
    /// Closed steps.
    steps: Vec<StepRecord>,
    /// Open step, if any.
    open_step: Option<OpenStep>,
    /// Attachments.
    attachments: Vec<Attachment>,
    /// Most recently logged response.
    last_response: Option<ResponseMeta>,
    /// Whether `last_response` has been attached already.
    last_response_attached: bool,
    /// Start time, milliseconds since the epoch.
    started_at_ms: u128,
}

impl ScenarioContext {
    /// Creates a context for one scenario and hooks request logging into
    /// `client`.
    #[must_use]
    pub fn new(
        info: ScenarioInfo,
        client: StoreClient,
        reporter: SharedReporter,
        settings: ScenarioSettings,
    ) -> Self {
        let client =
            client.with_request_observer(request_logger(info.name.clone(), settings.verbose));
        Self {
            info,
            client,
            reporter,
            settings,
            assertions: Vec::new(),
            steps: Vec::new(),
            open_step: None,
            attachments: Vec::new(),
            last_response: None,
            last_response_attached: false,
            started_at_ms: now_millis(),
        }
    }

    /// Returns the scenario's client.
    #[must_use]
    pub const fn client(&self) -> &StoreClient {
        &self.client
    }

    /// Returns the settings.
    #[must_use]
    pub const fn settings(&self) -> &ScenarioSettings {
        &self.settings
    }

    /// Returns the scenario metadata.
    #[must_use]
    pub const fn info(&self) -> &ScenarioInfo {
        &self.info
    }

    /// Checks recorded so far.
    #[must_use]
    pub fn assertions(&self) -> &[AssertionRecord] {
        &self.assertions
    }

    /// Attachments recorded so far.
    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Returns true once any check has failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.assertions.iter().any(|record| !record.passed)
    }

    // ------------------------------------------------------------------------
    // Scenario info
    // ------------------------------------------------------------------------

    /// Replaces the title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.info.title = title.into();
    }

    /// Replaces the description.
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.info.description = description.into();
    }

    /// Adds a tag unless already present.
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.info.tags.contains(&tag) {
            self.info.tags.push(tag);
        }
    }

    /// Replaces the severity.
    pub const fn set_severity(&mut self, severity: Severity) {
        self.info.severity = severity;
    }

    // ------------------------------------------------------------------------
    // Steps and attachments
    // ------------------------------------------------------------------------

    /// Opens a step, closing the previous one.
    pub fn step(&mut self, name: impl Into<String>) {
        self.end_step();
        let name = name.into();
        self.reporter.begin_step(&self.info.name, &name);
        self.open_step = Some(OpenStep {
            name,
            started_at_ms: now_millis(),
            failed: false,
        });
    }

    /// Closes the open step, if any.
    pub fn end_step(&mut self) {
        let Some(open) = self.open_step.take() else {
            return;
        };
        let status = if open.failed { ScenarioStatus::Failed } else { ScenarioStatus::Passed };
        let record = StepRecord {
            name: open.name,
            status,
            started_at_ms: open.started_at_ms,
            duration_ms: now_millis().saturating_sub(open.started_at_ms),
        };
        self.reporter.end_step(&self.info.name, &record);
        self.steps.push(record);
    }

    /// Attaches a text payload.
    pub fn attach(
        &mut self,
        name: impl Into<String>,
        content_type: impl Into<String>,
        content: impl Into<String>,
    ) {
        let attachment = Attachment {
            name: name.into(),
            content_type: content_type.into(),
            content: content.into(),
        };
        self.reporter.attach(&self.info.name, &attachment);
        self.attachments.push(attachment);
    }

    /// Attaches a value as pretty JSON.
    pub fn attach_json<T: Serialize + ?Sized>(&mut self, name: impl Into<String>, value: &T) {
        let content = serde_json::to_string_pretty(value)
            .unwrap_or_else(|err| format!("<unrenderable: {err}>"));
        self.attach(name, "application/json", content);
    }

    // ------------------------------------------------------------------------
    // Diagnostics
    // ------------------------------------------------------------------------

    /// Logs an outgoing request. Bodies are logged only in verbose mode.
    pub fn log_request(&self, method: &str, url: &str, body: Option<&Value>) {
        log_outgoing(&self.info.name, self.settings.verbose, method, url, body);
    }

    /// Logs a received response and remembers it for failure diagnostics.
    pub fn log_response(&mut self, meta: &ResponseMeta) {
        let headers = meta
            .headers
            .iter()
            .map(|(name, value)| format!("{name}: {value}"))
            .collect::<Vec<_>>()
            .join("; ");
        let body = if self.settings.verbose { pretty_body(meta) } else { String::new() };
        info!(
            scenario = %self.info.name,
            method = %meta.method,
            url = %meta.url,
            status = meta.status,
            status_text = meta.status_text(),
            elapsed_ms = meta.elapsed.as_millis(),
            size = meta.body.len(),
            attempts = meta.attempts,
            headers = %headers,
            body = %body,
            "response"
        );
        self.last_response = Some(meta.clone());
        self.last_response_attached = false;
    }

    // ------------------------------------------------------------------------
    // Transport
    // ------------------------------------------------------------------------

    /// Hard check that the call reached the server; logs the response.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioAbort`] on a transport failure.
    pub fn require_ok<T>(
        &mut self,
        description: &str,
        result: ApiResult<T>,
    ) -> Result<ApiResponse<T>, ScenarioAbort> {
        match result {
            Ok(response) => {
                self.log_response(&response.meta);
                self.require(Check::completed(description, None))?;
                Ok(response)
            }
            Err(err) => Err(self.abort(Check::completed(description, Some(&err)))),
        }
    }

    /// Hard check that the payload decoded; returns a copy of it.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioAbort`] for an empty or undecodable body.
    pub fn require_value<T: Clone>(
        &mut self,
        description: &str,
        response: &ApiResponse<T>,
    ) -> Result<T, ScenarioAbort> {
        let check = Check::decoded(
            description,
            response.value.is_some(),
            response.decode_error.as_deref(),
        );
        match response.value.clone() {
            Some(value) => {
                self.require(check)?;
                Ok(value)
            }
            None => Err(self.abort(check)),
        }
    }

    // ------------------------------------------------------------------------
    // Status
    // ------------------------------------------------------------------------

    /// Hard status check.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioAbort`] when `actual != expected`.
    pub fn require_status(&mut self, expected: u16, actual: u16) -> Result<(), ScenarioAbort> {
        self.require(Check::status(expected, actual))
    }

    /// Soft status check.
    pub fn check_status(&mut self, expected: u16, actual: u16) -> bool {
        self.check(Check::status(expected, actual))
    }

    /// Hard check that the status is one of `allowed`.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioAbort`] when `actual` is not allowed.
    pub fn require_status_in(
        &mut self,
        allowed: &[u16],
        actual: u16,
    ) -> Result<(), ScenarioAbort> {
        self.require(Check::status_in(allowed, actual))
    }

    /// Soft check that the status is one of `allowed`.
    pub fn check_status_in(&mut self, allowed: &[u16], actual: u16) -> bool {
        self.check(Check::status_in(allowed, actual))
    }

    /// Soft response-time ceiling. There is no hard form.
    pub fn check_response_time(&mut self, ceiling: Duration, elapsed: Duration) -> bool {
        self.check(Check::response_time(ceiling, elapsed))
    }

    // ------------------------------------------------------------------------
    // Content
    // ------------------------------------------------------------------------

    /// Hard non-empty check.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioAbort`] when `value` is empty.
    pub fn require_not_empty<T: Countable + ?Sized>(
        &mut self,
        description: &str,
        value: &T,
    ) -> Result<(), ScenarioAbort> {
        self.require(Check::not_empty(description, value))
    }

    /// Soft non-empty check.
    pub fn check_not_empty<T: Countable + ?Sized>(&mut self, description: &str, value: &T) -> bool {
        self.check(Check::not_empty(description, value))
    }

    /// Soft check that `path` resolves in `document`.
    pub fn check_field_present(&mut self, document: &JsonDocument, path: &str) -> bool {
        self.check(Check::field_present(document, path))
    }

    /// Soft check that `path` resolves to a value of `kind`.
    pub fn check_field_kind(
        &mut self,
        document: &JsonDocument,
        path: &str,
        kind: JsonKind,
    ) -> bool {
        self.check(Check::field_kind(document, path, kind))
    }

    /// Hard check that `path` resolves to a value of `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioAbort`] when the field is missing or has another kind.
    pub fn require_field_kind(
        &mut self,
        document: &JsonDocument,
        path: &str,
        kind: JsonKind,
    ) -> Result<(), ScenarioAbort> {
        self.require(Check::field_kind(document, path, kind))
    }

    /// Soft check that the body is JSON; returns the document when it is.
    pub fn check_json_structure(&mut self, meta: &ResponseMeta) -> Option<JsonDocument> {
        if self.check(Check::json_structure(meta)) {
            JsonDocument::parse(&meta.body).ok()
        } else {
            None
        }
    }

    /// Hard check that the body is JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioAbort`] when the body does not parse.
    pub fn require_json(&mut self, meta: &ResponseMeta) -> Result<JsonDocument, ScenarioAbort> {
        let check = Check::json_structure(meta);
        match JsonDocument::parse(&meta.body) {
            Ok(document) if check.passed => {
                self.require(check)?;
                Ok(document)
            }
            _ => Err(self.abort(check)),
        }
    }

    // ------------------------------------------------------------------------
    // Values
    // ------------------------------------------------------------------------

    /// Hard equality check.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioAbort`] when the values differ.
    pub fn require_eq<T>(
        &mut self,
        description: &str,
        expected: &T,
        actual: &T,
    ) -> Result<(), ScenarioAbort>
    where
        T: PartialEq + Serialize + ?Sized,
    {
        self.require(Check::equal(description, expected, actual))
    }

    /// Soft equality check.
    pub fn check_eq<T>(&mut self, description: &str, expected: &T, actual: &T) -> bool
    where
        T: PartialEq + Serialize + ?Sized,
    {
        self.check(Check::equal(description, expected, actual))
    }

    /// Hard boolean condition.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioAbort`] when `condition` is false.
    pub fn require_that(
        &mut self,
        description: &str,
        condition: bool,
    ) -> Result<(), ScenarioAbort> {
        self.require(Check::condition(description, condition))
    }

    /// Soft boolean condition.
    pub fn check_that(&mut self, description: &str, condition: bool) -> bool {
        self.check(Check::condition(description, condition))
    }

    /// Soft check that a lookup found nothing. Logs the response if any.
    pub fn check_missing_resource<T>(&mut self, description: &str, result: &ApiResult<T>) -> bool {
        if let Ok(response) = result {
            self.log_response(&response.meta);
        }
        let outcome = result.as_ref().map(|response| &response.meta);
        self.check(Check::missing_resource(description, outcome))
    }

    // ------------------------------------------------------------------------
    // Recording
    // ------------------------------------------------------------------------

    /// Records a check as hard.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioAbort`] carrying the record when the check failed.
    pub fn require(&mut self, check: Check) -> Result<(), ScenarioAbort> {
        let record = self.record(check, CheckMode::Hard);
        if record.passed {
            Ok(())
        } else {
            Err(ScenarioAbort {
                record,
            })
        }
    }

    /// Records a failing hard check and returns the abort for it.
    fn abort(&mut self, check: Check) -> ScenarioAbort {
        ScenarioAbort {
            record: self.record(check, CheckMode::Hard),
        }
    }

    /// Records a check as soft and returns whether it passed.
    pub fn check(&mut self, check: Check) -> bool {
        self.record(check, CheckMode::Soft).passed
    }

    /// Stamps, stores, and reports a check.
    fn record(&mut self, check: Check, mode: CheckMode) -> AssertionRecord {
        let step = self.open_step.as_ref().map(|open| open.name.clone());
        let record = AssertionRecord::from_check(check, mode, step);
        self.reporter.record_assertion(&self.info.name, &record);
        self.assertions.push(record.clone());
        if !record.passed {
            if let Some(open) = self.open_step.as_mut() {
                open.failed = true;
            }
            self.attach_last_response();
        }
        record
    }

    /// Attaches diagnostics for the last logged response, once.
    fn attach_last_response(&mut self) {
        if self.last_response_attached {
            return;
        }
        let Some(meta) = self.last_response.take() else {
            return;
        };
        let diagnostics = json!({
            "method": &meta.method,
            "url": &meta.url,
            "status": meta.status,
            "status_text": meta.status_text(),
            "elapsed_ms": meta.elapsed.as_millis(),
            "attempts": meta.attempts,
            "headers": &meta.headers,
            "body": meta.body_text(),
        });
        let name = format!("response diagnostics: {} {}", meta.method, meta.url);
        self.attach_json(name, &diagnostics);
        self.last_response = Some(meta);
        self.last_response_attached = true;
    }

    /// Closes the scenario and produces its report.
    #[must_use]
    pub fn finish(mut self, abort: Option<&ScenarioAbort>) -> ScenarioReport {
        if abort.is_some()
            && let Some(open) = self.open_step.as_mut()
        {
            open.failed = true;
        }
        self.end_step();
        let failed: Vec<&AssertionRecord> =
            self.assertions.iter().filter(|record| !record.passed).collect();
        let failure = match (abort, failed.first()) {
            (Some(abort), _) => Some(abort.record.to_string()),
            (None, Some(first)) if failed.len() == 1 => Some(first.to_string()),
            (None, Some(first)) => {
                Some(format!("{} checks failed; first: {first}", failed.len()))
            }
            (None, None) => None,
        };
        let status =
            if failure.is_some() { ScenarioStatus::Failed } else { ScenarioStatus::Passed };
        ScenarioReport {
            info: self.info,
            status,
            failure,
            assertions: self.assertions,
            steps: self.steps,
            attachments: self.attachments,
            started_at_ms: self.started_at_ms,
            duration_ms: now_millis().saturating_sub(self.started_at_ms),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Observer logging each call of the named scenario.
fn request_logger(scenario: String, verbose: bool) -> RequestObserver {
    Arc::new(move |request: &OutgoingRequest<'_>| {
        log_outgoing(&scenario, verbose, request.method, request.url.as_str(), request.body);
    })
}

/// Emits the `request` event.
fn log_outgoing(scenario: &str, verbose: bool, method: &str, url: &str, body: Option<&Value>) {
    let body = body.filter(|_| verbose).map(pretty_value);
    info!(scenario, method, url, body = body.as_deref().unwrap_or(""), "request");
}

/// Pretty-prints a JSON value.
fn pretty_value(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Pretty-prints a body when it is JSON, otherwise returns it as text.
fn pretty_body(meta: &ResponseMeta) -> String {
    meta.json_value().map_or_else(|_| meta.body_text().into_owned(), |value| pretty_value(&value))
}
