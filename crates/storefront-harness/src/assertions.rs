// crates/storefront-harness/src/assertions.rs
// ============================================================================
// Module: Assertion Evaluation
// Description: Pure check evaluators and the records they produce.
// Purpose: Keep pass/fail decisions independent of logging and reporting.
// Dependencies: serde, serde_json, storefront-client, thiserror
// ============================================================================

//! ## Overview
//! Every evaluator returns a [`Check`]: a description, the expected and actual
//! values rendered as text, and whether it passed. The scenario context turns
//! a check into an [`AssertionRecord`] by stamping it with a [`CheckMode`] and
//! the current step, then reports it.
//!
//! A failed hard check surfaces as [`ScenarioAbort`]; scenarios propagate it
//! with `?` and stop.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use storefront_client::ClientError;
use storefront_client::ResponseMeta;
use thiserror::Error;

use crate::document::JsonDocument;
use crate::document::JsonKind;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Whether a failed check stops the scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckMode {
    /// Failure aborts the scenario.
    Hard,
    /// Failure is recorded; the scenario continues.
    Soft,
}

impl CheckMode {
    /// Returns the lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hard => "hard",
            Self::Soft => "soft",
        }
    }
}

/// Outcome of evaluating one check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Check {
    /// What was checked.
    pub description: String,
    /// Expected value.
    pub expected: String,
    /// Observed value.
    pub actual: String,
    /// Whether the check passed.
    pub passed: bool,
}

/// A check as recorded on a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssertionRecord {
    /// What was checked.
    pub description: String,
    /// Expected value.
    pub expected: String,
    /// Observed value.
    pub actual: String,
    /// Whether the check passed.
    pub passed: bool,
    /// Hard or soft.
    pub mode: CheckMode,
    /// Step that was open when the check ran.
    pub step: Option<String>,
}

impl AssertionRecord {
    /// Stamps a check with its mode and step.
    #[must_use]
    pub fn from_check(check: Check, mode: CheckMode, step: Option<String>) -> Self {
        Self {
            description: check.description,
            expected: check.expected,
            actual: check.actual,
            passed: check.passed,
            mode,
            step,
        }
    }
}

impl fmt::Display for AssertionRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: expected {}, actual {}", self.description, self.expected, self.actual)
    }
}

/// Raised by a failed hard check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("hard check failed: {record}")]
pub struct ScenarioAbort {
    /// The failing assertion.
    pub record: AssertionRecord,
}

/// Things with a length that can be checked for emptiness.
pub trait Countable {
    /// Number of elements or characters.
    fn count(&self) -> usize;
}

impl<T> Countable for [T] {
    fn count(&self) -> usize {
        self.len()
    }
}

impl<T> Countable for Vec<T> {
    fn count(&self) -> usize {
        self.len()
    }
}

impl Countable for str {
    fn count(&self) -> usize {
        self.chars().count()
    }
}

impl Countable for String {
    fn count(&self) -> usize {
        self.as_str().count()
    }
}

impl<K, V> Countable for BTreeMap<K, V> {
    fn count(&self) -> usize {
        self.len()
    }
}

impl Countable for JsonDocument {
    fn count(&self) -> usize {
        self.len()
    }
}

// ============================================================================
// SECTION: Evaluators
// ============================================================================

impl Check {
    /// Builds a check from its parts.
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
        passed: bool,
    ) -> Self {
        Self {
            description: description.into(),
            expected: expected.into(),
            actual: actual.into(),
            passed,
        }
    }

    /// Status code equals `expected`.
    #[must_use]
    pub fn status(expected: u16, actual: u16) -> Self {
        Self::new("status code", expected.to_string(), actual.to_string(), expected == actual)
    }

    /// Status code is one of `allowed`.
    #[must_use]
    pub fn status_in(allowed: &[u16], actual: u16) -> Self {
        let expected = allowed.iter().map(u16::to_string).collect::<Vec<_>>().join(" | ");
        Self::new(
            "status code",
            format!("one of {expected}"),
            actual.to_string(),
            allowed.contains(&actual),
        )
    }

    /// Elapsed time is at or below `ceiling`.
    #[must_use]
    pub fn response_time(ceiling: Duration, elapsed: Duration) -> Self {
        Self::new(
            "response time",
            format!("<= {}ms", ceiling.as_millis()),
            format!("{}ms", elapsed.as_millis()),
            elapsed <= ceiling,
        )
    }

    /// Value has at least one element.
    #[must_use]
    pub fn not_empty<T: Countable + ?Sized>(description: &str, value: &T) -> Self {
        let count = value.count();
        Self::new(description, "non-empty", format!("{count} element(s)"), count > 0)
    }

    /// `path` resolves in `document`.
    #[must_use]
    pub fn field_present(document: &JsonDocument, path: &str) -> Self {
        let actual = document
            .kind_at(path)
            .map_or_else(|| "missing".to_string(), |kind| format!("present ({kind})"));
        Self::new(format!("field `{path}` present"), "present", actual, document.has(path))
    }

    /// `path` resolves to a value of `kind`.
    #[must_use]
    pub fn field_kind(document: &JsonDocument, path: &str, kind: JsonKind) -> Self {
        let found = document.kind_at(path);
        let actual = found.map_or_else(|| "missing".to_string(), |found| found.to_string());
        Self::new(format!("field `{path}` type"), kind.to_string(), actual, found == Some(kind))
    }

    /// Body parses as JSON.
    #[must_use]
    pub fn json_structure(meta: &ResponseMeta) -> Self {
        match JsonDocument::parse(&meta.body) {
            Ok(document) => Self::new(
                "valid JSON body",
                "JSON document",
                format!("JSON {}", document.kind()),
                true,
            ),
            Err(err) => Self::new("valid JSON body", "JSON document", err.to_string(), false),
        }
    }

    /// `expected == actual`, both rendered as JSON.
    #[must_use]
    pub fn equal<T>(description: &str, expected: &T, actual: &T) -> Self
    where
        T: PartialEq + Serialize + ?Sized,
    {
        Self::new(description, render(expected), render(actual), expected == actual)
    }

    /// Arbitrary boolean condition.
    #[must_use]
    pub fn condition(description: &str, condition: bool) -> Self {
        Self::new(description, "true", condition.to_string(), condition)
    }

    /// The call completed at the transport level.
    #[must_use]
    pub fn completed(description: &str, error: Option<&ClientError>) -> Self {
        let actual = error.map_or_else(|| "response".to_string(), ToString::to_string);
        Self::new(description, "response", actual, error.is_none())
    }

    /// The payload decoded into its typed form.
    #[must_use]
    pub fn decoded(description: &str, present: bool, decode_error: Option<&str>) -> Self {
        let actual = match (present, decode_error) {
            (true, _) => "decoded payload".to_string(),
            (false, Some(err)) => format!("decode error: {err}"),
            (false, None) => "empty body".to_string(),
        };
        Self::new(description, "decoded payload", actual, present)
    }

    /// Lookup of a resource that should not exist.
    ///
    /// A transport error (refused, reset, timed out), a 404, or a 200 whose
    /// body is empty, `null`, `{}` or `[]` are all accepted; the live service
    /// answers in each of these ways depending on the resource. Errors raised
    /// before anything was sent, such as an unusable URL, fail.
    #[must_use]
    pub fn missing_resource(
        description: &str,
        outcome: Result<&ResponseMeta, &ClientError>,
    ) -> Self {
        let expected = "transport error, 404, or empty 200";
        match outcome {
            Err(err) if err.is_transport() => {
                Self::new(description, expected, format!("transport error: {err}"), true)
            }
            Err(err) => Self::new(description, expected, format!("request error: {err}"), false),
            Ok(meta) if meta.status == 404 => Self::new(description, expected, "404", true),
            Ok(meta) if meta.status == 200 && has_empty_payload(meta) => {
                Self::new(description, expected, "200 with empty payload", true)
            }
            Ok(meta) => Self::new(
                description,
                expected,
                format!("{} with {} byte body", meta.status, meta.body.len()),
                false,
            ),
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Renders a value as compact JSON for expected/actual fields.
fn render<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|err| format!("<unrenderable: {err}>"))
}

/// True for an empty body or a JSON `null`, `{}` or `[]`.
fn has_empty_payload(meta: &ResponseMeta) -> bool {
    if meta.is_body_empty() {
        return true;
    }
    match meta.json_value() {
        Ok(Value::Null) => true,
        Ok(Value::Object(map)) => map.is_empty(),
        Ok(Value::Array(items)) => items.is_empty(),
        _ => false,
    }
}
