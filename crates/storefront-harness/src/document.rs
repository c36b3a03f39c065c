// crates/storefront-harness/src/document.rs
// ============================================================================
// Module: Untyped JSON Documents
// Description: Dotted-path lookups and coarse kinds over serde_json values.
// Purpose: Back structural and field-type checks without typed decoding.
// Dependencies: serde_json
// ============================================================================

//! ## Overview
//! Paths are dot separated. A numeric segment indexes into an array, any other
//! segment looks up an object key: `"0.rating.rate"` reaches the rate of the
//! first product in a list.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Coarse JSON value kinds used by field-type checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonKind {
    /// JSON string.
    String,
    /// JSON number, integral or not.
    Number,
    /// JSON boolean.
    Boolean,
    /// JSON array.
    Array,
    /// JSON object.
    Object,
    /// JSON null.
    Null,
}

impl JsonKind {
    /// Returns the kind of a value.
    #[must_use]
    pub const fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => Self::String,
            Value::Number(_) => Self::Number,
            Value::Bool(_) => Self::Boolean,
            Value::Array(_) => Self::Array,
            Value::Object(_) => Self::Object,
            Value::Null => Self::Null,
        }
    }

    /// Returns the lowercase label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for JsonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Untyped JSON document.
#[derive(Debug, Clone, PartialEq)]
pub struct JsonDocument {
    /// Root value.
    root: Value,
}

impl JsonDocument {
    /// Parses a document from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns the JSON error when the bytes are not a JSON document.
    pub fn parse(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes).map(Self::from_value)
    }

    /// Wraps an existing value.
    #[must_use]
    pub const fn from_value(root: Value) -> Self {
        Self {
            root,
        }
    }

    /// Returns the root value.
    #[must_use]
    pub const fn root(&self) -> &Value {
        &self.root
    }

    /// Returns the kind of the root value.
    #[must_use]
    pub const fn kind(&self) -> JsonKind {
        JsonKind::of(&self.root)
    }

    /// Resolves a dotted path. An empty path is the root.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        if path.is_empty() {
            return Some(&self.root);
        }
        path.split('.').try_fold(&self.root, |current, segment| match current {
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|index| items.get(index)),
            Value::Object(map) => map.get(segment),
            _ => None,
        })
    }

    /// Returns true when the path resolves, including to `null`.
    #[must_use]
    pub fn has(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Returns the kind at `path`, if it resolves.
    #[must_use]
    pub fn kind_at(&self, path: &str) -> Option<JsonKind> {
        self.get(path).map(JsonKind::of)
    }

    /// Returns the sub-document at `path`.
    #[must_use]
    pub fn select(&self, path: &str) -> Option<Self> {
        self.get(path).cloned().map(Self::from_value)
    }

    /// Number of elements for arrays, keys for objects, chars for strings.
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.root {
            Value::Array(items) => items.len(),
            Value::Object(map) => map.len(),
            Value::String(text) => text.chars().count(),
            Value::Null | Value::Bool(_) | Value::Number(_) => 0,
        }
    }

    /// Returns true when [`Self::len`] is zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
