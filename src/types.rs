//! Common types used throughout the SDK
//!
//! Shared type aliases and small value types used across multiple modules.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

/// A single record returned by a list query.
///
/// Records are semi-structured: every record carries at least `id` and
/// `_cursor`, the rest depends on the query's selection set.
pub type Record = JsonValue;

// ============================================================================
// Cursor
// ============================================================================

/// Name of the field every paginated record carries its cursor in
pub const CURSOR_FIELD: &str = "_cursor";

/// Opaque server-issued position token.
///
/// Only meaningful for the query and variables that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Wrap a raw cursor token
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<Cursor> for JsonValue {
    fn from(cursor: Cursor) -> Self {
        JsonValue::String(cursor.0)
    }
}
