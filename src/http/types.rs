//! GraphQL wire types and response helpers

use crate::error::{Error, Result};
use crate::types::JsonValue;
use serde::Serialize;

/// GraphQL request payload
#[derive(Debug, Clone, Serialize)]
pub struct GraphqlRequest<'a> {
    /// Query or mutation text
    pub query: &'a str,
    /// Variables object
    pub variables: &'a JsonValue,
}

impl<'a> GraphqlRequest<'a> {
    /// Create a new request
    pub fn new(query: &'a str, variables: &'a JsonValue) -> Self {
        Self { query, variables }
    }
}

/// Get `data.<field>` from a GraphQL response body.
///
/// A missing or null field means the caller's query and the declared result
/// field disagree, which is reported as a `SchemaMismatch`.
pub fn data_field<'a>(response: &'a JsonValue, field: &str) -> Result<&'a JsonValue> {
    match response.get("data").and_then(|data| data.get(field)) {
        Some(value) if !value.is_null() => Ok(value),
        _ => Err(Error::schema_mismatch(
            field,
            "field absent from response data",
        )),
    }
}

/// Get a string member of an object, reporting `parent.key` on mismatch
pub fn string_field(value: &JsonValue, parent: &str, key: &str) -> Result<String> {
    value
        .get(key)
        .and_then(JsonValue::as_str)
        .map(ToString::to_string)
        .ok_or_else(|| Error::schema_mismatch(format!("{parent}.{key}"), "expected a string"))
}
