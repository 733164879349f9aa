//! Pagination types
//!
//! Query descriptors, parsed pages and loop bookkeeping.

use crate::error::{Error, Result};
use crate::http::data_field;
use crate::types::{Cursor, JsonValue, Record, CURSOR_FIELD};
use std::borrow::Cow;

/// Variable the cursor of the previous page is passed in
pub const AFTER_VARIABLE: &str = "after";

/// A list query ready to run: text, variables and the result field name.
///
/// The field name is declared by the caller and must match the query's
/// actual result key; it is never inferred.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescriptor {
    query: Cow<'static, str>,
    variables: JsonValue,
    field: String,
}

impl QueryDescriptor {
    /// Create a descriptor with empty variables
    pub fn new(query: impl Into<Cow<'static, str>>, field: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: JsonValue::Object(serde_json::Map::new()),
            field: field.into(),
        }
    }

    /// Set the initial variables
    #[must_use]
    pub fn with_variables(mut self, variables: JsonValue) -> Self {
        self.variables = variables;
        self
    }

    /// Query text
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Initial variables
    pub fn variables(&self) -> &JsonValue {
        &self.variables
    }

    /// Result field name
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Check the descriptor can be run
    pub fn validate(&self) -> Result<()> {
        if self.field.is_empty() {
            return Err(Error::validation("Result field is required"));
        }
        if self.query.trim().is_empty() {
            return Err(Error::validation("Query text is required"));
        }
        if !(self.variables.is_object() || self.variables.is_null()) {
            return Err(Error::validation("Query variables must be a JSON object"));
        }
        Ok(())
    }
}

/// One page of records plus the cursor taken from its last record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageResult {
    /// Records in server order
    pub records: Vec<Record>,
    /// Cursor of the last record; `None` when the page is empty
    pub cursor: Option<Cursor>,
}

impl PageResult {
    /// Parse a GraphQL response body into a page.
    ///
    /// A response without `data` is an empty page. A present `data` without
    /// the declared field, or a field that is not a list, is a schema mismatch.
    pub fn parse(response: &JsonValue, field: &str) -> Result<Self> {
        match response.get("data") {
            None | Some(JsonValue::Null) => Ok(Self::default()),
            Some(_) => Self::parse_next(response, field),
        }
    }

    /// Parse a page requested with a cursor.
    ///
    /// Once a cursor has been followed the result field must be present; a
    /// response without `data` is a schema mismatch rather than the end.
    pub fn parse_next(response: &JsonValue, field: &str) -> Result<Self> {
        let records = data_field(response, field)?
            .as_array()
            .ok_or_else(|| Error::schema_mismatch(field, "expected a list of records"))?
            .clone();

        let cursor = match records.last() {
            Some(last) => cursor_of(last, field)?,
            None => None,
        };

        Ok(Self { records, cursor })
    }

    /// Number of records in the page
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the page has no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Read `_cursor` off a record. A null or empty cursor ends pagination.
fn cursor_of(record: &Record, field: &str) -> Result<Option<Cursor>> {
    match record.get(CURSOR_FIELD) {
        Some(JsonValue::String(s)) if s.is_empty() => Ok(None),
        Some(JsonValue::String(s)) => Ok(Some(Cursor::new(s.clone()))),
        Some(JsonValue::Number(n)) => Ok(Some(Cursor::new(n.to_string()))),
        Some(JsonValue::Null) => Ok(None),
        _ => Err(Error::schema_mismatch(
            format!("{field}.{CURSOR_FIELD}"),
            "last record of a non-empty page has no cursor",
        )),
    }
}

/// Tracks pagination progress during a fetch
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Pages fetched so far
    pub pages: u32,
    /// Cursor the next page is requested after
    pub cursor: Option<Cursor>,
    /// Total records fetched so far
    pub total_fetched: u64,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fetched page
    pub fn add_page(&mut self, records: usize) {
        self.pages += 1;
        self.total_fetched += records as u64;
    }

    /// Set cursor
    pub fn set_cursor(&mut self, cursor: Cursor) {
        self.cursor = Some(cursor);
    }
}
