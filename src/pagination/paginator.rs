//! Cursor paginator
//!
//! Drives a `QueryDescriptor` through a `Transport` until exhausted.

use super::types::{PageResult, PaginationState, QueryDescriptor, AFTER_VARIABLE};
use crate::error::Result;
use crate::http::Transport;
use crate::types::{Cursor, JsonValue, Record};
use tracing::debug;

/// Fetches every page of a list query
pub struct Paginator<'a, T: Transport + ?Sized> {
    transport: &'a T,
}

impl<'a, T: Transport + ?Sized> Paginator<'a, T> {
    /// Create a paginator over a transport
    pub fn new(transport: &'a T) -> Self {
        Self { transport }
    }

    /// Fetch all records, following `_cursor` until a page comes back empty.
    ///
    /// Errors from any page abort the whole fetch; no partial result is returned.
    pub async fn fetch_all(&self, descriptor: &QueryDescriptor) -> Result<Vec<Record>> {
        descriptor.validate()?;

        let mut variables = match descriptor.variables() {
            JsonValue::Null => JsonValue::Object(serde_json::Map::new()),
            other => other.clone(),
        };
        let mut state = PaginationState::new();
        let mut results = Vec::new();

        loop {
            let response = self.transport.send(descriptor.query(), &variables).await?;
            let page = match &state.cursor {
                None => PageResult::parse(&response, descriptor.field())?,
                Some(_) => PageResult::parse_next(&response, descriptor.field())?,
            };
            state.add_page(page.len());

            debug!(
                field = descriptor.field(),
                page = state.pages,
                after = ?state.cursor.as_ref().map(Cursor::as_str),
                records = page.len(),
                total = state.total_fetched,
                "fetched page"
            );

            let PageResult { records, cursor } = page;
            results.extend(records);

            match cursor {
                Some(cursor) => {
                    variables[AFTER_VARIABLE] = cursor.clone().into();
                    state.set_cursor(cursor);
                }
                None => break,
            }
        }

        Ok(results)
    }
}

/// Fetch all records of `descriptor` through `transport`
pub async fn fetch_all<T: Transport + ?Sized>(
    transport: &T,
    descriptor: &QueryDescriptor,
) -> Result<Vec<Record>> {
    Paginator::new(transport).fetch_all(descriptor).await
}
