//! Pagination module
//!
//! Cursor pagination over GraphQL list queries.
//!
//! # Overview
//!
//! Every paginated record carries an opaque `_cursor`. The paginator sends the
//! query, appends the page, takes the cursor of the last record and resends
//! the query with `after` set to it, until a page comes back empty.
//! All records are accumulated in memory; there is no streaming interface.

mod paginator;
mod types;

pub use paginator::{fetch_all, Paginator};
pub use types::{PageResult, PaginationState, QueryDescriptor, AFTER_VARIABLE};
