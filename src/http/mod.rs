//! HTTP transport module
//!
//! Sends bearer-authenticated GraphQL requests and moves raw bytes to and
//! from pre-signed object-storage URLs.
//!
//! # Features
//!
//! - **GraphQL**: POST `{query, variables}` with `Authorization` and
//!   `Organization-Context` headers, GraphQL `errors` surfaced as errors
//! - **Object storage**: direct PUT of chunks or whole files, GET to disk
//! - **Transport trait**: the seam pagination, upload and export code talks to
//!
//! There are no retries and no timeouts here; callers own retry policy.

mod client;
mod transport;
mod types;

pub use client::{ApiClient, ORGANIZATION_CONTEXT_HEADER};
pub use transport::Transport;
pub use types::{data_field, string_field, GraphqlRequest};

#[cfg(test)]
mod tests;
