//! Transport trait
//!
//! Everything above the transport (pagination, uploads, export polling)
//! depends only on this trait, so each protocol can run against a scripted
//! transport as easily as against the real API.

use crate::error::Result;
use crate::types::JsonValue;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;

/// Sends GraphQL requests and raw object-storage transfers
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a GraphQL query or mutation and return the parsed response body.
    ///
    /// Fails with `HttpStatus` on any status other than 200 and with
    /// `Graphql` when the body carries a non-empty `errors` array.
    async fn send(&self, query: &str, variables: &JsonValue) -> Result<JsonValue>;

    /// PUT raw bytes to a pre-signed URL, returning the `ETag` header if any
    async fn put_object(&self, url: &str, body: Bytes) -> Result<Option<String>>;

    /// PUT the full contents of a file to a pre-signed URL in one request
    async fn put_file(&self, url: &str, path: &Path) -> Result<()>;

    /// GET a pre-signed URL and write the body to `path`, returning bytes written
    async fn download_to_file(&self, url: &str, path: &Path) -> Result<u64>;

    /// Organization every request is scoped to
    fn organization_context(&self) -> &str;
}
