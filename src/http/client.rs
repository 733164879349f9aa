//! API client
//!
//! The concrete `Transport`: a thin, honest relay of backend responses.
//! - GraphQL requests carry the bearer token and organization context
//! - Non-200 statuses fail with the status code and raw body
//! - GraphQL `errors` arrays fail even when the status is 200
//! - Object-storage requests go straight to the pre-signed URL, unauthenticated

use super::transport::Transport;
use super::types::GraphqlRequest;
use crate::auth::{AuthSource, Authenticator};
use crate::config::{ClientConfig, Credentials};
use crate::error::{Error, GraphqlError, Result};
use crate::types::JsonValue;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt, TryStreamExt};
use reqwest::header::{CONTENT_LENGTH, ETAG};
use reqwest::{Body, Client, Response, StatusCode};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::debug;

/// Header carrying the organization id on every GraphQL request
pub const ORGANIZATION_CONTEXT_HEADER: &str = "Organization-Context";

/// Read buffer used when streaming a file as a request body
const STREAM_BUFFER_SIZE: usize = 64 * 1024;

/// Client for the GraphQL API and its pre-signed storage URLs
pub struct ApiClient {
    client: Client,
    config: ClientConfig,
    authenticator: Authenticator,
    organization_context: String,
}

impl ApiClient {
    /// Create a client that authenticates with client credentials
    pub fn new(config: ClientConfig, credentials: Credentials) -> Result<Self> {
        let source = AuthSource::client_credentials(credentials.client_id, credentials.client_secret);
        Self::with_auth(config, source, credentials.organization_context)
    }

    /// Create a client around an already issued bearer token
    pub fn with_token(
        config: ClientConfig,
        token: impl Into<String>,
        organization_context: impl Into<String>,
    ) -> Result<Self> {
        Self::with_auth(config, AuthSource::token(token), organization_context)
    }

    /// Create a client with an explicit auth source
    pub fn with_auth(
        config: ClientConfig,
        source: AuthSource,
        organization_context: impl Into<String>,
    ) -> Result<Self> {
        config.validate()?;
        let organization_context = organization_context.into();
        if organization_context.is_empty() {
            return Err(Error::missing_field("organization_context"));
        }

        let client = Client::builder()
            .user_agent(&config.user_agent)
            .build()
            .map_err(Error::Http)?;
        let authenticator = Authenticator::with_client(source, &config, client.clone());

        Ok(Self {
            client,
            config,
            authenticator,
            organization_context,
        })
    }

    /// Get a bearer token from the underlying authenticator
    pub async fn bearer_token(&self) -> Result<String> {
        self.authenticator.bearer_token().await
    }

    /// Get the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the underlying reqwest client
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl Transport for ApiClient {
    async fn send(&self, query: &str, variables: &JsonValue) -> Result<JsonValue> {
        let token = self.authenticator.bearer_token().await?;

        debug!(url = %self.config.api_url, "sending GraphQL request");
        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(token)
            .header(ORGANIZATION_CONTEXT_HEADER, &self.organization_context)
            .json(&GraphqlRequest::new(query, variables))
            .send()
            .await?;

        let response = ensure_ok(response).await?;
        let bytes = response.bytes().await?;
        let body: JsonValue = serde_json::from_slice(&bytes)?;

        if let Some(errors) = graphql_errors(&body) {
            debug!(count = errors.len(), "GraphQL response carried errors");
            return Err(Error::Graphql { errors });
        }

        Ok(body)
    }

    async fn put_object(&self, url: &str, body: Bytes) -> Result<Option<String>> {
        let len = body.len();
        let response = self.client.put(url).body(body).send().await?;
        let response = ensure_ok(response).await?;

        let etag = response
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string);
        debug!(bytes = len, etag = ?etag, "uploaded object part");
        Ok(etag)
    }

    async fn put_file(&self, url: &str, path: &Path) -> Result<()> {
        let file = tokio::fs::File::open(path).await?;
        let len = file.metadata().await?.len();

        let stream = futures::stream::try_unfold(file, |mut file| async move {
            let mut buf = BytesMut::with_capacity(STREAM_BUFFER_SIZE);
            let n = file.read_buf(&mut buf).await?;
            if n == 0 {
                Ok::<_, std::io::Error>(None)
            } else {
                Ok(Some((buf.freeze(), file)))
            }
        });

        let response = self
            .client
            .put(url)
            .header(CONTENT_LENGTH, len)
            .body(Body::wrap_stream(stream))
            .send()
            .await?;
        ensure_ok(response).await?;

        debug!(bytes = len, path = %path.display(), "uploaded file");
        Ok(())
    }

    async fn download_to_file(&self, url: &str, path: &Path) -> Result<u64> {
        let response = self.client.get(url).send().await?;
        let response = ensure_ok(response).await?;

        let body = response.bytes_stream().map_err(Error::from);
        let written = write_atomically(path, body).await?;

        debug!(bytes = written, path = %path.display(), "downloaded file");
        Ok(written)
    }

    fn organization_context(&self) -> &str {
        &self.organization_context
    }
}

/// Stream `body` into a sibling `.part` file, renamed over `path` once complete.
///
/// A failed transfer removes the partial file and leaves `path` untouched.
pub(crate) async fn write_atomically<S>(path: &Path, body: S) -> Result<u64>
where
    S: Stream<Item = Result<Bytes>>,
{
    let partial = partial_path(path);
    match stream_to_file(&partial, body).await {
        Ok(written) => {
            tokio::fs::rename(&partial, path).await?;
            Ok(written)
        }
        Err(e) => {
            if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                debug!(path = %partial.display(), error = %cleanup, "partial file not removed");
            }
            Err(e)
        }
    }
}

async fn stream_to_file<S>(path: &Path, body: S) -> Result<u64>
where
    S: Stream<Item = Result<Bytes>>,
{
    futures::pin_mut!(body);
    let mut file = tokio::fs::File::create(path).await?;
    let mut written = 0u64;
    while let Some(chunk) = body.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".part");
    path.with_file_name(name)
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("config", &self.config)
            .field("authenticator", &self.authenticator)
            .field("organization_context", &self.organization_context)
            .finish_non_exhaustive()
    }
}

/// Anything other than 200 is a failure carrying status and body
async fn ensure_ok(response: Response) -> Result<Response> {
    let status = response.status();
    if status == StatusCode::OK {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::http_status(status.as_u16(), body))
}

/// Extract a non-empty `errors` array from a GraphQL response body
fn graphql_errors(body: &JsonValue) -> Option<Vec<GraphqlError>> {
    let raw = body.get("errors")?.as_array()?;
    if raw.is_empty() {
        return None;
    }
    let errors = raw
        .iter()
        .map(|e| {
            serde_json::from_value(e.clone()).unwrap_or_else(|_| GraphqlError {
                message: e.to_string(),
                locations: Vec::new(),
                path: Vec::new(),
                extensions: None,
            })
        })
        .collect();
    Some(errors)
}
