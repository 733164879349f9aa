//! Authenticator implementation
//!
//! Handles token acquisition and caching for GraphQL requests.

use super::types::{expiry_after, AuthSource, CachedToken};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Authenticator hands out bearer tokens, fetching new ones on demand
pub struct Authenticator {
    /// Where tokens come from
    source: AuthSource,
    /// OAuth token endpoint
    token_url: String,
    /// OAuth audience
    audience: String,
    /// Lifetime assumed when the endpoint omits `expires_in`
    token_lifetime: Duration,
    /// Cached token for client-credentials auth
    cached_token: Arc<RwLock<Option<CachedToken>>>,
    /// HTTP client for token requests
    http_client: Client,
}

impl Authenticator {
    /// Create an authenticator using the token endpoint from `config`
    pub fn new(source: AuthSource, config: &ClientConfig) -> Self {
        Self::with_client(source, config, Client::new())
    }

    /// Create an authenticator with a custom HTTP client
    pub fn with_client(source: AuthSource, config: &ClientConfig, http_client: Client) -> Self {
        Self {
            source,
            token_url: config.token_url.clone(),
            audience: config.audience.clone(),
            token_lifetime: config.token_lifetime,
            cached_token: Arc::new(RwLock::new(None)),
            http_client,
        }
    }

    /// Get a valid bearer token, refreshing if necessary
    pub async fn bearer_token(&self) -> Result<String> {
        let (client_id, client_secret) = match &self.source {
            AuthSource::Token(token) => return Ok(token.clone()),
            AuthSource::ClientCredentials {
                client_id,
                client_secret,
            } => (client_id, client_secret),
        };

        {
            let cached = self.cached_token.read().await;
            if let Some(token) = cached.as_ref() {
                if !token.is_expired() {
                    return Ok(token.token.clone());
                }
            }
        }

        let mut cached = self.cached_token.write().await;

        // Another task may have refreshed while we waited for the write lock
        if let Some(token) = cached.as_ref() {
            if !token.is_expired() {
                return Ok(token.token.clone());
            }
        }

        let new_token = self.fetch_token(client_id, client_secret).await?;
        let token_str = new_token.token.clone();
        *cached = Some(new_token);

        Ok(token_str)
    }

    /// Fetch a token with the client-credentials grant
    async fn fetch_token(&self, client_id: &str, client_secret: &str) -> Result<CachedToken> {
        debug!(token_url = %self.token_url, "requesting access token");

        let body = TokenRequest {
            client_id,
            client_secret,
            audience: &self.audience,
            grant_type: "client_credentials",
        };

        let response = self
            .http_client
            .post(&self.token_url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Http)?;

        if response.status() != reqwest::StatusCode::OK {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::OAuth2 {
                message: format!("Token request failed with status {status}: {body}"),
            });
        }

        let token_response: TokenResponse = response.json().await.map_err(Error::Http)?;
        if token_response.access_token.is_empty() {
            return Err(Error::auth("Token endpoint returned an empty access_token"));
        }
        Ok(token_response.into_cached_token(self.token_lifetime))
    }

    /// Clear the cached token, forcing the next call to re-authenticate
    pub async fn clear_cache(&self) {
        let mut cached = self.cached_token.write().await;
        *cached = None;
    }

    /// Get the configured token source
    pub fn source(&self) -> &AuthSource {
        &self.source
    }
}

impl std::fmt::Debug for Authenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Authenticator")
            .field("source", &self.source)
            .field("token_url", &self.token_url)
            .field("audience", &self.audience)
            .finish_non_exhaustive()
    }
}

/// Client-credentials request body
#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    audience: &'a str,
    grant_type: &'a str,
}

/// OAuth2 token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

impl TokenResponse {
    /// An `expires_in` that overflows the clock falls back to the configured lifetime
    fn into_cached_token(self, fallback_lifetime: Duration) -> CachedToken {
        let fallback = i64::try_from(fallback_lifetime.as_secs()).unwrap_or(i64::MAX);
        let expires_at = self
            .expires_in
            .and_then(expiry_after)
            .or_else(|| expiry_after(fallback));
        CachedToken::new(self.access_token, expires_at)
    }
}
