//! Auth configuration types

use chrono::{DateTime, Utc};
use std::fmt;

/// Where bearer tokens come from
#[derive(Clone)]
pub enum AuthSource {
    /// A token obtained elsewhere, used as-is
    Token(String),

    /// OAuth2 client-credentials flow against the configured token endpoint
    ClientCredentials {
        /// Client ID
        client_id: String,
        /// Client secret
        client_secret: String,
    },
}

impl AuthSource {
    /// Client-credentials source
    pub fn client_credentials(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self::ClientCredentials {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    /// Static token source
    pub fn token(token: impl Into<String>) -> Self {
        Self::Token(token.into())
    }
}

impl fmt::Debug for AuthSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(_) => f.debug_tuple("Token").field(&"<redacted>").finish(),
            Self::ClientCredentials { client_id, .. } => f
                .debug_struct("ClientCredentials")
                .field("client_id", client_id)
                .field("client_secret", &"<redacted>")
                .finish(),
        }
    }
}

/// Cached token with expiration
#[derive(Debug, Clone)]
pub struct CachedToken {
    /// The access token
    pub token: String,
    /// When the token expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl CachedToken {
    /// Create a new cached token
    pub fn new(token: String, expires_at: Option<DateTime<Utc>>) -> Self {
        Self { token, expires_at }
    }

    /// Create a token that expires in N seconds from now.
    ///
    /// A lifetime too large to represent leaves the expiry unset.
    pub fn expires_in(token: String, seconds: i64) -> Self {
        Self {
            token,
            expires_at: expiry_after(seconds),
        }
    }

    /// Check if the token is expired (with 30 second buffer)
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => {
                let buffer = chrono::Duration::seconds(30);
                Utc::now() + buffer >= expires_at
            }
            None => false,
        }
    }
}

/// `now + seconds`, or `None` when it does not fit a timestamp
pub(crate) fn expiry_after(seconds: i64) -> Option<DateTime<Utc>> {
    chrono::Duration::try_seconds(seconds).and_then(|d| Utc::now().checked_add_signed(d))
}
