//! Client configuration
//!
//! Endpoint URLs, audience and tuning knobs are carried in a `ClientConfig`
//! passed at client construction instead of living in module constants, so
//! tests and alternate environments can point the client elsewhere.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Production GraphQL endpoint
pub const DEFAULT_API_URL: &str = "https://platform.finitestate.io/api/v1/graphql";

/// OAuth token endpoint
pub const DEFAULT_TOKEN_URL: &str = "https://finitestate.auth0.com/oauth/token";

/// OAuth audience requested for API tokens
pub const DEFAULT_AUDIENCE: &str = "https://platform.finitestate.io/api/v1/graphql";

/// Default multipart chunk size (5 GiB), large enough that most files go up
/// as a single part
pub const DEFAULT_CHUNK_SIZE: u64 = 5 * 1024 * 1024 * 1024;

/// Default interval between export status queries
pub const DEFAULT_EXPORT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Default token validity when the token endpoint omits `expires_in`
pub const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

/// Environment variable holding the OAuth client id
pub const ENV_CLIENT_ID: &str = "CLIENT_ID";
/// Environment variable holding the OAuth client secret
pub const ENV_CLIENT_SECRET: &str = "CLIENT_SECRET";
/// Environment variable holding the organization context
pub const ENV_ORGANIZATION_CONTEXT: &str = "ORGANIZATION_CONTEXT";

// ============================================================================
// Client Config
// ============================================================================

/// Configuration for an `ApiClient`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// GraphQL endpoint
    pub api_url: String,
    /// OAuth client-credentials token endpoint
    pub token_url: String,
    /// OAuth audience
    pub audience: String,
    /// Multipart upload chunk size in bytes
    pub chunk_size: u64,
    /// Interval between export status queries
    #[serde(with = "duration_secs")]
    pub export_poll_interval: Duration,
    /// Token validity assumed when the token response has no expiry
    #[serde(with = "duration_secs")]
    pub token_lifetime: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token_url: DEFAULT_TOKEN_URL.to_string(),
            audience: DEFAULT_AUDIENCE.to_string(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            export_poll_interval: DEFAULT_EXPORT_POLL_INTERVAL,
            token_lifetime: DEFAULT_TOKEN_LIFETIME,
            user_agent: format!("finite-state-sdk/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Create a new config builder
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Load a config from a YAML file. Missing keys keep their defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Parse a config from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check URLs parse and tuning values are usable
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.api_url)?;
        Url::parse(&self.token_url)?;
        if self.audience.is_empty() {
            return Err(Error::missing_field("audience"));
        }
        if self.chunk_size == 0 {
            return Err(Error::config("chunk_size must be greater than zero"));
        }
        Ok(())
    }
}

/// Builder for `ClientConfig`
#[derive(Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Set the GraphQL endpoint
    pub fn api_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_url = url.into();
        self
    }

    /// Set the token endpoint
    pub fn token_url(mut self, url: impl Into<String>) -> Self {
        self.config.token_url = url.into();
        self
    }

    /// Set the OAuth audience
    pub fn audience(mut self, audience: impl Into<String>) -> Self {
        self.config.audience = audience.into();
        self
    }

    /// Set the multipart chunk size
    pub fn chunk_size(mut self, bytes: u64) -> Self {
        self.config.chunk_size = bytes;
        self
    }

    /// Set the export poll interval
    pub fn export_poll_interval(mut self, interval: Duration) -> Self {
        self.config.export_poll_interval = interval;
        self
    }

    /// Set the fallback token lifetime
    pub fn token_lifetime(mut self, lifetime: Duration) -> Self {
        self.config.token_lifetime = lifetime;
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// API credentials and the organization every request is scoped to
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// OAuth client id
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Organization context sent with every GraphQL request
    pub organization_context: String,
}

impl Credentials {
    /// Create credentials
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        organization_context: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            organization_context: organization_context.into(),
        }
    }

    /// Read `CLIENT_ID`, `CLIENT_SECRET` and `ORGANIZATION_CONTEXT`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build credentials from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::missing_field(key))
        };
        Ok(Self {
            client_id: get(ENV_CLIENT_ID)?,
            client_secret: get(ENV_CLIENT_SECRET)?,
            organization_context: get(ENV_ORGANIZATION_CONTEXT)?,
        })
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("organization_context", &self.organization_context)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.token_url, DEFAULT_TOKEN_URL);
        assert_eq!(config.audience, DEFAULT_AUDIENCE);
        assert_eq!(config.chunk_size, 5_368_709_120);
        assert_eq!(config.export_poll_interval, Duration::from_secs(10));
        assert_eq!(config.token_lifetime, Duration::from_secs(86_400));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::builder()
            .api_url("http://localhost:1234/graphql")
            .token_url("http://localhost:1234/oauth/token")
            .audience("test-audience")
            .chunk_size(1024)
            .export_poll_interval(Duration::from_millis(5))
            .user_agent("test-agent/1.0")
            .build();

        assert_eq!(config.api_url, "http://localhost:1234/graphql");
        assert_eq!(config.token_url, "http://localhost:1234/oauth/token");
        assert_eq!(config.audience, "test-audience");
        assert_eq!(config.chunk_size, 1024);
        assert_eq!(config.export_poll_interval, Duration::from_millis(5));
        assert_eq!(config.user_agent, "test-agent/1.0");
    }

    #[test]
    fn test_config_from_yaml_keeps_defaults() {
        let yaml = r"
api_url: https://staging.example.com/api/v1/graphql
chunk_size: 1048576
export_poll_interval: 2
";
        let config = ClientConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.api_url, "https://staging.example.com/api/v1/graphql");
        assert_eq!(config.chunk_size, 1_048_576);
        assert_eq!(config.export_poll_interval, Duration::from_secs(2));
        assert_eq!(config.token_url, DEFAULT_TOKEN_URL);
    }

    #[test]
    fn test_config_validate_rejects_bad_values() {
        let config = ClientConfig::builder().api_url("not a url").build();
        assert!(matches!(config.validate(), Err(Error::InvalidUrl(_))));

        let config = ClientConfig::builder().chunk_size(0).build();
        assert!(matches!(config.validate(), Err(Error::Config { .. })));

        let config = ClientConfig::builder().audience("").build();
        assert!(matches!(
            config.validate(),
            Err(Error::MissingConfigField { .. })
        ));
    }

    #[test]
    fn test_config_from_missing_file() {
        let result = ClientConfig::from_yaml_file("/definitely/not/here.yaml");
        assert!(matches!(result, Err(Error::FileNotFound { .. })));
    }

    #[test]
    fn test_credentials_from_lookup() {
        let env: HashMap<&str, &str> = [
            ("CLIENT_ID", "id"),
            ("CLIENT_SECRET", "secret"),
            ("ORGANIZATION_CONTEXT", "org"),
        ]
        .into_iter()
        .collect();

        let creds = Credentials::from_lookup(|k| env.get(k).map(ToString::to_string)).unwrap();
        assert_eq!(creds, Credentials::new("id", "secret", "org"));
    }

    #[test]
    fn test_credentials_missing_variable() {
        let result = Credentials::from_lookup(|k| (k == "CLIENT_ID").then(|| "id".to_string()));
        match result {
            Err(Error::MissingConfigField { field }) => assert_eq!(field, "CLIENT_SECRET"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_credentials_debug_redacts_secret() {
        let creds = Credentials::new("id", "super-secret", "org");
        let debug = format!("{creds:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
