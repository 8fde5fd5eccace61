//! Configuration for the Parlance client
//!
//! This module defines the construction-time options recognized by the
//! client (API version date, endpoint override, credentials, default
//! headers) and validates them before any request can be issued.

use crate::error::{ParlanceError, Result};
use serde::Deserialize;
use std::collections::HashMap;

/// Default hosted endpoint for the assistant service
pub const DEFAULT_SERVICE_URL: &str = "https://api.parlance.cloud/assistant";

/// Default token exchange endpoint used by API-key authentication
pub const DEFAULT_TOKEN_URL: &str = "https://iam.parlance.cloud/identity/token";

/// Construction-time configuration for [`AssistantClient`](crate::client::AssistantClient)
///
/// `version` is mandatory: every request carries it as a query parameter,
/// and client construction fails when it is absent or not a calendar date.
///
/// # Examples
///
/// ```
/// use parlance::config::ClientConfig;
///
/// let config = ClientConfig::new("2024-08-15");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// API version date (`YYYY-MM-DD`), appended to every request
    #[serde(default)]
    pub version: String,

    /// Base endpoint; override for dedicated or test deployments
    #[serde(default = "default_service_url")]
    pub url: String,

    /// Credential configuration
    #[serde(default)]
    pub auth: AuthConfig,

    /// Default headers merged into every request
    #[serde(default)]
    pub headers: HashMap<String, String>,

    /// Timeout in seconds for the underlying HTTP client
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_service_url() -> String {
    DEFAULT_SERVICE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    90
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: String::new(),
            url: default_service_url(),
            auth: AuthConfig::default(),
            headers: HashMap::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ClientConfig {
    /// Create a configuration with the given API version date
    ///
    /// All other options take their defaults: hosted service URL, no
    /// credentials, no default headers.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Self::default()
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns a `Config` error when `version` is absent or not a valid
    /// `YYYY-MM-DD` date, when `url` is not an absolute URL, or when the
    /// credential combination is incoherent.
    pub fn validate(&self) -> Result<()> {
        if self.version.trim().is_empty() {
            return Err(ParlanceError::Config(
                "version is required and must be a YYYY-MM-DD date".to_string(),
            )
            .into());
        }

        if chrono::NaiveDate::parse_from_str(&self.version, "%Y-%m-%d").is_err() {
            return Err(ParlanceError::Config(format!(
                "version must be a YYYY-MM-DD date, got '{}'",
                self.version
            ))
            .into());
        }

        let url = url::Url::parse(&self.url).map_err(|e| {
            ParlanceError::Config(format!("invalid service url '{}': {}", self.url, e))
        })?;
        if url.cannot_be_a_base() {
            return Err(ParlanceError::Config(format!(
                "service url '{}' cannot carry a path",
                self.url
            ))
            .into());
        }

        self.auth.validate()
    }
}

/// Credential configuration
///
/// Exactly one authentication mode is derived from the populated fields:
/// `username`/`password` for Basic, `bearer_token` for a static bearer
/// header, `apikey` (with optional `token_url` override) for token-exchange
/// bearer auth, or `use_unauthenticated` to skip the Authorization header.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// Basic-auth user name; requires `password`
    pub username: Option<String>,
    /// Basic-auth password; requires `username`
    pub password: Option<String>,
    /// API key exchanged at the token endpoint for a bearer token
    pub apikey: Option<String>,
    /// Static bearer token applied as-is
    pub bearer_token: Option<String>,
    /// Token endpoint override; only meaningful with `apikey`
    pub token_url: Option<String>,
    /// Skip the Authorization header entirely
    #[serde(default)]
    pub use_unauthenticated: bool,
}

impl AuthConfig {
    /// Whether any credential field is populated
    pub fn has_credentials(&self) -> bool {
        self.username.is_some()
            || self.password.is_some()
            || self.apikey.is_some()
            || self.bearer_token.is_some()
    }

    /// Validate the credential combination
    ///
    /// # Errors
    ///
    /// Returns a `Config` error for partial Basic credentials, a token
    /// endpoint without an API key, multiple credential kinds at once, or
    /// `use_unauthenticated` combined with credentials.
    pub fn validate(&self) -> Result<()> {
        if self.username.is_some() != self.password.is_some() {
            return Err(ParlanceError::Config(
                "username and password must be supplied together".to_string(),
            )
            .into());
        }

        if self.token_url.is_some() && self.apikey.is_none() {
            return Err(ParlanceError::Config(
                "token_url is only valid together with apikey".to_string(),
            )
            .into());
        }

        let kinds = [
            self.username.is_some(),
            self.apikey.is_some(),
            self.bearer_token.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count();
        if kinds > 1 {
            return Err(ParlanceError::Config(
                "supply exactly one of username/password, apikey, or bearer_token".to_string(),
            )
            .into());
        }

        if self.use_unauthenticated && self.has_credentials() {
            return Err(ParlanceError::Config(
                "use_unauthenticated cannot be combined with credentials".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
