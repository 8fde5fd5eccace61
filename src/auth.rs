//! Authentication for the Parlance client
//!
//! This module derives an authenticator from the credential configuration
//! and applies it to outgoing requests: Basic credentials, a static bearer
//! token, API-key token exchange with in-memory caching, or no header at
//! all for unauthenticated deployments.

use crate::config::{AuthConfig, DEFAULT_TOKEN_URL};
use crate::error::{ParlanceError, Result};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::Deserialize;
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

/// Exchanged tokens are refreshed this many seconds before expiry
const TOKEN_REFRESH_WINDOW_SECS: u64 = 60;

/// Token lifetime assumed when the endpoint omits `expires_in`
const DEFAULT_TOKEN_TTL_SECS: u64 = 3600;

/// Authentication modes for the assistant service
///
/// Built once at client construction from [`AuthConfig`] and shared across
/// all calls. Applying the authenticator only mutates the per-request
/// header map, never the client configuration.
#[derive(Debug, Clone)]
pub enum Authenticator {
    /// `Authorization: Basic <base64(username:password)>`
    Basic {
        /// Basic-auth user name
        username: String,
        /// Basic-auth password
        password: String,
    },
    /// `Authorization: Bearer <token>` with a caller-supplied token
    Bearer {
        /// Static bearer token
        token: String,
    },
    /// Bearer token obtained by exchanging an API key at the token endpoint
    TokenExchange(TokenExchangeAuthenticator),
    /// No Authorization header
    Unauthenticated,
}

impl Authenticator {
    /// Derive the authenticator from credential configuration
    ///
    /// The configuration must already have passed [`AuthConfig::validate`];
    /// a configuration without any populated credential field resolves to
    /// `Unauthenticated`.
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        config.validate()?;

        if let (Some(username), Some(password)) = (&config.username, &config.password) {
            return Ok(Authenticator::Basic {
                username: username.clone(),
                password: password.clone(),
            });
        }
        if let Some(token) = &config.bearer_token {
            return Ok(Authenticator::Bearer {
                token: token.clone(),
            });
        }
        if let Some(apikey) = &config.apikey {
            return Ok(Authenticator::TokenExchange(
                TokenExchangeAuthenticator::new(apikey.clone(), config.token_url.clone()),
            ));
        }

        Ok(Authenticator::Unauthenticated)
    }

    /// Insert the Authorization header for one outgoing request
    ///
    /// # Errors
    ///
    /// Returns an `Authentication` error when the token exchange fails or
    /// when credentials cannot be encoded into a header value.
    ///
    /// # Examples
    ///
    /// ```
    /// use parlance::auth::Authenticator;
    /// use reqwest::header::{HeaderMap, AUTHORIZATION};
    ///
    /// # tokio_test::block_on(async {
    /// let auth = Authenticator::Bearer { token: "tok".to_string() };
    /// let mut headers = HeaderMap::new();
    /// auth.authorize(&reqwest::Client::new(), &mut headers)
    ///     .await
    ///     .unwrap();
    /// assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer tok");
    /// # });
    /// ```
    pub async fn authorize(&self, client: &Client, headers: &mut HeaderMap) -> Result<()> {
        match self {
            Authenticator::Basic { username, password } => {
                let encoded = BASE64.encode(format!("{}:{}", username, password));
                headers.insert(AUTHORIZATION, header_value(format!("Basic {}", encoded))?);
            }
            Authenticator::Bearer { token } => {
                headers.insert(AUTHORIZATION, header_value(format!("Bearer {}", token))?);
            }
            Authenticator::TokenExchange(exchange) => {
                let token = exchange.token(client).await?;
                headers.insert(AUTHORIZATION, header_value(format!("Bearer {}", token))?);
            }
            Authenticator::Unauthenticated => {}
        }
        Ok(())
    }
}

fn header_value(value: String) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(&value)
        .map_err(|_| ParlanceError::Authentication("credentials are not header-safe".to_string()))?;
    value.set_sensitive(true);
    Ok(value)
}

/// API-key authenticator with an in-memory token cache
///
/// The API key is exchanged at the token endpoint for a short-lived bearer
/// token. The token is cached together with its expiry and re-exchanged
/// when a request finds it within the refresh window. Uses RwLock for
/// cheap reads; two calls racing past an expired token may both exchange,
/// last write wins.
#[derive(Debug, Clone)]
pub struct TokenExchangeAuthenticator {
    apikey: String,
    token_url: String,
    cache: Arc<RwLock<Option<CachedToken>>>,
}

/// Cached bearer token and its expiry (epoch seconds)
#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: u64,
}

/// Response from the token endpoint
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_token_ttl")]
    expires_in: u64,
}

fn default_token_ttl() -> u64 {
    DEFAULT_TOKEN_TTL_SECS
}

impl TokenExchangeAuthenticator {
    /// Create an authenticator for the given API key
    ///
    /// `token_url` overrides the hosted token endpoint, for dedicated or
    /// test deployments.
    pub fn new(apikey: String, token_url: Option<String>) -> Self {
        Self {
            apikey,
            token_url: token_url.unwrap_or_else(|| DEFAULT_TOKEN_URL.to_string()),
            cache: Arc::new(RwLock::new(None)),
        }
    }

    /// Return a valid bearer token, exchanging the API key if needed
    async fn token(&self, client: &Client) -> Result<String> {
        if let Ok(cache) = self.cache.read() {
            if let Some(cached) = cache.as_ref() {
                if !Self::is_expiring(cached.expires_at) {
                    return Ok(cached.access_token.clone());
                }
            }
        }

        let token = self.exchange(client).await?;

        if let Ok(mut cache) = self.cache.write() {
            *cache = Some(token.clone());
        }

        Ok(token.access_token)
    }

    /// Exchange the API key at the token endpoint
    async fn exchange(&self, client: &Client) -> Result<CachedToken> {
        tracing::debug!("Exchanging API key at token endpoint: {}", self.token_url);

        let response = client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "urn:params:oauth:grant-type:apikey"),
                ("apikey", self.apikey.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Token exchange request failed: {}", e);
                ParlanceError::Authentication(format!("token exchange failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Token endpoint returned {}: {}", status, error_text);
            return Err(ParlanceError::Authentication(format!(
                "token endpoint returned {}: {}",
                status, error_text
            ))
            .into());
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse token response: {}", e);
            ParlanceError::Authentication(format!("invalid token response: {}", e))
        })?;

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at: epoch_secs() + token.expires_in,
        })
    }

    /// Whether a token with the given expiry is inside the refresh window
    fn is_expiring(expires_at: u64) -> bool {
        epoch_secs() + TOKEN_REFRESH_WINDOW_SECS >= expires_at
    }

    #[cfg(test)]
    fn seed_cache(&self, access_token: &str, expires_at: u64) {
        *self.cache.write().unwrap() = Some(CachedToken {
            access_token: access_token.to_string(),
            expires_at,
        });
    }
}

/// Current time as epoch seconds
fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_from_config_basic() {
        let config = AuthConfig {
            username: Some("user".to_string()),
            password: Some("pass".to_string()),
            ..AuthConfig::default()
        };
        let auth = Authenticator::from_config(&config).unwrap();
        assert!(matches!(auth, Authenticator::Basic { .. }));
    }

    #[test]
    fn test_from_config_bearer() {
        let config = AuthConfig {
            bearer_token: Some("token".to_string()),
            ..AuthConfig::default()
        };
        let auth = Authenticator::from_config(&config).unwrap();
        assert!(matches!(auth, Authenticator::Bearer { .. }));
    }

    #[test]
    fn test_from_config_apikey() {
        let config = AuthConfig {
            apikey: Some("key".to_string()),
            ..AuthConfig::default()
        };
        let auth = Authenticator::from_config(&config).unwrap();
        assert!(matches!(auth, Authenticator::TokenExchange(_)));
    }

    #[test]
    fn test_from_config_empty_is_unauthenticated() {
        let auth = Authenticator::from_config(&AuthConfig::default()).unwrap();
        assert!(matches!(auth, Authenticator::Unauthenticated));
    }

    #[test]
    fn test_from_config_rejects_partial_basic() {
        let config = AuthConfig {
            username: Some("user".to_string()),
            ..AuthConfig::default()
        };
        assert!(Authenticator::from_config(&config).is_err());
    }

    #[tokio::test]
    async fn test_basic_header_encoding() {
        let auth = Authenticator::Basic {
            username: "user".to_string(),
            password: "pass".to_string(),
        };
        let client = Client::new();
        let mut headers = HeaderMap::new();
        auth.authorize(&client, &mut headers).await.unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Basic dXNlcjpwYXNz");
    }

    #[tokio::test]
    async fn test_bearer_header() {
        let auth = Authenticator::Bearer {
            token: "tok_123".to_string(),
        };
        let client = Client::new();
        let mut headers = HeaderMap::new();
        auth.authorize(&client, &mut headers).await.unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer tok_123");
    }

    #[tokio::test]
    async fn test_unauthenticated_adds_no_header() {
        let auth = Authenticator::Unauthenticated;
        let client = Client::new();
        let mut headers = HeaderMap::new();
        auth.authorize(&client, &mut headers).await.unwrap();
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[tokio::test]
    async fn test_token_exchange_and_cache() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/identity/token"))
            .and(body_string_contains("apikey=secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "exchanged_token",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let auth = TokenExchangeAuthenticator::new(
            "secret".to_string(),
            Some(format!("{}/identity/token", server.uri())),
        );
        let client = Client::new();

        // Two requests, one exchange
        assert_eq!(auth.token(&client).await.unwrap(), "exchanged_token");
        assert_eq!(auth.token(&client).await.unwrap(), "exchanged_token");
    }

    #[tokio::test]
    async fn test_token_exchange_refreshes_expired_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/identity/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "fresh_token",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let auth = TokenExchangeAuthenticator::new(
            "secret".to_string(),
            Some(format!("{}/identity/token", server.uri())),
        );
        auth.seed_cache("stale_token", epoch_secs().saturating_sub(10));

        let client = Client::new();
        assert_eq!(auth.token(&client).await.unwrap(), "fresh_token");
    }

    #[tokio::test]
    async fn test_token_exchange_surfaces_endpoint_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/identity/token"))
            .respond_with(ResponseTemplate::new(400).set_body_string("invalid apikey"))
            .mount(&server)
            .await;

        let auth = TokenExchangeAuthenticator::new(
            "bad".to_string(),
            Some(format!("{}/identity/token", server.uri())),
        );
        let err = auth.token(&Client::new()).await.unwrap_err();
        assert!(err.to_string().contains("token endpoint returned 400"));
    }

    #[test]
    fn test_is_expiring_inside_window() {
        assert!(TokenExchangeAuthenticator::is_expiring(epoch_secs() + 30));
        assert!(TokenExchangeAuthenticator::is_expiring(
            epoch_secs().saturating_sub(10)
        ));
    }

    #[test]
    fn test_is_expiring_fresh_token() {
        assert!(!TokenExchangeAuthenticator::is_expiring(
            epoch_secs() + 3600
        ));
    }

    #[test]
    fn test_token_response_defaults_ttl() {
        let token: TokenResponse =
            serde_json::from_str(r#"{ "access_token": "tok" }"#).unwrap();
        assert_eq!(token.expires_in, DEFAULT_TOKEN_TTL_SECS);
    }
}
