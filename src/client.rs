//! Assistant session/message client
//!
//! This module implements the three operations of the session API:
//! creating a session, deleting a session, and sending a message within
//! a session. Each operation validates its required identifiers, builds
//! a request descriptor without touching the network, and delegates the
//! round trip to the shared HTTP client.

use crate::auth::Authenticator;
use crate::config::ClientConfig;
use crate::error::{ParlanceError, Result};
use crate::request::{dispatch, dispatch_empty, require_params, RequestDescriptor};
use crate::types::{MessageContext, MessageInput, MessageResponse, SessionResponse};

use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use serde::Serialize;
use std::time::Duration;

/// Client for the assistant session/message API
///
/// The client retains no state across calls: sessions live entirely on
/// the server, and each operation works on its own locally constructed
/// request descriptor. Calls may be issued concurrently; no ordering or
/// mutual exclusion is imposed between them.
///
/// # Examples
///
/// ```no_run
/// use parlance::client::{AssistantClient, CreateSessionParams, MessageParams};
/// use parlance::config::ClientConfig;
/// use parlance::types::MessageInput;
///
/// # async fn example() -> parlance::error::Result<()> {
/// let client = AssistantClient::new(ClientConfig::new("2024-08-15"))?;
///
/// let session = client
///     .create_session(CreateSessionParams::new("my-assistant"))
///     .await?;
///
/// let response = client
///     .message(
///         MessageParams::new("my-assistant", &session.session_id)
///             .input(MessageInput::text("Hello")),
///     )
///     .await?;
/// # Ok(())
/// # }
/// ```
pub struct AssistantClient {
    client: Client,
    config: ClientConfig,
    authenticator: Authenticator,
}

/// Parameters for [`AssistantClient::create_session`]
#[derive(Debug, Clone, Default)]
pub struct CreateSessionParams {
    /// Assistant identifier. Required.
    pub assistant_id: Option<String>,
    /// Per-call header overrides
    pub headers: Option<HeaderMap>,
}

impl CreateSessionParams {
    /// Creates parameters for the given assistant
    pub fn new(assistant_id: impl Into<String>) -> Self {
        Self {
            assistant_id: Some(assistant_id.into()),
            headers: None,
        }
    }
}

/// Parameters for [`AssistantClient::delete_session`]
#[derive(Debug, Clone, Default)]
pub struct DeleteSessionParams {
    /// Assistant identifier. Required.
    pub assistant_id: Option<String>,
    /// Session identifier. Required.
    pub session_id: Option<String>,
    /// Per-call header overrides
    pub headers: Option<HeaderMap>,
}

impl DeleteSessionParams {
    /// Creates parameters for the given assistant and session
    pub fn new(assistant_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            assistant_id: Some(assistant_id.into()),
            session_id: Some(session_id.into()),
            headers: None,
        }
    }
}

/// Parameters for [`AssistantClient::message`]
#[derive(Debug, Clone, Default)]
pub struct MessageParams {
    /// Assistant identifier. Required.
    pub assistant_id: Option<String>,
    /// Session identifier. Required.
    pub session_id: Option<String>,
    /// User input for this turn
    pub input: Option<MessageInput>,
    /// Context carried over from the previous turn
    pub context: Option<MessageContext>,
    /// Per-call header overrides
    pub headers: Option<HeaderMap>,
}

impl MessageParams {
    /// Creates parameters for the given assistant and session
    pub fn new(assistant_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            assistant_id: Some(assistant_id.into()),
            session_id: Some(session_id.into()),
            ..Self::default()
        }
    }

    /// Sets the user input for this turn
    pub fn input(mut self, input: MessageInput) -> Self {
        self.input = Some(input);
        self
    }

    /// Sets the context carried over from the previous turn
    pub fn context(mut self, context: MessageContext) -> Self {
        self.context = Some(context);
        self
    }
}

/// Request body for a message turn; absent fields are not serialized
#[derive(Debug, Serialize)]
struct MessageRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    input: Option<&'a MessageInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    context: Option<&'a MessageContext>,
}

impl AssistantClient {
    /// Create a new client from configuration
    ///
    /// # Arguments
    ///
    /// * `config` - Client configuration; `version` is mandatory
    ///
    /// # Errors
    ///
    /// Returns a `Config` error when the configuration does not validate
    /// (missing `version`, invalid URL, incoherent credentials) or when
    /// HTTP client initialization fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use parlance::client::AssistantClient;
    /// use parlance::config::ClientConfig;
    ///
    /// let client = AssistantClient::new(ClientConfig::new("2024-08-15"));
    /// assert!(client.is_ok());
    /// ```
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let authenticator = Authenticator::from_config(&config.auth)?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(concat!("parlance/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ParlanceError::Config(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized assistant client: url={}, version={}",
            config.url,
            config.version
        );

        Ok(Self {
            client,
            config,
            authenticator,
        })
    }

    /// Get the configured API version date
    pub fn version(&self) -> &str {
        &self.config.version
    }

    /// Get the configured base endpoint
    pub fn url(&self) -> &str {
        &self.config.url
    }

    /// Create a session
    ///
    /// `POST /v2/assistants/{assistant_id}/sessions` with an empty body.
    /// The returned session identifier is opaque; the server expires idle
    /// sessions on its own schedule.
    ///
    /// # Errors
    ///
    /// Returns `MissingParameters` before any network I/O when
    /// `assistant_id` is absent; transport and service errors are passed
    /// through unchanged.
    pub async fn create_session(&self, params: CreateSessionParams) -> Result<SessionResponse> {
        let descriptor = self.build_create_session(&params)?;
        dispatch(&self.client, &self.authenticator, descriptor).await
    }

    /// Delete a session
    ///
    /// `DELETE /v2/assistants/{assistant_id}/sessions/{session_id}`. The
    /// response body is empty.
    pub async fn delete_session(&self, params: DeleteSessionParams) -> Result<()> {
        let descriptor = self.build_delete_session(&params)?;
        dispatch_empty(&self.client, &self.authenticator, descriptor).await
    }

    /// Send a message within a session
    ///
    /// `POST /v2/assistants/{assistant_id}/sessions/{session_id}/message`.
    /// The body carries the optional `input` and `context`; fields that
    /// were not supplied are omitted, never serialized as null. Context is
    /// round-tripped unchanged between turns — the client never interprets
    /// it.
    ///
    /// # Errors
    ///
    /// Returns `MissingParameters` before any network I/O when
    /// `assistant_id` or `session_id` is absent; transport and service
    /// errors are passed through unchanged.
    pub async fn message(&self, params: MessageParams) -> Result<MessageResponse> {
        let descriptor = self.build_message(&params)?;
        dispatch(&self.client, &self.authenticator, descriptor).await
    }

    fn build_create_session(&self, params: &CreateSessionParams) -> Result<RequestDescriptor> {
        let ids = require_params(&[("assistant_id", params.assistant_id.as_deref())])?;

        let mut descriptor = RequestDescriptor::new(
            Method::POST,
            &self.config.url,
            &["v2", "assistants", ids[0], "sessions"],
            &self.config.version,
        )?;
        self.finish(&mut descriptor, params.headers.as_ref())?;
        Ok(descriptor)
    }

    fn build_delete_session(&self, params: &DeleteSessionParams) -> Result<RequestDescriptor> {
        let ids = require_params(&[
            ("assistant_id", params.assistant_id.as_deref()),
            ("session_id", params.session_id.as_deref()),
        ])?;

        let mut descriptor = RequestDescriptor::new(
            Method::DELETE,
            &self.config.url,
            &["v2", "assistants", ids[0], "sessions", ids[1]],
            &self.config.version,
        )?;
        self.finish(&mut descriptor, params.headers.as_ref())?;
        Ok(descriptor)
    }

    fn build_message(&self, params: &MessageParams) -> Result<RequestDescriptor> {
        let ids = require_params(&[
            ("assistant_id", params.assistant_id.as_deref()),
            ("session_id", params.session_id.as_deref()),
        ])?;

        let body = MessageRequest {
            input: params.input.as_ref(),
            context: params.context.as_ref(),
        };

        let mut descriptor = RequestDescriptor::new(
            Method::POST,
            &self.config.url,
            &["v2", "assistants", ids[0], "sessions", ids[1], "message"],
            &self.config.version,
        )?
        .json_body(&body)?;
        self.finish(&mut descriptor, params.headers.as_ref())?;
        Ok(descriptor)
    }

    /// Merge configured defaults, then per-call overrides
    fn finish(
        &self,
        descriptor: &mut RequestDescriptor,
        overrides: Option<&HeaderMap>,
    ) -> Result<()> {
        descriptor.apply_default_headers(&self.config.headers)?;
        if let Some(headers) = overrides {
            descriptor.apply_header_overrides(headers);
        }
        Ok(())
    }
}
