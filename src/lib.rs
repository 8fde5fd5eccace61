//! Parlance - client bindings for a conversational assistant API
//!
//! This library provides a typed client for the assistant session/message
//! API: it validates required parameters, assembles HTTP requests, and
//! parses JSON responses into typed shapes. Sessions live entirely on the
//! server; the client only forwards identifiers and round-trips context
//! between turns.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `client`: the `AssistantClient` and its three operations
//! - `request`: request assembly (path templating, header merge, validation)
//! - `auth`: credential handling (basic, bearer, API-key token exchange)
//! - `types`: wire shapes for inputs, context, and responses
//! - `config`: construction-time configuration and validation
//! - `error`: error types and result aliases
//!
//! # Example
//!
//! ```no_run
//! use parlance::{AssistantClient, ClientConfig, CreateSessionParams, MessageParams};
//! use parlance::types::MessageInput;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = AssistantClient::new(ClientConfig::new("2024-08-15"))?;
//!
//!     let session = client
//!         .create_session(CreateSessionParams::new("my-assistant"))
//!         .await?;
//!     let response = client
//!         .message(
//!             MessageParams::new("my-assistant", &session.session_id)
//!                 .input(MessageInput::text("Hello")),
//!         )
//!         .await?;
//!     println!("{:?}", response.output.generic);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod request;
pub mod types;

// Re-export commonly used types
pub use auth::Authenticator;
pub use client::{AssistantClient, CreateSessionParams, DeleteSessionParams, MessageParams};
pub use config::{AuthConfig, ClientConfig};
pub use error::{ParlanceError, Result};
pub use types::{MessageContext, MessageInput, MessageResponse, SessionResponse};
