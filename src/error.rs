//! Error types for Parlance
//!
//! This module defines all error types used throughout the client,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Parlance operations
///
/// This enum encompasses all possible errors that can occur during
/// client construction, request assembly, authentication, and the
/// HTTP round trip to the assistant service.
#[derive(Error, Debug)]
pub enum ParlanceError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Required parameters absent from an operation call
    ///
    /// Raised locally before any network I/O, naming every missing field.
    #[error("Missing required parameters: {}", .fields.join(", "))]
    MissingParameters {
        /// Names of the absent required fields, in declaration order
        fields: Vec<String>,
    },

    /// Authentication errors (credential exchange, header construction)
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Non-2xx response from the assistant service
    #[error("Service error {status}: {message}")]
    Service {
        /// HTTP status code returned by the service
        status: u16,
        /// Message extracted from the service error body
        message: String,
    },

    /// Invalid header name or value
    #[error("Header error: {0}")]
    Header(String),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ParlanceError {
    /// Build a `MissingParameters` error from field names
    pub fn missing_parameters<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ParlanceError::MissingParameters {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

/// Result type alias for Parlance operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;
