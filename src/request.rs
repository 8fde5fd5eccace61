//! Request assembly and dispatch
//!
//! This module builds request descriptors for the assistant service and
//! hands them to the shared HTTP client. Assembly is synchronous and
//! performs no I/O: required parameters are checked first, path segments
//! are percent-encoded into the URL template, the mandatory `version`
//! query pair is appended, and default headers are merged with per-call
//! overrides before anything touches the network.

use crate::auth::Authenticator;
use crate::error::{ParlanceError, Result};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use url::Url;

/// An assembled request, ready for dispatch
///
/// Holds everything the transport needs: method, fully resolved URL
/// (path segments substituted, `version` query appended), merged headers,
/// and an optional JSON body. Construction never performs network I/O,
/// so operations can fail on validation without a request ever leaving
/// the process.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    /// HTTP method
    pub method: Method,
    /// Fully resolved request URL
    pub url: Url,
    /// Merged request headers
    pub headers: HeaderMap,
    /// JSON body, absent for bodyless requests
    pub body: Option<Value>,
}

impl RequestDescriptor {
    /// Assemble a descriptor for the given path segments
    ///
    /// Each segment is pushed onto the base URL path with percent-encoding,
    /// so an identifier containing `/` or whitespace cannot escape its
    /// segment. The `version` query pair is appended unconditionally and
    /// `Accept: application/json` is set as the default.
    ///
    /// # Errors
    ///
    /// Returns a `Config` error when the base URL does not parse or cannot
    /// carry a path.
    pub fn new(method: Method, base: &str, segments: &[&str], version: &str) -> Result<Self> {
        let mut url = Url::parse(base).map_err(|e| {
            ParlanceError::Config(format!("invalid service url '{}': {}", base, e))
        })?;
        {
            let mut path = url.path_segments_mut().map_err(|_| {
                ParlanceError::Config(format!("service url '{}' cannot carry a path", base))
            })?;
            path.pop_if_empty();
            for segment in segments {
                path.push(segment);
            }
        }
        url.query_pairs_mut().append_pair("version", version);

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        Ok(Self {
            method,
            url,
            headers,
            body: None,
        })
    }

    /// Attach a JSON body and set `Content-Type: application/json`
    pub fn json_body<T: Serialize>(mut self, body: &T) -> Result<Self> {
        self.body = Some(serde_json::to_value(body).map_err(ParlanceError::from)?);
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(self)
    }

    /// Merge configured default headers, overriding built-in defaults per key
    ///
    /// # Errors
    ///
    /// Returns a `Header` error when a name or value is not header-safe.
    pub fn apply_default_headers(&mut self, defaults: &HashMap<String, String>) -> Result<()> {
        for (name, value) in defaults {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ParlanceError::Header(format!("invalid header name '{}'", name)))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|_| ParlanceError::Header(format!("invalid value for header '{}'", name)))?;
            self.headers.insert(header_name, header_value);
        }
        Ok(())
    }

    /// Merge caller-supplied per-call headers, taking precedence per key
    ///
    /// Shallow override: a caller-supplied key replaces every configured
    /// value for that key. The caller's map is not retained, so defaults
    /// are untouched for subsequent calls.
    pub fn apply_header_overrides(&mut self, overrides: &HeaderMap) {
        for (name, value) in overrides.iter() {
            self.headers.insert(name.clone(), value.clone());
        }
    }
}

/// Check required parameters, yielding their values in declaration order
///
/// Every absent field is collected so the error names all of them at once,
/// not just the first.
///
/// # Errors
///
/// Returns `MissingParameters` listing each `None` field by name.
pub fn require_params<'a>(fields: &[(&str, Option<&'a str>)]) -> Result<Vec<&'a str>> {
    let missing: Vec<String> = fields
        .iter()
        .filter(|(_, value)| value.is_none())
        .map(|(name, _)| (*name).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ParlanceError::MissingParameters { fields: missing }.into());
    }
    Ok(fields.iter().filter_map(|(_, value)| *value).collect())
}

/// Dispatch a descriptor and parse the JSON response body
pub async fn dispatch<T: DeserializeOwned>(
    client: &Client,
    auth: &Authenticator,
    descriptor: RequestDescriptor,
) -> Result<T> {
    let response = send(client, auth, descriptor).await?;
    response.json().await.map_err(|e| {
        tracing::error!("Failed to parse service response: {}", e);
        ParlanceError::from(e).into()
    })
}

/// Dispatch a descriptor, discarding any response body
pub async fn dispatch_empty(
    client: &Client,
    auth: &Authenticator,
    descriptor: RequestDescriptor,
) -> Result<()> {
    send(client, auth, descriptor).await?;
    Ok(())
}

async fn send(
    client: &Client,
    auth: &Authenticator,
    descriptor: RequestDescriptor,
) -> Result<reqwest::Response> {
    let RequestDescriptor {
        method,
        url,
        mut headers,
        body,
    } = descriptor;

    auth.authorize(client, &mut headers).await?;

    tracing::debug!("Dispatching {} {}", method, url.path());

    let mut request = client.request(method, url).headers(headers);
    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request.send().await.map_err(|e| {
        tracing::error!("Request failed: {}", e);
        ParlanceError::from(e)
    })?;

    let status = response.status();
    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_default();
        let message = service_error_message(status, &error_text);
        tracing::warn!("Service returned {}: {}", status, message);
        return Err(ParlanceError::Service {
            status: status.as_u16(),
            message,
        }
        .into());
    }

    Ok(response)
}

/// Extract a human-readable message from a service error body
///
/// The service reports errors as `{"error": "..."}` or
/// `{"errors": [{"message": "..."}]}`; anything else falls back to the raw
/// body, or the status reason when the body is empty.
fn service_error_message(status: StatusCode, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(message) = value.get("error").and_then(|v| v.as_str()) {
            return message.to_string();
        }
        if let Some(message) = value
            .get("errors")
            .and_then(|v| v.as_array())
            .and_then(|errors| errors.first())
            .and_then(|e| e.get("message"))
            .and_then(|v| v.as_str())
        {
            return message.to_string();
        }
    }
    if body.trim().is_empty() {
        status
            .canonical_reason()
            .unwrap_or("unknown error")
            .to_string()
    } else {
        body.to_string()
    }
}
