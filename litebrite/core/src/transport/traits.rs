//! Transport Traits
//!
//! The single seam between the display client and the network.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while talking to the display service
#[derive(Clone, Debug, Error, PartialEq)]
pub enum TransportError {
    /// The request never produced a response (connect, timeout, body read)
    #[error("Request failed: {0}")]
    Network(String),

    /// The service answered with a non-success HTTP status
    #[error("Service returned HTTP {status}")]
    Status {
        /// HTTP status code
        status: u16,
    },

    /// The service answered `result: "failure"`
    #[error("Service rejected request: {body}")]
    Rejected {
        /// The full parsed response
        body: Value,
    },

    /// A successful response was missing required fields
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// A request URL could not be built
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl TransportError {
    /// Whether the service itself refused the request
    ///
    /// `false` means the failure happened before or outside the service's
    /// protocol (network, HTTP status, malformed payload).
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

/// Classify a parsed response body
///
/// # Errors
///
/// Returns `Rejected` when the body is an object whose `result` is `"failure"`.
pub fn classify_response(body: Value) -> Result<Value, TransportError> {
    if body.get("result").and_then(Value::as_str) == Some("failure") {
        return Err(TransportError::Rejected { body });
    }
    Ok(body)
}

/// Issues GET requests against the display service
///
/// Implementations return the parsed response on success and never retry.
#[async_trait]
pub trait DisplayTransport: Send + Sync {
    /// Send a GET request and classify the response
    async fn get(&self, url: &Url) -> Result<Value, TransportError>;
}

#[async_trait]
impl<T: DisplayTransport + ?Sized> DisplayTransport for Arc<T> {
    async fn get(&self, url: &Url) -> Result<Value, TransportError> {
        (**self).get(url).await
    }
}

#[async_trait]
impl<T: DisplayTransport + ?Sized> DisplayTransport for &T {
    async fn get(&self, url: &Url) -> Result<Value, TransportError> {
        (**self).get(url).await
    }
}
