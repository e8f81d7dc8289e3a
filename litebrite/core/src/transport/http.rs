//! HTTP Transport
//!
//! reqwest-backed implementation of [`DisplayTransport`]. Bodies are parsed as
//! JSON when possible; anything else is kept as a JSON string so callers always
//! receive a `serde_json::Value`.

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, trace};

use super::traits::{classify_response, DisplayTransport, TransportError};
use crate::config::DisplayConfig;

/// Display service client over HTTP
#[derive(Clone, Debug)]
pub struct HttpTransport {
    /// HTTP client (carries `User-Agent` and timeout)
    http_client: reqwest::Client,
    /// Log URLs and raw responses at debug level instead of trace
    debug: bool,
}

impl HttpTransport {
    /// Create a transport from configuration
    ///
    /// # Errors
    ///
    /// Returns `Network` if the HTTP client cannot be initialized (e.g. no TLS
    /// backend available).
    pub fn new(config: &DisplayConfig) -> Result<Self, TransportError> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            http_client,
            debug: config.debug,
        })
    }

    fn log_request(&self, url: &Url) {
        if self.debug {
            debug!(url = %url, "GET");
        } else {
            trace!(url = %url, "GET");
        }
    }

    fn log_response(&self, status: u16, body: &str) {
        if self.debug {
            debug!(status, body, "Response");
        } else {
            trace!(status, body, "Response");
        }
    }
}

/// Parse a response body, keeping non-JSON payloads as a string value
fn parse_body(text: String) -> Value {
    serde_json::from_str(&text).unwrap_or(Value::String(text))
}

#[async_trait]
impl DisplayTransport for HttpTransport {
    async fn get(&self, url: &Url) -> Result<Value, TransportError> {
        self.log_request(url);

        let response = self.http_client.get(url.clone()).send().await?;
        let status = response.status();
        let text = response.text().await?;
        self.log_response(status.as_u16(), &text);

        let body = classify_response(parse_body(text))?;
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }
        Ok(body)
    }
}
