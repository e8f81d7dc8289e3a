//! Scripted Transport for Tests
//!
//! Replays queued outcomes in order and records every requested URL. Once the
//! script is exhausted every request succeeds with `{"result": "success"}`.
//!
//! # Usage
//!
//! ```
//! use litebrite_core::transport::MockTransport;
//!
//! let mock = MockTransport::new();
//! mock.push_failure();
//! mock.push_ok(serde_json::json!({"result": "success", "lease_code": "abc"}));
//! assert_eq!(mock.request_count(), 0);
//! ```

use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::Url;
use serde_json::{json, Value};

use super::traits::{classify_response, DisplayTransport, TransportError};

/// In-memory [`DisplayTransport`] with a scripted response queue
#[derive(Debug, Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Result<Value, TransportError>>>,
    requests: Mutex<Vec<String>>,
}

impl MockTransport {
    /// Create a mock that succeeds on every request
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response body; it is classified like a real response
    pub fn push_ok(&self, body: Value) {
        self.script.lock().push_back(classify_response(body));
    }

    /// Queue a `result: "failure"` rejection
    pub fn push_failure(&self) {
        self.push_ok(json!({"result": "failure"}));
    }

    /// Queue an arbitrary error
    pub fn push_err(&self, err: TransportError) {
        self.script.lock().push_back(Err(err));
    }

    /// Queue `n` identical rejections
    pub fn push_failures(&self, n: usize) {
        for _ in 0..n {
            self.push_failure();
        }
    }

    /// URLs requested so far, in order
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }

    /// Number of requests made so far
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Outcomes still queued
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }
}

#[async_trait]
impl DisplayTransport for MockTransport {
    async fn get(&self, url: &Url) -> Result<Value, TransportError> {
        self.requests.lock().push(url.to_string());
        self.script
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(json!({"result": "success"})))
    }
}
