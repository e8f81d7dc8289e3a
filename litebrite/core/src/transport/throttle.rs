//! Request Throttling
//!
//! A fixed-rate limiter: every request waits the configured delay before it is
//! sent, whatever happened to the previous one. Unlike a token bucket there is
//! no burst allowance and no adaptation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;

use super::traits::{DisplayTransport, TransportError};
use crate::config::DisplayConfig;

/// Wraps a transport with a fixed pre-request delay
#[derive(Clone, Debug)]
pub struct Throttled<T> {
    inner: T,
    delay: Duration,
}

impl<T> Throttled<T> {
    /// Throttle `inner` by `delay` per request
    pub fn new(inner: T, delay: Duration) -> Self {
        Self { inner, delay }
    }

    /// Throttle `inner` using the configured delay
    pub fn from_config(inner: T, config: &DisplayConfig) -> Self {
        Self::new(inner, config.throttle)
    }

    /// The delay applied before each request
    #[must_use]
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Borrow the wrapped transport
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: DisplayTransport> DisplayTransport for Throttled<T> {
    async fn get(&self, url: &Url) -> Result<Value, TransportError> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.inner.get(url).await
    }
}
