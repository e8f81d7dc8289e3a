//! Write Leases
//!
//! The display only accepts writes that carry a lease code. A [`Lease`] is
//! either wrapped around a code the operator already holds (no network call)
//! or acquired from the service by a [`LeaseManager`].
//!
//! Acquisition blocks the caller until the service grants a lease. Failures of
//! any kind are logged and retried after a fixed delay. The default
//! [`RetryPolicy`] never gives up: acquisition is a one-time startup step, so
//! waiting out an unreachable display is preferable to exiting.
//!
//! Expiry is advisory. Nothing here renews, releases, or checks it.

use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::DisplayConfig;
use crate::transport::{DisplayTransport, Endpoints, TransportError};

/// Errors from lease acquisition
#[derive(Clone, Debug, Error, PartialEq)]
pub enum LeaseError {
    /// A zero-minute lease was requested
    #[error("Lease duration must be at least one minute")]
    InvalidDuration,

    /// The request URL could not be built or the transport failed outright
    #[error("Lease request failed: {0}")]
    Transport(#[from] TransportError),

    /// A bounded retry policy ran out of attempts
    #[error("No lease after {attempts} attempts: {last_error}")]
    Exhausted {
        /// Attempts made
        attempts: u32,
        /// Error from the final attempt
        last_error: TransportError,
    },
}

/// An authorization to write to the display
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lease {
    code: String,
    expiry: Option<String>,
}

impl Lease {
    /// Wrap an existing lease code
    pub fn from_code(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            expiry: None,
        }
    }

    /// Wrap a code together with the expiry reported by the service
    pub fn with_expiry(code: impl Into<String>, expiry: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            expiry: Some(expiry.into()),
        }
    }

    /// Parse a `get_lease` response body
    ///
    /// `lease_code` and `lease_expiry` may be strings or numbers.
    ///
    /// # Errors
    ///
    /// Returns `MalformedResponse` if `lease_code` is missing or empty.
    pub fn from_response(body: &Value) -> Result<Self, TransportError> {
        let code = body
            .get("lease_code")
            .and_then(scalar_to_string)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                TransportError::MalformedResponse(format!("no lease_code in {body}"))
            })?;
        let expiry = body.get("lease_expiry").and_then(scalar_to_string);

        Ok(Self { code, expiry })
    }

    /// The lease code sent with every write
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The expiry exactly as the service reported it
    #[must_use]
    pub fn expiry(&self) -> Option<&str> {
        self.expiry.as_deref()
    }

    /// The expiry as a timestamp, if it is RFC 3339 or integer Unix seconds
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.expiry.as_deref()?.trim();
        if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
            return Some(ts.with_timezone(&Utc));
        }
        raw.parse::<i64>()
            .ok()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
    }
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// How lease acquisition retries
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts before giving up (None = unbounded)
    pub max_attempts: Option<u32>,
    /// Fixed delay between attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: None,
            delay: Duration::from_secs(15),
        }
    }
}

impl RetryPolicy {
    /// Retry forever with a fixed delay
    #[must_use]
    pub fn unbounded(delay: Duration) -> Self {
        Self {
            max_attempts: None,
            delay,
        }
    }

    /// Give up after `max_attempts` attempts
    #[must_use]
    pub fn bounded(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: Some(max_attempts),
            delay,
        }
    }

    /// Policy described by configuration
    #[must_use]
    pub fn from_config(config: &DisplayConfig) -> Self {
        Self {
            max_attempts: config.lease_max_attempts,
            delay: config.lease_retry_delay,
        }
    }

    /// Whether another attempt is allowed after `attempts` have been made
    #[must_use]
    pub fn allows_another(&self, attempts: u32) -> bool {
        !matches!(self.max_attempts, Some(max) if attempts >= max)
    }
}

/// Acquires leases through a transport
pub struct LeaseManager<T> {
    transport: T,
    endpoints: Endpoints,
    policy: RetryPolicy,
}

impl<T: DisplayTransport> LeaseManager<T> {
    /// Create a manager with an explicit retry policy
    pub fn new(transport: T, endpoints: Endpoints, policy: RetryPolicy) -> Self {
        Self {
            transport,
            endpoints,
            policy,
        }
    }

    /// Create a manager from configuration
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the configured base URL is unusable.
    pub fn from_config(
        transport: T,
        config: &DisplayConfig,
    ) -> Result<Self, crate::config::ConfigError> {
        Ok(Self::new(
            transport,
            Endpoints::from_config(config)?,
            RetryPolicy::from_config(config),
        ))
    }

    /// The active retry policy
    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Borrow the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Acquire a lease for `minutes`, retrying per policy
    ///
    /// With the default policy this only returns once the service grants a
    /// lease.
    ///
    /// # Errors
    ///
    /// - `InvalidDuration` for `minutes == 0`, before any request
    /// - `Transport` if the request URL cannot be built
    /// - `Exhausted` when a bounded policy runs out of attempts
    pub async fn acquire(&self, minutes: u32) -> Result<Lease, LeaseError> {
        if minutes == 0 {
            return Err(LeaseError::InvalidDuration);
        }
        let url = self.endpoints.lease(minutes)?;

        let mut attempts: u32 = 0;
        loop {
            attempts += 1;
            let outcome = self
                .transport
                .get(&url)
                .await
                .and_then(|body| Lease::from_response(&body));

            match outcome {
                Ok(lease) => {
                    info!(
                        attempts,
                        expiry = lease.expiry().unwrap_or("unknown"),
                        "Lease acquired"
                    );
                    return Ok(lease);
                }
                Err(last_error) if !self.policy.allows_another(attempts) => {
                    warn!(attempts, error = %last_error, "Giving up on lease");
                    return Err(LeaseError::Exhausted {
                        attempts,
                        last_error,
                    });
                }
                Err(e) => {
                    warn!(
                        attempts,
                        error = %e,
                        "Could not get lease. Retrying in {}s",
                        self.policy.delay.as_secs_f32()
                    );
                    tokio::time::sleep(self.policy.delay).await;
                }
            }
        }
    }
}
