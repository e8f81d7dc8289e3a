//! Display Service Transport
//!
//! Every call to the display service goes through a [`DisplayTransport`]:
//! - [`HttpTransport`]: reqwest-backed GET with a fixed `User-Agent`
//! - [`Throttled`]: fixed delay before every request, wrapping any transport
//! - [`MockTransport`]: scripted double that records request URLs
//!
//! Responses are classified at this boundary. A body whose `result` field is
//! `"failure"` becomes [`TransportError::Rejected`], distinct from network
//! level failures, so callers never inspect raw payloads for errors.
//!
//! No retry happens here. Lease acquisition retries; row writes do not.

pub mod endpoints;
pub mod http;
pub mod mock;
pub mod throttle;
pub mod traits;

pub use endpoints::Endpoints;
pub use http::HttpTransport;
pub use mock::MockTransport;
pub use throttle::Throttled;
pub use traits::{classify_response, DisplayTransport, TransportError};
