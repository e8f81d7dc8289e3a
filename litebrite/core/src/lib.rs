//! LiteBrite Core - Display Transport and Text Encoding
//!
//! Drives a LiteBrite character display over its HTTP control API: acquire a
//! write lease, encode text into the fixed grid, and send the grid one row at
//! a time through a throttled transport.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────┐     text      ┌───────────────────────────────┐
//! │ ContentProducer  │ ────────────► │ DisplaySink                   │
//! │ (text, clock,    │               │  ├─ ConsoleSink (dry run)     │
//! │  feed headlines) │               │  └─ DisplayWriter (live)      │
//! └──────────────────┘               │       │ ContentEncoder        │
//!                                    │       │ Lease                 │
//!                                    └───────┼───────────────────────┘
//!                                            │ one GET per row
//!                                    ┌───────▼───────────────────────┐
//!                                    │ Throttled<HttpTransport>      │
//!                                    └───────┬───────────────────────┘
//!                                            │
//!                                  display service (get_lease, write)
//! ```
//!
//! # Quick Start
//!
//! ```ignore
//! use litebrite_core::{
//!     load_config, show, DisplayWriter, HttpTransport, LeaseManager, Throttled,
//! };
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     let transport = Arc::new(Throttled::from_config(HttpTransport::new(&config)?, &config));
//!
//!     let lease = LeaseManager::from_config(transport.clone(), &config)?
//!         .acquire(config.lease_minutes)
//!         .await?;
//!     let writer = DisplayWriter::from_config(transport, lease, &config)?;
//!
//!     show(&writer, "HELLO WORLD").await?;
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`config`]: layered configuration (defaults, TOML, env, CLI)
//! - [`transport`]: throttled HTTP transport, endpoints, response classification
//! - [`lease`]: lease values and acquisition with retry
//! - [`encoder`]: text to fixed-width grid rows
//! - [`writer`]: live and console sinks
//! - [`producers`]: content producers

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod encoder;
pub mod lease;
pub mod producers;
pub mod transport;
pub mod writer;

pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    ConfigSource, DisplayConfig, GridConfig,
};
pub use encoder::ContentEncoder;
pub use lease::{Lease, LeaseError, LeaseManager, RetryPolicy};
pub use producers::{Clock, ContentProducer, FeedHeadlines, HeadlineBoard, StaticText};
pub use transport::{
    DisplayTransport, Endpoints, HttpTransport, MockTransport, Throttled, TransportError,
};
pub use writer::{show, ConsoleSink, DisplaySink, DisplayWriter, WriteError};

pub use reqwest::Url;
