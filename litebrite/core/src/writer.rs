//! Display Writers
//!
//! A [`DisplaySink`] is where encoded rows end up:
//! - [`DisplayWriter`]: the live device, one lease-scoped GET per row
//! - [`ConsoleSink`]: local preview for dry runs
//!
//! Writes are strictly sequential. A failed row aborts the remaining rows of
//! that call; rows already sent stay on the device because it has no
//! transactional semantics.

use std::io::Write;

use async_trait::async_trait;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{DisplayConfig, GridConfig};
use crate::encoder::ContentEncoder;
use crate::lease::Lease;
use crate::transport::{DisplayTransport, Endpoints, TransportError};

/// Errors from writing to a sink
#[derive(Debug, Error)]
pub enum WriteError {
    /// A row request failed; later rows were not sent
    #[error("Row {row} failed after {written} rows written: {source}")]
    Transport {
        /// Row whose request failed
        row: usize,
        /// Rows successfully written before the failure
        written: usize,
        /// The underlying failure
        #[source]
        source: TransportError,
    },

    /// Local output failed (console sink)
    #[error("Console output failed: {0}")]
    Io(#[from] std::io::Error),
}

impl WriteError {
    /// The transport failure, if that is what stopped the write
    #[must_use]
    pub fn transport_error(&self) -> Option<&TransportError> {
        match self {
            Self::Transport { source, .. } => Some(source),
            Self::Io(_) => None,
        }
    }
}

/// Destination for encoded grid content
#[async_trait]
pub trait DisplaySink: Send + Sync {
    /// Blank every row
    async fn clear(&self) -> Result<(), WriteError>;

    /// Encode `message` and write it starting at `(row, col)`
    ///
    /// Returns the number of rows written.
    async fn write(&self, row: usize, col: usize, message: &str) -> Result<usize, WriteError>;
}

/// Clear the sink, then write `message` from the top-left corner
///
/// # Errors
///
/// Propagates the first failure from either step.
pub async fn show<S: DisplaySink + ?Sized>(sink: &S, message: &str) -> Result<usize, WriteError> {
    sink.clear().await?;
    sink.write(0, 0, message).await
}

// =============================================================================
// Live display
// =============================================================================

/// Writes rows to the physical display under a lease
pub struct DisplayWriter<T> {
    transport: T,
    lease: Lease,
    endpoints: Endpoints,
    encoder: ContentEncoder,
    grid: GridConfig,
}

impl<T: DisplayTransport> DisplayWriter<T> {
    /// Create a writer from its parts
    pub fn new(transport: T, lease: Lease, endpoints: Endpoints, grid: GridConfig) -> Self {
        Self {
            transport,
            lease,
            endpoints,
            encoder: ContentEncoder::for_grid(&grid),
            grid,
        }
    }

    /// Create a writer from configuration
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the configured base URL is unusable.
    pub fn from_config(
        transport: T,
        lease: Lease,
        config: &DisplayConfig,
    ) -> Result<Self, crate::config::ConfigError> {
        Ok(Self::new(
            transport,
            lease,
            Endpoints::from_config(config)?,
            config.grid,
        ))
    }

    /// The lease used for every write
    #[must_use]
    pub fn lease(&self) -> &Lease {
        &self.lease
    }

    /// Borrow the transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send already-encoded rows, one request each, starting at `row`
    async fn send_rows(
        &self,
        row: usize,
        col: usize,
        lines: &[String],
    ) -> Result<usize, WriteError> {
        for (offset, line) in lines.iter().enumerate() {
            let target = row + offset;
            if target >= self.grid.rows {
                warn!(
                    row = target,
                    rows = self.grid.rows,
                    "Writing past the last display row"
                );
            }

            let url = self
                .endpoints
                .write(self.lease.code(), target, col, line)
                .map_err(|source| WriteError::Transport {
                    row: target,
                    written: offset,
                    source,
                })?;

            self.transport
                .get(&url)
                .await
                .map_err(|source| WriteError::Transport {
                    row: target,
                    written: offset,
                    source,
                })?;
            debug!(row = target, col, "Row written");
        }
        Ok(lines.len())
    }
}

#[async_trait]
impl<T: DisplayTransport> DisplaySink for DisplayWriter<T> {
    async fn clear(&self) -> Result<(), WriteError> {
        let blank = [self.encoder.blank_line()];
        for row in 0..self.grid.rows {
            self.send_rows(row, 0, &blank).await?;
        }
        Ok(())
    }

    async fn write(&self, row: usize, col: usize, message: &str) -> Result<usize, WriteError> {
        let lines = self.encoder.encode(message);
        self.send_rows(row, col, &lines).await
    }
}

// =============================================================================
// Console preview
// =============================================================================

/// Prints encoded rows between `|` borders instead of sending them
///
/// Shows exactly what the device would render, one output line per row.
/// Rows skipped before a write's starting row are printed blank.
pub struct ConsoleSink<W> {
    console: Mutex<Console<W>>,
    encoder: ContentEncoder,
}

struct Console<W> {
    out: W,
    /// First row not yet printed since the last clear
    next_row: usize,
}

impl ConsoleSink<std::io::Stdout> {
    /// Preview on standard output
    #[must_use]
    pub fn stdout(grid: &GridConfig) -> Self {
        Self::new(std::io::stdout(), grid)
    }
}

impl<W: Write + Send> ConsoleSink<W> {
    /// Preview into any writer
    pub fn new(out: W, grid: &GridConfig) -> Self {
        Self {
            console: Mutex::new(Console { out, next_row: 0 }),
            encoder: ContentEncoder::for_grid(grid),
        }
    }

    /// Recover the underlying writer
    pub fn into_inner(self) -> W {
        self.console.into_inner().out
    }
}

#[async_trait]
impl<W: Write + Send> DisplaySink for ConsoleSink<W> {
    async fn clear(&self) -> Result<(), WriteError> {
        let mut console = self.console.lock();
        console.next_row = 0;
        writeln!(console.out, "+{}+", "-".repeat(self.encoder.cols()))?;
        console.out.flush()?;
        Ok(())
    }

    async fn write(&self, row: usize, col: usize, message: &str) -> Result<usize, WriteError> {
        let lines = self.encoder.encode(message);
        let mut console = self.console.lock();
        let Console { out, next_row } = &mut *console;

        let blank = self.encoder.blank_line();
        for _ in *next_row..row {
            writeln!(out, "|{blank}|")?;
        }
        for (offset, line) in lines.iter().enumerate() {
            debug!(row = row + offset, col, "Row previewed");
            writeln!(out, "|{}{line}|", " ".repeat(col))?;
        }
        out.flush()?;

        *next_row = (*next_row).max(row + lines.len());
        Ok(lines.len())
    }
}
