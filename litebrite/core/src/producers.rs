//! Content Producers
//!
//! Producers supply the raw text a sink displays. The core only relies on the
//! `() -> String` shape; layout beyond plain text (fonts, images) is out of
//! scope here.
//!
//! # Available Producers
//!
//! - [`StaticText`]: fixed text (CLI arguments, files, stdin)
//! - [`Clock`]: current local time as plain text
//! - [`FeedHeadlines`]: titles from a JSON feed laid out by a [`HeadlineBoard`]

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use reqwest::Url;
use serde_json::Value;

use crate::config::GridConfig;
use crate::transport::DisplayTransport;

/// Timestamp format used in board titles
const STAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// A source of display text
#[async_trait]
pub trait ContentProducer: Send + Sync {
    /// Short name for logs (e.g. "clock")
    fn name(&self) -> &str;

    /// Produce the text block to display
    async fn produce(&self) -> anyhow::Result<String>;
}

/// Fixed text
#[derive(Clone, Debug)]
pub struct StaticText {
    text: String,
}

impl StaticText {
    /// Wrap a text block
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl ContentProducer for StaticText {
    fn name(&self) -> &str {
        "text"
    }

    async fn produce(&self) -> anyhow::Result<String> {
        Ok(self.text.clone())
    }
}

/// Current local time, optionally with the date on a second line
#[derive(Clone, Copy, Debug, Default)]
pub struct Clock {
    /// Append a date line
    pub show_date: bool,
}

impl Clock {
    /// Render a specific time
    #[must_use]
    pub fn render(&self, now: NaiveDateTime) -> String {
        let time = now.format("%-I:%M").to_string();
        if self.show_date {
            format!("{time}\n{}", now.format("%a %b %-d %Y"))
        } else {
            time
        }
    }
}

#[async_trait]
impl ContentProducer for Clock {
    fn name(&self) -> &str {
        "clock"
    }

    async fn produce(&self) -> anyhow::Result<String> {
        Ok(self.render(Local::now().naive_local()))
    }
}

/// Lays out a titled list of headlines to fit the grid
///
/// ```text
/// {title} - {timestamp}
/// ================================ (full row)
/// headline 1
/// ...
/// headline N      (N = rows - 2 - reserved - footer)
/// {footer}
/// ```
#[derive(Clone, Debug)]
pub struct HeadlineBoard {
    title: String,
    grid: GridConfig,
    reserved_rows: usize,
    footer: Option<String>,
}

impl HeadlineBoard {
    /// Board for `grid`, leaving the last row free
    pub fn new(title: impl Into<String>, grid: GridConfig) -> Self {
        Self {
            title: title.into(),
            grid,
            reserved_rows: 1,
            footer: None,
        }
    }

    /// Rows to leave empty below the board
    #[must_use]
    pub fn with_reserved_rows(mut self, rows: usize) -> Self {
        self.reserved_rows = rows;
        self
    }

    /// Closing line after the headlines
    #[must_use]
    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Number of headlines that fit
    #[must_use]
    pub fn capacity(&self) -> usize {
        let footer = usize::from(self.footer.is_some());
        self.grid
            .rows
            .saturating_sub(2 + self.reserved_rows + footer)
    }

    /// Compose the board text
    ///
    /// Headlines are flattened to one line each; extras beyond
    /// [`capacity`](Self::capacity) are dropped.
    #[must_use]
    pub fn compose<S: AsRef<str>>(&self, headlines: &[S], stamp: &str) -> String {
        let mut lines = vec![
            format!("{} - {stamp}", self.title),
            "=".repeat(self.grid.cols),
        ];
        lines.extend(
            headlines
                .iter()
                .take(self.capacity())
                .map(|h| h.as_ref().split_whitespace().collect::<Vec<_>>().join(" ")),
        );
        if let Some(ref footer) = self.footer {
            lines.push(footer.clone());
        }
        lines.join("\n")
    }
}

/// Headlines fetched from a JSON feed
pub struct FeedHeadlines<T> {
    transport: T,
    url: Url,
    items_pointer: String,
    title_field: String,
    board: HeadlineBoard,
}

impl<T: DisplayTransport> FeedHeadlines<T> {
    /// Read `{"items": [{"title": ...}, ...]}` from `url`
    pub fn new(transport: T, url: Url, board: HeadlineBoard) -> Self {
        Self {
            transport,
            url,
            items_pointer: "/items".to_string(),
            title_field: "title".to_string(),
            board,
        }
    }

    /// JSON pointer to the items array (e.g. `/value/items`)
    #[must_use]
    pub fn with_items_pointer(mut self, pointer: impl Into<String>) -> Self {
        self.items_pointer = pointer.into();
        self
    }

    /// Field holding each item's title
    #[must_use]
    pub fn with_title_field(mut self, field: impl Into<String>) -> Self {
        self.title_field = field.into();
        self
    }

    /// Extract titles from a feed body
    ///
    /// # Errors
    ///
    /// Fails if the pointer does not resolve to an array. Items without a
    /// string title are skipped.
    pub fn titles(&self, body: &Value) -> anyhow::Result<Vec<String>> {
        let items = body
            .pointer(&self.items_pointer)
            .and_then(Value::as_array)
            .ok_or_else(|| {
                anyhow::anyhow!("Feed has no item array at {:?}", self.items_pointer)
            })?;

        Ok(items
            .iter()
            .filter_map(|item| item.get(&self.title_field).and_then(Value::as_str))
            .map(String::from)
            .collect())
    }
}

#[async_trait]
impl<T: DisplayTransport> ContentProducer for FeedHeadlines<T> {
    fn name(&self) -> &str {
        "feed"
    }

    async fn produce(&self) -> anyhow::Result<String> {
        let body = self.transport.get(&self.url).await?;
        let titles = self.titles(&body)?;
        tracing::debug!(url = %self.url, count = titles.len(), "Fetched feed");

        let stamp = Local::now().format(STAMP_FORMAT).to_string();
        Ok(self.board.compose(&titles, &stamp))
    }
}
