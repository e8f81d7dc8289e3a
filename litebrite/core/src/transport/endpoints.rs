//! Display Service Endpoints
//!
//! ```text
//! {base}/get_lease/{minutes}
//! {base}/write/{lease_code}/{row}/{col}/{line}
//! ```
//!
//! Segments are appended with `Url::path_segments_mut`, which percent-encodes
//! each one on its own, so a space becomes `%20` and a `/` inside a line
//! becomes `%2F` instead of adding a path level.

use reqwest::Url;

use super::traits::TransportError;
use crate::config::{ConfigError, DisplayConfig};

/// URL builder for the display service
#[derive(Clone, Debug)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    /// Build endpoints under an already-parsed base URL
    #[must_use]
    pub fn new(base: Url) -> Self {
        Self { base }
    }

    /// Build endpoints from configuration
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the configured base URL is unusable.
    pub fn from_config(config: &DisplayConfig) -> Result<Self, ConfigError> {
        config.parsed_base_url().map(Self::new)
    }

    /// The base URL
    #[must_use]
    pub fn base(&self) -> &Url {
        &self.base
    }

    /// Lease acquisition URL
    ///
    /// # Errors
    ///
    /// Returns `InvalidUrl` if the base URL cannot carry path segments.
    pub fn lease(&self, minutes: u32) -> Result<Url, TransportError> {
        self.join(&["get_lease", &minutes.to_string()])
    }

    /// Row write URL; `line` is percent-encoded as a single segment
    ///
    /// # Errors
    ///
    /// Returns `InvalidUrl` if the base URL cannot carry path segments.
    pub fn write(
        &self,
        lease_code: &str,
        row: usize,
        col: usize,
        line: &str,
    ) -> Result<Url, TransportError> {
        self.join(&[
            "write",
            lease_code,
            &row.to_string(),
            &col.to_string(),
            line,
        ])
    }

    fn join(&self, segments: &[&str]) -> Result<Url, TransportError> {
        let mut url = self.base.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|()| TransportError::InvalidUrl(self.base.to_string()))?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn endpoints(base: &str) -> Endpoints {
        Endpoints::new(Url::parse(base).unwrap())
    }

    #[test]
    fn test_lease_url() {
        let url = endpoints("http://10.1.3.251/litebrite/peggy").lease(5).unwrap();
        assert_eq!(url.as_str(), "http://10.1.3.251/litebrite/peggy/get_lease/5");
    }

    #[test]
    fn test_trailing_slash_base() {
        let url = endpoints("http://display.local/peggy/").lease(1).unwrap();
        assert_eq!(url.as_str(), "http://display.local/peggy/get_lease/1");

        let url = endpoints("http://display.local").lease(1).unwrap();
        assert_eq!(url.as_str(), "http://display.local/get_lease/1");
    }

    #[test]
    fn test_write_url_escapes_line() {
        let url = endpoints("http://display.local/peggy")
            .write("abc123", 3, 7, "HI THERE/")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://display.local/peggy/write/abc123/3/7/HI%20THERE%2F"
        );
    }

    #[test]
    fn test_write_url_keeps_grid_punctuation() {
        let url = endpoints("http://display.local/peggy")
            .write("abc", 0, 0, "a-b.c")
            .unwrap();
        assert_eq!(url.as_str(), "http://display.local/peggy/write/abc/0/0/a-b.c");
    }

    #[test]
    fn test_from_config() {
        let config = DisplayConfig::default();
        let endpoints = Endpoints::from_config(&config).unwrap();
        assert_eq!(endpoints.base().as_str(), "http://10.1.3.251/litebrite/peggy");

        let config = DisplayConfig::default().with_base_url("::nope::");
        assert!(Endpoints::from_config(&config).is_err());
    }
}
