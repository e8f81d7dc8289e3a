//! Display Configuration
//!
//! Every component is constructed from an explicit [`DisplayConfig`] rather
//! than process-wide constants. Values are layered with the following priority
//! (highest first):
//! 1. CLI arguments ([`ConfigOverrides`])
//! 2. Environment variables (`LITEBRITE_*`)
//! 3. TOML configuration file
//! 4. Default values
//!
//! The configuration file lives at `$XDG_CONFIG_HOME/litebrite/litebrite.toml`
//! (typically `~/.config/litebrite/litebrite.toml`).
//!
//! # Example Configuration
//!
//! ```toml
//! base_url = "http://10.1.3.251/litebrite/peggy"
//! user_agent = "litebrite 0.1"
//! debug = false
//!
//! [grid]
//! rows = 12
//! cols = 80
//!
//! [transport]
//! throttle_ms = 200
//! request_timeout_secs = 30
//!
//! [lease]
//! minutes = 1
//! retry_secs = 15
//! max_attempts = 40
//! ```

use std::path::PathBuf;
use std::time::Duration;

use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default display service endpoint
pub const DEFAULT_BASE_URL: &str = "http://10.1.3.251/litebrite/peggy";

/// Default client identification sent as `User-Agent`
pub const DEFAULT_USER_AGENT: &str = "litebrite 0.1";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where a configuration value came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Value from command-line argument
    Cli,
    /// Value from environment variable
    Env,
    /// Value from TOML configuration file
    File,
    /// Default value
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::Env => write!(f, "environment"),
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// Runtime Configuration
// =============================================================================

/// Dimensions of the physical character grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Number of rows the device renders
    pub rows: usize,
    /// Number of characters per row
    pub cols: usize,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self { rows: 12, cols: 80 }
    }
}

impl GridConfig {
    /// Create a grid of the given dimensions
    #[must_use]
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }
}

/// Configuration shared by the transport, lease manager, encoder and writer
#[derive(Clone, Debug)]
pub struct DisplayConfig {
    /// Base URL of the display service (endpoints are appended as path segments)
    pub base_url: String,

    /// Grid dimensions
    pub grid: GridConfig,

    /// Fixed delay before every outbound request
    pub throttle: Duration,

    /// Per-request timeout for the HTTP client
    pub request_timeout: Duration,

    /// Fixed delay between lease acquisition attempts
    pub lease_retry_delay: Duration,

    /// Maximum lease acquisition attempts (None = retry forever)
    pub lease_max_attempts: Option<u32>,

    /// Lease duration requested from the service
    pub lease_minutes: u32,

    /// `User-Agent` header sent with every request
    pub user_agent: String,

    /// Log request URLs and raw responses
    pub debug: bool,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            grid: GridConfig::default(),
            throttle: Duration::from_millis(200),
            request_timeout: Duration::from_secs(30),
            lease_retry_delay: Duration::from_secs(15),
            lease_max_attempts: None,
            lease_minutes: 1,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            debug: false,
            config_file_path: None,
            source: ConfigSource::Default,
        }
    }
}

impl DisplayConfig {
    /// Create a new configuration with default values
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the grid dimensions
    #[must_use]
    pub fn with_grid(mut self, rows: usize, cols: usize) -> Self {
        self.grid = GridConfig::new(rows, cols);
        self
    }

    /// Set the throttle delay
    #[must_use]
    pub fn with_throttle(mut self, throttle: Duration) -> Self {
        self.throttle = throttle;
        self
    }

    /// Get the primary source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Parse the base URL
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the URL cannot be parsed or cannot carry
    /// path segments (e.g. `mailto:`).
    pub fn parsed_base_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.base_url).map_err(|e| {
            ConfigError::ValidationError(format!("base_url {:?}: {e}", self.base_url))
        })?;
        if url.cannot_be_a_base() {
            return Err(ConfigError::ValidationError(format!(
                "base_url {:?} cannot carry path segments",
                self.base_url
            )));
        }
        Ok(url)
    }

    /// Check that the configuration is usable
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for an empty grid, a zero lease duration,
    /// a zero attempt budget, or an unusable base URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.rows == 0 || self.grid.cols == 0 {
            return Err(ConfigError::ValidationError(format!(
                "grid must be non-empty, got {}x{}",
                self.grid.rows, self.grid.cols
            )));
        }
        if self.lease_minutes == 0 {
            return Err(ConfigError::ValidationError(
                "lease minutes must be at least 1".to_string(),
            ));
        }
        if self.lease_max_attempts == Some(0) {
            return Err(ConfigError::ValidationError(
                "lease max_attempts must be at least 1".to_string(),
            ));
        }
        self.parsed_base_url().map(|_| ())
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Grid section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GridToml {
    /// Number of rows
    pub rows: Option<usize>,
    /// Number of columns
    pub cols: Option<usize>,
}

/// Transport section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportToml {
    /// Delay before every request in milliseconds
    pub throttle_ms: Option<u64>,
    /// HTTP request timeout in seconds
    pub request_timeout_secs: Option<u64>,
}

/// Lease section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaseToml {
    /// Lease duration to request
    pub minutes: Option<u32>,
    /// Delay between acquisition attempts in seconds
    pub retry_secs: Option<u64>,
    /// Maximum acquisition attempts (omit to retry forever)
    pub max_attempts: Option<u32>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LiteBriteToml {
    /// Display service base URL
    pub base_url: Option<String>,
    /// Client identification
    pub user_agent: Option<String>,
    /// Request/response debug logging
    pub debug: Option<bool>,
    /// Grid section
    pub grid: GridToml,
    /// Transport section
    pub transport: TransportToml,
    /// Lease section
    pub lease: LeaseToml,
}

// =============================================================================
// Configuration Loading
// =============================================================================

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/litebrite/litebrite.toml` or
/// `~/.config/litebrite/litebrite.toml` if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("litebrite").join("litebrite.toml"))
}

/// Load configuration from all sources with proper priority
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed, or if the
/// merged configuration is invalid. A missing config file is not an error.
pub fn load_config() -> Result<DisplayConfig, ConfigError> {
    load_config_from_path(default_config_path())
}

/// Load configuration from a specific path
///
/// # Arguments
///
/// * `path` - Optional path to the configuration file. If `None`, only defaults
///   and environment variables are used.
///
/// # Errors
///
/// Returns an error if the specified config file cannot be read or parsed.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<DisplayConfig, ConfigError> {
    let mut config = DisplayConfig::default();

    if let Some(ref config_path) = path {
        if config_path.exists() {
            let toml_content =
                std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                    path: config_path.clone(),
                    source: e,
                })?;

            let toml_config: LiteBriteToml = toml::from_str(&toml_content)?;
            apply_toml_config(&mut config, &toml_config);
            config.config_file_path = Some(config_path.clone());
            config.source = ConfigSource::File;

            tracing::info!(
                path = %config_path.display(),
                "Loaded configuration from file"
            );
        } else {
            tracing::debug!(
                path = %config_path.display(),
                "Config file not found, using defaults"
            );
        }
    }

    apply_env_config(&mut config, |key| std::env::var(key).ok());

    config.validate()?;
    Ok(config)
}

/// Apply TOML configuration values to the config struct
fn apply_toml_config(config: &mut DisplayConfig, toml: &LiteBriteToml) {
    if let Some(ref url) = toml.base_url {
        config.base_url = url.clone();
    }
    if let Some(ref agent) = toml.user_agent {
        config.user_agent = agent.clone();
    }
    if let Some(debug) = toml.debug {
        config.debug = debug;
    }

    if let Some(rows) = toml.grid.rows {
        config.grid.rows = rows;
    }
    if let Some(cols) = toml.grid.cols {
        config.grid.cols = cols;
    }

    if let Some(ms) = toml.transport.throttle_ms {
        config.throttle = Duration::from_millis(ms);
    }
    if let Some(secs) = toml.transport.request_timeout_secs {
        config.request_timeout = Duration::from_secs(secs);
    }

    if let Some(minutes) = toml.lease.minutes {
        config.lease_minutes = minutes;
    }
    if let Some(secs) = toml.lease.retry_secs {
        config.lease_retry_delay = Duration::from_secs(secs);
    }
    if toml.lease.max_attempts.is_some() {
        config.lease_max_attempts = toml.lease.max_attempts;
    }
}

/// Apply `LITEBRITE_*` overrides read through `lookup`
///
/// Unparsable numeric values are ignored so that a typo in the environment
/// falls back to the file or default value.
fn apply_env_config<F>(config: &mut DisplayConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("LITEBRITE_BASE_URL") {
        config.base_url = url;
        config.source = ConfigSource::Env;
    }
    if let Some(agent) = lookup("LITEBRITE_USER_AGENT") {
        config.user_agent = agent;
        config.source = ConfigSource::Env;
    }
    if let Some(debug) = lookup("LITEBRITE_DEBUG") {
        config.debug = debug != "0" && debug.to_lowercase() != "false";
        config.source = ConfigSource::Env;
    }
    if let Some(rows) = lookup("LITEBRITE_ROWS").and_then(|v| v.parse().ok()) {
        config.grid.rows = rows;
        config.source = ConfigSource::Env;
    }
    if let Some(cols) = lookup("LITEBRITE_COLS").and_then(|v| v.parse().ok()) {
        config.grid.cols = cols;
        config.source = ConfigSource::Env;
    }
    if let Some(ms) = lookup("LITEBRITE_THROTTLE_MS").and_then(|v| v.parse().ok()) {
        config.throttle = Duration::from_millis(ms);
        config.source = ConfigSource::Env;
    }
    if let Some(secs) = lookup("LITEBRITE_LEASE_RETRY_SECS").and_then(|v| v.parse().ok()) {
        config.lease_retry_delay = Duration::from_secs(secs);
        config.source = ConfigSource::Env;
    }
    if let Some(minutes) = lookup("LITEBRITE_LEASE_MINUTES").and_then(|v| v.parse().ok()) {
        config.lease_minutes = minutes;
        config.source = ConfigSource::Env;
    }
}

// =============================================================================
// CLI Override Support
// =============================================================================

/// Builder for applying CLI overrides to configuration
///
/// Use this after [`load_config`] to apply command-line argument overrides.
#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    /// Base URL override
    pub base_url: Option<String>,

    /// Lease duration override
    pub lease_minutes: Option<u32>,

    /// Debug logging override
    pub debug: Option<bool>,
}

impl ConfigOverrides {
    /// Create a new empty set of overrides
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set base URL override
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set lease duration override
    #[must_use]
    pub fn with_lease_minutes(mut self, minutes: u32) -> Self {
        self.lease_minutes = Some(minutes);
        self
    }

    /// Set debug override
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = Some(debug);
        self
    }

    /// Apply overrides to a configuration
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if the overridden configuration is invalid.
    pub fn apply(&self, config: &mut DisplayConfig) -> Result<(), ConfigError> {
        if self.base_url.is_some() || self.lease_minutes.is_some() || self.debug.is_some() {
            config.source = ConfigSource::Cli;
        }

        if let Some(ref url) = self.base_url {
            config.base_url = url.clone();
        }
        if let Some(minutes) = self.lease_minutes {
            config.lease_minutes = minutes;
        }
        if let Some(debug) = self.debug {
            config.debug = debug;
        }

        config.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = DisplayConfig::default();

        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.grid, GridConfig { rows: 12, cols: 80 });
        assert_eq!(config.throttle, Duration::from_millis(200));
        assert_eq!(config.lease_retry_delay, Duration::from_secs(15));
        assert_eq!(config.lease_max_attempts, None);
        assert_eq!(config.lease_minutes, 1);
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert!(!config.debug);
        assert_eq!(config.source(), ConfigSource::Default);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_config_path() {
        if let Some(path) = default_config_path() {
            assert!(path.ends_with("litebrite/litebrite.toml"));
        }
    }

    #[test]
    fn test_parse_valid_toml() {
        let toml_str = r#"
base_url = "http://display.local/peggy"
user_agent = "test-agent"
debug = true

[grid]
rows = 6
cols = 40

[transport]
throttle_ms = 50
request_timeout_secs = 5

[lease]
minutes = 3
retry_secs = 2
max_attempts = 4
"#;
        let parsed: LiteBriteToml = toml::from_str(toml_str).unwrap();
        let mut config = DisplayConfig::default();
        apply_toml_config(&mut config, &parsed);

        assert_eq!(config.base_url, "http://display.local/peggy");
        assert_eq!(config.user_agent, "test-agent");
        assert!(config.debug);
        assert_eq!(config.grid, GridConfig::new(6, 40));
        assert_eq!(config.throttle, Duration::from_millis(50));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.lease_minutes, 3);
        assert_eq!(config.lease_retry_delay, Duration::from_secs(2));
        assert_eq!(config.lease_max_attempts, Some(4));
    }

    #[test]
    fn test_parse_partial_toml() {
        let parsed: LiteBriteToml = toml::from_str("[grid]\ncols = 20\n").unwrap();
        let mut config = DisplayConfig::default();
        apply_toml_config(&mut config, &parsed);

        assert_eq!(config.grid.cols, 20);
        assert_eq!(config.grid.rows, 12);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "base_url = \"http://file.local/peggy\"").unwrap();
        writeln!(file, "[lease]\nretry_secs = 1").unwrap();

        let config = load_config_from_path(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(config.base_url, "http://file.local/peggy");
        assert_eq!(config.lease_retry_delay, Duration::from_secs(1));
        assert_eq!(config.config_file_path, Some(file.path().to_path_buf()));
    }

    #[test]
    fn test_missing_file_graceful() {
        let path = PathBuf::from("/nonexistent/litebrite/litebrite.toml");
        let config = load_config_from_path(Some(path)).unwrap();
        assert!(config.config_file_path.is_none());
    }

    #[test]
    fn test_malformed_toml_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[grid\nrows = ").unwrap();

        let result = load_config_from_path(Some(file.path().to_path_buf()));
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_env_overrides_file_values() {
        let parsed: LiteBriteToml =
            toml::from_str("base_url = \"http://file.local\"\n[grid]\nrows = 6\n").unwrap();
        let mut config = DisplayConfig::default();
        apply_toml_config(&mut config, &parsed);

        apply_env_config(
            &mut config,
            env_from(&[
                ("LITEBRITE_BASE_URL", "http://env.local"),
                ("LITEBRITE_THROTTLE_MS", "10"),
                ("LITEBRITE_DEBUG", "1"),
            ]),
        );

        assert_eq!(config.base_url, "http://env.local");
        assert_eq!(config.grid.rows, 6);
        assert_eq!(config.throttle, Duration::from_millis(10));
        assert!(config.debug);
        assert_eq!(config.source(), ConfigSource::Env);
    }

    #[test]
    fn test_env_ignores_unparsable_numbers() {
        let mut config = DisplayConfig::default();
        apply_env_config(&mut config, env_from(&[("LITEBRITE_COLS", "wide")]));

        assert_eq!(config.grid.cols, 80);
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = DisplayConfig::default();
        ConfigOverrides::new()
            .with_base_url("http://cli.local/peggy")
            .with_lease_minutes(5)
            .with_debug(true)
            .apply(&mut config)
            .unwrap();

        assert_eq!(config.base_url, "http://cli.local/peggy");
        assert_eq!(config.lease_minutes, 5);
        assert!(config.debug);
        assert_eq!(config.source(), ConfigSource::Cli);
    }

    #[test]
    fn test_empty_overrides_keep_source() {
        let mut config = DisplayConfig::default();
        ConfigOverrides::new().apply(&mut config).unwrap();
        assert_eq!(config.source(), ConfigSource::Default);
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        assert!(DisplayConfig::default().with_grid(0, 80).validate().is_err());
        assert!(DisplayConfig::default()
            .with_base_url("not a url")
            .validate()
            .is_err());
        assert!(DisplayConfig::default()
            .with_base_url("mailto:peggy@example.com")
            .validate()
            .is_err());

        let mut config = DisplayConfig::default();
        config.lease_minutes = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_config_source_display() {
        assert_eq!(ConfigSource::Cli.to_string(), "CLI");
        assert_eq!(ConfigSource::Env.to_string(), "environment");
        assert_eq!(ConfigSource::File.to_string(), "config file");
        assert_eq!(ConfigSource::Default.to_string(), "default");
    }
}
