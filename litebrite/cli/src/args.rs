//! Command-line arguments

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use litebrite_core::{default_config_path, ConfigOverrides};

/// Put text on a LiteBrite display
#[derive(Parser, Debug)]
#[command(name = "litebrite")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, env = "LITEBRITE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Display service base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Send to the device instead of previewing on the console
    #[arg(long, env = "LITEBRITE_LIVE")]
    pub live: bool,

    /// Reuse an existing lease instead of acquiring one
    #[arg(long, env = "LITEBRITE_LEASE_CODE")]
    pub lease_code: Option<String>,

    /// Lease duration to request, in minutes
    #[arg(long)]
    pub lease_minutes: Option<u32>,

    /// First row to write
    #[arg(long, default_value_t = 0)]
    pub row: usize,

    /// Column offset for every row
    #[arg(long, default_value_t = 0)]
    pub col: usize,

    /// Write without blanking the display first
    #[arg(long)]
    pub no_clear: bool,

    /// Log request URLs and raw responses
    #[arg(short, long)]
    pub debug: bool,

    /// Log level when --debug is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// What to display
    #[command(subcommand)]
    pub command: Command,
}

/// Content to display
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Display the given words (`-` reads stdin)
    Text {
        /// Words joined with single spaces
        #[arg(required = true)]
        words: Vec<String>,
    },

    /// Display a file's contents (`-` reads stdin)
    File {
        /// Path to read
        path: String,
    },

    /// Display the current time
    Clock {
        /// Add the date on a second line
        #[arg(long)]
        date: bool,
    },

    /// Display headlines from a JSON feed
    Feed {
        /// Feed URL
        url: String,

        /// Board title
        #[arg(long, default_value = "NEWS")]
        title: String,

        /// JSON pointer to the item array
        #[arg(long, default_value = "/items")]
        items_pointer: String,

        /// Field holding each item's title
        #[arg(long, default_value = "title")]
        title_field: String,

        /// Line shown after the headlines
        #[arg(long)]
        footer: Option<String>,
    },

    /// Blank every row
    Clear,
}

impl Args {
    /// Config file to load: the explicit path, else the default location
    pub fn config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(default_config_path)
    }

    /// Settings from the command line, applied over file and environment
    pub fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::default();
        if let Some(ref url) = self.base_url {
            overrides = overrides.with_base_url(url.clone());
        }
        if let Some(minutes) = self.lease_minutes {
            overrides = overrides.with_lease_minutes(minutes);
        }
        if self.debug {
            overrides = overrides.with_debug(true);
        }
        overrides
    }
}
