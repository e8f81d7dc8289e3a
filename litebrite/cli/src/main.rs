//! LiteBrite CLI - Put text on a LiteBrite display
//!
//! Picks a content producer, then either previews the encoded grid on the
//! console (default) or sends it to the display under a write lease.
//!
//! # Usage
//!
//! ```bash
//! # Preview locally
//! litebrite text "HELLO WORLD"
//!
//! # Send to the device, acquiring a fresh lease
//! litebrite --live text "HELLO WORLD"
//!
//! # Reuse a lease from an earlier run
//! litebrite --live --lease-code abc123 clock --date
//!
//! # Headlines from a JSON feed
//! litebrite --live feed https://example.com/news.json --title "NEWS" --items-pointer /items
//!
//! # Verbose logging (URLs and raw responses)
//! litebrite --debug --live clear
//! ```

mod args;

use std::io::Read;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use litebrite_core::{
    load_config_from_path, show, Clock, ConsoleSink, ContentProducer, DisplayConfig, DisplaySink,
    DisplayTransport, DisplayWriter, FeedHeadlines, HeadlineBoard, HttpTransport, Lease,
    LeaseManager, StaticText, Throttled, Url,
};

use args::{Args, Command};

/// Read the text for `text`/`file` commands; `-` means stdin
fn read_source(source: &str) -> Result<String> {
    if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(source).with_context(|| format!("Failed to read {source}"))
    }
}

/// Build the producer selected on the command line
fn producer<T>(
    command: &Command,
    transport: T,
    config: &DisplayConfig,
) -> Result<Box<dyn ContentProducer>>
where
    T: DisplayTransport + 'static,
{
    let producer: Box<dyn ContentProducer> = match command {
        Command::Text { words } => {
            let text = if words.len() == 1 && words[0] == "-" {
                read_source("-")?
            } else {
                words.join(" ")
            };
            Box::new(StaticText::new(text))
        }
        Command::File { path } => Box::new(StaticText::new(read_source(path)?)),
        Command::Clock { date } => Box::new(Clock { show_date: *date }),
        Command::Feed {
            url,
            title,
            items_pointer,
            title_field,
            footer,
        } => {
            let url = url
                .parse::<Url>()
                .with_context(|| format!("Invalid feed URL {url}"))?;
            let mut board = HeadlineBoard::new(title.clone(), config.grid);
            if let Some(footer) = footer {
                board = board.with_footer(footer.clone());
            }
            Box::new(
                FeedHeadlines::new(transport, url, board)
                    .with_items_pointer(items_pointer.clone())
                    .with_title_field(title_field.clone()),
            )
        }
        Command::Clear => Box::new(StaticText::new(String::new())),
    };
    Ok(producer)
}

/// Obtain a lease: reuse the given code or acquire one from the service
async fn lease<T: DisplayTransport>(
    code: Option<&str>,
    transport: T,
    config: &DisplayConfig,
) -> Result<Lease> {
    if let Some(code) = code {
        info!("Reusing existing lease");
        return Ok(Lease::from_code(code));
    }

    info!(minutes = config.lease_minutes, "Acquiring lease");
    let manager = LeaseManager::from_config(transport, config)?;
    Ok(manager.acquire(config.lease_minutes).await?)
}

/// Send the produced text to the chosen sink
async fn display(args: &Args, sink: &dyn DisplaySink, text: &str) -> Result<()> {
    if matches!(args.command, Command::Clear) {
        sink.clear().await.context("Failed to clear display")?;
        return Ok(());
    }

    let rows = if args.no_clear {
        sink.write(args.row, args.col, text).await
    } else if args.row == 0 && args.col == 0 {
        show(sink, text).await
    } else {
        match sink.clear().await {
            Ok(()) => sink.write(args.row, args.col, text).await,
            Err(e) => Err(e),
        }
    };
    let rows = rows.context("Failed to write to display")?;

    info!(rows, "Content displayed");
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let mut config = load_config_from_path(args.config_path())
        .context("Failed to load configuration")?;
    args.overrides()
        .apply(&mut config)
        .context("Invalid configuration override")?;
    info!(source = %config.source(), base_url = %config.base_url, "Configuration loaded");

    let transport = Arc::new(Throttled::from_config(
        HttpTransport::new(&config).context("Failed to create HTTP client")?,
        &config,
    ));

    let producer = producer(&args.command, Arc::clone(&transport), &config)?;
    let text = producer
        .produce()
        .await
        .with_context(|| format!("Producer {} failed", producer.name()))?;

    if args.live {
        let lease = lease(args.lease_code.as_deref(), Arc::clone(&transport), &config).await?;
        println!("Lease: {}", lease.code());
        let writer = DisplayWriter::from_config(transport, lease, &config)?;
        display(&args, &writer, &text).await
    } else {
        let sink = ConsoleSink::stdout(&config.grid);
        display(&args, &sink, &text).await
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.debug {
        "debug".to_string()
    } else {
        args.log_level.clone()
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&filter)),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    run(args).await
}
