//! Guidefeed main entry point
//!
//! Crawls the configured TV guide site and writes the collected upcoming
//! programs to an Atom feed file.

use chrono::Utc;
use clap::Parser;
use guidefeed::config::load_config;
use guidefeed::crawler::Pipeline;
use guidefeed::feed::write_feed;
use std::path::PathBuf;
use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

/// Guidefeed: a polite TV guide crawler
///
/// Guidefeed enumerates time-windowed guide chart pages, follows every
/// program detail link it finds, and publishes the deduplicated set of
/// upcoming programs as an Atom feed.
#[derive(Parser, Debug)]
#[command(name = "guidefeed")]
#[command(version = "1.0.0")]
#[command(about = "A polite TV guide crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    // Crawl-start instant, captured once; every window offset and the feed
    // timestamp derive from it
    let started_at = Utc::now().with_timezone(&config.source.zone());

    // Ctrl-C raises the run-wide shutdown signal so workers wind down
    // instead of being killed mid-request
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, cancelling crawl");
            let _ = shutdown_tx.send(true);
        }
    });

    let site_link = config.source.base_url.clone();
    let feed_config = config.feed.clone();

    let pipeline = Pipeline::new(config)?;
    let programs = match pipeline.run(started_at, shutdown_rx).await {
        Ok(programs) => programs,
        Err(e) => {
            // Fatal: no partial feed is written
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    // Any completed run writes a feed, however many pages were skipped
    write_feed(&feed_config, &site_link, &programs, started_at)?;

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("guidefeed=info,warn"),
            1 => EnvFilter::new("guidefeed=debug,info"),
            2 => EnvFilter::new("guidefeed=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
