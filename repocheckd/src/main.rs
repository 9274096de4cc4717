//! repocheck daemon
//!
//! Serves adapter repository checks over HTTP so registry tooling can
//! validate submissions without shelling out to the CLI.

#![forbid(unsafe_code)]

mod http_api;

use anyhow::{Context, Result};
use clap::Parser;
use repocheck_common::{HttpFetcher, Pipeline, RepocheckConfig, init_logging};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

use http_api::HttpState;

#[derive(Parser)]
#[command(name = "repocheckd")]
#[command(author, version, about = "repocheck daemon - HTTP check endpoint")]
struct Cli {
    /// Path to a config file (overrides REPOCHECK_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on (overrides daemon.listen)
    #[arg(short, long)]
    listen: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = RepocheckConfig::load(cli.config.as_deref())?;
    let config = loaded.config;
    init_logging(
        &config.general.log_level,
        config.general.log_format,
        cli.verbose,
    );

    info!("Starting repocheck daemon...");
    if let Some(path) = &loaded.path {
        info!("Loaded configuration from {}", path.display());
    }

    let fetcher = Arc::new(HttpFetcher::new(&config.http).context("failed to build HTTP client")?);
    let state = HttpState {
        pipeline: Pipeline::with_listing_page(fetcher, config.policy),
        deadline: Duration::from_secs(config.general.run_deadline_secs),
        version: env!("CARGO_PKG_VERSION"),
        started_at: Instant::now(),
        pid: std::process::id(),
    };

    let listen = cli.listen.unwrap_or(config.daemon.listen);
    http_api::serve(&listen, state, shutdown_signal())
        .await
        .with_context(|| format!("HTTP server on {listen} failed"))?;

    info!("repocheck daemon stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received Ctrl-C, shutting down..."),
        Err(e) => {
            tracing::warn!("Ctrl-C handler unavailable: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
