//! chords-scraper - chord sheet search and parsing service
//!
//! Serves `/search`, `/top`, `/parse` and `/debug/html` over HTTP on top of
//! the Ultimate Guitar and MyChords adapters.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chords_common::config::{CliOverrides, TomlConfig};
use chords_scraper::{build_router, logging, AppState};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};

/// Command-line arguments for chords-scraper
#[derive(Parser, Debug)]
#[command(name = "chords-scraper")]
#[command(about = "Chord sheet scraper for Ultimate Guitar and MyChords")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "CHORDS_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Log level (overridden by RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Subscriber first so configuration loading can log
    let log_filter = logging::init(args.log_level.as_deref());

    let cli = CliOverrides {
        host: args.host,
        port: args.port,
        log_level: args.log_level,
    };
    let config = match TomlConfig::resolve(args.config.as_deref(), &cli) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(anyhow::Error::new(e).context("Failed to load configuration"));
        }
    };
    logging::apply_configured_level(&log_filter, &config.logging.level);

    info!(
        "Starting chords-scraper v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!(
        "Sources: {} | {} (timeout {}s)",
        config.scraper.ultimate_guitar_base_url,
        config.scraper.mychords_base_url,
        config.scraper.timeout_secs
    );

    let state = AppState::new(&config.scraper).context("Failed to initialize scraper")?;
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("chords-scraper listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
///
/// A handler that cannot be installed never fires; the other one still can.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
