//! tabwatch-crawler - daily tablature listing crawler with a dashboard API
//!
//! Loads bootstrap config, resolves the data folder, restores persisted
//! stores, starts the daily scheduler and serves the HTTP API.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tabwatch_common::config::{
    ensure_directory_exists, load_or_default, resolve_config_path, DataFolderResolver,
};
use tabwatch_crawler::crawler::CrawlSettings;
use tabwatch_crawler::fetcher::HttpFetcher;
use tabwatch_crawler::pipeline::DataPaths;
use tabwatch_crawler::scheduler::spawn_daily_sync;
use tabwatch_crawler::{build_router, AppState, Crawler};
use tokio::signal;
use tracing::info;

/// Command-line arguments for tabwatch-crawler
#[derive(Parser, Debug)]
#[command(name = "tabwatch-crawler")]
#[command(about = "Crawls a tablature listing page and serves a song dashboard")]
#[command(version)]
struct Args {
    /// TOML config file
    #[arg(short, long, env = "TABWATCH_CONFIG")]
    config: Option<PathBuf>,

    /// Folder holding stores and list files
    #[arg(short, long)]
    data_folder: Option<PathBuf>,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "TABWATCH_PORT")]
    port: Option<u16>,

    /// Run one full sync right after startup
    #[arg(long)]
    sync_now: bool,

    /// Do not start the daily scheduler
    #[arg(long)]
    no_scheduler: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref());
    let config = load_or_default(config_path.as_deref()).context("Failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!(
        "Starting tabwatch-crawler v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let data_folder = DataFolderResolver::new()
        .with_cli_arg(args.data_folder.clone())
        .with_toml_config(&config)
        .resolve();
    ensure_directory_exists(&data_folder)?;

    let settings = CrawlSettings::from(&config);
    let fetcher = HttpFetcher::new(settings.fetch_timeout)
        .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

    let crawler = Arc::new(Crawler::new(
        DataPaths::new(&data_folder),
        Arc::new(fetcher),
        settings,
    ));

    if !args.no_scheduler {
        spawn_daily_sync(crawler.clone(), config.sync_hour);
    }

    {
        let crawler = crawler.clone();
        let sync_now = args.sync_now;
        tokio::spawn(async move {
            crawler.backfill_favorites().await;
            if sync_now {
                crawler.sync_all().await;
            }
        });
    }

    let app = build_router(AppState::new(crawler));

    let port = args.port.unwrap_or(config.port);
    let addr: SocketAddr = format!("{}:{}", config.bind_address, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", config.bind_address, port))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("tabwatch-crawler listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
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
