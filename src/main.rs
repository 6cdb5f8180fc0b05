//! MediaStats — folder statistics service for media galleries.
//!
//! Thin binary entry point. All logic lives in the `mediastats-core`
//! and `mediastats-server` crates.

use anyhow::Context;
use clap::Parser;
use mediastats_server::{AppState, ServerConfig, StatsService, Store};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "mediastats", version)]
#[command(about = "Folder statistics service for media galleries")]
struct Cli {
    /// Address to listen on
    #[arg(long, env = "MEDIASTATS_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Port to listen on
    #[arg(long, env = "MEDIASTATS_PORT", default_value_t = 8188)]
    port: u16,

    /// SQLite database file holding the cache, settings, and media index
    #[arg(long, env = "MEDIASTATS_DATABASE", default_value = "mediastats.db")]
    database: PathBuf,

    /// Folder roots requests may reference (repeatable; empty = unrestricted)
    #[arg(
        long = "allowed-root",
        env = "MEDIASTATS_ALLOWED_ROOTS",
        value_delimiter = ','
    )]
    allowed_roots: Vec<PathBuf>,

    /// Bearer token required on every endpoint except /health
    #[arg(long, env = "MEDIASTATS_API_TOKEN")]
    api_token: Option<String>,

    /// Reject cache clearing, stopword changes, and precompute submissions
    #[arg(long, env = "MEDIASTATS_READ_ONLY")]
    read_only: bool,

    /// Maximum folder scans running at once (default: CPU count)
    #[arg(long, env = "MEDIASTATS_MAX_CONCURRENT_SCANS")]
    max_concurrent_scans: Option<usize>,

    /// Concurrency ceiling for background precompute jobs
    #[arg(long, env = "MEDIASTATS_BACKGROUND_WORKERS", default_value_t = 4)]
    background_workers: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,mediastats_server=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    let defaults = ServerConfig::default();
    let config = ServerConfig {
        allowed_roots: cli.allowed_roots,
        api_token: cli.api_token,
        read_only: cli.read_only,
        max_concurrent_scans: cli
            .max_concurrent_scans
            .unwrap_or(defaults.max_concurrent_scans),
        background_workers: cli.background_workers,
    };
    if config.allowed_roots.is_empty() {
        warn!("no allowed roots configured; any readable folder may be analyzed");
    }

    let store = Store::open(&cli.database)
        .await
        .with_context(|| format!("failed to open database {}", cli.database.display()))?;
    let service = StatsService::new(store, &config)
        .await
        .context("failed to initialize the statistics service")?;

    let state = AppState {
        service,
        api_token: config.api_token.clone(),
        read_only: config.read_only,
    };
    let app = mediastats_server::router(state);

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port)
        .parse()
        .context("failed to parse listen address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(
        %addr,
        database = %cli.database.display(),
        allowed_roots = config.allowed_roots.len(),
        read_only = config.read_only,
        max_concurrent_scans = config.max_concurrent_scans,
        background_workers = config.background_workers,
        "mediastats listening"
    );

    axum::serve(listener, app)
        .await
        .context("server error")?;

    Ok(())
}
