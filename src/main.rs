//! Hardened URL-Fetch Gateway
//!
//! A server-side fetch proxy built with Tokio and Axum. Browsers cannot
//! fetch arbitrary cross-origin pages themselves, so they POST a URL here
//! and get the raw body back in a JSON envelope — under rate limits, an
//! internal-address filter, a wall-clock deadline, and a size cap.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────┐
//!                    │                  FETCH GATEWAY                    │
//!                    │                                                   │
//!   POST {url}       │  ┌──────────┐   ┌──────────┐   ┌──────────────┐  │
//!   ─────────────────┼─▶│   gate   │──▶│ validate │──▶│    fetch     │──┼──▶ Upstream
//!                    │  │ key+rate │   │  scheme  │   │ GET deadline │  │
//!                    │  │  +shape  │   │  +host   │   │   +size cap  │  │
//!                    │  └──────────┘   └──────────┘   └──────┬───────┘  │
//!                    │                                        │          │
//!   JSON envelope    │  ┌─────────────────────────────┐      │          │
//!   ◀────────────────┼──│     response translator      │◀─────┘          │
//!                    │  │  closed tag set → status+body│                 │
//!                    │  └─────────────────────────────┘                 │
//!                    │                                                   │
//!                    │  Cross-cutting: config · observability · lifecycle│
//!                    └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fetch_gateway::config::loader::load_config;
use fetch_gateway::{GatewayConfig, HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "fetch-gateway")]
#[command(about = "Hardened server-side URL-fetch gateway", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing subscriber
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "fetch_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("fetch-gateway v0.1.0 starting");

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        rate_limit_enabled = config.rate_limit.enabled,
        max_requests = config.rate_limit.max_requests,
        window_secs = config.rate_limit.window_secs,
        fetch_timeout_secs = config.fetch.timeout_secs,
        max_body_bytes = config.fetch.max_body_bytes,
        "Configuration loaded"
    );

    // Bind TCP listener
    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        "Listening for connections"
    );

    // Initialize metrics exporter
    if config.observability.metrics_enabled {
        if let Ok(addr) = config.observability.metrics_address.parse() {
            fetch_gateway::observability::metrics::init_metrics(addr);
        } else {
            tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            );
        }
    }

    // Wire Ctrl+C to the shutdown broadcast
    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown signal received");
            shutdown.trigger();
        }
    });

    // Create and run HTTP server
    let server = HttpServer::new(config)?;
    server.run(listener, shutdown_rx).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
