//! reelsift-search - movie search, enrichment and selection service
//!
//! Serves the view layer over HTTP + SSE. Configuration resolves CLI → ENV → TOML → defaults.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use reelsift_common::config::{resolve_config, ConfigOverrides};
use reelsift_common::events::EventBus;
use reelsift_search::{build_router, AppState, SearchSession};
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for reelsift-search
#[derive(Parser, Debug)]
#[command(name = "reelsift-search")]
#[command(about = "Movie search, enrichment and selection service")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "REELSIFT_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Catalog search endpoint
    #[arg(long)]
    catalog_url: Option<String>,

    /// Metadata provider endpoint
    #[arg(long)]
    omdb_url: Option<String>,

    /// Metadata provider API key
    #[arg(long)]
    omdb_api_key: Option<String>,

    /// Log filter directive (e.g. "debug", "reelsift_search=trace")
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let overrides = ConfigOverrides {
        port: args.port,
        catalog_url: args.catalog_url,
        omdb_url: args.omdb_url,
        omdb_api_key: args.omdb_api_key,
        log_level: args.log_level,
    };
    let config = resolve_config(args.config.as_deref(), &overrides)
        .context("Failed to resolve configuration")?;

    // Initialize tracing; RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "reelsift_search={level},reelsift_common={level},tower_http={level}",
                    level = config.logging.level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting reelsift-search v{} on port {}",
        env!("CARGO_PKG_VERSION"),
        config.port
    );
    info!("Catalog: {}", config.catalog_url);
    info!(
        "Metadata provider: {} (policy: {:?}, rate limit: {:?})",
        config.omdb_url, config.enrichment_policy, config.omdb_requests_per_second
    );

    let event_bus = EventBus::new(100);
    let session = Arc::new(
        SearchSession::from_config(&config, event_bus).context("Failed to build search session")?,
    );

    // Initial load with empty filters, like opening the page
    let ticket = session.reload().await;
    let initial = Arc::clone(&session);
    tokio::spawn(async move {
        initial.run_cycle(ticket).await;
    });

    let app = build_router(AppState::new(session));

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Listening on http://{}", addr);

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
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
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
