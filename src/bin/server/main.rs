//! Smartlog Analytics HTTP Server
//!
//! Exposes the log ingestion and aggregation views over a REST API.
//!
//! # Endpoints
//!
//! ## Log file management
//! - `POST /api/log` - Upload a parsed log file
//! - `GET /api/log` - List stored log files
//! - `DELETE /api/log` - Delete a stored log file
//!
//! ## Log aggregation analysis
//! - `GET /api/log_aggregation/overview` - Overview statistics
//! - `POST /api/log_aggregation/frequency` - Frequency analysis
//!
//! ## Charts
//! - `GET /api/charts/filters` - Filter values for the chart controls
//! - `POST /api/charts/time` - Time histogram
//! - `POST /api/charts/firmware` - Firmware histogram
//!
//! ## Admin
//! - `GET /health` - Health check
//!
//! # Configuration
//!
//! Reads TOML configuration from `SMARTLOG_CONFIG` or `./smartlog.toml`,
//! with `SMARTLOG_*` environment overrides.

mod handlers;
mod types;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use clap::Parser;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use handlers::AppState;
use smartlog_analytics::config::Config;
use smartlog_analytics::store::HttpStore;
use smartlog_analytics::LogDatabase;

/// Smartlog analytics server
#[derive(Debug, Parser)]
#[command(name = "smartlog-server", version)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long)]
    config: Option<String>,

    /// Listen address override (host:port)
    #[arg(long)]
    listen: Option<String>,
}

fn build_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        // Log file management
        .route(
            "/api/log",
            post(handlers::upload_log)
                .get(handlers::list_logs)
                .delete(handlers::delete_log),
        )
        // Aggregation analysis
        .route(
            "/api/log_aggregation/overview",
            get(handlers::log_overview),
        )
        .route(
            "/api/log_aggregation/frequency",
            post(handlers::log_frequency),
        )
        // Charts
        .route("/api/charts/filters", get(handlers::chart_filters))
        .route("/api/charts/time", post(handlers::time_chart))
        .route("/api/charts/firmware", post(handlers::firmware_chart))
        .layer(cors)
        .with_state(state)
}

async fn shutdown_signal() {
    // Graceful shutdown on ctrl-c; SIGTERM is covered by the runtime default
    let _ = signal::ctrl_c().await;
    info!("shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Some(path) = &cli.config {
        std::env::set_var("SMARTLOG_CONFIG", path);
    }
    let config = Config::load()?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.monitoring.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!("Starting Smartlog Analytics Server v{}", env!("CARGO_PKG_VERSION"));

    let store = Arc::new(HttpStore::new(config.http_store_config())?);
    let db = LogDatabase::new(store, config.store.index.clone());
    db.ensure_ready().await?;
    info!(index = %config.store.index, "log index ready");

    let state = Arc::new(AppState { db });
    let app = build_router(state);

    let listen_addr = cli.listen.unwrap_or_else(|| config.listen_addr());
    let addr: SocketAddr = listen_addr.parse()?;
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}
