//! board-server: Main binary for the board service.
//!
//! This binary wires together all crates and starts the HTTP server.

use board_api::{create_router, AppState, BoardRegistry};
use board_ingestion::{AnalyticsClient, ApiConfig};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Default port for the server.
const DEFAULT_PORT: u16 = 3000;

/// Default host for the server.
const DEFAULT_HOST: &str = "0.0.0.0";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if present)
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "board_server=info,board_api=info,board_ingestion=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env()?;
    let host = std::env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    tracing::info!(
        "Starting board-server on {}:{} (upstream: {}, api key: {}, fan-out: {} pages)",
        host,
        port,
        config.base_url,
        if config.has_api_key() { "set" } else { "missing" },
        config.fanout_pages
    );
    if !config.has_api_key() {
        tracing::warn!("ANALYTICS_API_KEY is not set; upstream calls will likely be rejected");
    }

    let fanout_pages = config.fanout_pages;
    let registry = BoardRegistry::builtin();
    let state = Arc::new(
        AppState::new(AnalyticsClient::new(config), registry).with_fanout_pages(fanout_pages),
    );

    let app = create_router(Arc::clone(&state));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health                   - Health check");
    tracing::info!("  GET  /v1/boards                - List boards");
    tracing::info!("  POST /v1/boards/:board/query   - Query a board");
    tracing::info!("  POST /v1/boards/:board/refresh - Refresh a local board");
    for board in state.registry.list() {
        tracing::info!("  board {} -> {} ({:?})", board.name, board.endpoint, board.mode);
    }

    axum::serve(listener, app).await?;

    Ok(())
}
