//! comanda-server — multi-tenant restaurant ordering backend
//!
//! Long-running service that:
//! - Issues QR customer sessions and staff sessions (JWT)
//! - Holds per-session carts and converts them into orders atomically
//! - Drives the order status state machine (stock, table occupancy)
//! - Fans lifecycle events out to kitchen/bar/cashier dashboards over WS

use comanda_server::api;
use comanda_server::config::Config;
use comanda_server::state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "comanda_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting comanda-server (env: {})", config.environment);

    let state = AppState::new(&config).await?;

    let app = api::router(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("comanda-server HTTP listening on {addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
