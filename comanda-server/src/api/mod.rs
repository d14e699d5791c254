//! HTTP API
//!
//! Route map:
//! - `POST /api/session/qr`, `POST /api/session/login` — public
//! - everything under `/api` behind the JWT middleware
//! - `GET /health` — liveness probe

pub mod cart;
pub mod menu;
pub mod orders;
pub mod session;
pub mod tables;

use axum::routing::{get, post, put};
use axum::{Json, Router, middleware};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::auth_middleware;
use crate::live;
use crate::state::AppState;

/// GET /health
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Build the full application router
pub fn router(state: AppState) -> Router {
    let authed = Router::new()
        .route("/api/menu", get(menu::browse))
        .route(
            "/api/cart",
            get(cart::view).post(cart::add_item).delete(cart::clear),
        )
        .route(
            "/api/cart/{product_id}",
            put(cart::set_quantity).delete(cart::remove_item),
        )
        .route("/api/orders", post(orders::place).get(orders::list))
        .route("/api/orders/{id}", get(orders::get))
        .route("/api/orders/{id}/status", post(orders::transition))
        .route("/api/orders/{id}/cancel", post(orders::cancel))
        .route("/api/orders/{id}/payment", post(orders::payment))
        .route("/api/tables", get(tables::list))
        .route("/api/live/ws", get(live::ws::handle_live_ws))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health))
        .route("/api/session/qr", post(session::qr))
        .route("/api/session/login", post(session::login))
        .merge(authed)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
