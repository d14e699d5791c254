//! Order endpoints
//!
//! Thin HTTP shells over [`crate::orders::OrderEngine`]; authorization
//! that depends on order content (ownership, capability gates per
//! transition) lives in the engine, tenant scoping lives here.

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::Deserialize;
use shared::models::order::{Order, OrderStatus, PaymentStatus, Station};

use crate::auth::Identity;
use crate::db;
use crate::error::{AppError, AppResult};
use crate::orders::{OrderView, PlacementItem, PlacementRequest};
use crate::state::AppState;
use crate::tenant::TenantScope;

#[derive(Debug, Deserialize)]
pub struct PlaceOrderRequest {
    /// Staff placing on behalf of a walk-in; QR sessions use their
    /// bound table and may omit this
    pub table_id: Option<i64>,
    #[serde(default)]
    pub special_instructions: String,
}

/// POST /api/orders — convert the session's cart into an order
pub async fn place(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<PlaceOrderRequest>,
) -> AppResult<Json<OrderView>> {
    let scope = TenantScope::resolve(&identity)?;

    let table_id = identity
        .table_id
        .or(req.table_id)
        .ok_or_else(|| AppError::Validation("no table for this order".to_string()))?;

    let cart = state.carts.get(&identity.session_id);
    let items: Vec<PlacementItem> = cart
        .lines
        .iter()
        .map(|l| PlacementItem {
            product_id: l.product_id,
            quantity: l.quantity,
        })
        .collect();

    let view = state
        .engine
        .place_order(
            &identity,
            &scope,
            PlacementRequest {
                table_id,
                items,
                special_instructions: req.special_instructions,
            },
        )
        .await?;

    // The cart survives a failed placement so the customer can adjust it
    state.carts.clear(&identity.session_id);
    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub status: Option<OrderStatus>,
    /// Kitchen/bar dashboards: only orders with a line routed to them
    pub station: Option<Station>,
}

/// GET /api/orders — tenant-scoped list, newest first
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Vec<Order>>> {
    let scope = TenantScope::resolve(&identity)?;
    let mut orders =
        db::orders::list_scoped(&state.pool, &scope, params.status, params.station).await?;

    // Customers only ever see their own orders
    if identity.is_customer() {
        orders.retain(|o| o.placed_by == identity.subject);
    }
    Ok(Json(orders))
}

/// GET /api/orders/{id}
pub async fn get(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
) -> AppResult<Json<OrderView>> {
    let scope = TenantScope::resolve(&identity)?;
    let order = db::orders::get_scoped(&state.pool, &scope, id)
        .await?
        .ok_or_else(|| AppError::NotFound("order not found".to_string()))?;
    if identity.is_customer() && order.placed_by != identity.subject {
        return Err(AppError::NotFound("order not found".to_string()));
    }
    let lines = db::orders::lines(&state.pool, id).await?;
    Ok(Json(OrderView { order, lines }))
}

#[derive(Debug, Deserialize)]
pub struct TransitionRequest {
    pub status: OrderStatus,
    pub reason: Option<String>,
}

/// POST /api/orders/{id}/status — move the order along the state machine
pub async fn transition(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    Json(req): Json<TransitionRequest>,
) -> AppResult<Json<OrderView>> {
    let scope = TenantScope::resolve(&identity)?;
    let view = state
        .engine
        .transition(&identity, &scope, id, req.status, req.reason)
        .await?;
    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
pub struct CancelRequest {
    pub reason: String,
}

/// POST /api/orders/{id}/cancel
pub async fn cancel(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    Json(req): Json<CancelRequest>,
) -> AppResult<Json<OrderView>> {
    let scope = TenantScope::resolve(&identity)?;
    let view = state.engine.cancel(&identity, &scope, id, req.reason).await?;
    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    pub payment_status: PaymentStatus,
}

/// POST /api/orders/{id}/payment — record the cashier's settlement
pub async fn payment(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(id): Path<i64>,
    Json(req): Json<PaymentRequest>,
) -> AppResult<Json<OrderView>> {
    let scope = TenantScope::resolve(&identity)?;
    let view = state
        .engine
        .settle_payment(&identity, &scope, id, req.payment_status)
        .await?;
    Ok(Json(view))
}
