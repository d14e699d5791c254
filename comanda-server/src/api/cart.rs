//! Cart endpoints
//!
//! Every mutation returns the freshly priced cart so clients never hold
//! a stale totals snapshot. Stock checks here are advisory (fast
//! feedback while browsing); placement re-validates authoritatively.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::auth::Identity;
use crate::cart::{self, PricedCart};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::tenant::TenantScope;

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: i64,
}

async fn priced(state: &AppState, identity: &Identity) -> AppResult<PricedCart> {
    let scope = TenantScope::resolve(identity)?;
    let tenant_id = scope.require_tenant()?;
    let cart = state.carts.get(&identity.session_id);
    cart::price_cart_for_tenant(&state.pool, tenant_id, &cart).await
}

/// GET /api/cart — current cart with live prices and totals
pub async fn view(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> AppResult<Json<PricedCart>> {
    Ok(Json(priced(&state, &identity).await?))
}

/// POST /api/cart — add a product (merges with an existing line)
pub async fn add_item(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<AddItemRequest>,
) -> AppResult<Json<PricedCart>> {
    if req.quantity <= 0 {
        return Err(AppError::Validation("quantity must be positive".to_string()));
    }

    let scope = TenantScope::resolve(&identity)?;
    let in_cart = state
        .carts
        .get(&identity.session_id)
        .lines
        .iter()
        .find(|l| l.product_id == req.product_id)
        .map(|l| l.quantity)
        .unwrap_or(0);
    cart::check_availability(&state.pool, &scope, req.product_id, in_cart + req.quantity).await?;

    state
        .carts
        .with_cart(&identity.session_id, |c| c.add(req.product_id, req.quantity));
    Ok(Json(priced(&state, &identity).await?))
}

/// PUT /api/cart/{product_id} — set an exact quantity (zero removes)
pub async fn set_quantity(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(product_id): Path<i64>,
    Json(req): Json<SetQuantityRequest>,
) -> AppResult<Json<PricedCart>> {
    // Zero removes the line and needs no availability
    if req.quantity > 0 {
        let scope = TenantScope::resolve(&identity)?;
        cart::check_availability(&state.pool, &scope, product_id, req.quantity).await?;
    }
    state
        .carts
        .with_cart(&identity.session_id, |c| c.set_quantity(product_id, req.quantity));
    Ok(Json(priced(&state, &identity).await?))
}

/// DELETE /api/cart/{product_id} — remove one line
pub async fn remove_item(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(product_id): Path<i64>,
) -> AppResult<Json<PricedCart>> {
    state
        .carts
        .with_cart(&identity.session_id, |c| c.remove(product_id));
    Ok(Json(priced(&state, &identity).await?))
}

/// DELETE /api/cart — drop the whole cart
pub async fn clear(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> StatusCode {
    state.carts.clear(&identity.session_id);
    StatusCode::NO_CONTENT
}
