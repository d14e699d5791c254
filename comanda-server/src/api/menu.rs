//! Menu browsing

use axum::Extension;
use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use shared::models::order::Station;
use shared::util::now_millis;

use crate::auth::Identity;
use crate::db;
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use crate::tenant::TenantScope;

#[derive(Debug, Deserialize)]
pub struct MenuParams {
    /// Required for administrators, ignored for tenant-bound sessions
    pub tenant_id: Option<i64>,
}

/// One menu entry with the price a customer would pay right now
#[derive(Debug, Serialize)]
pub struct MenuItem {
    pub id: i64,
    pub category: String,
    pub name: String,
    pub price: f64,
    /// Effective price at this moment (promotion applied when active)
    pub current_price: f64,
    pub on_promotion: bool,
    pub station: Station,
    pub available_stock: i64,
}

/// GET /api/menu — available products of the caller's restaurant
pub async fn browse(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<MenuParams>,
) -> AppResult<Json<Vec<MenuItem>>> {
    let scope = TenantScope::resolve(&identity)?;
    let tenant_id = match scope.filter() {
        Some(id) => id,
        None => params.tenant_id.ok_or_else(|| {
            AppError::Validation("tenant_id is required for unscoped sessions".to_string())
        })?,
    };

    let now = now_millis();
    let items = db::products::list_available(&state.pool, tenant_id)
        .await?
        .into_iter()
        .map(|p| MenuItem {
            current_price: p.current_price(now),
            on_promotion: p.has_active_promotion(now),
            id: p.id,
            category: p.category,
            name: p.name,
            price: p.price,
            station: p.station,
            available_stock: p.available_stock,
        })
        .collect();

    Ok(Json(items))
}
