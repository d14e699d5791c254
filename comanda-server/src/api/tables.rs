//! Table endpoints

use axum::extract::State;
use axum::{Extension, Json};
use shared::models::dining_table::DiningTable;

use crate::auth::Identity;
use crate::db;
use crate::error::AppResult;
use crate::state::AppState;
use crate::tenant::TenantScope;

/// GET /api/tables — floor view with live occupancy (staff dashboards)
pub async fn list(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> AppResult<Json<Vec<DiningTable>>> {
    identity.require_staff()?;
    let scope = TenantScope::resolve(&identity)?;
    let tables = db::tables::list(&state.pool, &scope).await?;
    Ok(Json(tables))
}
