//! Session issuance
//!
//! Two entry points mint every token the server accepts:
//! - the QR flow: a customer scans a table's code and gets a customer
//!   token bound to that tenant and table;
//! - the staff login: the auth collaborator (which owns credentials)
//!   presents the shared API key and a capability set to sign.
//! No password ever reaches this server.

use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

use crate::auth::{self, Capability};
use crate::db;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QrRequest {
    /// The tenant slug embedded in the table's QR code
    pub restaurant_code: String,
    pub table_number: String,
    pub guest_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub tenant_id: i64,
    pub restaurant_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_number: Option<String>,
}

/// POST /api/session/qr — start a customer session from a scanned code
pub async fn qr(
    State(state): State<AppState>,
    Json(req): Json<QrRequest>,
) -> AppResult<Json<SessionResponse>> {
    let tenant = db::tenants::find_by_code(&state.pool, &req.restaurant_code)
        .await?
        .ok_or_else(|| AppError::NotFound("restaurant not found".to_string()))?;

    let table = db::tables::find_by_number(&state.pool, tenant.id, &req.table_number)
        .await?
        .ok_or_else(|| AppError::NotFound("table not found".to_string()))?;

    let subject = format!("guest-{}", &uuid::Uuid::new_v4().simple().to_string()[..8]);
    let name = req
        .guest_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| format!("Table {} guest", table.number));

    let token = auth::create_token(
        &state.jwt_secret,
        &subject,
        &name,
        Some(tenant.id),
        Some(table.id),
        vec![Capability::Customer],
    )?;

    tracing::info!(tenant = %tenant.code, table = %table.number, "customer session issued");
    Ok(Json(SessionResponse {
        token,
        tenant_id: tenant.id,
        restaurant_name: tenant.name,
        table_id: Some(table.id),
        table_number: Some(table.number),
    }))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub subject: String,
    pub name: String,
    pub tenant_id: Option<i64>,
    pub capabilities: Vec<Capability>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
}

/// POST /api/session/login — mint a staff token (auth collaborator only)
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let presented = headers
        .get("X-Auth-Key")
        .and_then(|v| v.to_str().ok())
        .ok_or(AppError::Unauthorized)?;
    if presented != state.auth_api_key {
        return Err(AppError::Unauthorized);
    }

    if req.capabilities.is_empty() {
        return Err(AppError::Validation(
            "at least one capability is required".to_string(),
        ));
    }
    // Anyone below administrator must be pinned to a tenant, or every
    // scoped request they make will fail anyway.
    if req.tenant_id.is_none() && !req.capabilities.contains(&Capability::Administrator) {
        return Err(AppError::Validation(
            "non-administrator principals require a tenant_id".to_string(),
        ));
    }

    let token = auth::create_token(
        &state.jwt_secret,
        &req.subject,
        &req.name,
        req.tenant_id,
        None,
        req.capabilities,
    )?;

    tracing::info!(subject = %req.subject, tenant_id = ?req.tenant_id, "staff session issued");
    Ok(Json(LoginResponse { token }))
}
