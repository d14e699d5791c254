//! Tenant Model

use serde::{Deserialize, Serialize};

/// Tenant entity — one restaurant's isolated data scope
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Tenant {
    pub id: i64,
    pub name: String,
    /// QR-code slug customers scan to open a session
    pub code: String,
    /// Tax rate as a fraction (0.08 = 8%)
    pub tax_rate: f64,
    pub is_active: bool,
    pub created_at: i64,
}

/// Create tenant payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TenantCreate {
    pub name: String,
    pub code: String,
    pub tax_rate: Option<f64>,
}
