//! Dining Table Model

use serde::{Deserialize, Serialize};

/// Dining table entity (桌台)
///
/// `is_occupied` is derived state: it must always agree with "does an
/// active order reference this table". The server reconciles it on every
/// order transition; nothing else writes it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DiningTable {
    pub id: i64,
    pub tenant_id: i64,
    /// Table number, unique per tenant ("T3", "12", ...)
    pub number: String,
    pub capacity: i32,
    pub is_occupied: bool,
    pub is_active: bool,
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiningTableCreate {
    pub number: String,
    pub capacity: Option<i32>,
}
