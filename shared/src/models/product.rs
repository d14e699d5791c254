//! Product Model

use serde::{Deserialize, Serialize};

use super::order::Station;

/// Product entity (menu item)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Product {
    pub id: i64,
    pub tenant_id: i64,
    pub category: String,
    pub name: String,
    /// Regular price in currency unit
    pub price: f64,
    /// Preparation area the item is routed to
    pub station: Station,
    pub available_stock: i64,
    pub is_available: bool,
    /// Promotional price, active inside [promo_starts_at, promo_ends_at)
    pub promo_price: Option<f64>,
    pub promo_starts_at: Option<i64>,
    pub promo_ends_at: Option<i64>,
}

impl Product {
    /// Whether a promotion window covers `now` (millis)
    pub fn has_active_promotion(&self, now: i64) -> bool {
        match (self.promo_price, self.promo_starts_at, self.promo_ends_at) {
            (Some(_), Some(start), Some(end)) => start <= now && now < end,
            _ => false,
        }
    }

    /// Effective price at `now`: promotional price when the window is
    /// active, regular price otherwise
    pub fn current_price(&self, now: i64) -> f64 {
        if self.has_active_promotion(now) {
            self.promo_price.unwrap_or(self.price)
        } else {
            self.price
        }
    }
}

/// Create product payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductCreate {
    pub category: String,
    pub name: String,
    pub price: f64,
    pub station: Station,
    pub available_stock: i64,
    pub promo_price: Option<f64>,
    pub promo_starts_at: Option<i64>,
    pub promo_ends_at: Option<i64>,
}
