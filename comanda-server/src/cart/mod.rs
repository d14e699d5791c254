//! Session carts
//!
//! Carts are per-session scratch space, held in memory and keyed by the
//! JWT session id. They store only product ids and quantities: prices are
//! re-resolved against the live menu every time the cart is viewed or
//! converted, so a promotion starting mid-browse is reflected without any
//! cart migration. Losing a cart (restart) is acceptable; losing an order
//! is not.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use shared::models::product::Product;
use shared::util::now_millis;
use sqlx::SqlitePool;

use crate::db;
use crate::error::{AppError, AppResult};
use crate::orders::money;
use crate::tenant::TenantScope;

/// Upper bound on a single line's quantity, a fat-finger guard
const MAX_LINE_QUANTITY: i64 = 99;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    pub product_id: i64,
    pub quantity: i64,
}

/// The stored cart: product references only, no prices
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

impl Cart {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add to an existing line or append a new one
    pub fn add(&mut self, product_id: i64, quantity: i64) {
        let quantity = quantity.clamp(1, MAX_LINE_QUANTITY);
        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => line.quantity = (line.quantity + quantity).min(MAX_LINE_QUANTITY),
            None => self.lines.push(CartLine {
                product_id,
                quantity,
            }),
        }
    }

    /// Set an exact quantity; zero (or less) removes the line
    pub fn set_quantity(&mut self, product_id: i64, quantity: i64) {
        if quantity <= 0 {
            self.remove(product_id);
            return;
        }
        let quantity = quantity.min(MAX_LINE_QUANTITY);
        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => line.quantity = quantity,
            None => self.lines.push(CartLine {
                product_id,
                quantity,
            }),
        }
    }

    pub fn remove(&mut self, product_id: i64) {
        self.lines.retain(|l| l.product_id != product_id);
    }
}

/// 购物车存储 - 以会话 ID 为键的内存表
#[derive(Default)]
pub struct CartStore {
    carts: DashMap<String, Cart>,
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, session_id: &str) -> Cart {
        self.carts
            .get(session_id)
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    /// Mutate a session's cart in place, creating it on first touch
    pub fn with_cart<R>(&self, session_id: &str, f: impl FnOnce(&mut Cart) -> R) -> R {
        let mut entry = self.carts.entry(session_id.to_string()).or_default();
        f(&mut entry)
    }

    /// Remove and return the cart (placement consumes it)
    pub fn take(&self, session_id: &str) -> Cart {
        self.carts
            .remove(session_id)
            .map(|(_, cart)| cart)
            .unwrap_or_default()
    }

    pub fn clear(&self, session_id: &str) {
        self.carts.remove(session_id);
    }
}

/// Advisory availability gate applied on every cart mutation: the
/// product must exist, be orderable in the caller's scope, and cover
/// `requested` units. Fast feedback while browsing; placement
/// re-validates authoritatively under the transaction.
pub async fn check_availability(
    pool: &SqlitePool,
    scope: &TenantScope,
    product_id: i64,
    requested: i64,
) -> AppResult<Product> {
    let product = db::products::get_scoped(pool, scope, product_id)
        .await?
        .filter(|p| p.is_available)
        .ok_or_else(|| AppError::NotFound("product not found".to_string()))?;
    if requested > product.available_stock {
        return Err(AppError::InsufficientStock(product.name.clone()));
    }
    Ok(product)
}

/// One cart line priced against the current menu
#[derive(Debug, Clone, Serialize)]
pub struct PricedLine {
    pub product_id: i64,
    pub product_name: String,
    pub quantity: i64,
    /// Effective price right now (promotion applied when active)
    pub unit_price: f64,
    pub line_total: f64,
    /// Current availability, advisory only (placement re-checks)
    pub available_stock: i64,
}

/// Cart resolved to prices and totals
#[derive(Debug, Clone, Serialize)]
pub struct PricedCart {
    pub lines: Vec<PricedLine>,
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

/// Price a cart against the tenant's live menu.
///
/// Lines whose product has vanished or been hidden are dropped silently,
/// never surfaced as an error: the cart degrades to what is orderable.
pub async fn price_cart(
    pool: &SqlitePool,
    tenant_id: i64,
    cart: &Cart,
    tax_rate: f64,
) -> AppResult<PricedCart> {
    let now = now_millis();
    let mut lines = Vec::with_capacity(cart.lines.len());
    let mut subtotal = rust_decimal::Decimal::ZERO;

    for line in &cart.lines {
        let product: Option<Product> = sqlx::query_as(
            "SELECT id, tenant_id, category, name, price, station, available_stock, \
                    is_available, promo_price, promo_starts_at, promo_ends_at \
             FROM products WHERE id = ?1 AND tenant_id = ?2 AND is_available = 1",
        )
        .bind(line.product_id)
        .bind(tenant_id)
        .fetch_optional(pool)
        .await?;
        let Some(product) = product else {
            continue;
        };

        let unit_price = product.current_price(now);
        let line_total = money::line_total(unit_price, line.quantity);
        subtotal += line_total;
        lines.push(PricedLine {
            product_id: product.id,
            product_name: product.name,
            quantity: line.quantity,
            unit_price,
            line_total: money::to_f64(money::round_money(line_total)),
            available_stock: product.available_stock,
        });
    }

    let (tax, total) = money::apply_tax(subtotal, tax_rate);
    Ok(PricedCart {
        lines,
        subtotal: money::to_f64(money::round_money(subtotal)),
        tax: money::to_f64(tax),
        total: money::to_f64(total),
    })
}

/// Price a cart resolving the tax rate from the tenant record
pub async fn price_cart_for_tenant(
    pool: &SqlitePool,
    tenant_id: i64,
    cart: &Cart,
) -> AppResult<PricedCart> {
    let tax_rate = db::tenants::tax_rate(pool, tenant_id).await?;
    price_cart(pool, tenant_id, cart, tax_rate).await
}
