//! 订单生命周期引擎
//!
//! The single owner of every order mutation: placement, status
//! transitions, cancellation and payment settlement all run here, each
//! inside one database transaction that also keeps stock counters and
//! table occupancy consistent. Notifications are published after commit,
//! fire-and-forget: a delivery failure never rolls an order back.

use rust_decimal::Decimal;
use serde::Serialize;
use shared::live::LiveEvent;
use shared::models::order::{Order, OrderLine, OrderStatus, PaymentStatus};
use shared::util::{now_millis, now_rfc3339};
use sqlx::SqlitePool;

use crate::auth::{CONFIRM_CAPABILITIES, Identity, SETTLE_CAPABILITIES};
use crate::db;
use crate::error::{AppError, AppResult};
use crate::live::{LiveBus, Topic};
use crate::orders::{money, occupancy};
use crate::tenant::TenantScope;

/// Attempts to find an unused order number before giving up
const ORDER_NUMBER_ATTEMPTS: u32 = 5;

/// One line of a placement request (quantities re-validated here; the
/// cart's view of stock is advisory only)
#[derive(Debug, Clone)]
pub struct PlacementItem {
    pub product_id: i64,
    pub quantity: i64,
}

#[derive(Debug, Clone)]
pub struct PlacementRequest {
    pub table_id: i64,
    pub items: Vec<PlacementItem>,
    pub special_instructions: String,
}

/// Order plus its lines, the shape every order endpoint returns
#[derive(Debug, Clone, Serialize)]
pub struct OrderView {
    #[serde(flatten)]
    pub order: Order,
    pub lines: Vec<OrderLine>,
}

/// Generate a public order number: "ORD-" + 8 uppercase hex chars
fn generate_order_number() -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("ORD-{}", hex[..8].to_uppercase())
}

#[derive(Clone)]
pub struct OrderEngine {
    pool: SqlitePool,
    bus: LiveBus,
}

impl OrderEngine {
    pub fn new(pool: SqlitePool, bus: LiveBus) -> Self {
        Self { pool, bus }
    }

    /// Place an order on a table.
    ///
    /// Everything between order creation and occupancy marking is one
    /// transaction: a stock shortfall on the last line aborts the whole
    /// order and releases every decrement already made.
    pub async fn place_order(
        &self,
        identity: &Identity,
        scope: &TenantScope,
        request: PlacementRequest,
    ) -> AppResult<OrderView> {
        if request.items.is_empty() {
            return Err(AppError::Validation("order has no items".to_string()));
        }
        for item in &request.items {
            if item.quantity <= 0 {
                return Err(AppError::Validation(format!(
                    "invalid quantity {} for product {}",
                    item.quantity, item.product_id
                )));
            }
        }

        let table = db::tables::get_scoped(&self.pool, scope, request.table_id)
            .await?
            .ok_or_else(|| AppError::NotFound("table not found".to_string()))?;
        let tenant_id = table.tenant_id;

        // QR customers are bound to one table; placing on another is a
        // forged request, not a mistake.
        if let Some(bound) = identity.table_id {
            if bound != table.id {
                return Err(AppError::Forbidden(
                    "session is bound to a different table".to_string(),
                ));
            }
        }

        // Snapshot products and the tax rate up front: once the write
        // transaction is open this task must not borrow a second pool
        // connection, or concurrent placements deadlock the pool.
        let now = now_millis();
        let mut products = Vec::with_capacity(request.items.len());
        for item in &request.items {
            let product = db::products::get_scoped(&self.pool, scope, item.product_id)
                .await?
                .filter(|p| p.tenant_id == tenant_id && p.is_available)
                .ok_or_else(|| AppError::NotFound("product not found".to_string()))?;
            products.push(product);
        }
        let tax_rate = db::tenants::tax_rate(&self.pool, tenant_id).await?;

        let mut tx = self.pool.begin().await?;

        let mut order_id = None;
        for _ in 0..ORDER_NUMBER_ATTEMPTS {
            let number = generate_order_number();
            if let Some(id) = db::orders::try_insert(
                &mut tx,
                tenant_id,
                table.id,
                &number,
                &identity.subject,
                &request.special_instructions,
                now,
            )
            .await?
            {
                order_id = Some(id);
                break;
            }
            tracing::warn!(number, "order number collision, regenerating");
        }
        let order_id = order_id.ok_or_else(|| {
            AppError::Internal("could not allocate a unique order number".to_string())
        })?;

        let mut subtotal = Decimal::ZERO;
        for (item, product) in request.items.iter().zip(&products) {
            let decremented =
                db::products::try_decrement_stock(&mut tx, tenant_id, product.id, item.quantity)
                    .await?;
            if !decremented {
                // Dropping the transaction rolls back the order row and
                // every earlier decrement.
                return Err(AppError::InsufficientStock(product.name.clone()));
            }

            let unit_price = product.current_price(now);
            db::orders::insert_line(
                &mut tx,
                order_id,
                product.id,
                &product.name,
                item.quantity,
                unit_price,
                product.station,
            )
            .await?;
            subtotal += money::line_total(unit_price, item.quantity);
        }

        let (_tax, total) = money::apply_tax(subtotal, tax_rate);
        db::orders::set_total(&mut tx, order_id, money::to_f64(total), now).await?;

        occupancy::occupy(&mut tx, table.id).await?;

        tx.commit().await?;

        let view = self.load_view(order_id).await?;
        let order = &view.order;

        let event = LiveEvent::NewOrder {
            order_id: order.id,
            order_number: order.order_number.clone(),
            table_number: table.number.clone(),
            items_count: view.lines.iter().map(|l| l.quantity).sum(),
            total_amount: order.total_amount,
            message: format!(
                "New order {} on table {}",
                order.order_number, table.number
            ),
            timestamp: now_rfc3339(),
        };
        self.bus.publish(Topic::Restaurant(tenant_id), event.clone());
        self.bus.publish(Topic::Order(order.id), event);

        tracing::info!(
            order_id,
            order_number = %order.order_number,
            table = %table.number,
            total = order.total_amount,
            "order placed"
        );
        Ok(view)
    }

    /// Move an order along the state machine (staff only).
    ///
    /// `pending → confirmed` additionally requires a confirm capability
    /// and records who confirmed. A cancellation requires a non-empty
    /// reason and restores the stock the placement took.
    pub async fn transition(
        &self,
        identity: &Identity,
        scope: &TenantScope,
        order_id: i64,
        next: OrderStatus,
        reason: Option<String>,
    ) -> AppResult<OrderView> {
        identity.require_staff()?;

        let order = db::orders::get_scoped(&self.pool, scope, order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("order not found".to_string()))?;

        if order.status == OrderStatus::Pending
            && next == OrderStatus::Confirmed
            && !identity.has_any(CONFIRM_CAPABILITIES)
        {
            return Err(AppError::Forbidden(
                "confirming orders requires a kitchen, bar or owner capability".to_string(),
            ));
        }

        self.apply_transition(identity, order, next, reason).await
    }

    /// Cancel an order.
    ///
    /// Customers may only cancel their own, still-pending orders; staff
    /// cancellation goes through the full transition rules.
    pub async fn cancel(
        &self,
        identity: &Identity,
        scope: &TenantScope,
        order_id: i64,
        reason: String,
    ) -> AppResult<OrderView> {
        let order = db::orders::get_scoped(&self.pool, scope, order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("order not found".to_string()))?;

        if identity.is_customer() {
            if order.placed_by != identity.subject {
                return Err(AppError::Forbidden(
                    "customers may only cancel their own orders".to_string(),
                ));
            }
            if order.status != OrderStatus::Pending {
                return Err(AppError::Forbidden(
                    "order is already being prepared; ask the staff to cancel".to_string(),
                ));
            }
        }

        self.apply_transition(identity, order, OrderStatus::Cancelled, Some(reason))
            .await
    }

    /// Record a payment and release the table once the bill is settled
    pub async fn settle_payment(
        &self,
        identity: &Identity,
        scope: &TenantScope,
        order_id: i64,
        payment_status: PaymentStatus,
    ) -> AppResult<OrderView> {
        if !identity.has_any(SETTLE_CAPABILITIES) {
            return Err(AppError::Forbidden(
                "settling payments requires a cashier or owner capability".to_string(),
            ));
        }

        let order = db::orders::get_scoped(&self.pool, scope, order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("order not found".to_string()))?;
        if order.status == OrderStatus::Cancelled {
            return Err(AppError::Conflict(
                "cancelled orders cannot be settled".to_string(),
            ));
        }

        let now = now_millis();
        let mut tx = self.pool.begin().await?;
        db::orders::set_payment_status(&mut tx, order.id, payment_status, now).await?;
        let occupied = occupancy::reconcile(&mut tx, order.table_id).await?;
        tx.commit().await?;

        let view = self.load_view(order.id).await?;
        let table_number = self.table_number(order.table_id).await;
        let event = LiveEvent::OrderStatusUpdate {
            order_id: order.id,
            order_number: order.order_number.clone(),
            table_number: table_number.clone(),
            status: view.order.status,
            status_display: view.order.status.display_name().to_string(),
            message: format!(
                "Order {} payment is now {}",
                order.order_number,
                serde_json::to_string(&payment_status)
                    .unwrap_or_default()
                    .trim_matches('"')
            ),
            updated_by: identity.name.clone(),
            timestamp: now_rfc3339(),
        };
        self.bus
            .publish(Topic::Restaurant(order.tenant_id), event.clone());
        self.bus.publish(Topic::Order(order.id), event);

        tracing::info!(
            order_id = order.id,
            payment = ?payment_status,
            table_occupied = occupied,
            "payment settled"
        );
        Ok(view)
    }

    /// Recompute an order's total from its lines and the tenant's
    /// current tax rate. Placement already does this inline; this is
    /// the standalone path for administrative corrections.
    pub async fn recalculate(&self, order_id: i64) -> AppResult<f64> {
        let order = db::orders::get(&self.pool, order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("order not found".to_string()))?;
        let lines = db::orders::lines(&self.pool, order_id).await?;
        let tax_rate = db::tenants::tax_rate(&self.pool, order.tenant_id).await?;

        let subtotal: Decimal = lines
            .iter()
            .map(|l| money::line_total(l.unit_price, l.quantity))
            .sum();
        let (_tax, total) = money::apply_tax(subtotal, tax_rate);
        let total = money::to_f64(total);

        let mut tx = self.pool.begin().await?;
        db::orders::set_total(&mut tx, order_id, total, now_millis()).await?;
        tx.commit().await?;
        Ok(total)
    }

    /// Shared transition core: graph validation, the optimistic write,
    /// side effects (stock, occupancy) and the post-commit events.
    async fn apply_transition(
        &self,
        identity: &Identity,
        order: Order,
        next: OrderStatus,
        reason: Option<String>,
    ) -> AppResult<OrderView> {
        if !order.status.can_transition_to(next) {
            return Err(AppError::InvalidTransition {
                from: order.status,
                to: next,
            });
        }
        let cancelling = next == OrderStatus::Cancelled;
        if cancelling && reason.as_deref().is_none_or(|r| r.trim().is_empty()) {
            return Err(AppError::Validation(
                "a cancellation reason is required".to_string(),
            ));
        }

        let confirmed_by = (order.status == OrderStatus::Pending && next == OrderStatus::Confirmed)
            .then(|| identity.name.clone());
        let lines = db::orders::lines(&self.pool, order.id).await?;

        let now = now_millis();
        let mut tx = self.pool.begin().await?;

        let moved = db::orders::try_transition(
            &mut tx,
            order.id,
            order.status,
            next,
            confirmed_by.as_deref(),
            if cancelling { reason.as_deref() } else { None },
            now,
        )
        .await?;
        if !moved {
            // Another request already moved the order; report against
            // its current status. Give the connection back first -- no
            // pool borrows while a transaction is held.
            drop(tx);
            let current = db::orders::get(&self.pool, order.id)
                .await?
                .map(|o| o.status)
                .unwrap_or(order.status);
            return Err(AppError::InvalidTransition {
                from: current,
                to: next,
            });
        }

        // Cancellation is the only transition that returns stock; waste
        // terminals record a loss, the food is already prepared.
        if cancelling {
            for line in &lines {
                db::products::restore_stock(&mut tx, line.product_id, line.quantity).await?;
            }
        }

        occupancy::reconcile(&mut tx, order.table_id).await?;

        tx.commit().await?;

        let view = self.load_view(order.id).await?;
        let table_number = self.table_number(order.table_id).await;
        let timestamp = now_rfc3339();

        let update = LiveEvent::OrderStatusUpdate {
            order_id: order.id,
            order_number: order.order_number.clone(),
            table_number: table_number.clone(),
            status: next,
            status_display: next.display_name().to_string(),
            message: format!(
                "Order {} is now {}",
                order.order_number,
                next.display_name()
            ),
            updated_by: identity.name.clone(),
            timestamp: timestamp.clone(),
        };
        self.bus
            .publish(Topic::Restaurant(order.tenant_id), update.clone());
        self.bus.publish(Topic::Order(order.id), update);

        if cancelling {
            let cancelled = LiveEvent::OrderCancelled {
                order_id: order.id,
                order_number: order.order_number.clone(),
                table_number,
                reason: reason.clone().unwrap_or_default(),
                message: format!("Order {} was cancelled", order.order_number),
                timestamp,
            };
            self.bus
                .publish(Topic::Restaurant(order.tenant_id), cancelled.clone());
            self.bus.publish(Topic::Order(order.id), cancelled);
        }

        tracing::info!(
            order_id = order.id,
            from = %order.status,
            to = %next,
            by = %identity.name,
            "order transition"
        );
        Ok(view)
    }

    pub async fn load_view(&self, order_id: i64) -> AppResult<OrderView> {
        let order = db::orders::get(&self.pool, order_id)
            .await?
            .ok_or_else(|| AppError::NotFound("order not found".to_string()))?;
        let lines = db::orders::lines(&self.pool, order_id).await?;
        Ok(OrderView { order, lines })
    }

    /// Table number for event payloads; falls back to the raw id when
    /// the table was deactivated after placement.
    async fn table_number(&self, table_id: i64) -> String {
        match db::tables::get_scoped(&self.pool, &TenantScope::Unscoped, table_id).await {
            Ok(Some(table)) => table.number,
            _ => table_id.to_string(),
        }
    }
}
