//! Order database operations
//!
//! Reads are tenant-scoped; all mutations go through the lifecycle
//! engine (`crate::orders::engine`), which calls the transaction-bound
//! helpers here.

use shared::models::order::{Order, OrderLine, OrderStatus, PaymentStatus, Station};
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::tenant::TenantScope;

const COLUMNS: &str = "id, tenant_id, table_id, order_number, placed_by, confirmed_by, \
                       status, payment_status, total_amount, special_instructions, \
                       reason_if_cancelled, created_at, updated_at";

/// SQL predicate for "this order keeps its table occupied".
///
/// Must stay in sync with `OrderStatus::occupies_table`: pending through
/// ready always occupy, served occupies until fully paid.
pub const ACTIVE_PREDICATE: &str = "(status IN ('pending', 'confirmed', 'preparing', 'ready') \
     OR (status = 'served' AND payment_status != 'paid'))";

/// Insert a pending order inside the placement transaction.
///
/// Returns `None` on an order-number collision so the engine can retry
/// with a regenerated number.
pub async fn try_insert(
    tx: &mut Transaction<'_, Sqlite>,
    tenant_id: i64,
    table_id: i64,
    order_number: &str,
    placed_by: &str,
    instructions: &str,
    now: i64,
) -> sqlx::Result<Option<i64>> {
    let result: Result<(i64,), sqlx::Error> = sqlx::query_as(
        r#"
        INSERT INTO orders (
            tenant_id, table_id, order_number, placed_by, status, payment_status,
            total_amount, special_instructions, created_at, updated_at
        )
        VALUES (?1, ?2, ?3, ?4, 'pending', 'unpaid', 0, ?5, ?6, ?6)
        RETURNING id
        "#,
    )
    .bind(tenant_id)
    .bind(table_id)
    .bind(order_number)
    .bind(placed_by)
    .bind(instructions)
    .bind(now)
    .fetch_one(&mut **tx)
    .await;

    match result {
        Ok((id,)) => Ok(Some(id)),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Insert one snapshotted line (price/station captured at placement)
pub async fn insert_line(
    tx: &mut Transaction<'_, Sqlite>,
    order_id: i64,
    product_id: i64,
    product_name: &str,
    quantity: i64,
    unit_price: f64,
    station: Station,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO order_lines (order_id, product_id, product_name, quantity, unit_price, station)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        "#,
    )
    .bind(order_id)
    .bind(product_id)
    .bind(product_name)
    .bind(quantity)
    .bind(unit_price)
    .bind(station)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

pub async fn get(pool: &SqlitePool, id: i64) -> sqlx::Result<Option<Order>> {
    sqlx::query_as(&format!("SELECT {COLUMNS} FROM orders WHERE id = ?1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Scoped read: an order outside the scope is reported as absent, never
/// as forbidden (existence in another tenant must not leak)
pub async fn get_scoped(
    pool: &SqlitePool,
    scope: &TenantScope,
    id: i64,
) -> sqlx::Result<Option<Order>> {
    let order = get(pool, id).await?;
    Ok(order.filter(|o| scope.covers(o.tenant_id)))
}

pub async fn lines(pool: &SqlitePool, order_id: i64) -> sqlx::Result<Vec<OrderLine>> {
    sqlx::query_as(
        "SELECT id, order_id, product_id, product_name, quantity, unit_price, station \
         FROM order_lines WHERE order_id = ?1 ORDER BY id",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await
}

/// List orders in scope, newest first, optionally filtered by status
/// and by station (kitchen/bar dashboards only see orders with at least
/// one line routed to them)
pub async fn list_scoped(
    pool: &SqlitePool,
    scope: &TenantScope,
    status: Option<OrderStatus>,
    station: Option<Station>,
) -> sqlx::Result<Vec<Order>> {
    let sql = format!(
        "SELECT {COLUMNS} FROM orders \
         WHERE (?1 IS NULL OR tenant_id = ?1) \
           AND (?2 IS NULL OR status = ?2) \
           AND (?3 IS NULL OR EXISTS (SELECT 1 FROM order_lines \
                WHERE order_lines.order_id = orders.id AND order_lines.station = ?3)) \
         ORDER BY created_at DESC"
    );

    sqlx::query_as(&sql)
        .bind(scope.filter())
        .bind(status)
        .bind(station)
        .fetch_all(pool)
        .await
}

/// Optimistic status move: succeeds only if the order is still in
/// `expected` (rejects writes racing a concurrent transition)
pub async fn try_transition(
    tx: &mut Transaction<'_, Sqlite>,
    order_id: i64,
    expected: OrderStatus,
    next: OrderStatus,
    confirmed_by: Option<&str>,
    reason: Option<&str>,
    now: i64,
) -> sqlx::Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE orders
        SET status = ?1,
            confirmed_by = COALESCE(?2, confirmed_by),
            reason_if_cancelled = COALESCE(?3, reason_if_cancelled),
            updated_at = ?4
        WHERE id = ?5 AND status = ?6
        "#,
    )
    .bind(next)
    .bind(confirmed_by)
    .bind(reason)
    .bind(now)
    .bind(order_id)
    .bind(expected)
    .execute(&mut **tx)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn set_total(
    tx: &mut Transaction<'_, Sqlite>,
    order_id: i64,
    total: f64,
    now: i64,
) -> sqlx::Result<()> {
    sqlx::query("UPDATE orders SET total_amount = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(total)
        .bind(now)
        .bind(order_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

pub async fn set_payment_status(
    tx: &mut Transaction<'_, Sqlite>,
    order_id: i64,
    payment_status: PaymentStatus,
    now: i64,
) -> sqlx::Result<()> {
    sqlx::query("UPDATE orders SET payment_status = ?1, updated_at = ?2 WHERE id = ?3")
        .bind(payment_status)
        .bind(now)
        .bind(order_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Count orders that keep `table_id` occupied (the occupancy manager's
/// derived predicate, evaluated inside the caller's transaction)
pub async fn count_active_on_table(
    tx: &mut Transaction<'_, Sqlite>,
    table_id: i64,
) -> sqlx::Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM orders WHERE table_id = ?1 AND {ACTIVE_PREDICATE}");
    let (count,): (i64,) = sqlx::query_as(&sql)
        .bind(table_id)
        .fetch_one(&mut **tx)
        .await?;
    Ok(count)
}
