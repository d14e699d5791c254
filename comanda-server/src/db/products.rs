//! Product database operations
//!
//! Stock counters are the only globally shared mutable resource in the
//! order core: every change goes through the conditional atomic updates
//! below, never read-modify-write in application code.

use shared::models::product::{Product, ProductCreate};
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::tenant::TenantScope;

const COLUMNS: &str = "id, tenant_id, category, name, price, station, available_stock, \
                       is_available, promo_price, promo_starts_at, promo_ends_at";

pub async fn create(
    pool: &SqlitePool,
    tenant_id: i64,
    data: &ProductCreate,
) -> sqlx::Result<Product> {
    let product: Product = sqlx::query_as(&format!(
        r#"
        INSERT INTO products (
            tenant_id, category, name, price, station, available_stock,
            is_available, promo_price, promo_starts_at, promo_ends_at
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?8, ?9)
        RETURNING {COLUMNS}
        "#
    ))
    .bind(tenant_id)
    .bind(&data.category)
    .bind(&data.name)
    .bind(data.price)
    .bind(data.station)
    .bind(data.available_stock)
    .bind(data.promo_price)
    .bind(data.promo_starts_at)
    .bind(data.promo_ends_at)
    .fetch_one(pool)
    .await?;
    Ok(product)
}

/// Available menu for one tenant, ordered the way it is browsed
pub async fn list_available(pool: &SqlitePool, tenant_id: i64) -> sqlx::Result<Vec<Product>> {
    sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM products \
         WHERE tenant_id = ?1 AND is_available = 1 ORDER BY category, name"
    ))
    .bind(tenant_id)
    .fetch_all(pool)
    .await
}

pub async fn get_scoped(
    pool: &SqlitePool,
    scope: &TenantScope,
    id: i64,
) -> sqlx::Result<Option<Product>> {
    let product: Option<Product> =
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM products WHERE id = ?1"))
            .bind(id)
            .fetch_optional(pool)
            .await?;
    Ok(product.filter(|p| scope.covers(p.tenant_id)))
}

pub async fn available_stock(pool: &SqlitePool, id: i64) -> sqlx::Result<i64> {
    let (stock,): (i64,) = sqlx::query_as("SELECT available_stock FROM products WHERE id = ?1")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(stock)
}

/// Atomically decrement stock inside a placement transaction.
///
/// Returns `false` when availability is insufficient (no row matched);
/// the caller must abort the whole placement.
pub async fn try_decrement_stock(
    tx: &mut Transaction<'_, Sqlite>,
    tenant_id: i64,
    product_id: i64,
    quantity: i64,
) -> sqlx::Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE products
        SET available_stock = available_stock - ?1
        WHERE id = ?2 AND tenant_id = ?3 AND is_available = 1 AND available_stock >= ?1
        "#,
    )
    .bind(quantity)
    .bind(product_id)
    .bind(tenant_id)
    .execute(&mut **tx)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Restore stock when an order is cancelled (the pairing for the
/// placement decrement)
pub async fn restore_stock(
    tx: &mut Transaction<'_, Sqlite>,
    product_id: i64,
    quantity: i64,
) -> sqlx::Result<()> {
    sqlx::query("UPDATE products SET available_stock = available_stock + ?1 WHERE id = ?2")
        .bind(quantity)
        .bind(product_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}
