//! Tenant database operations

use shared::models::tenant::{Tenant, TenantCreate};
use shared::util::now_millis;
use sqlx::SqlitePool;

pub async fn create(pool: &SqlitePool, data: &TenantCreate) -> sqlx::Result<Tenant> {
    let tax_rate = data.tax_rate.unwrap_or(0.08);
    let tenant: Tenant = sqlx::query_as(
        r#"
        INSERT INTO tenants (name, code, tax_rate, is_active, created_at)
        VALUES (?1, ?2, ?3, 1, ?4)
        RETURNING id, name, code, tax_rate, is_active, created_at
        "#,
    )
    .bind(&data.name)
    .bind(&data.code)
    .bind(tax_rate)
    .bind(now_millis())
    .fetch_one(pool)
    .await?;
    Ok(tenant)
}

/// Look up an active tenant by its QR-code slug
pub async fn find_by_code(pool: &SqlitePool, code: &str) -> sqlx::Result<Option<Tenant>> {
    sqlx::query_as(
        r#"
        SELECT id, name, code, tax_rate, is_active, created_at
        FROM tenants WHERE code = ?1 AND is_active = 1
        "#,
    )
    .bind(code)
    .fetch_optional(pool)
    .await
}

/// Configured tax rate for a tenant (fraction, e.g. 0.08)
pub async fn tax_rate(pool: &SqlitePool, id: i64) -> sqlx::Result<f64> {
    let (rate,): (f64,) = sqlx::query_as("SELECT tax_rate FROM tenants WHERE id = ?1")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(rate)
}
