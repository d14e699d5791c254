//! Dining table database operations
//!
//! `is_occupied` is written only by the occupancy manager
//! (`crate::orders::occupancy`), never here.

use shared::models::dining_table::{DiningTable, DiningTableCreate};
use sqlx::SqlitePool;

use crate::tenant::TenantScope;

const COLUMNS: &str = "id, tenant_id, number, capacity, is_occupied, is_active";

pub async fn create(
    pool: &SqlitePool,
    tenant_id: i64,
    data: &DiningTableCreate,
) -> sqlx::Result<DiningTable> {
    let table: DiningTable = sqlx::query_as(
        r#"
        INSERT INTO dining_tables (tenant_id, number, capacity, is_occupied, is_active)
        VALUES (?1, ?2, ?3, 0, 1)
        RETURNING id, tenant_id, number, capacity, is_occupied, is_active
        "#,
    )
    .bind(tenant_id)
    .bind(&data.number)
    .bind(data.capacity.unwrap_or(4))
    .fetch_one(pool)
    .await?;
    Ok(table)
}

/// List active tables visible in the scope, with live occupancy
pub async fn list(pool: &SqlitePool, scope: &TenantScope) -> sqlx::Result<Vec<DiningTable>> {
    match scope.filter() {
        Some(tenant_id) => {
            sqlx::query_as(&format!(
                "SELECT {COLUMNS} FROM dining_tables \
                 WHERE tenant_id = ?1 AND is_active = 1 ORDER BY number"
            ))
            .bind(tenant_id)
            .fetch_all(pool)
            .await
        }
        None => {
            sqlx::query_as(&format!(
                "SELECT {COLUMNS} FROM dining_tables \
                 WHERE is_active = 1 ORDER BY tenant_id, number"
            ))
            .fetch_all(pool)
            .await
        }
    }
}

pub async fn get_scoped(
    pool: &SqlitePool,
    scope: &TenantScope,
    id: i64,
) -> sqlx::Result<Option<DiningTable>> {
    let table: Option<DiningTable> = sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM dining_tables WHERE id = ?1 AND is_active = 1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(table.filter(|t| scope.covers(t.tenant_id)))
}

/// Find an active table by its per-tenant number
pub async fn find_by_number(
    pool: &SqlitePool,
    tenant_id: i64,
    number: &str,
) -> sqlx::Result<Option<DiningTable>> {
    sqlx::query_as(&format!(
        "SELECT {COLUMNS} FROM dining_tables \
         WHERE tenant_id = ?1 AND number = ?2 AND is_active = 1"
    ))
    .bind(tenant_id)
    .bind(number)
    .fetch_optional(pool)
    .await
}
