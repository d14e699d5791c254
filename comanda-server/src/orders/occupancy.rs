//! Table occupancy manager
//!
//! Maintains the invariant: a table is occupied iff it has at least one
//! active order. The stored `is_occupied` flag is a cache of that
//! predicate; the derived definition is canonical and the cache is
//! reconciled inside every transition's transaction.

use sqlx::{Sqlite, Transaction};

use crate::db;

/// Mark a table occupied. Unconditional and idempotent: occupying an
/// already-occupied table is a no-op.
pub async fn occupy(tx: &mut Transaction<'_, Sqlite>, table_id: i64) -> sqlx::Result<()> {
    sqlx::query("UPDATE dining_tables SET is_occupied = 1 WHERE id = ?1")
        .bind(table_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Recompute the cached flag from the derived predicate and return the
/// new value. Called after every order transition; release is implicit:
/// the flag only drops once no sibling order on the table is active,
/// and the count runs inside the caller's transaction so it cannot race
/// a concurrent placement.
pub async fn reconcile(tx: &mut Transaction<'_, Sqlite>, table_id: i64) -> sqlx::Result<bool> {
    let active = db::orders::count_active_on_table(tx, table_id).await?;
    let occupied = active > 0;
    sqlx::query("UPDATE dining_tables SET is_occupied = ?1 WHERE id = ?2")
        .bind(occupied)
        .bind(table_id)
        .execute(&mut **tx)
        .await?;
    Ok(occupied)
}
