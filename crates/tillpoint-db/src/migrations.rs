//! # Database Migrations
//!
//! Embedded SQL migrations for the sales store.
//!
//! ## Schema
//! ```text
//! ┌────────────────────┐        ┌────────────────────┐
//! │      products      │        │       sales        │
//! │  id (PK)           │        │  id (PK)           │
//! │  barcode (UNIQUE)  │        │  cashier_id        │
//! │  price_cents ≥ 0   │        │  occurred_at       │
//! │  stock ≥ 0         │        │  totals (cents)    │
//! └─────────┬──────────┘        └─────────┬──────────┘
//!           │ 1                            │ 1
//!           │                              │
//!           │ n   ┌────────────────────┐ n │
//!           └────►│     sale_items     │◄──┘
//!                 │  line_no           │
//!                 │  name/price frozen │
//!                 └────────────────────┘
//! ```
//!
//! ## Adding New Migrations
//!
//! 1. Create a new file in `migrations/sqlite/` with the next sequence number
//! 2. Name format: `NNN_description.sql`
//! 3. **NEVER** modify existing migrations - always add new ones

use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

/// Migrations embedded at compile time from `migrations/sqlite`.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations/sqlite");

/// Runs all pending database migrations.
///
/// Idempotent; each migration runs in its own transaction, in filename order.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    info!("Checking for pending migrations");

    MIGRATOR.run(pool).await?;

    info!("All migrations applied successfully");
    Ok(())
}

/// Returns `(embedded, applied)` migration counts, for diagnostics.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let total = MIGRATOR.migrations.len();

    let applied: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success")
        .fetch_one(pool)
        .await?;

    Ok((total, applied as usize))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        db.run_migrations().await.unwrap();

        let (total, applied) = migration_status(db.pool()).await.unwrap();
        assert!(total > 0);
        assert_eq!(total, applied);
    }
}
