//! # Sale Commit Service
//!
//! Turns a finalized cart into a persisted sale, all or nothing.
//!
//! ## Commit Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  commit(&cart, cashier_id)                                              │
//! │       │                                                                 │
//! │       ├── cart empty?             → EmptyCart            (no I/O)       │
//! │       ├── change_due < 0?         → InsufficientPayment  (no I/O)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │   1. INSERT sales header          ← takes the write lock first          │
//! │   2. for each line:                                                     │
//! │        UPDATE products SET stock = stock - q                            │
//! │        WHERE id = ? AND stock >= q                                      │
//! │        0 rows? → ROLLBACK → StockConflict { product_id }                │
//! │   3. INSERT sale_items (name/price copied from the cart line)           │
//! │  COMMIT                                                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Sale { id, occurred_at, totals, lines }                                │
//! │                                                                         │
//! │  Any SQL error in 1-3 → transaction dropped (rolled back)               │
//! │                       → Persistence(DbError)                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Concurrency
//! Registers sharing a database file queue on SQLite's write lock (bounded
//! by the configured busy timeout). The bounded decrement makes the stock
//! check and the write a single statement, so the last unit of a product
//! can only be sold once.
//!
//! The transaction runs on its own task: if the caller stops waiting, the
//! commit still finishes (or rolls back) instead of stopping half-way.

use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{CommitError, DbError};
use crate::repository::now_utc;
use crate::repository::product::try_decrement_stock;
use crate::repository::sale::{insert_sale_header, insert_sale_line};
use tillpoint_core::{Cart, Sale, SaleLineItem};

/// The only write path for sales.
#[derive(Debug, Clone)]
pub struct SaleCommitService {
    pool: SqlitePool,
}

impl SaleCommitService {
    pub fn new(pool: SqlitePool) -> Self {
        SaleCommitService { pool }
    }

    /// Persists the cart as a sale together with its stock decrements.
    ///
    /// The cart is only read. On success the caller typically clears it;
    /// on failure it is left as it was for the operator to adjust.
    ///
    /// ## Returns
    /// * `Ok(Sale)` - committed, with generated id and timestamp
    /// * `Err(CommitError::EmptyCart)` / `Err(CommitError::InsufficientPayment)` -
    ///   rejected before touching the database
    /// * `Err(CommitError::StockConflict)` - a line's stock ran out since the
    ///   scan; nothing was written
    /// * `Err(CommitError::Persistence)` - storage failure; nothing was written
    pub async fn commit(&self, cart: &Cart, cashier_id: &str) -> Result<Sale, CommitError> {
        if cart.is_empty() {
            return Err(CommitError::EmptyCart);
        }
        if cart.change_due().is_negative() {
            return Err(CommitError::InsufficientPayment {
                total: cart.total(),
                tendered: cart.amount_tendered(),
            });
        }

        let sale = build_sale(cart, cashier_id);
        let pool = self.pool.clone();

        tokio::spawn(async move { write_sale(&pool, sale).await })
            .await
            .map_err(|e| {
                CommitError::Persistence(DbError::Internal(format!("commit task failed: {}", e)))
            })?
    }
}

/// Freezes the cart into the sale that will be written.
fn build_sale(cart: &Cart, cashier_id: &str) -> Sale {
    let sale_id = Uuid::new_v4().to_string();

    let lines = cart
        .lines()
        .iter()
        .map(|line| SaleLineItem {
            sale_id: sale_id.clone(),
            product_id: line.product_id.clone(),
            product_name_at_sale: line.product_name.clone(),
            quantity: line.quantity,
            unit_price_at_sale: line.unit_price,
            line_subtotal: line.line_subtotal,
        })
        .collect();

    Sale {
        id: sale_id,
        cashier_id: cashier_id.to_string(),
        occurred_at: now_utc(),
        subtotal: cart.subtotal(),
        discount_percent: cart.discount_percent(),
        discount_amount: cart.discount_amount(),
        total: cart.total(),
        amount_tendered: cart.amount_tendered(),
        change_due: cart.change_due(),
        lines,
    }
}

async fn write_sale(pool: &SqlitePool, sale: Sale) -> Result<Sale, CommitError> {
    debug!(
        sale_id = %sale.id,
        lines = sale.lines.len(),
        total = %sale.total,
        "Beginning sale commit"
    );

    let mut tx = pool.begin().await?;

    insert_sale_header(&mut tx, &sale).await?;

    for line in &sale.lines {
        if !try_decrement_stock(&mut tx, &line.product_id, line.quantity).await? {
            warn!(
                sale_id = %sale.id,
                product_id = %line.product_id,
                quantity = line.quantity,
                "Stock conflict, rolling back sale"
            );
            if let Err(e) = tx.rollback().await {
                warn!(sale_id = %sale.id, error = %e, "Rollback after stock conflict failed");
            }
            return Err(CommitError::StockConflict {
                product_id: line.product_id.clone(),
            });
        }
    }

    for (idx, line) in sale.lines.iter().enumerate() {
        insert_sale_line(&mut tx, idx as i64 + 1, line).await?;
    }

    tx.commit().await?;

    info!(
        sale_id = %sale.id,
        cashier_id = %sale.cashier_id,
        items = sale.item_count(),
        total = %sale.total,
        change = %sale.change_due,
        "Sale committed"
    );

    Ok(sale)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::product::NewProduct;
    use tillpoint_core::{Money, ProductSnapshot};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn add_product(db: &Database, name: &str, price: i64, stock: i64) -> ProductSnapshot {
        db.products()
            .insert(NewProduct::new(name, Money::from_cents(price)).stock(stock))
            .await
            .unwrap()
            .snapshot()
    }

    async fn stock_of(db: &Database, id: &str) -> i64 {
        db.products().get_by_id(id).await.unwrap().unwrap().stock
    }

    async fn row_count(db: &Database, table: &str) -> i64 {
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    /// 2 x 15000 + 1 x 20000 = 50000
    async fn two_line_cart(db: &Database) -> (Cart, ProductSnapshot, ProductSnapshot) {
        let a = add_product(db, "Beras 5kg", 15_000, 10).await;
        let b = add_product(db, "Minyak Goreng 2L", 20_000, 10).await;

        let mut cart = Cart::new();
        cart.add_item(&a, 2).unwrap();
        cart.add_item(&b, 1).unwrap();
        (cart, a, b)
    }

    #[tokio::test]
    async fn test_commit_exact_payment() {
        let db = setup().await;
        let (mut cart, a, b) = two_line_cart(&db).await;
        cart.set_amount_tendered(Money::from_cents(50_000)).unwrap();

        let sale = db.checkout().commit(&cart, "cashier-7").await.unwrap();

        assert_eq!(sale.total, Money::from_cents(50_000));
        assert_eq!(sale.change_due, Money::zero());
        assert_eq!(sale.cashier_id, "cashier-7");
        assert_eq!(sale.lines.len(), 2);
        assert_eq!(sale.lines[0].product_id, a.id);
        assert_eq!(sale.lines[1].product_id, b.id);

        assert_eq!(stock_of(&db, &a.id).await, 8);
        assert_eq!(stock_of(&db, &b.id).await, 9);

        let stored = db.sales().find_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(stored, sale);
    }

    #[tokio::test]
    async fn test_commit_with_change() {
        let db = setup().await;
        let (mut cart, _, _) = two_line_cart(&db).await;
        cart.set_amount_tendered(Money::from_cents(60_000)).unwrap();

        let sale = db.checkout().commit(&cart, "cashier-7").await.unwrap();

        assert_eq!(sale.change_due, Money::from_cents(10_000));
    }

    #[tokio::test]
    async fn test_commit_with_discount() {
        let db = setup().await;
        let (mut cart, _, _) = two_line_cart(&db).await;
        cart.set_discount_percent(Money::from_cents(1_000)).unwrap();
        cart.set_amount_tendered(Money::from_cents(50_000)).unwrap();

        let sale = db.checkout().commit(&cart, "cashier-7").await.unwrap();

        assert_eq!(sale.discount_percent, Money::from_cents(1_000));
        assert_eq!(sale.discount_amount, Money::from_cents(5_000));
        assert_eq!(sale.total, Money::from_cents(45_000));
        assert_eq!(sale.change_due, Money::from_cents(5_000));
    }

    #[tokio::test]
    async fn test_empty_cart_writes_nothing() {
        let db = setup().await;

        let result = db.checkout().commit(&Cart::new(), "cashier-7").await;

        assert!(matches!(result, Err(CommitError::EmptyCart)));
        assert_eq!(row_count(&db, "sales").await, 0);
    }

    #[tokio::test]
    async fn test_underpayment_writes_nothing() {
        let db = setup().await;
        let (mut cart, a, _) = two_line_cart(&db).await;
        cart.set_amount_tendered(Money::from_cents(49_999)).unwrap();

        let result = db.checkout().commit(&cart, "cashier-7").await;

        match result {
            Err(CommitError::InsufficientPayment { total, tendered }) => {
                assert_eq!(total, Money::from_cents(50_000));
                assert_eq!(tendered, Money::from_cents(49_999));
            }
            other => panic!("expected InsufficientPayment, got {:?}", other),
        }
        assert_eq!(row_count(&db, "sales").await, 0);
        assert_eq!(stock_of(&db, &a.id).await, 10);
    }

    #[tokio::test]
    async fn test_stock_conflict_rolls_back_everything() {
        let db = setup().await;
        let plenty = add_product(&db, "Gula 1kg", 14_000, 10).await;
        let scarce = add_product(&db, "Telur 1kg", 28_000, 1).await;

        // The scan saw 5 on the shelf; by commit time only 1 is left.
        let stale = ProductSnapshot {
            available_stock: 5,
            ..scarce.clone()
        };

        let mut cart = Cart::new();
        cart.add_item(&plenty, 2).unwrap();
        cart.add_item(&stale, 3).unwrap();
        cart.set_amount_tendered(Money::from_cents(200_000)).unwrap();
        let before = cart.clone();

        let result = db.checkout().commit(&cart, "cashier-7").await;

        match result {
            Err(CommitError::StockConflict { product_id }) => assert_eq!(product_id, scarce.id),
            other => panic!("expected StockConflict, got {:?}", other),
        }
        assert_eq!(stock_of(&db, &plenty.id).await, 10);
        assert_eq!(stock_of(&db, &scarce.id).await, 1);
        assert_eq!(row_count(&db, "sales").await, 0);
        assert_eq!(row_count(&db, "sale_items").await, 0);
        assert_eq!(cart, before);
    }

    #[tokio::test]
    async fn test_sale_keeps_scanned_name_and_price() {
        let db = setup().await;
        let snapshot = add_product(&db, "Kecap Manis", 9_000, 10).await;

        let mut cart = Cart::new();
        cart.add_item(&snapshot, 1).unwrap();
        cart.set_amount_tendered(Money::from_cents(9_000)).unwrap();

        let mut product = db.products().get_by_id(&snapshot.id).await.unwrap().unwrap();
        product.name = "Kecap Manis Refill".to_string();
        product.price_cents = 12_000;
        db.products().update(&product).await.unwrap();

        let sale = db.checkout().commit(&cart, "cashier-7").await.unwrap();
        let stored = db.sales().find_by_id(&sale.id).await.unwrap().unwrap();

        assert_eq!(stored.lines[0].product_name_at_sale, "Kecap Manis");
        assert_eq!(stored.lines[0].unit_price_at_sale, Money::from_cents(9_000));
        assert_eq!(stored.total, Money::from_cents(9_000));
    }

    #[tokio::test]
    async fn test_closed_pool_is_persistence_error() {
        let db = setup().await;
        let (mut cart, _, _) = two_line_cart(&db).await;
        cart.set_amount_tendered(Money::from_cents(50_000)).unwrap();
        db.close().await;

        let result = db.checkout().commit(&cart, "cashier-7").await;

        assert!(matches!(result, Err(CommitError::Persistence(_))));
    }

    #[tokio::test]
    async fn test_line_insert_failure_rolls_back_decrements() {
        let db = setup().await;
        let (mut cart, a, b) = two_line_cart(&db).await;
        cart.set_amount_tendered(Money::from_cents(50_000)).unwrap();

        // header and decrements succeed, the first line insert fails
        sqlx::query("DROP TABLE sale_items")
            .execute(db.pool())
            .await
            .unwrap();

        let result = db.checkout().commit(&cart, "cashier-7").await;

        assert!(matches!(result, Err(CommitError::Persistence(_))));
        assert_eq!(stock_of(&db, &a.id).await, 10);
        assert_eq!(stock_of(&db, &b.id).await, 10);
        assert_eq!(row_count(&db, "sales").await, 0);
        assert_eq!(cart.line_count(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_commits_sell_last_unit_once() {
        let dir = tempfile::tempdir().unwrap();
        let config = DbConfig::new(dir.path().join("registers.db")).max_connections(4);
        let db = Database::new(config).await.unwrap();

        let last = add_product(&db, "Susu UHT 1L", 18_000, 1).await;

        let register = |db: Database, snapshot: ProductSnapshot, cashier: &'static str| async move {
            let mut cart = Cart::new();
            cart.add_item(&snapshot, 1).unwrap();
            cart.set_amount_tendered(Money::from_cents(20_000)).unwrap();
            db.checkout().commit(&cart, cashier).await
        };

        let (first, second) = tokio::join!(
            tokio::spawn(register(db.clone(), last.clone(), "cashier-a")),
            tokio::spawn(register(db.clone(), last.clone(), "cashier-b")),
        );
        let outcomes = [first.unwrap(), second.unwrap()];

        let successes = outcomes.iter().filter(|r| r.is_ok()).count();
        let conflicts = outcomes
            .iter()
            .filter(|r| matches!(r, Err(CommitError::StockConflict { product_id }) if *product_id == last.id))
            .count();

        assert_eq!(successes, 1);
        assert_eq!(conflicts, 1);
        assert_eq!(stock_of(&db, &last.id).await, 0);
        assert_eq!(row_count(&db, "sales").await, 1);
        assert_eq!(row_count(&db, "sale_items").await, 1);
    }
}
