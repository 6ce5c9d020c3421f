//! # Sale Repository
//!
//! Read side of the sales ledger, plus the row writers the commit
//! service calls inside its transaction.
//!
//! ## Sale Structure
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sales                                                                  │
//! │  ├── id: "a1b2..."                                                      │
//! │  ├── occurred_at: 2026-10-18T09:30:00.000000Z                          │
//! │  ├── subtotal / discount / total / tendered / change (cents)            │
//! │  │                                                                      │
//! │  └── sale_items (1:n, ordered by line_no)                              │
//! │       ├── #1 Teh Botol 350ml  x 2 @ 4500 = 9000                        │
//! │       └── #2 Indomie Goreng   x 5 @ 3000 = 15000                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Dates used for grouping and range filters are UTC calendar dates of
//! `occurred_at`.

use std::collections::BTreeMap;

use chrono::{DateTime, Days, NaiveDate, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use tillpoint_core::{Money, Sale, SaleLineItem, SalesSummary};

use super::encode_timestamp;

const SALE_COLUMNS: &str = "id, cashier_id, occurred_at, subtotal_cents, \
     discount_percent_hundredths, discount_cents, total_cents, tendered_cents, change_cents";

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, FromRow)]
struct SaleRow {
    id: String,
    cashier_id: String,
    occurred_at: DateTime<Utc>,
    subtotal_cents: i64,
    discount_percent_hundredths: i64,
    discount_cents: i64,
    total_cents: i64,
    tendered_cents: i64,
    change_cents: i64,
}

impl SaleRow {
    fn into_sale(self, lines: Vec<SaleLineItem>) -> Sale {
        Sale {
            id: self.id,
            cashier_id: self.cashier_id,
            occurred_at: self.occurred_at,
            subtotal: Money::from_cents(self.subtotal_cents),
            discount_percent: Money::from_cents(self.discount_percent_hundredths),
            discount_amount: Money::from_cents(self.discount_cents),
            total: Money::from_cents(self.total_cents),
            amount_tendered: Money::from_cents(self.tendered_cents),
            change_due: Money::from_cents(self.change_cents),
            lines,
        }
    }
}

#[derive(Debug, FromRow)]
struct SaleItemRow {
    sale_id: String,
    product_id: String,
    product_name: String,
    quantity: i64,
    unit_price_cents: i64,
    line_total_cents: i64,
}

impl From<SaleItemRow> for SaleLineItem {
    fn from(row: SaleItemRow) -> Self {
        SaleLineItem {
            sale_id: row.sale_id,
            product_id: row.product_id,
            product_name_at_sale: row.product_name,
            quantity: row.quantity,
            unit_price_at_sale: Money::from_cents(row.unit_price_cents),
            line_subtotal: Money::from_cents(row.line_total_cents),
        }
    }
}

#[derive(Debug, FromRow)]
struct DailyTotalRow {
    day: String,
    total_cents: i64,
}

// =============================================================================
// Repository
// =============================================================================

/// Read-only access to committed sales.
///
/// There is no update or delete: a sale, once written,
/// is exactly what the customer paid.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Fetches one sale with its lines.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {} FROM sales WHERE id = ?1", SALE_COLUMNS);
        let row = sqlx::query_as::<_, SaleRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let lines = self.lines_for(&row.id).await?;
                Ok(Some(row.into_sale(lines)))
            }
            None => Ok(None),
        }
    }

    /// Sales whose date falls in `from..=to`, newest first.
    ///
    /// An inverted range (`from > to`) matches nothing.
    pub async fn find_by_date_range(&self, from: NaiveDate, to: NaiveDate) -> DbResult<Vec<Sale>> {
        debug!(%from, %to, "Loading sales by date range");

        let sql = format!(
            r#"
            SELECT {} FROM sales
            WHERE date(occurred_at) BETWEEN ?1 AND ?2
            ORDER BY occurred_at DESC, id
            "#,
            SALE_COLUMNS
        );
        let rows = sqlx::query_as::<_, SaleRow>(&sql)
            .bind(from.to_string())
            .bind(to.to_string())
            .fetch_all(&self.pool)
            .await?;

        self.with_lines(rows).await
    }

    /// The latest `limit` sales, newest first.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<Sale>> {
        let sql = format!(
            "SELECT {} FROM sales ORDER BY occurred_at DESC, id LIMIT ?1",
            SALE_COLUMNS
        );
        let rows = sqlx::query_as::<_, SaleRow>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        self.with_lines(rows).await
    }

    /// Summed sale totals per date for the last `window_days` days.
    ///
    /// Covers `today - window_days ..= today`. Dates without sales are
    /// absent from the map; callers that chart a series fill the gaps.
    pub async fn daily_totals(&self, window_days: u32) -> DbResult<BTreeMap<NaiveDate, Money>> {
        let today = Utc::now().date_naive();
        let from = today
            .checked_sub_days(Days::new(u64::from(window_days)))
            .unwrap_or(NaiveDate::MIN);

        self.daily_totals_between(from, today).await
    }

    /// Summed sale totals per date in `from..=to`.
    pub async fn daily_totals_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> DbResult<BTreeMap<NaiveDate, Money>> {
        let rows = sqlx::query_as::<_, DailyTotalRow>(
            r#"
            SELECT date(occurred_at) AS day, SUM(total_cents) AS total_cents
            FROM sales
            WHERE date(occurred_at) BETWEEN ?1 AND ?2
            GROUP BY day
            "#,
        )
        .bind(from.to_string())
        .bind(to.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| {
                let day = NaiveDate::parse_from_str(&row.day, "%Y-%m-%d")
                    .map_err(|e| DbError::Decode(format!("sale date '{}': {}", row.day, e)))?;
                Ok((day, Money::from_cents(row.total_cents)))
            })
            .collect()
    }

    /// Sale count and total for one date.
    pub async fn summary_for(&self, date: NaiveDate) -> DbResult<SalesSummary> {
        let (sale_count, total_cents): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COUNT(*), COALESCE(SUM(total_cents), 0)
            FROM sales
            WHERE date(occurred_at) = ?1
            "#,
        )
        .bind(date.to_string())
        .fetch_one(&self.pool)
        .await?;

        Ok(SalesSummary {
            date,
            sale_count,
            total: Money::from_cents(total_cents),
        })
    }

    async fn lines_for(&self, sale_id: &str) -> DbResult<Vec<SaleLineItem>> {
        let rows = sqlx::query_as::<_, SaleItemRow>(
            r#"
            SELECT sale_id, product_id, product_name, quantity,
                   unit_price_cents, line_total_cents
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY line_no
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(SaleLineItem::from).collect())
    }

    async fn with_lines(&self, rows: Vec<SaleRow>) -> DbResult<Vec<Sale>> {
        let mut sales = Vec::with_capacity(rows.len());
        for row in rows {
            let lines = self.lines_for(&row.id).await?;
            sales.push(row.into_sale(lines));
        }
        Ok(sales)
    }
}

// =============================================================================
// Transactional Writers (commit service only)
// =============================================================================

/// Writes the sale header row.
pub(crate) async fn insert_sale_header(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sales (
            id, cashier_id, occurred_at, subtotal_cents,
            discount_percent_hundredths, discount_cents, total_cents,
            tendered_cents, change_cents
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.cashier_id)
    .bind(encode_timestamp(&sale.occurred_at))
    .bind(sale.subtotal.cents())
    .bind(sale.discount_percent.cents())
    .bind(sale.discount_amount.cents())
    .bind(sale.total.cents())
    .bind(sale.amount_tendered.cents())
    .bind(sale.change_due.cents())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Writes one sale line. `line_no` is 1-based cart order.
pub(crate) async fn insert_sale_line(
    conn: &mut SqliteConnection,
    line_no: i64,
    line: &SaleLineItem,
) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sale_items (
            sale_id, line_no, product_id, product_name,
            unit_price_cents, quantity, line_total_cents
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&line.sale_id)
    .bind(line_no)
    .bind(&line.product_id)
    .bind(&line.product_name_at_sale)
    .bind(line.unit_price_at_sale.cents())
    .bind(line.quantity)
    .bind(line.line_subtotal.cents())
    .execute(&mut *conn)
    .await?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
