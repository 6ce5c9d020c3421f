//! # Domain Types
//!
//! Core domain types shared by the cart, the commit service and the
//! reporting collaborators.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   resolve()   ┌──────────────────┐                 │
//! │  │    Product      │ ────────────► │ ProductSnapshot  │ ──► Cart        │
//! │  │  (catalog row)  │               │ (frozen at scan) │                 │
//! │  └─────────────────┘               └──────────────────┘                 │
//! │                                                                         │
//! │  ┌─────────────────┐  1 ─── n  ┌─────────────────┐                      │
//! │  │      Sale       │ ────────► │  SaleLineItem   │                      │
//! │  │  (immutable)    │           │ (name/price     │                      │
//! │  │                 │           │  frozen)        │                      │
//! │  └─────────────────┘           └─────────────────┘                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A catalog product as stored in the `products` table.
///
/// The register never holds on to this: it takes a [`ProductSnapshot`]
/// and works from that for the rest of the sale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Barcode (EAN-13, UPC-A, internal code...).
    pub barcode: Option<String>,

    /// Display name shown to the cashier and on receipts.
    pub name: String,

    pub category: Option<String>,

    /// Price in minor units.
    pub price_cents: i64,

    /// Units on hand. Only ever lowered through the bounded decrement.
    pub stock: i64,

    /// Threshold at or below which the product is reported as low stock.
    pub min_stock: i64,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }

    /// Freezes the current price and stock for use in a cart.
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            unit_price: self.price(),
            available_stock: self.stock,
        }
    }
}

// =============================================================================
// Product Snapshot
// =============================================================================

/// Price and stock of a product at the moment it was scanned.
///
/// ## Snapshot Semantics
/// - `unit_price` is what the customer pays for the whole sale, even if the
///   catalog price changes before checkout
/// - `available_stock` is advisory only; the commit re-checks the live
///   stock atomically
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ProductSnapshot {
    pub id: String,
    pub name: String,
    pub unit_price: Money,
    pub available_stock: i64,
}

// =============================================================================
// Sale
// =============================================================================

/// A committed sale. Immutable: there is no update, void or delete path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sale {
    /// Generated at commit (UUID v4).
    pub id: String,

    /// Opaque identifier from the authentication collaborator.
    pub cashier_id: String,

    #[ts(as = "String")]
    pub occurred_at: DateTime<Utc>,

    pub subtotal: Money,

    /// Percentage with 2 fraction digits (`Money::from_cents(1000)` = 10%).
    pub discount_percent: Money,

    pub discount_amount: Money,
    pub total: Money,
    pub amount_tendered: Money,

    /// Always >= 0 for a committed sale.
    pub change_due: Money,

    /// Lines in the order they appeared in the cart.
    pub lines: Vec<SaleLineItem>,
}

impl Sale {
    /// Total number of units sold.
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

// =============================================================================
// Sale Line Item
// =============================================================================

/// A line of a committed sale.
///
/// Name and price are denormalized copies taken at commit, so later catalog
/// edits never alter a historical receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLineItem {
    pub sale_id: String,
    pub product_id: String,
    pub product_name_at_sale: String,
    pub quantity: i64,
    pub unit_price_at_sale: Money,
    pub line_subtotal: Money,
}

// =============================================================================
// Sales Summary
// =============================================================================

/// Sale count and summed totals for one calendar date (UTC).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SalesSummary {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub sale_count: i64,
    pub total: Money,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: i64, min_stock: i64) -> Product {
        Product {
            id: "p-1".to_string(),
            barcode: Some("8991234567890".to_string()),
            name: "Teh Botol 350ml".to_string(),
            category: Some("Beverages".to_string()),
            price_cents: 450_000,
            stock,
            min_stock,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_snapshot_freezes_price_and_stock() {
        let mut p = product(12, 5);
        let snapshot = p.snapshot();

        p.price_cents = 999_999;
        p.stock = 0;

        assert_eq!(snapshot.unit_price, Money::from_cents(450_000));
        assert_eq!(snapshot.available_stock, 12);
        assert_eq!(snapshot.name, "Teh Botol 350ml");
    }

    #[test]
    fn test_low_stock_threshold_is_inclusive() {
        assert!(product(5, 5).is_low_stock());
        assert!(product(0, 5).is_low_stock());
        assert!(!product(6, 5).is_low_stock());
    }

    #[test]
    fn test_sale_item_count() {
        let line = |qty| SaleLineItem {
            sale_id: "s-1".to_string(),
            product_id: "p-1".to_string(),
            product_name_at_sale: "Teh".to_string(),
            quantity: qty,
            unit_price_at_sale: Money::from_cents(100),
            line_subtotal: Money::from_cents(100 * qty),
        };
        let sale = Sale {
            id: "s-1".to_string(),
            cashier_id: "cashier-1".to_string(),
            occurred_at: Utc::now(),
            subtotal: Money::from_cents(500),
            discount_percent: Money::zero(),
            discount_amount: Money::zero(),
            total: Money::from_cents(500),
            amount_tendered: Money::from_cents(500),
            change_due: Money::zero(),
            lines: vec![line(2), line(3)],
        };
        assert_eq!(sale.item_count(), 5);
    }
}
