//! # Cart Aggregate
//!
//! The in-memory working set of one sale in progress.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  Operator Action          Cart Method              Effect               │
//! │  ───────────────          ───────────              ──────               │
//! │  Scan product ──────────► add_item() ────────────► push or merge line   │
//! │  Change quantity ───────► set_quantity() ────────► line.quantity = n    │
//! │  Remove line ───────────► remove_item() ─────────► drop line (if any)   │
//! │  Enter discount ────────► set_discount_percent() ► discount, total      │
//! │  Enter cash received ───► set_amount_tendered() ─► change_due           │
//! │  Cancel sale ───────────► clear()                                       │
//! │                                                                         │
//! │  Every successful mutation ends in recompute(). A failed mutation       │
//! │  returns before touching any field.                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - one line per distinct product id, in first-scan order
//! - `line_subtotal == unit_price × quantity` for every line
//! - `subtotal == Σ line_subtotal`
//! - `discount_amount == subtotal.percentage_of(discount_percent)`
//! - `total == subtotal - discount_amount` (never negative)
//! - `change_due == amount_tendered - total` (may be negative here; the
//!   commit refuses it)

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::ProductSnapshot;
use crate::validation::{validate_cart_size, validate_price_cents, validate_quantity};
use crate::{MAX_CART_LINES, MAX_ITEM_QUANTITY};

/// 100.00% expressed with 2 fraction digits.
const MAX_DISCOUNT_PERCENT: Money = Money::from_cents(10_000);

// =============================================================================
// Line Item
// =============================================================================

/// One product/quantity pairing in the cart.
///
/// `unit_price` and `product_name` are frozen from the snapshot taken at the
/// first scan. `available_stock` is the most recent advisory stock figure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItem {
    pub product_id: String,
    pub product_name: String,
    pub unit_price: Money,
    pub quantity: i64,
    pub line_subtotal: Money,
    pub available_stock: i64,
}

impl LineItem {
    fn from_snapshot(snapshot: &ProductSnapshot, quantity: i64) -> Self {
        LineItem {
            product_id: snapshot.id.clone(),
            product_name: snapshot.name.clone(),
            unit_price: snapshot.unit_price,
            quantity,
            line_subtotal: snapshot.unit_price.multiply_quantity(quantity),
            available_stock: snapshot.available_stock,
        }
    }

    fn set_quantity(&mut self, quantity: i64) {
        self.quantity = quantity;
        self.line_subtotal = self.unit_price.multiply_quantity(quantity);
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The cart aggregate for a single in-progress sale.
///
/// Owned by one register and mutated from one thread; it is never
/// persisted. Commit reads it without changing it, so a failed commit leaves
/// the operator with the same cart to retry or adjust.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cart {
    lines: Vec<LineItem>,
    discount_percent: Money,
    amount_tendered: Money,
    subtotal: Money,
    discount_amount: Money,
    total: Money,
    change_due: Money,
}

impl Cart {
    /// Creates an empty cart with no discount and nothing tendered.
    pub fn new() -> Self {
        Cart {
            lines: Vec::new(),
            discount_percent: Money::zero(),
            amount_tendered: Money::zero(),
            subtotal: Money::zero(),
            discount_amount: Money::zero(),
            total: Money::zero(),
            change_due: Money::zero(),
        }
    }

    /// Adds `quantity` units of a scanned product.
    ///
    /// ## Behavior
    /// - product already in cart: its quantity grows, the line keeps its
    ///   position and frozen price
    /// - product not in cart: a new line is appended
    ///
    /// ## Errors
    /// - `Validation(MustBePositive)` / `QuantityTooLarge` for bad quantities
    /// - `InvalidAmount` if the snapshot price is negative or above
    ///   `MAX_UNIT_PRICE_CENTS`
    /// - `OutOfStock` if the snapshot shows no stock at all
    /// - `InsufficientStock` if the cumulative quantity exceeds the snapshot
    /// - `CartTooLarge` when a new line would exceed `MAX_CART_LINES`
    pub fn add_item(&mut self, product: &ProductSnapshot, quantity: i64) -> CoreResult<()> {
        check_quantity(quantity)?;
        validate_price_cents(product.unit_price.cents()).map_err(|_| CoreError::InvalidAmount {
            input: product.unit_price.to_string(),
            reason: "unit price is outside the allowed range".to_string(),
        })?;

        if product.available_stock <= 0 {
            return Err(CoreError::OutOfStock {
                product_id: product.id.clone(),
            });
        }

        match self.position(&product.id) {
            Some(idx) => {
                let requested = self.lines[idx].quantity + quantity;
                check_quantity(requested)?;
                check_stock(&product.id, product.available_stock, requested)?;

                let line = &mut self.lines[idx];
                line.available_stock = product.available_stock;
                line.set_quantity(requested);
            }
            None => {
                check_stock(&product.id, product.available_stock, quantity)?;
                validate_cart_size(self.lines.len())
                    .map_err(|_| CoreError::CartTooLarge { max: MAX_CART_LINES })?;

                self.lines.push(LineItem::from_snapshot(product, quantity));
            }
        }

        self.recompute();
        Ok(())
    }

    /// Replaces the quantity of an existing line.
    ///
    /// ## Errors
    /// - `Validation(MustBePositive)` for zero or negative (use `remove_item`)
    /// - `QuantityTooLarge` above `MAX_ITEM_QUANTITY`
    /// - `NotInCart` if the product has no line
    /// - `InsufficientStock` against the line's advisory stock figure
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) -> CoreResult<()> {
        check_quantity(quantity)?;

        let idx = self
            .position(product_id)
            .ok_or_else(|| CoreError::NotInCart(product_id.to_string()))?;

        check_stock(product_id, self.lines[idx].available_stock, quantity)?;

        self.lines[idx].set_quantity(quantity);
        self.recompute();
        Ok(())
    }

    /// Removes the line for `product_id`. Absent products are a no-op.
    ///
    /// Returns whether a line was removed.
    pub fn remove_item(&mut self, product_id: &str) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        let removed = self.lines.len() != before;

        self.recompute();
        removed
    }

    /// Empties the cart and resets discount and payment.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.discount_percent = Money::zero();
        self.amount_tendered = Money::zero();
        self.recompute();
    }

    /// Sets the flat discount, `percent` carrying 2 fraction digits
    /// (`Money::from_cents(1250)` = 12.50%).
    pub fn set_discount_percent(&mut self, percent: Money) -> CoreResult<()> {
        if percent.is_negative() || percent > MAX_DISCOUNT_PERCENT {
            return Err(CoreError::InvalidDiscount { percent });
        }

        self.discount_percent = percent;
        self.recompute();
        Ok(())
    }

    /// Records the amount handed over by the customer.
    ///
    /// Less than the total is accepted: `change_due` goes negative, which
    /// is how the register shows "insufficient payment".
    pub fn set_amount_tendered(&mut self, amount: Money) -> CoreResult<()> {
        if amount.is_negative() {
            return Err(CoreError::InvalidAmount {
                input: amount.to_string(),
                reason: "tendered amount cannot be negative".to_string(),
            });
        }

        self.amount_tendered = amount;
        self.recompute();
        Ok(())
    }

    /// Sum of all line quantities.
    pub fn total_item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    // -------------------------------------------------------------------------
    // Read accessors
    // -------------------------------------------------------------------------

    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    pub fn line(&self, product_id: &str) -> Option<&LineItem> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn subtotal(&self) -> Money {
        self.subtotal
    }

    pub fn discount_percent(&self) -> Money {
        self.discount_percent
    }

    pub fn discount_amount(&self) -> Money {
        self.discount_amount
    }

    pub fn total(&self) -> Money {
        self.total
    }

    pub fn amount_tendered(&self) -> Money {
        self.amount_tendered
    }

    pub fn change_due(&self) -> Money {
        self.change_due
    }

    /// Whether the tendered amount covers the total.
    pub fn is_fully_paid(&self) -> bool {
        !self.change_due.is_negative()
    }

    // -------------------------------------------------------------------------
    // Internals
    // -------------------------------------------------------------------------

    fn position(&self, product_id: &str) -> Option<usize> {
        self.lines.iter().position(|l| l.product_id == product_id)
    }

    /// The single place derived fields are written.
    fn recompute(&mut self) {
        self.subtotal = self.lines.iter().map(|l| l.line_subtotal).sum();
        self.discount_amount = self.subtotal.percentage_of(self.discount_percent);
        self.total = (self.subtotal - self.discount_amount).max(Money::zero());
        self.change_due = self.amount_tendered - self.total;
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

fn check_quantity(quantity: i64) -> CoreResult<()> {
    if quantity > MAX_ITEM_QUANTITY {
        return Err(CoreError::QuantityTooLarge {
            requested: quantity,
            max: MAX_ITEM_QUANTITY,
        });
    }
    validate_quantity(quantity)?;
    Ok(())
}

fn check_stock(product_id: &str, available: i64, requested: i64) -> CoreResult<()> {
    if requested > available {
        return Err(CoreError::InsufficientStock {
            product_id: product_id.to_string(),
            available,
            requested,
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
