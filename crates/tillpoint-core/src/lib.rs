//! # tillpoint-core: Pure Business Logic for the Sales-Transaction Engine
//!
//! This crate is the **heart** of Tillpoint. It contains the money math and
//! the cart aggregate as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tillpoint Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               Register UI (external collaborator)               │   │
//! │  │    Scan ──► Cart view ──► Discount / Tender ──► Receipt         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ tillpoint-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │   Cart    │  │   rules   │  │   │
//! │  │   │   Sale    │  │  parse    │  │ LineItem  │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ commit(&cart, cashier_id)              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                tillpoint-db (Database Layer)                    │   │
//! │  │      atomic commit, catalog lookup, sales queries (SQLite)      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Fixed-point Money with exact arithmetic
//! - [`cart`] - The cart aggregate and its line items
//! - [`types`] - Domain types (Product, ProductSnapshot, Sale, ...)
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation rules
//!
//! ## Example Usage
//!
//! ```rust
//! use tillpoint_core::{Cart, Money, ProductSnapshot};
//!
//! let tea = ProductSnapshot {
//!     id: "p-1".to_string(),
//!     name: "Iced Tea".to_string(),
//!     unit_price: Money::from_cents(1500),
//!     available_stock: 10,
//! };
//!
//! let mut cart = Cart::new();
//! cart.add_item(&tea, 2).unwrap();
//! cart.set_discount_percent("10".parse().unwrap()).unwrap();
//! cart.set_amount_tendered(Money::from_cents(3000)).unwrap();
//!
//! assert_eq!(cart.total().cents(), 2700);
//! assert_eq!(cart.change_due().cents(), 300);
//! ```

pub mod cart;
pub mod error;
pub mod money;
pub mod types;
pub mod validation;

pub use cart::{Cart, LineItem};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines in a single cart.
///
/// Prevents runaway carts and keeps the commit transaction short.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity on a single line.
///
/// Catches typing 1000 instead of 10.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest unit price a product may carry, in minor units (1 billion).
///
/// With `MAX_ITEM_QUANTITY` and `MAX_CART_LINES` this keeps every cart sum
/// far inside `i64`.
pub const MAX_UNIT_PRICE_CENTS: i64 = 100_000_000_000;
