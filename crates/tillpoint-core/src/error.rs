//! # Error Types
//!
//! Domain-specific error types for tillpoint-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tillpoint-core errors (this file)                                     │
//! │  ├── CoreError        - Cart-time business rule failures (advisory)    │
//! │  └── ValidationError  - Field-level input validation failures          │
//! │                                                                         │
//! │  tillpoint-db errors (separate crate)                                  │
//! │  ├── DbError          - Storage/infrastructure failures                │
//! │  └── CommitError      - Checkout failures (authoritative)              │
//! │                                                                         │
//! │  Every CoreError leaves the cart exactly as it was before the call.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Cart-time business errors.
///
/// Recovered locally: the register UI re-prompts the operator and the cart
/// stays untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// Text could not be turned into Money, or a Money value is out of
    /// range for the field (e.g. a negative tendered amount).
    #[error("Invalid amount '{input}': {reason}")]
    InvalidAmount { input: String, reason: String },

    /// Discount percentage outside 0.00 - 100.00.
    #[error("Invalid discount {percent}%: must be between 0 and 100")]
    InvalidDiscount { percent: Money },

    /// The product had no stock at all when it was scanned.
    #[error("Product {product_id} is out of stock")]
    OutOfStock { product_id: String },

    /// The cumulative quantity in the cart exceeds the stock snapshot.
    ///
    /// ## User Workflow
    /// ```text
    /// Scan COKE (stock snapshot: 3) ×3   ✓
    ///      │
    ///      ▼
    /// Scan COKE again → cumulative 4
    ///      │
    ///      ▼
    /// InsufficientStock { available: 3, requested: 4 }
    /// ```
    #[error("Insufficient stock for {product_id}: available {available}, requested {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// `set_quantity` on a product that has no line in the cart.
    #[error("Product {0} is not in the cart")]
    NotInCart(String),

    /// Cart has reached the maximum number of distinct lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds the maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for early validation of catalog records and operator input before
/// business logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, non-digit barcode).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
