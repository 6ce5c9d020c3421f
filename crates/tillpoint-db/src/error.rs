//! # Database Error Types
//!
//! Error types for storage operations and for the checkout commit.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError ← Adds context and categorization                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  CommitError::Persistence ← fatal to this commit, not to the process   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Register UI shows a message; the cart is still there for a retry      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use tillpoint_core::{Money, ValidationError};

// =============================================================================
// Database Error
// =============================================================================

/// Storage-layer errors.
///
/// These wrap sqlx errors and classify constraint failures for
/// debugging and user feedback.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation (e.g. duplicate barcode).
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - A sale line referencing a product id that is not in the catalog
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// CHECK constraint violation (negative stock, non-positive quantity).
    #[error("Constraint violation: {message}")]
    CheckViolation { message: String },

    /// Record failed validation before reaching the database.
    #[error("Invalid record: {0}")]
    Validation(#[from] ValidationError),

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Invalid configuration value (e.g. from the environment).
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Runtime SQL error not covered by a more specific variant.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A stored value could not be turned back into a domain value.
    #[error("Corrupt stored value: {0}")]
    Decode(String),

    /// Pool exhausted (all connections in use past the acquire timeout).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// sqlx::Error::ColumnDecode   → DbError::Decode
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // SQLite constraint messages:
                //   "UNIQUE constraint failed: <table>.<column>"
                //   "FOREIGN KEY constraint failed"
                //   "CHECK constraint failed: <expr>"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("CHECK constraint failed") {
                    DbError::CheckViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::ColumnDecode { index, source } => {
                DbError::Decode(format!("column {}: {}", index, source))
            }

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Commit Error
// =============================================================================

/// Why a checkout did not produce a Sale.
///
/// Every variant guarantees the database is unchanged. None of them is
/// retried automatically: a stock conflict needs the operator to decide
/// on a new quantity.
#[derive(Debug, Error)]
pub enum CommitError {
    /// The cart has no lines.
    #[error("Cannot commit an empty cart")]
    EmptyCart,

    /// The tendered amount does not cover the total.
    #[error("Insufficient payment: total {total}, tendered {tendered}")]
    InsufficientPayment { total: Money, tendered: Money },

    /// Another sale took the stock this cart was counting on.
    ///
    /// ## User Workflow
    /// ```text
    /// Register A and B both hold the last unit of COKE
    ///      │
    ///      ▼
    /// A commits first → stock 1 → 0 ✓
    ///      │
    ///      ▼
    /// B's bounded decrement matches 0 rows → StockConflict { COKE }
    ///      │
    ///      ▼
    /// B's whole transaction is rolled back; operator adjusts the cart
    /// ```
    #[error("Stock conflict on product {product_id}: not enough stock left")]
    StockConflict { product_id: String },

    /// Infrastructure failure; the transaction was rolled back.
    #[error("Persistence error: {0}")]
    Persistence(#[from] DbError),
}

impl From<sqlx::Error> for CommitError {
    fn from(err: sqlx::Error) -> Self {
        CommitError::Persistence(DbError::from(err))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[test]
    fn test_pool_errors() {
        assert!(matches!(
            DbError::from(sqlx::Error::PoolTimedOut),
            DbError::PoolExhausted
        ));
        assert!(matches!(
            DbError::from(sqlx::Error::PoolClosed),
            DbError::ConnectionFailed(_)
        ));
    }

    #[test]
    fn test_commit_error_messages() {
        let err = CommitError::InsufficientPayment {
            total: Money::from_cents(50_000),
            tendered: Money::from_cents(40_000),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient payment: total 500.00, tendered 400.00"
        );

        let err: CommitError = DbError::PoolExhausted.into();
        assert!(matches!(err, CommitError::Persistence(DbError::PoolExhausted)));
    }
}
