//! # Repository Module
//!
//! Database repository implementations.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Register                                                               │
//! │       │                                                                 │
//! │       │  db.products().resolve("8991234567890")                        │
//! │       ▼                                                                 │
//! │  ProductRepository                                                      │
//! │  ├── resolve / get_by_id / get_by_barcode / search                     │
//! │  ├── list_low_stock / categories                                       │
//! │  └── insert / update / restock                                         │
//! │                                                                         │
//! │  SaleRepository (read-only)                                            │
//! │  ├── find_by_id / find_by_date_range / recent                          │
//! │  └── daily_totals / summary_for                                        │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes to `sales` and `sale_items` happen only through
//! [`crate::commit::SaleCommitService`].

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};

pub mod product;
pub mod sale;

/// Current time at the precision the database stores.
pub(crate) fn now_utc() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed-width RFC 3339 in UTC, so text order is time order.
pub(crate) fn encode_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}
