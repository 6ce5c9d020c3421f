//! # tillpoint-db: Database Layer for Tillpoint
//!
//! SQLite persistence for the sales-transaction engine, using sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Tillpoint Data Flow                              │
//! │                                                                         │
//! │  Register (scan, cart, tender)                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  tillpoint-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │   Commit     │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (commit.rs) │  │   │
//! │  │   │               │    │ ProductRepo   │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ SaleRepo      │    │ one tx per   │  │   │
//! │  │   │ DbConfig      │    │ (read side)   │    │ sale         │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (WAL), shared by every register in the store              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database and commit error types
//! - [`repository`] - Catalog and sales repositories
//! - [`commit`] - The atomic sale commit
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tillpoint_core::Cart;
//! use tillpoint_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::from_env()?).await?;
//!
//! let mut cart = Cart::new();
//! cart.add_item(&db.products().resolve("8991234567890").await?, 2)?;
//! cart.set_amount_tendered("20000".parse()?)?;
//!
//! let sale = db.checkout().commit(&cart, "cashier-1").await?;
//! ```

pub mod commit;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use commit::SaleCommitService;
pub use error::{CommitError, DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::product::{NewProduct, ProductRepository};
pub use repository::sale::SaleRepository;
