//! # bazaar-db: Persistence and Settlement for Bazaar
//!
//! SQLite storage via sqlx, the inventory ledger, and the order settlement
//! engine built on [`bazaar_core`].
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bazaar Data Flow                                 │
//! │                                                                         │
//! │  HTTP handler (POST /trx, authenticated buyer id)                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     bazaar-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐   ┌────────────────┐   ┌───────────────┐   │   │
//! │  │   │ OrderSettle-  │──►│  UnitOfWork +  │──►│ Repositories  │   │   │
//! │  │   │ ment          │   │ InventoryLedger│   │ product       │   │   │
//! │  │   │ settle / list │   │ (BEGIN         │   │ address       │   │   │
//! │  │   │               │   │  IMMEDIATE)    │   │ order         │   │   │
//! │  │   └───────────────┘   └────────────────┘   └───────────────┘   │   │
//! │  │                                                                 │   │
//! │  │   Database (pool.rs) ── SqlitePool, WAL, embedded migrations   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (BAZAAR_DATABASE_PATH)                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Configuration, connection pool, repository accessors
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - [`DbError`] and the caller-facing [`OrderError`]
//! - [`repository`] - Product, address and order repositories
//! - [`unit_of_work`] - [`InventoryLedger`] / [`UnitOfWork`] traits and the SQLite implementation
//! - [`settlement`] - [`OrderSettlement`]: settle, list and get orders
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bazaar_core::{CartLine, SettlementRequest};
//! use bazaar_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::from_env()?).await?;
//!
//! let receipt = db
//!     .settlement()
//!     .settle(SettlementRequest {
//!         buyer_id: 1,
//!         shipping_address_id: 2,
//!         payment_method: "COD".into(),
//!         lines: vec![CartLine::new(7, 3)],
//!     })
//!     .await?;
//!
//! let history = db.settlement().list_orders_for_user(1).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod settlement;
pub mod unit_of_work;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult, OrderError};
pub use pool::{Database, DbConfig};
pub use settlement::OrderSettlement;
pub use unit_of_work::{InventoryLedger, SqliteUnitOfWork, UnitOfWork};

// Repository re-exports for convenience
pub use repository::address::AddressRepository;
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
