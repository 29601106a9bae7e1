//! # bazaar-core: Pure Business Logic for Bazaar
//!
//! This crate holds the settlement rules of the marketplace as pure
//! functions and plain data. Nothing here touches a database.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bazaar Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │              HTTP layer (outside this workspace)                │   │
//! │  │        POST /trx ──► settle   GET /trx ──► list / get           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bazaar-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌────────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │ settlement │  │ validation│  │   │
//! │  │   │  Product  │  │   Money   │  │ OrderDraft │  │   cart    │  │   │
//! │  │   │   Order   │  │           │  │  invoice   │  │   rules   │  │   │
//! │  │   └───────────┘  └───────────┘  └────────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          bazaar-db (ledger, unit of work, repositories)         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Address, Order, OrderLine, ProductSnapshot)
//! - [`money`] - Money type with checked integer arithmetic
//! - [`error`] - Domain error types and the [`ErrorKind`] taxonomy
//! - [`validation`] - Request shape validation
//! - [`settlement`] - Order drafting: stock checks, totals, snapshots, invoice codes
//! - [`pagination`] - Page/limit normalization for the order read path
//!
//! ## Example Usage
//!
//! ```rust
//! use bazaar_core::money::Money;
//!
//! let price = Money::from_cents(1000);
//! let line_total = price.checked_mul_quantity(3).unwrap();
//! assert_eq!(line_total.cents(), 3000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod pagination;
pub mod settlement;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use money::Money;
pub use pagination::{Page, Pagination};
pub use settlement::{invoice_code, DraftLine, OrderDraft, StockChange};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum number of lines accepted in a single cart.
///
/// ## Business Reason
/// Bounds the time a settlement holds the inventory lock.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single cart line.
pub const MAX_LINE_QUANTITY: i64 = 9_999;

/// Maximum length of the free-form payment method string.
pub const MAX_PAYMENT_METHOD_LEN: usize = 50;

/// Prefix of every invoice code.
pub const INVOICE_PREFIX: &str = "INV";
