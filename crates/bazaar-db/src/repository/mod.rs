//! # Repository Module
//!
//! SQL for each table group lives in one repository.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Pool methods (&self)              In-transaction fns (&mut conn)       │
//! │  ─────────────────────             ──────────────────────────────       │
//! │  db.products().insert(..)          ProductRepository::lock_for_update   │
//! │  db.addresses().find_by_id(..)     ProductRepository::set_stock         │
//! │  db.orders().list_for_user(..)     AddressRepository::find_in           │
//! │                                    OrderRepository::insert_order / ..   │
//! │                                                                         │
//! │  The in-transaction half is only reached through SqliteUnitOfWork.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Catalog rows and stock
//! - [`AddressRepository`](address::AddressRepository) - Shipping addresses
//! - [`OrderRepository`](order::OrderRepository) - Orders, lines, snapshots

pub mod address;
pub mod order;
pub mod product;
