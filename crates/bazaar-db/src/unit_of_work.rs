//! # Unit of Work
//!
//! The seams the settlement engine is written against.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  OrderSettlement::settle_in<U: UnitOfWork>(uow, request)               │
//! │       │                                                                 │
//! │       ├── InventoryLedger::lock_product_for_update / set_stock         │
//! │       ├── UnitOfWork::find_address                                      │
//! │       ├── UnitOfWork::insert_order / insert_order_line / insert_snapshot│
//! │       └── UnitOfWork::commit  or  UnitOfWork::rollback                 │
//! │                                                                         │
//! │  SqliteUnitOfWork: one Transaction opened with BEGIN IMMEDIATE         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Locking on SQLite
//! SQLite has no row locks. `BEGIN IMMEDIATE` takes the database's single
//! RESERVED lock when the unit of work starts, so every product read through
//! [`InventoryLedger::lock_product_for_update`] stays exclusive until commit
//! or rollback. A second settlement waits in `BEGIN` for at most the
//! connection's `busy_timeout` and then fails with [`DbError::Busy`].
//! Since the lock covers the whole database there is no lock order to get
//! wrong between overlapping carts.
//!
//! [`DbError::Busy`]: crate::error::DbError::Busy

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::DbResult;
use crate::repository::address::AddressRepository;
use crate::repository::order::OrderRepository;
use crate::repository::product::ProductRepository;
use bazaar_core::{
    Address, AddressId, NewOrder, NewOrderLine, NewProductSnapshot, Order, OrderId, OrderLine,
    OrderLineId, Product, ProductId, ProductSnapshot,
};

/// Exclusive access to product stock for the life of a unit of work.
#[allow(async_fn_in_trait)]
pub trait InventoryLedger {
    /// Reads a product and holds it exclusively until the unit of work ends.
    async fn lock_product_for_update(&mut self, id: ProductId) -> DbResult<Option<Product>>;

    /// Writes an absolute stock level. Callers check sufficiency first, under
    /// the lock taken by [`lock_product_for_update`](Self::lock_product_for_update).
    async fn set_stock(&mut self, id: ProductId, stock: i64) -> DbResult<()>;
}

/// One atomic settlement: everything written through it commits or rolls
/// back together.
#[allow(async_fn_in_trait)]
pub trait UnitOfWork: InventoryLedger {
    async fn find_address(&mut self, id: AddressId) -> DbResult<Option<Address>>;

    async fn insert_order(&mut self, order: &NewOrder) -> DbResult<Order>;

    async fn insert_order_line(
        &mut self,
        order_id: OrderId,
        line: &NewOrderLine,
        created_at: DateTime<Utc>,
    ) -> DbResult<OrderLine>;

    async fn insert_snapshot(
        &mut self,
        order_id: OrderId,
        order_line_id: OrderLineId,
        snapshot: &NewProductSnapshot,
        created_at: DateTime<Utc>,
    ) -> DbResult<ProductSnapshot>;

    async fn commit(self) -> DbResult<()>;

    async fn rollback(self) -> DbResult<()>;
}

// =============================================================================
// SQLite implementation
// =============================================================================

/// A unit of work over one SQLite write transaction.
///
/// Dropping it without [`commit`](UnitOfWork::commit) rolls back.
#[derive(Debug)]
pub struct SqliteUnitOfWork {
    tx: Transaction<'static, Sqlite>,
}

impl SqliteUnitOfWork {
    /// Acquires a pooled connection and takes the write lock.
    ///
    /// ## Returns
    /// * `Err(DbError::Busy)` - another writer held the lock past `busy_timeout`
    /// * `Err(DbError::PoolExhausted)` - no connection within the acquire timeout
    pub async fn begin(pool: &SqlitePool) -> DbResult<Self> {
        let tx = pool.begin_with("BEGIN IMMEDIATE").await?;
        debug!("Write transaction started");
        Ok(SqliteUnitOfWork { tx })
    }
}

impl InventoryLedger for SqliteUnitOfWork {
    async fn lock_product_for_update(&mut self, id: ProductId) -> DbResult<Option<Product>> {
        ProductRepository::lock_for_update(&mut self.tx, id).await
    }

    async fn set_stock(&mut self, id: ProductId, stock: i64) -> DbResult<()> {
        ProductRepository::set_stock(&mut self.tx, id, stock).await
    }
}

impl UnitOfWork for SqliteUnitOfWork {
    async fn find_address(&mut self, id: AddressId) -> DbResult<Option<Address>> {
        AddressRepository::find_in(&mut self.tx, id).await
    }

    async fn insert_order(&mut self, order: &NewOrder) -> DbResult<Order> {
        OrderRepository::insert_order(&mut self.tx, order).await
    }

    async fn insert_order_line(
        &mut self,
        order_id: OrderId,
        line: &NewOrderLine,
        created_at: DateTime<Utc>,
    ) -> DbResult<OrderLine> {
        OrderRepository::insert_line(&mut self.tx, order_id, line, created_at).await
    }

    async fn insert_snapshot(
        &mut self,
        order_id: OrderId,
        order_line_id: OrderLineId,
        snapshot: &NewProductSnapshot,
        created_at: DateTime<Utc>,
    ) -> DbResult<ProductSnapshot> {
        OrderRepository::insert_snapshot(&mut self.tx, order_id, order_line_id, snapshot, created_at)
            .await
    }

    async fn commit(self) -> DbResult<()> {
        self.tx.commit().await?;
        debug!("Write transaction committed");
        Ok(())
    }

    async fn rollback(self) -> DbResult<()> {
        self.tx.rollback().await?;
        debug!("Write transaction rolled back");
        Ok(())
    }
}
