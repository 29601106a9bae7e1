//! # Order Settlement
//!
//! Turns a buyer's cart into a committed order, and serves the buyer's order
//! history.
//!
//! ## Settlement Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  settle(request)                                                        │
//! │    │                                                                    │
//! │    ├─ request.validate()              ValidationError, no tx opened    │
//! │    ├─ SqliteUnitOfWork::begin         BEGIN IMMEDIATE                   │
//! │    └─ settle_in(uow, validated)                                         │
//! │         ├─ find_address               AddressNotFound / AccessDenied   │
//! │         ├─ for each cart line (cart order):                             │
//! │         │    lock_product_for_update  ProductNotFound                  │
//! │         │    draft.add_line           InsufficientStock                │
//! │         │    set_stock(remaining)                                       │
//! │         ├─ insert_order               INV-{buyer}-{micros}             │
//! │         ├─ insert_order_line + insert_snapshot per line                 │
//! │         └─ commit        (any error above → rollback, nothing written) │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::OrderError;
use crate::repository::order::OrderRepository;
use crate::unit_of_work::{SqliteUnitOfWork, UnitOfWork};
use bazaar_core::{
    invoice_code, CoreError, OrderDetails, OrderDraft, OrderId, Page, Pagination,
    SettlementReceipt, SettlementRequest, UserId, ValidatedSettlement,
};

/// Settlement engine and order read path over a SQLite pool.
///
/// ## Usage
/// ```rust,ignore
/// let receipt = db.settlement().settle(SettlementRequest {
///     buyer_id: 1,
///     shipping_address_id: 2,
///     payment_method: "COD".into(),
///     lines: vec![CartLine::new(7, 3)],
/// }).await?;
/// ```
#[derive(Debug, Clone)]
pub struct OrderSettlement {
    pool: SqlitePool,
}

impl OrderSettlement {
    pub fn new(pool: SqlitePool) -> Self {
        OrderSettlement { pool }
    }

    /// Settles a cart in one SQLite write transaction.
    ///
    /// ## Returns
    /// * `Ok(SettlementReceipt)` - order committed, stock decremented
    /// * `Err(OrderError::Rejected(_))` - business rule failed, nothing written
    /// * `Err(OrderError::Persistence(_))` - storage failed, nothing written;
    ///   check [`OrderError::is_retryable`]
    pub async fn settle(&self, request: SettlementRequest) -> Result<SettlementReceipt, OrderError> {
        let validated = request.validate()?;
        let uow = SqliteUnitOfWork::begin(&self.pool).await?;
        Self::settle_in(uow, &validated).await
    }

    /// Runs a settlement inside `uow` and commits it, or rolls it back on
    /// the first error.
    pub async fn settle_in<U: UnitOfWork>(
        mut uow: U,
        request: &ValidatedSettlement,
    ) -> Result<SettlementReceipt, OrderError> {
        match apply(&mut uow, request).await {
            Ok(receipt) => {
                uow.commit().await?;
                info!(
                    order_id = %receipt.order_id,
                    invoice_code = %receipt.invoice_code,
                    total_cents = %receipt.total_cents,
                    "Order settled"
                );
                Ok(receipt)
            }
            Err(err) => {
                if let Err(rollback_err) = uow.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                match &err {
                    OrderError::Rejected(reason) => {
                        debug!(buyer_id = %request.buyer_id(), kind = ?reason.kind(), "Settlement rejected: {reason}")
                    }
                    OrderError::Persistence(db_err) => {
                        warn!(buyer_id = %request.buyer_id(), error = %db_err, "Settlement failed")
                    }
                }
                Err(err)
            }
        }
    }

    /// All of the user's orders, newest first.
    pub async fn list_orders_for_user(&self, user_id: UserId) -> Result<Vec<OrderDetails>, OrderError> {
        Ok(self.orders().list_for_user(user_id).await?)
    }

    pub async fn list_orders_for_user_page(
        &self,
        user_id: UserId,
        pagination: Pagination,
    ) -> Result<Page<OrderDetails>, OrderError> {
        Ok(self.orders().list_for_user_page(user_id, pagination).await?)
    }

    /// The order, or `OrderNotFound` when it is missing or belongs to
    /// someone else.
    pub async fn get_order_for_user(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> Result<OrderDetails, OrderError> {
        self.orders()
            .get_for_user(user_id, order_id)
            .await?
            .ok_or_else(|| CoreError::OrderNotFound(order_id).into())
    }

    fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.pool.clone())
    }
}

/// Everything between BEGIN and COMMIT.
async fn apply<U: UnitOfWork>(
    uow: &mut U,
    request: &ValidatedSettlement,
) -> Result<SettlementReceipt, OrderError> {
    let buyer_id = request.buyer_id();
    let address_id = request.shipping_address_id();

    let address = uow
        .find_address(address_id)
        .await?
        .ok_or(CoreError::AddressNotFound(address_id))?;
    if !address.is_owned_by(buyer_id) {
        return Err(CoreError::AccessDenied {
            address_id,
            buyer_id,
        }
        .into());
    }

    let mut draft = OrderDraft::new(buyer_id, address_id, request.payment_method());

    for cart_line in request.lines() {
        let product = uow
            .lock_product_for_update(cart_line.product_id)
            .await?
            .ok_or(CoreError::ProductNotFound(cart_line.product_id))?;

        let change = draft.add_line(&product, cart_line.quantity)?;
        uow.set_stock(change.product_id, change.remaining).await?;

        debug!(
            product_id = %change.product_id,
            previous = %change.previous,
            remaining = %change.remaining,
            "Stock reserved"
        );
    }

    let now = Utc::now();
    let (new_order, lines) = draft.finish(invoice_code(buyer_id, now), now);
    let order = uow.insert_order(&new_order).await?;

    for draft_line in &lines {
        let line = uow.insert_order_line(order.id, &draft_line.line, now).await?;
        uow.insert_snapshot(order.id, line.id, &draft_line.snapshot, now)
            .await?;
    }

    Ok(SettlementReceipt {
        order_id: order.id,
        invoice_code: order.invoice_code,
        total_cents: order.total_cents,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
