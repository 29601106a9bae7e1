//! # Settlement Drafting
//!
//! The pure half of order settlement. The database layer locks a product,
//! hands it to [`OrderDraft::add_line`], and writes back the returned
//! [`StockChange`]. When every line has been added the draft is turned into
//! the rows to insert.
//!
//! ```text
//!  locked Product ──► OrderDraft::add_line(product, qty)
//!                        │  stock >= qty ?  ── no ──► InsufficientStock
//!                        │  line_total = qty × consumer_price
//!                        │  total     += line_total
//!                        ▼
//!                     StockChange { remaining } ──► ledger.set_stock
//!
//!  OrderDraft::finish(invoice, now) ──► NewOrder + [DraftLine { line, snapshot }]
//! ```

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{
    AddressId, NewOrder, NewOrderLine, NewProductSnapshot, Product, ProductId, UserId,
};
use crate::INVOICE_PREFIX;

/// Stock write-back computed for one cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockChange {
    pub product_id: ProductId,
    pub previous: i64,
    pub remaining: i64,
}

/// An order line and its snapshot, not yet attached to an order id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftLine {
    pub line: NewOrderLine,
    pub snapshot: NewProductSnapshot,
}

/// Accumulates priced lines for one settlement.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    buyer_id: UserId,
    shipping_address_id: AddressId,
    payment_method: String,
    total: Money,
    lines: Vec<DraftLine>,
}

impl OrderDraft {
    pub fn new(
        buyer_id: UserId,
        shipping_address_id: AddressId,
        payment_method: impl Into<String>,
    ) -> Self {
        OrderDraft {
            buyer_id,
            shipping_address_id,
            payment_method: payment_method.into(),
            total: Money::zero(),
            lines: Vec::new(),
        }
    }

    /// Prices one line against a product read under the inventory lock.
    ///
    /// The product's stock is compared to `quantity`; on success the line and
    /// its snapshot are recorded and the stock to write back is returned. On
    /// failure the draft is left untouched.
    pub fn add_line(&mut self, product: &Product, quantity: i64) -> CoreResult<StockChange> {
        if !product.has_stock_for(quantity) {
            return Err(CoreError::InsufficientStock {
                product_id: product.id,
                name: product.name.clone(),
                available: product.stock,
                requested: quantity,
            });
        }

        let overflow = || CoreError::AmountOverflow {
            product_id: product.id,
        };
        let line_total = product
            .consumer_price()
            .checked_mul_quantity(quantity)
            .ok_or_else(overflow)?;
        let total = self.total.checked_add(line_total).ok_or_else(overflow)?;

        self.total = total;
        self.lines.push(DraftLine {
            line: NewOrderLine {
                product_id: product.id,
                store_id: product.store_id,
                quantity,
                line_total_cents: line_total.cents(),
            },
            snapshot: NewProductSnapshot::from(product),
        });

        Ok(StockChange {
            product_id: product.id,
            previous: product.stock,
            remaining: product.stock - quantity,
        })
    }

    /// Running total of every line added so far.
    pub fn total(&self) -> Money {
        self.total
    }

    pub fn lines(&self) -> &[DraftLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Produces the order row and its lines, stamped with `created_at`.
    pub fn finish(self, invoice_code: String, created_at: DateTime<Utc>) -> (NewOrder, Vec<DraftLine>) {
        let order = NewOrder {
            total_cents: self.total.cents(),
            invoice_code,
            payment_method: self.payment_method,
            shipping_address_id: self.shipping_address_id,
            user_id: self.buyer_id,
            created_at,
        };
        (order, self.lines)
    }
}

/// Builds an invoice code from the buyer id and a microsecond timestamp.
///
/// Two settlements by the same buyer within the same microsecond produce the
/// same code; the database's unique constraint turns that into a persistence
/// error.
///
/// ```rust
/// use bazaar_core::invoice_code;
/// use chrono::{TimeZone, Utc};
///
/// let at = Utc.timestamp_opt(1_700_000_000, 123_456_000).unwrap();
/// assert_eq!(invoice_code(42, at), "INV-42-1700000000123456");
/// ```
pub fn invoice_code(buyer_id: UserId, at: DateTime<Utc>) -> String {
    format!("{}-{}-{}", INVOICE_PREFIX, buyer_id, at.timestamp_micros())
}

// =============================================================================
// Unit Tests
// =============================================================================
