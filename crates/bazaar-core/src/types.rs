//! # Domain Types
//!
//! Core domain types used by order settlement.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │     Order       │   │    Address      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  id             │       │
//! │  │  store_id       │   │  invoice_code   │   │  user_id (owner)│       │
//! │  │  consumer_price │   │  total_cents    │   │  detail         │       │
//! │  │  stock          │   │  user_id        │   └─────────────────┘       │
//! │  └─────────────────┘   └────────┬────────┘                              │
//! │                                 │ owns (cascade-created)                │
//! │                  ┌──────────────┴──────────────┐                        │
//! │                  ▼                             ▼                        │
//! │         ┌─────────────────┐          ┌──────────────────┐               │
//! │         │   OrderLine     │ 1 ─── 1  │ ProductSnapshot  │               │
//! │         │  quantity       │          │  name, slug      │               │
//! │         │  line_total     │          │  both prices     │               │
//! │         └─────────────────┘          └──────────────────┘               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ids are database row ids (`i64`). `New*` types are rows that have not been
//! written yet; they carry no id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::Money;
use crate::validation;

// =============================================================================
// Identifiers
// =============================================================================

pub type UserId = i64;
pub type StoreId = i64;
pub type CategoryId = i64;
pub type AddressId = i64;
pub type ProductId = i64;
pub type OrderId = i64;
pub type OrderLineId = i64;

// =============================================================================
// Product
// =============================================================================

/// A product listed by a store. Its `stock` column is the ledger row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    pub id: ProductId,
    pub store_id: StoreId,
    pub category_id: CategoryId,
    pub name: String,
    pub slug: String,
    /// Price charged to resellers.
    pub reseller_price_cents: i64,
    /// Price charged to the buyer at checkout.
    pub consumer_price_cents: i64,
    /// Units available for sale.
    pub stock: i64,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the consumer price as Money.
    #[inline]
    pub fn consumer_price(&self) -> Money {
        Money::from_cents(self.consumer_price_cents)
    }

    /// Returns the reseller price as Money.
    #[inline]
    pub fn reseller_price(&self) -> Money {
        Money::from_cents(self.reseller_price_cents)
    }

    /// Checks whether `quantity` units can be taken from current stock.
    #[inline]
    pub fn has_stock_for(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

/// A product that has not been inserted yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub store_id: StoreId,
    pub category_id: CategoryId,
    pub name: String,
    pub slug: String,
    pub reseller_price_cents: i64,
    pub consumer_price_cents: i64,
    pub stock: i64,
    pub description: String,
}

impl NewProduct {
    /// Checks name, slug, prices and stock before insertion.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_product_name(&self.name)?;
        validation::validate_slug(&self.slug)?;
        validation::validate_price_cents("reseller_price", self.reseller_price_cents)?;
        validation::validate_price_cents("consumer_price", self.consumer_price_cents)?;
        validation::validate_stock(self.stock)?;
        Ok(())
    }
}

/// Editable product attributes (everything except stock, which only the
/// ledger writes).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDetails {
    pub name: String,
    pub slug: String,
    pub reseller_price_cents: i64,
    pub consumer_price_cents: i64,
    pub description: String,
}

// =============================================================================
// Address
// =============================================================================

/// A shipping address owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Address {
    pub id: AddressId,
    pub user_id: UserId,
    pub label: String,
    pub recipient_name: String,
    pub phone: String,
    pub detail: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Address {
    #[inline]
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.user_id == user_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAddress {
    pub user_id: UserId,
    pub label: String,
    pub recipient_name: String,
    pub phone: String,
    pub detail: String,
}

// =============================================================================
// Cart / Settlement Request
// =============================================================================

/// One (product, quantity) pair submitted for purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: i64,
}

impl CartLine {
    pub fn new(product_id: ProductId, quantity: i64) -> Self {
        CartLine {
            product_id,
            quantity,
        }
    }
}

/// A cart submitted for settlement by an authenticated buyer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementRequest {
    pub buyer_id: UserId,
    pub shipping_address_id: AddressId,
    pub payment_method: String,
    pub lines: Vec<CartLine>,
}

impl SettlementRequest {
    /// Checks the request shape and returns the validated form the settlement
    /// engine accepts.
    pub fn validate(self) -> Result<ValidatedSettlement, ValidationError> {
        validation::validate_id("buyer_id", self.buyer_id)?;
        validation::validate_id("shipping_address_id", self.shipping_address_id)?;
        validation::validate_payment_method(&self.payment_method)?;
        validation::validate_cart_lines(&self.lines)?;

        Ok(ValidatedSettlement {
            buyer_id: self.buyer_id,
            shipping_address_id: self.shipping_address_id,
            payment_method: self.payment_method.trim().to_string(),
            lines: self.lines,
        })
    }
}

/// A [`SettlementRequest`] whose shape has been checked.
///
/// Only obtainable through [`SettlementRequest::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSettlement {
    buyer_id: UserId,
    shipping_address_id: AddressId,
    payment_method: String,
    lines: Vec<CartLine>,
}

impl ValidatedSettlement {
    pub fn buyer_id(&self) -> UserId {
        self.buyer_id
    }

    pub fn shipping_address_id(&self) -> AddressId {
        self.shipping_address_id
    }

    pub fn payment_method(&self) -> &str {
        &self.payment_method
    }

    /// Cart lines in submission order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }
}

// =============================================================================
// Order
// =============================================================================

/// A committed order. Never updated after settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Order {
    pub id: OrderId,
    /// Always the sum of the order's line totals.
    pub total_cents: i64,
    pub invoice_code: String,
    pub payment_method: String,
    pub shipping_address_id: AddressId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl Order {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// An order row waiting to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub total_cents: i64,
    pub invoice_code: String,
    pub payment_method: String,
    pub shipping_address_id: AddressId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Order Line
// =============================================================================

/// A purchased line. Price is frozen at purchase time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderLine {
    pub id: OrderLineId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    /// Store that owned the product when it was bought.
    pub store_id: StoreId,
    pub quantity: i64,
    /// quantity × consumer price at purchase time.
    pub line_total_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl OrderLine {
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub store_id: StoreId,
    pub quantity: i64,
    pub line_total_cents: i64,
}

// =============================================================================
// Product Snapshot
// =============================================================================

/// Frozen copy of a product as it was when an order line was bought.
///
/// ## Snapshot Pattern
/// Later edits or deletion of the live product never reach this row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductSnapshot {
    pub id: i64,
    pub order_id: OrderId,
    pub order_line_id: OrderLineId,
    pub product_id: ProductId,
    pub name: String,
    pub slug: String,
    pub reseller_price_cents: i64,
    pub consumer_price_cents: i64,
    pub description: String,
    pub store_id: StoreId,
    pub category_id: CategoryId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProductSnapshot {
    pub product_id: ProductId,
    pub name: String,
    pub slug: String,
    pub reseller_price_cents: i64,
    pub consumer_price_cents: i64,
    pub description: String,
    pub store_id: StoreId,
    pub category_id: CategoryId,
}

impl From<&Product> for NewProductSnapshot {
    fn from(product: &Product) -> Self {
        NewProductSnapshot {
            product_id: product.id,
            name: product.name.clone(),
            slug: product.slug.clone(),
            reseller_price_cents: product.reseller_price_cents,
            consumer_price_cents: product.consumer_price_cents,
            description: product.description.clone(),
            store_id: product.store_id,
            category_id: product.category_id,
        }
    }
}

// =============================================================================
// Read Models
// =============================================================================

/// One line of an expanded order with its snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineDetails {
    pub line: OrderLine,
    pub snapshot: ProductSnapshot,
}

/// An order expanded with its shipping address, lines and snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDetails {
    pub order: Order,
    /// `None` only if the address row has since been removed.
    pub shipping_address: Option<Address>,
    pub lines: Vec<OrderLineDetails>,
}

impl OrderDetails {
    /// Sum of line totals. Equal to `order.total_cents` for every committed order.
    pub fn lines_total(&self) -> Money {
        self.lines.iter().map(|l| l.line.line_total()).sum()
    }
}

/// What a successful settlement returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettlementReceipt {
    pub order_id: OrderId,
    pub invoice_code: String,
    pub total_cents: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================
