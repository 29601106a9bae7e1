//! # Order Repository
//!
//! Writes the order aggregate inside a settlement transaction and reads it
//! back expanded for order history.
//!
//! ## Aggregate Layout
//! ```text
//! orders ──┬── order_lines (order_id) ──── product_snapshots (order_line_id)
//!          └── addresses (shipping_address_id)
//! ```
//!
//! Reads load one page of orders, then their lines, snapshots and addresses
//! with one `IN (…)` query each, all inside a single read transaction so the
//! pieces come from the same database state.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use bazaar_core::{
    Address, NewOrder, NewOrderLine, NewProductSnapshot, Order, OrderDetails, OrderId, OrderLine,
    OrderLineDetails, OrderLineId, Page, Pagination, ProductSnapshot, UserId,
};

const ORDER_COLUMNS: &str =
    "id, total_cents, invoice_code, payment_method, shipping_address_id, user_id, created_at";

const LINE_COLUMNS: &str =
    "id, order_id, product_id, store_id, quantity, line_total_cents, created_at";

const SNAPSHOT_COLUMNS: &str = "id, order_id, order_line_id, product_id, name, slug, \
     reseller_price_cents, consumer_price_cents, description, store_id, category_id, created_at";

const ADDRESS_COLUMNS: &str =
    "id, user_id, label, recipient_name, phone, detail, created_at, updated_at";

/// Newest first; id breaks ties between orders created in the same instant.
const HISTORY_ORDER: &str = "ORDER BY created_at DESC, id DESC";

/// Repository for orders, order lines and product snapshots.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    // =========================================================================
    // Read path
    // =========================================================================

    /// Every order of `user_id`, newest first, fully expanded.
    pub async fn list_for_user(&self, user_id: UserId) -> DbResult<Vec<OrderDetails>> {
        debug!(user_id = %user_id, "Listing orders");

        let mut tx = self.pool.begin().await?;
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = ?1 {HISTORY_ORDER}");
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(user_id)
            .fetch_all(&mut *tx)
            .await?;

        let details = expand(&mut tx, orders).await?;
        tx.commit().await?;

        debug!(count = details.len(), "Orders listed");
        Ok(details)
    }

    /// One page of `user_id`'s orders, newest first.
    pub async fn list_for_user_page(
        &self,
        user_id: UserId,
        pagination: Pagination,
    ) -> DbResult<Page<OrderDetails>> {
        debug!(
            user_id = %user_id,
            page = pagination.page(),
            limit = pagination.limit(),
            "Listing order page"
        );

        let mut tx = self.pool.begin().await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = ?1")
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = ?1 {HISTORY_ORDER} LIMIT ?2 OFFSET ?3"
        );
        let orders = sqlx::query_as::<_, Order>(&sql)
            .bind(user_id)
            .bind(pagination.limit())
            .bind(pagination.offset())
            .fetch_all(&mut *tx)
            .await?;

        let details = expand(&mut tx, orders).await?;
        tx.commit().await?;

        Ok(Page::new(pagination, total, details))
    }

    /// The order if it exists and belongs to `user_id`.
    pub async fn get_for_user(
        &self,
        user_id: UserId,
        order_id: OrderId,
    ) -> DbResult<Option<OrderDetails>> {
        debug!(user_id = %user_id, order_id = %order_id, "Fetching order");

        let mut tx = self.pool.begin().await?;
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1 AND user_id = ?2");
        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(order_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;

        let Some(order) = order else {
            return Ok(None);
        };

        let details = expand(&mut tx, vec![order]).await?.pop();
        tx.commit().await?;
        Ok(details)
    }

    /// Orders in the whole store (diagnostics and tests).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // =========================================================================
    // In-transaction writes
    // =========================================================================

    /// Inserts the order header and returns it with its id.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - invoice code already used
    /// * `Err(DbError::ForeignKeyViolation)` - address row missing
    pub async fn insert_order(conn: &mut SqliteConnection, order: &NewOrder) -> DbResult<Order> {
        debug!(invoice_code = %order.invoice_code, total_cents = %order.total_cents, "Inserting order");

        let sql = format!(
            "INSERT INTO orders (total_cents, invoice_code, payment_method, shipping_address_id, user_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING {ORDER_COLUMNS}"
        );

        let inserted = sqlx::query_as::<_, Order>(&sql)
            .bind(order.total_cents)
            .bind(&order.invoice_code)
            .bind(&order.payment_method)
            .bind(order.shipping_address_id)
            .bind(order.user_id)
            .bind(order.created_at)
            .fetch_one(conn)
            .await?;

        Ok(inserted)
    }

    pub async fn insert_line(
        conn: &mut SqliteConnection,
        order_id: OrderId,
        line: &NewOrderLine,
        created_at: DateTime<Utc>,
    ) -> DbResult<OrderLine> {
        debug!(order_id = %order_id, product_id = %line.product_id, "Inserting order line");

        let sql = format!(
            "INSERT INTO order_lines (order_id, product_id, store_id, quantity, line_total_cents, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING {LINE_COLUMNS}"
        );

        let inserted = sqlx::query_as::<_, OrderLine>(&sql)
            .bind(order_id)
            .bind(line.product_id)
            .bind(line.store_id)
            .bind(line.quantity)
            .bind(line.line_total_cents)
            .bind(created_at)
            .fetch_one(conn)
            .await?;

        Ok(inserted)
    }

    pub async fn insert_snapshot(
        conn: &mut SqliteConnection,
        order_id: OrderId,
        order_line_id: OrderLineId,
        snapshot: &NewProductSnapshot,
        created_at: DateTime<Utc>,
    ) -> DbResult<ProductSnapshot> {
        let sql = format!(
            "INSERT INTO product_snapshots (
                order_id, order_line_id, product_id, name, slug,
                reseller_price_cents, consumer_price_cents, description,
                store_id, category_id, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            RETURNING {SNAPSHOT_COLUMNS}"
        );

        let inserted = sqlx::query_as::<_, ProductSnapshot>(&sql)
            .bind(order_id)
            .bind(order_line_id)
            .bind(snapshot.product_id)
            .bind(&snapshot.name)
            .bind(&snapshot.slug)
            .bind(snapshot.reseller_price_cents)
            .bind(snapshot.consumer_price_cents)
            .bind(&snapshot.description)
            .bind(snapshot.store_id)
            .bind(snapshot.category_id)
            .bind(created_at)
            .fetch_one(conn)
            .await?;

        Ok(inserted)
    }
}

// =============================================================================
// Expansion
// =============================================================================

/// `SELECT {columns} FROM {table} WHERE {key} IN (ids…) ORDER BY id`
fn select_in<'a>(
    columns: &str,
    table: &str,
    key: &str,
    ids: impl IntoIterator<Item = i64>,
) -> QueryBuilder<'a, Sqlite> {
    let mut qb = QueryBuilder::new(format!("SELECT {columns} FROM {table} WHERE {key} IN ("));
    let mut separated = qb.separated(", ");
    for id in ids {
        separated.push_bind(id);
    }
    separated.push_unseparated(") ORDER BY id");
    qb
}

/// Attaches lines, snapshots and addresses to `orders`, keeping their order.
async fn expand(conn: &mut SqliteConnection, orders: Vec<Order>) -> DbResult<Vec<OrderDetails>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let order_ids: Vec<OrderId> = orders.iter().map(|o| o.id).collect();
    let mut address_ids: Vec<i64> = orders.iter().map(|o| o.shipping_address_id).collect();
    address_ids.sort_unstable();
    address_ids.dedup();

    let lines = select_in(LINE_COLUMNS, "order_lines", "order_id", order_ids.iter().copied())
        .build_query_as::<OrderLine>()
        .fetch_all(&mut *conn)
        .await?;

    let snapshots =
        select_in(SNAPSHOT_COLUMNS, "product_snapshots", "order_id", order_ids.iter().copied())
            .build_query_as::<ProductSnapshot>()
            .fetch_all(&mut *conn)
            .await?;

    let addresses = select_in(ADDRESS_COLUMNS, "addresses", "id", address_ids)
        .build_query_as::<Address>()
        .fetch_all(&mut *conn)
        .await?;

    let mut snapshot_by_line: HashMap<OrderLineId, ProductSnapshot> = snapshots
        .into_iter()
        .map(|s| (s.order_line_id, s))
        .collect();
    let address_by_id: HashMap<i64, Address> =
        addresses.into_iter().map(|a| (a.id, a)).collect();

    let mut lines_by_order: HashMap<OrderId, Vec<OrderLineDetails>> = HashMap::new();
    for line in lines {
        let snapshot = snapshot_by_line.remove(&line.id).ok_or_else(|| {
            DbError::Internal(format!("order line {} has no product snapshot", line.id))
        })?;
        lines_by_order
            .entry(line.order_id)
            .or_default()
            .push(OrderLineDetails { line, snapshot });
    }

    let details = orders
        .into_iter()
        .map(|order| OrderDetails {
            shipping_address: address_by_id.get(&order.shipping_address_id).cloned(),
            lines: lines_by_order.remove(&order.id).unwrap_or_default(),
            order,
        })
        .collect();

    Ok(details)
}
