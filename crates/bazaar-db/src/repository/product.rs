//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - Catalog CRUD on the pool (`insert`, `get_by_id`, `update_details`, `delete`)
//! - Ledger reads and writes inside a settlement transaction
//!   (`lock_for_update`, `set_stock`)
//!
//! ## Stock Writes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Absolute Stock Write-Back                            │
//! │                                                                         │
//! │  BEGIN IMMEDIATE            ← write lock held from here                │
//! │  SELECT … WHERE id = 7      → stock = 5                                │
//! │  (core checks 3 <= 5)                                                  │
//! │  UPDATE … SET stock = 2     ← absolute value, computed under the lock  │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  No other writer can run between the SELECT and the UPDATE, so the     │
//! │  absolute write never loses a concurrent decrement.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use bazaar_core::{NewProduct, Product, ProductDetails, ProductId};

const PRODUCT_COLUMNS: &str = "id, store_id, category_id, name, slug, \
     reseller_price_cents, consumer_price_cents, stock, description, \
     created_at, updated_at";

async fn fetch_product<'e>(executor: impl SqliteExecutor<'e>, id: ProductId) -> DbResult<Option<Product>> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1");
    let product = sqlx::query_as::<_, Product>(&sql)
        .bind(id)
        .fetch_optional(executor)
        .await?;
    Ok(product)
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
/// let product = repo.insert(&new_product).await?;
/// let same = repo.get_by_id(product.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: ProductId) -> DbResult<Option<Product>> {
        fetch_product(&self.pool, id).await
    }

    /// Inserts a new product and returns the stored row.
    ///
    /// ## Returns
    /// * `Err(DbError::UniqueViolation)` - slug already exists
    /// * `Err(DbError::CheckViolation)` - negative price or stock
    pub async fn insert(&self, product: &NewProduct) -> DbResult<Product> {
        debug!(slug = %product.slug, "Inserting product");

        let now = Utc::now();
        let sql = format!(
            "INSERT INTO products (
                store_id, category_id, name, slug,
                reseller_price_cents, consumer_price_cents, stock, description,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
            RETURNING {PRODUCT_COLUMNS}"
        );

        let inserted = sqlx::query_as::<_, Product>(&sql)
            .bind(product.store_id)
            .bind(product.category_id)
            .bind(&product.name)
            .bind(&product.slug)
            .bind(product.reseller_price_cents)
            .bind(product.consumer_price_cents)
            .bind(product.stock)
            .bind(&product.description)
            .bind(now)
            .fetch_one(&self.pool)
            .await?;

        debug!(id = %inserted.id, "Product inserted");
        Ok(inserted)
    }

    /// Replaces a product's editable attributes. Stock is untouched.
    ///
    /// Snapshots of past purchases are separate rows and keep their values.
    pub async fn update_details(&self, id: ProductId, details: &ProductDetails) -> DbResult<()> {
        debug!(id = %id, "Updating product details");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                name = ?2,
                slug = ?3,
                reseller_price_cents = ?4,
                consumer_price_cents = ?5,
                description = ?6,
                updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&details.name)
        .bind(&details.slug)
        .bind(details.reseller_price_cents)
        .bind(details.consumer_price_cents)
        .bind(&details.description)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Hard-deletes a product. Order lines and snapshots that reference it
    /// are kept.
    pub async fn delete(&self, id: ProductId) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts total products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // In-transaction ledger access
    // =========================================================================

    /// Reads a product on a connection that already holds the write lock.
    ///
    /// Must be called inside a transaction opened with `BEGIN IMMEDIATE`;
    /// the lock is what makes the returned stock safe to act on.
    pub async fn lock_for_update(
        conn: &mut SqliteConnection,
        id: ProductId,
    ) -> DbResult<Option<Product>> {
        debug!(id = %id, "Reading product under write lock");
        fetch_product(conn, id).await
    }

    /// Writes an absolute stock value.
    pub async fn set_stock(conn: &mut SqliteConnection, id: ProductId, stock: i64) -> DbResult<()> {
        debug!(id = %id, stock = %stock, "Writing back stock");

        let result = sqlx::query("UPDATE products SET stock = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(id)
            .bind(stock)
            .bind(Utc::now())
            .execute(conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
