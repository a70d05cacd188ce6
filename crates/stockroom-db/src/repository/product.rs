//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - Create a product with its opening stock
//! - Lookups by ID and by barcode (POS scan / JSON API)
//! - Listing and dashboard counters
//!
//! Stock levels are read here but never written after creation; every
//! later change goes through [`LedgerRepository`](super::ledger::LedgerRepository)
//! so the ledger and `stock_quantity` stay in step.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use stockroom_core::{NewProduct, Product, LOW_STOCK_THRESHOLD};

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let product = repo.get_by_barcode("5449000000996").await?;
/// let all = repo.list().await?;
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

    /// Inserts a new product.
    ///
    /// ## Arguments
    /// * `new` - Validated product fields
    ///
    /// ## Returns
    /// * `Ok(Product)` - Inserted product with generated ID and timestamps
    /// * `Err(DbError::UniqueViolation)` - Barcode already exists
    pub async fn insert(&self, new: &NewProduct) -> DbResult<Product> {
        debug!(barcode = %new.barcode, "Inserting product");

        let now = Utc::now();
        let product = Product {
            id: generate_id(),
            name: new.name.clone(),
            barcode: new.barcode.clone(),
            category: new.category.clone(),
            price_cents: new.price_cents,
            stock_quantity: new.stock_quantity,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, barcode, category,
                price_cents, stock_quantity,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.barcode)
        .bind(&product.category)
        .bind(product.price_cents)
        .bind(product.stock_quantity)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| DbError::from(e).with_duplicate_value("barcode", &new.barcode))?;

        Ok(product)
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                id, name, barcode, category,
                price_cents, stock_quantity,
                created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its barcode (exact match).
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - No product carries this barcode
    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                id, name, barcode, category,
                price_cents, stock_quantity,
                created_at, updated_at
            FROM products
            WHERE barcode = ?1
            "#,
        )
        .bind(barcode)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists all products sorted by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT
                id, name, barcode, category,
                price_cents, stock_quantity,
                created_at, updated_at
            FROM products
            ORDER BY name COLLATE NOCASE, barcode
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Counts all products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Counts products whose stock is below [`LOW_STOCK_THRESHOLD`].
    pub async fn low_stock_count(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE stock_quantity < ?1")
                .bind(LOW_STOCK_THRESHOLD)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn cola() -> NewProduct {
        NewProduct {
            name: "Cola 330ml".to_string(),
            barcode: "5449000000996".to_string(),
            category: "Beverages".to_string(),
            price_cents: 150,
            stock_quantity: 24,
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        let inserted = repo.insert(&cola()).await.unwrap();
        assert_eq!(inserted.stock_quantity, 24);

        let by_id = repo.get_by_id(&inserted.id).await.unwrap().unwrap();
        assert_eq!(by_id.barcode, "5449000000996");

        let by_barcode = repo.get_by_barcode("5449000000996").await.unwrap().unwrap();
        assert_eq!(by_barcode.id, inserted.id);
        assert_eq!(by_barcode.price().cents(), 150);
    }

    #[tokio::test]
    async fn test_missing_product_is_none() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.products().get_by_id("nope").await.unwrap().is_none());
        assert!(db.products().get_by_barcode("000").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_barcode_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        repo.insert(&cola()).await.unwrap();

        let mut again = cola();
        again.name = "Cola (duplicate)".to_string();
        let err = repo.insert(&again).await.unwrap_err();

        match err {
            DbError::UniqueViolation { field, value } => {
                assert_eq!(field, "barcode");
                assert_eq!(value, "5449000000996");
            }
            other => panic!("expected UniqueViolation, got {other:?}"),
        }
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_sorted_and_low_stock_count() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();

        repo.insert(&cola()).await.unwrap();
        repo.insert(&NewProduct {
            name: "apple juice".to_string(),
            barcode: "4000000000001".to_string(),
            category: "Beverages".to_string(),
            price_cents: 220,
            stock_quantity: LOW_STOCK_THRESHOLD - 1,
        })
        .await
        .unwrap();

        let names: Vec<_> = repo.list().await.unwrap().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["apple juice", "Cola 330ml"]);
        assert_eq!(repo.low_stock_count().await.unwrap(), 1);
    }
}
