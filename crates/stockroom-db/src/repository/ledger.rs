//! # Stock Ledger Repository
//!
//! The only writer of `products.stock_quantity` after a product is created.
//!
//! ## Atomic Stock Movement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    record_sale(product, 3, Strict)                      │
//! │                                                                         │
//! │  validate_quantity(3)          ← rejected before touching storage       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UPDATE products                                                        │
//! │     SET stock_quantity = stock_quantity + (-3)   ← relative, not "= 7"  │
//! │   WHERE id = ? AND (stock_quantity + (-3) >= 0 OR <override>)          │
//! │     AND stock_quantity + (-3) BETWEEN -MAX_STOCK AND MAX_STOCK         │
//! │       │                                                                 │
//! │       ├── 0 rows → SELECT to tell NotFound / InsufficientStock /       │
//! │       │            out-of-range apart                                   │
//! │       │            ROLLBACK                                             │
//! │       ▼                                                                 │
//! │  INSERT INTO stock_transactions (..., 'sale', 3, ...)                  │
//! │       │                                                                 │
//! │       ├── error → ROLLBACK (stock decrement undone too)                │
//! │       ▼                                                                 │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The write statement comes first so SQLite takes the write lock at the
//! start of the transaction. Two concurrent sales of the same product queue
//! on that lock (bounded by the busy timeout) and both apply.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::generate_id;
use stockroom_core::validation::validate_quantity;
use stockroom_core::{
    CoreError, LedgerEntry, ProductLedgerSummary, StockPolicy, StockTransaction, TransactionType,
    ValidationError, MAX_STOCK_QUANTITY,
};

/// Repository for the append-only stock ledger.
///
/// ## Usage
/// ```rust,ignore
/// let ledger = db.ledger();
///
/// ledger.record_sale(&product.id, 3, StockPolicy::Strict).await?;
/// ledger.record_stock_in(&product.id, 24).await?;
///
/// let latest = ledger.recent(50).await?;
/// ```
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    /// Creates a new LedgerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Records a sale: appends a `Sale` row and decrements stock, atomically.
    ///
    /// ## Errors
    /// * `DbError::Domain(CoreError::Validation)` - quantity outside 1..=999
    /// * `DbError::NotFound` - unknown product; nothing written
    /// * `DbError::Domain(CoreError::InsufficientStock)` - strict policy and
    ///   not enough stock; nothing written
    /// * `DbError::Domain(CoreError::Validation)` - resulting stock would
    ///   leave `±MAX_STOCK_QUANTITY`; nothing written
    /// * unavailable store (see [`DbError::is_unavailable`]); nothing written
    pub async fn record_sale(
        &self,
        product_id: &str,
        quantity: i64,
        policy: StockPolicy,
    ) -> DbResult<StockTransaction> {
        validate_quantity(quantity).map_err(CoreError::from)?;

        self.record(product_id, TransactionType::Sale, quantity, policy)
            .await
    }

    /// Records a delivery: appends a `StockIn` row and increments stock,
    /// atomically.
    ///
    /// Same errors as [`record_sale`](Self::record_sale) minus
    /// `InsufficientStock`.
    pub async fn record_stock_in(
        &self,
        product_id: &str,
        quantity: i64,
    ) -> DbResult<StockTransaction> {
        validate_quantity(quantity).map_err(CoreError::from)?;

        self.record(
            product_id,
            TransactionType::StockIn,
            quantity,
            StockPolicy::AllowNegative,
        )
        .await
    }

    async fn record(
        &self,
        product_id: &str,
        transaction_type: TransactionType,
        quantity: i64,
        policy: StockPolicy,
    ) -> DbResult<StockTransaction> {
        let delta = transaction_type.stock_delta(quantity);
        let allow_negative = policy == StockPolicy::AllowNegative;
        let now = Utc::now();

        debug!(
            product_id = %product_id,
            transaction_type = %transaction_type,
            quantity,
            "Recording stock movement"
        );

        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE products
            SET
                stock_quantity = stock_quantity + ?1,
                updated_at = ?2
            WHERE id = ?3
              AND (stock_quantity + ?1 >= 0 OR ?4)
              AND stock_quantity + ?1 BETWEEN -?5 AND ?5
            "#,
        )
        .bind(delta)
        .bind(now)
        .bind(product_id)
        .bind(allow_negative)
        .bind(MAX_STOCK_QUANTITY)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            let current: Option<(String, i64)> =
                sqlx::query_as("SELECT name, stock_quantity FROM products WHERE id = ?1")
                    .bind(product_id)
                    .fetch_optional(&mut *tx)
                    .await?;

            tx.rollback().await?;

            return Err(match current {
                None => DbError::not_found("Product", product_id),
                Some((_, available))
                    if !(-MAX_STOCK_QUANTITY..=MAX_STOCK_QUANTITY)
                        .contains(&available.saturating_add(delta)) =>
                {
                    warn!(
                        product_id = %product_id,
                        available,
                        delta,
                        "Stock movement rejected: stock level out of range"
                    );
                    CoreError::from(ValidationError::OutOfRange {
                        field: "stock_quantity".to_string(),
                        min: -MAX_STOCK_QUANTITY,
                        max: MAX_STOCK_QUANTITY,
                    })
                    .into()
                }
                Some((product, available)) => {
                    warn!(
                        product_id = %product_id,
                        available,
                        requested = quantity,
                        "Sale rejected: insufficient stock"
                    );
                    CoreError::InsufficientStock {
                        product,
                        available,
                        requested: quantity,
                    }
                    .into()
                }
            });
        }

        let entry = StockTransaction {
            id: generate_id(),
            product_id: product_id.to_string(),
            transaction_type,
            quantity,
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO stock_transactions (
                id, product_id, transaction_type, quantity, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.product_id)
        .bind(entry.transaction_type)
        .bind(entry.quantity)
        .bind(entry.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            transaction_id = %entry.id,
            product_id = %entry.product_id,
            transaction_type = %entry.transaction_type,
            quantity,
            "Stock movement recorded"
        );

        Ok(entry)
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Newest ledger entries first, joined with the product name.
    pub async fn recent(&self, limit: u32) -> DbResult<Vec<LedgerEntry>> {
        let entries = sqlx::query_as::<_, LedgerEntry>(
            r#"
            SELECT
                t.id,
                t.product_id,
                p.name AS product_name,
                t.transaction_type,
                t.quantity,
                t.created_at
            FROM stock_transactions t
            INNER JOIN products p ON p.id = t.product_id
            ORDER BY t.created_at DESC, t.rowid DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Per-product totals of the ledger, for reports. Products without any
    /// movement are included with zero totals.
    pub async fn product_summaries(&self) -> DbResult<Vec<ProductLedgerSummary>> {
        let summaries = sqlx::query_as::<_, ProductLedgerSummary>(
            r#"
            SELECT
                p.id AS product_id,
                p.name AS product_name,
                p.price_cents,
                p.stock_quantity,
                COALESCE(SUM(CASE WHEN t.transaction_type = 'sale' THEN t.quantity END), 0)
                    AS units_sold,
                COALESCE(SUM(CASE WHEN t.transaction_type = 'stock_in' THEN t.quantity END), 0)
                    AS units_stocked_in
            FROM products p
            LEFT JOIN stock_transactions t ON t.product_id = p.id
            GROUP BY p.id
            ORDER BY p.name COLLATE NOCASE, p.barcode
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(summaries)
    }

    /// Total units sold across all products.
    pub async fn total_sold(&self) -> DbResult<i64> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(quantity), 0) FROM stock_transactions WHERE transaction_type = 'sale'",
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(total)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use stockroom_core::{Money, NewProduct, Product, MAX_PRICE_CENTS};

    async fn setup(stock: i64) -> (Database, Product) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = insert_product(&db, "5449000000996", stock).await;
        (db, product)
    }

    async fn insert_product(db: &Database, barcode: &str, stock: i64) -> Product {
        db.products()
            .insert(&NewProduct {
                name: format!("Product {barcode}"),
                barcode: barcode.to_string(),
                category: "Test".to_string(),
                price_cents: 150,
                stock_quantity: stock,
            })
            .await
            .unwrap()
    }

    async fn stock_of(db: &Database, id: &str) -> i64 {
        db.products()
            .get_by_id(id)
            .await
            .unwrap()
            .unwrap()
            .stock_quantity
    }

    async fn ledger_rows(db: &Database) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM stock_transactions")
            .fetch_one(db.pool())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_sale_decrements_stock_and_appends_row() {
        let (db, product) = setup(10).await;

        let entry = db
            .ledger()
            .record_sale(&product.id, 3, StockPolicy::Strict)
            .await
            .unwrap();

        assert_eq!(entry.product_id, product.id);
        assert_eq!(entry.transaction_type, TransactionType::Sale);
        assert_eq!(entry.quantity, 3);
        assert_eq!(stock_of(&db, &product.id).await, 7);

        let rows = db.ledger().recent(10).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, entry.id);
        assert_eq!(rows[0].transaction_type, TransactionType::Sale);
        assert_eq!(rows[0].quantity, 3);
    }

    #[tokio::test]
    async fn test_sale_of_unknown_product_changes_nothing() {
        let (db, product) = setup(10).await;

        let err = db
            .ledger()
            .record_sale("does-not-exist", 1, StockPolicy::Strict)
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::NotFound { .. }));
        assert_eq!(ledger_rows(&db).await, 0);
        assert_eq!(stock_of(&db, &product.id).await, 10);
    }

    #[tokio::test]
    async fn test_invalid_quantity_rejected_before_storage() {
        let (db, product) = setup(10).await;

        for qty in [0, -2, 1000] {
            let err = db
                .ledger()
                .record_sale(&product.id, qty, StockPolicy::Strict)
                .await
                .unwrap_err();
            assert!(
                matches!(err, DbError::Domain(CoreError::Validation(_))),
                "qty {qty} gave {err:?}"
            );
        }

        let err = db.ledger().record_stock_in(&product.id, 0).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::MustBePositive { .. }))
        ));

        assert_eq!(ledger_rows(&db).await, 0);
        assert_eq!(stock_of(&db, &product.id).await, 10);
    }

    #[tokio::test]
    async fn test_oversell_requires_override() {
        let (db, product) = setup(2).await;

        let err = db
            .ledger()
            .record_sale(&product.id, 5, StockPolicy::Strict)
            .await
            .unwrap_err();

        match err {
            DbError::Domain(CoreError::InsufficientStock {
                available,
                requested,
                ..
            }) => {
                assert_eq!(available, 2);
                assert_eq!(requested, 5);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        assert_eq!(stock_of(&db, &product.id).await, 2);
        assert_eq!(ledger_rows(&db).await, 0);

        db.ledger()
            .record_sale(&product.id, 5, StockPolicy::AllowNegative)
            .await
            .unwrap();
        assert_eq!(stock_of(&db, &product.id).await, -3);
        assert_eq!(ledger_rows(&db).await, 1);
    }

    #[tokio::test]
    async fn test_selling_exact_stock_reaches_zero() {
        let (db, product) = setup(4).await;

        db.ledger()
            .record_sale(&product.id, 4, StockPolicy::Strict)
            .await
            .unwrap();
        assert_eq!(stock_of(&db, &product.id).await, 0);
    }

    #[tokio::test]
    async fn test_stock_in_increments_even_from_negative() {
        let (db, product) = setup(1).await;

        db.ledger()
            .record_sale(&product.id, 3, StockPolicy::AllowNegative)
            .await
            .unwrap();
        let entry = db.ledger().record_stock_in(&product.id, 5).await.unwrap();

        assert_eq!(entry.transaction_type, TransactionType::StockIn);
        assert_eq!(stock_of(&db, &product.id).await, 3);

        let err = db.ledger().record_stock_in("missing", 5).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_ledger_balances_after_mixed_movements() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let a = insert_product(&db, "A-1", 20).await;
        let b = insert_product(&db, "B-1", 5).await;
        let ledger = db.ledger();

        ledger.record_sale(&a.id, 4, StockPolicy::Strict).await.unwrap();
        ledger.record_stock_in(&b.id, 10).await.unwrap();
        ledger.record_sale(&b.id, 12, StockPolicy::Strict).await.unwrap();
        ledger.record_stock_in(&a.id, 7).await.unwrap();
        ledger.record_sale(&a.id, 1, StockPolicy::Strict).await.unwrap();
        // Rejected attempt leaves no trace
        assert!(ledger.record_sale(&b.id, 9, StockPolicy::Strict).await.is_err());

        let initial = [(a.id.clone(), 20), (b.id.clone(), 5)];
        for summary in ledger.product_summaries().await.unwrap() {
            let (_, opening) = initial
                .iter()
                .find(|(id, _)| *id == summary.product_id)
                .unwrap();
            assert_eq!(
                summary.stock_quantity,
                opening + summary.units_stocked_in - summary.units_sold,
                "ledger out of balance for {}",
                summary.product_name
            );
        }

        assert_eq!(ledger.total_sold().await.unwrap(), 17);
    }

    #[tokio::test]
    async fn test_failed_ledger_insert_rolls_back_stock() {
        let (db, product) = setup(10).await;

        // Make the second write of the transaction fail
        sqlx::query(
            r#"
            CREATE TRIGGER fail_ledger_insert
            BEFORE INSERT ON stock_transactions
            BEGIN
                SELECT RAISE(ABORT, 'injected failure');
            END
            "#,
        )
        .execute(db.pool())
        .await
        .unwrap();

        let err = db
            .ledger()
            .record_sale(&product.id, 3, StockPolicy::Strict)
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::QueryFailed(_)), "got {err:?}");
        assert_eq!(stock_of(&db, &product.id).await, 10);
        assert_eq!(ledger_rows(&db).await, 0);
    }

    #[tokio::test]
    async fn test_closed_pool_reports_unavailable() {
        let (db, product) = setup(10).await;
        let ledger = db.ledger();
        db.close().await;

        let err = ledger
            .record_sale(&product.id, 1, StockPolicy::Strict)
            .await
            .unwrap_err();
        assert!(err.is_unavailable(), "got {err:?}");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sales_both_apply() {
        let dir = tempfile::tempdir().unwrap();
        let config = DbConfig::new(dir.path().join("concurrent.db")).max_connections(4);
        let db = Database::new(config).await.unwrap();
        let product = insert_product(&db, "CONC-1", 10).await;

        let first = {
            let ledger = db.ledger();
            let id = product.id.clone();
            tokio::spawn(async move { ledger.record_sale(&id, 3, StockPolicy::Strict).await })
        };
        let second = {
            let ledger = db.ledger();
            let id = product.id.clone();
            tokio::spawn(async move { ledger.record_sale(&id, 4, StockPolicy::Strict).await })
        };

        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        assert_eq!(stock_of(&db, &product.id).await, 3);
        assert_eq!(ledger_rows(&db).await, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_sales_never_oversell() {
        let dir = tempfile::tempdir().unwrap();
        let config = DbConfig::new(dir.path().join("race.db")).max_connections(4);
        let db = Database::new(config).await.unwrap();
        let product = insert_product(&db, "RACE-1", 5).await;

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let ledger = db.ledger();
                let id = product.id.clone();
                tokio::spawn(async move { ledger.record_sale(&id, 1, StockPolicy::Strict).await })
            })
            .collect();

        let mut sold = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => sold += 1,
                Err(DbError::Domain(CoreError::InsufficientStock { .. })) => {}
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        assert_eq!(sold, 5);
        assert_eq!(stock_of(&db, &product.id).await, 0);
        assert_eq!(ledger_rows(&db).await, 5);
    }

    #[tokio::test]
    async fn test_recent_is_newest_first_and_limited() {
        let (db, product) = setup(50).await;
        let ledger = db.ledger();

        for qty in 1..=4 {
            ledger
                .record_sale(&product.id, qty, StockPolicy::Strict)
                .await
                .unwrap();
        }

        let recent = ledger.recent(3).await.unwrap();
        let quantities: Vec<_> = recent.iter().map(|e| e.quantity).collect();
        assert_eq!(quantities, vec![4, 3, 2]);
        assert_eq!(recent[0].product_name, product.name);
    }

    #[tokio::test]
    async fn test_summaries_include_untouched_products() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let sold = insert_product(&db, "S-1", 10).await;
        insert_product(&db, "U-1", 10).await;

        db.ledger()
            .record_sale(&sold.id, 2, StockPolicy::Strict)
            .await
            .unwrap();

        let summaries = db.ledger().product_summaries().await.unwrap();
        assert_eq!(summaries.len(), 2);

        let s = summaries.iter().find(|s| s.product_id == sold.id).unwrap();
        assert_eq!(s.units_sold, 2);
        assert_eq!(s.revenue().cents(), 300);

        let untouched = summaries.iter().find(|s| s.product_id != sold.id).unwrap();
        assert_eq!(untouched.units_sold, 0);
        assert_eq!(untouched.units_stocked_in, 0);
    }

    #[tokio::test]
    async fn test_total_sold_ignores_stock_in() {
        let (db, product) = setup(10).await;
        assert_eq!(db.ledger().total_sold().await.unwrap(), 0);

        db.ledger().record_stock_in(&product.id, 6).await.unwrap();
        db.ledger()
            .record_sale(&product.id, 2, StockPolicy::Strict)
            .await
            .unwrap();

        assert_eq!(db.ledger().total_sold().await.unwrap(), 2);
    }

    async fn insert_priced(db: &Database, barcode: &str, price_cents: i64, stock: i64) -> Product {
        db.products()
            .insert(&NewProduct {
                name: format!("Product {barcode}"),
                barcode: barcode.to_string(),
                category: "Test".to_string(),
                price_cents,
                stock_quantity: stock,
            })
            .await
            .unwrap()
    }

    fn is_stock_out_of_range(err: &DbError) -> bool {
        matches!(
            err,
            DbError::Domain(CoreError::Validation(ValidationError::OutOfRange { field, .. }))
                if field == "stock_quantity"
        )
    }

    #[tokio::test]
    async fn test_stock_in_at_max_stock_is_rejected() {
        let (db, product) = setup(MAX_STOCK_QUANTITY).await;

        let err = db.ledger().record_stock_in(&product.id, 1).await.unwrap_err();
        assert!(is_stock_out_of_range(&err), "got {err:?}");
        assert_eq!(ledger_rows(&db).await, 0);
        assert_eq!(stock_of(&db, &product.id).await, MAX_STOCK_QUANTITY);

        // Selling from the cap still works
        db.ledger()
            .record_sale(&product.id, 999, StockPolicy::Strict)
            .await
            .unwrap();
        db.ledger().record_stock_in(&product.id, 999).await.unwrap();
        assert_eq!(stock_of(&db, &product.id).await, MAX_STOCK_QUANTITY);
    }

    #[tokio::test]
    async fn test_stock_near_i64_max_never_becomes_real() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = insert_product(&db, "OVERFLOW-1", i64::MAX).await;

        let err = db.ledger().record_stock_in(&product.id, 1).await.unwrap_err();
        assert!(is_stock_out_of_range(&err), "got {err:?}");

        // Every row still decodes as INTEGER
        let products = db.products().list().await.unwrap();
        assert_eq!(products[0].stock_quantity, i64::MAX);
        let summaries = db.ledger().product_summaries().await.unwrap();
        assert_eq!(summaries[0].stock_quantity, i64::MAX);
        assert_eq!(ledger_rows(&db).await, 0);
    }

    #[tokio::test]
    async fn test_oversell_cannot_pass_negative_bound() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let product = insert_product(&db, "NEG-1", -MAX_STOCK_QUANTITY).await;

        let err = db
            .ledger()
            .record_sale(&product.id, 1, StockPolicy::AllowNegative)
            .await
            .unwrap_err();
        assert!(is_stock_out_of_range(&err), "got {err:?}");
        assert_eq!(stock_of(&db, &product.id).await, -MAX_STOCK_QUANTITY);

        // A delivery brings it back inside the range
        db.ledger().record_stock_in(&product.id, 5).await.unwrap();
        assert_eq!(stock_of(&db, &product.id).await, -MAX_STOCK_QUANTITY + 5);
    }

    #[tokio::test]
    async fn test_revenue_at_max_price() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let capped = insert_priced(&db, "CAP-1", MAX_PRICE_CENTS, 1_000).await;
        let huge = insert_priced(&db, "HUGE-1", i64::MAX, 10).await;

        db.ledger()
            .record_sale(&capped.id, 999, StockPolicy::Strict)
            .await
            .unwrap();
        db.ledger()
            .record_sale(&huge.id, 2, StockPolicy::Strict)
            .await
            .unwrap();

        let summaries = db.ledger().product_summaries().await.unwrap();
        let at_cap = summaries.iter().find(|s| s.product_id == capped.id).unwrap();
        assert_eq!(at_cap.revenue().cents(), MAX_PRICE_CENTS * 999);

        let beyond = summaries.iter().find(|s| s.product_id == huge.id).unwrap();
        assert_eq!(beyond.revenue().cents(), i64::MAX);

        let total: Money = summaries.iter().map(|s| s.revenue()).sum();
        assert_eq!(total.cents(), i64::MAX);
    }
}
