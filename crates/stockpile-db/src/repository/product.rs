//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Upsert Semantics
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    How a Product Is Written                             │
//! │                                                                         │
//! │  id = Some(n)  ──► INSERT ... ON CONFLICT(id) DO UPDATE                 │
//! │                    row n is replaced as a whole (all fields or none)    │
//! │                                                                         │
//! │  id = None     ──► INSERT, SQLite assigns the next id                   │
//! │                                                                         │
//! │  Both paths: RETURNING id ──► caller learns the canonical id            │
//! │                                                                         │
//! │  upsert_many wraps every row in ONE transaction:                        │
//! │  a failure half-way leaves the table exactly as it was.                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rows that exist locally but are absent from a batch are left alone.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use stockpile_core::{Product, ProductId};

const SELECT_COLUMNS: &str = "SELECT id, name, price_cents, quantity FROM products";

const UPSERT_SQL: &str = r#"
    INSERT INTO products (id, name, price_cents, quantity)
    VALUES (?1, ?2, ?3, ?4)
    ON CONFLICT(id) DO UPDATE SET
        name = excluded.name,
        price_cents = excluded.price_cents,
        quantity = excluded.quantity
    RETURNING id
"#;

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let id = repo.upsert_one(&Product::new("Pen", 150, 10)).await?;
/// let pen = repo.get_by_id(id).await?;
/// let all = repo.list_all().await?;
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

    /// Lists every product ordered by id.
    pub async fn list_all(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!("{SELECT_COLUMNS} ORDER BY id"))
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Listed products");
        Ok(products)
    }

    /// Gets a product by its id.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: ProductId) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!("{SELECT_COLUMNS} WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Like [`get_by_id`](Self::get_by_id) but a missing row is an error.
    pub async fn require(&self, id: ProductId) -> DbResult<Product> {
        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Inserts or replaces one product and returns its id.
    ///
    /// A product without an id is inserted and receives a fresh id.
    pub async fn upsert_one(&self, product: &Product) -> DbResult<ProductId> {
        debug!(id = ?product.id, name = %product.name, "Upserting product");

        let id: ProductId = sqlx::query_scalar(UPSERT_SQL)
            .bind(product.id)
            .bind(&product.name)
            .bind(product.price_cents)
            .bind(product.quantity)
            .fetch_one(&self.pool)
            .await?;

        Ok(id)
    }

    /// Inserts or replaces every product in a single transaction.
    pub async fn upsert_many(&self, products: &[Product]) -> DbResult<()> {
        debug!(count = products.len(), "Upserting product batch");

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        for product in products {
            sqlx::query_scalar::<_, ProductId>(UPSERT_SQL)
                .bind(product.id)
                .bind(&product.name)
                .bind(product.price_cents)
                .bind(product.quantity)
                .fetch_one(&mut *tx)
                .await?;
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(())
    }

    /// Counts stored products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
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
    use crate::{Database, DbConfig};

    async fn repo() -> ProductRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().products()
    }

    #[tokio::test]
    async fn test_upsert_assigns_id_when_absent() {
        let repo = repo().await;

        let first = repo.upsert_one(&Product::new("Pen", 150, 10)).await.unwrap();
        let second = repo.upsert_one(&Product::new("Ink", 300, 3)).await.unwrap();

        assert_ne!(first, second);
        let pen = repo.require(first).await.unwrap();
        assert_eq!(pen, Product::new("Pen", 150, 10).with_id(first));
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_row() {
        let repo = repo().await;
        let id = repo.upsert_one(&Product::new("Pen", 150, 10)).await.unwrap();

        let returned = repo
            .upsert_one(&Product::new("Blue Pen", 175, 7).with_id(id))
            .await
            .unwrap();

        assert_eq!(returned, id);
        assert_eq!(repo.count().await.unwrap(), 1);
        assert_eq!(
            repo.require(id).await.unwrap(),
            Product::new("Blue Pen", 175, 7).with_id(id)
        );
    }

    #[tokio::test]
    async fn test_upsert_keeps_remote_assigned_id() {
        let repo = repo().await;

        let id = repo
            .upsert_one(&Product::new("Stapler", 900, 2).with_id(40))
            .await
            .unwrap();

        assert_eq!(id, 40);
    }

    #[tokio::test]
    async fn test_upsert_many_merges_and_keeps_local_only_rows() {
        let repo = repo().await;
        repo.upsert_one(&Product::new("Pen", 150, 10).with_id(1)).await.unwrap();
        repo.upsert_one(&Product::new("Tape", 80, 5).with_id(9)).await.unwrap();

        repo.upsert_many(&[
            Product::new("Pen", 150, 7).with_id(1),
            Product::new("Ink", 300, 3).with_id(2),
        ])
        .await
        .unwrap();

        let all = repo.list_all().await.unwrap();
        assert_eq!(
            all,
            vec![
                Product::new("Pen", 150, 7).with_id(1),
                Product::new("Ink", 300, 3).with_id(2),
                Product::new("Tape", 80, 5).with_id(9),
            ]
        );
    }

    #[tokio::test]
    async fn test_upsert_many_rolls_back_on_row_failure() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.products();
        repo.upsert_one(&Product::new("Pen", 150, 10).with_id(1)).await.unwrap();

        sqlx::query(
            "CREATE TRIGGER reject_boom BEFORE INSERT ON products \
             WHEN NEW.name = 'Boom' BEGIN SELECT RAISE(ABORT, 'boom'); END",
        )
        .execute(db.pool())
        .await
        .unwrap();

        let result = repo
            .upsert_many(&[
                Product::new("Pen", 150, 7).with_id(1),
                Product::new("Ink", 300, 3).with_id(2),
                Product::new("Boom", 1, 1).with_id(3),
            ])
            .await;

        assert!(matches!(result, Err(DbError::QueryFailed(ref msg)) if msg.contains("boom")));
        assert_eq!(
            repo.list_all().await.unwrap(),
            vec![Product::new("Pen", 150, 10).with_id(1)]
        );
    }

    #[tokio::test]
    async fn test_get_missing_product() {
        let repo = repo().await;

        assert!(repo.get_by_id(404).await.unwrap().is_none());
        assert!(matches!(
            repo.require(404).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_all_empty() {
        let repo = repo().await;
        assert!(repo.list_all().await.unwrap().is_empty());
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
