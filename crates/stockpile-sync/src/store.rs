//! # Local Store Seam
//!
//! The repository talks to local persistence through [`LocalStore`] so it can
//! run against SQLite in production and an in-memory map in tests.

use async_trait::async_trait;

use stockpile_core::{Product, ProductId};
use stockpile_db::ProductRepository;

use crate::error::SyncResult;

/// Durable local persistence for products.
///
/// Implementations must make `upsert_many` atomic: after a failure the store
/// holds exactly what it held before the call.
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Every stored product.
    async fn list_all(&self) -> SyncResult<Vec<Product>>;

    /// Inserts or replaces every product, all or nothing.
    async fn upsert_many(&self, products: &[Product]) -> SyncResult<()>;

    /// Inserts or replaces one product and returns its canonical id.
    async fn upsert_one(&self, product: &Product) -> SyncResult<ProductId>;

    /// Looks a product up by id.
    async fn get_by_id(&self, id: ProductId) -> SyncResult<Option<Product>>;
}

#[async_trait]
impl LocalStore for ProductRepository {
    async fn list_all(&self) -> SyncResult<Vec<Product>> {
        Ok(ProductRepository::list_all(self).await?)
    }

    async fn upsert_many(&self, products: &[Product]) -> SyncResult<()> {
        Ok(ProductRepository::upsert_many(self, products).await?)
    }

    async fn upsert_one(&self, product: &Product) -> SyncResult<ProductId> {
        Ok(ProductRepository::upsert_one(self, product).await?)
    }

    async fn get_by_id(&self, id: ProductId) -> SyncResult<Option<Product>> {
        Ok(ProductRepository::get_by_id(self, id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;
    use stockpile_db::{Database, DbConfig};

    #[tokio::test]
    async fn test_sqlite_store_through_trait() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store: Box<dyn LocalStore> = Box::new(db.products());

        let id = store.upsert_one(&Product::new("Pen", 150, 10)).await.unwrap();
        store
            .upsert_many(&[Product::new("Ink", 300, 3).with_id(id + 1)])
            .await
            .unwrap();

        assert_eq!(store.list_all().await.unwrap().len(), 2);
        assert_eq!(
            store.get_by_id(id).await.unwrap(),
            Some(Product::new("Pen", 150, 10).with_id(id))
        );
    }

    #[tokio::test]
    async fn test_closed_store_reports_database_error() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = db.products();
        db.close().await;

        let err = LocalStore::list_all(&store).await.unwrap_err();
        assert!(matches!(err, SyncError::DatabaseError(_)));
    }
}
