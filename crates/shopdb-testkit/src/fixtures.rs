//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use shopdb::{
    sample_catalog, Engine, MemoryEngine, NewProduct, ProductStore, RecordId, ShopConfig,
    SqliteEngine,
};
use tempfile::TempDir;

/// A product store plus whatever keeps its storage alive.
pub struct TestFixture<E: Engine> {
    pub store: ProductStore<E>,
    /// Holds the database directory for SQLite fixtures.
    temp_dir: Option<TempDir>,
}

impl TestFixture<MemoryEngine> {
    /// An empty store on a fresh in-memory engine.
    pub async fn memory() -> Self {
        let store = ProductStore::in_memory(ShopConfig::default())
            .await
            .expect("in-memory store opens");
        Self {
            store,
            temp_dir: None,
        }
    }
}

impl TestFixture<SqliteEngine> {
    /// An empty store on a SQLite file in a temporary directory.
    pub async fn sqlite() -> Self {
        let temp_dir = TempDir::new().expect("temp dir");
        let config = ShopConfig::new().data_dir(temp_dir.path());
        let store = ProductStore::open(config).await.expect("sqlite store opens");
        Self {
            store,
            temp_dir: Some(temp_dir),
        }
    }

    /// Open a second store on the same file, as a restarted process would.
    pub async fn reopen(&self) -> ProductStore<SqliteEngine> {
        ProductStore::open(self.store.config().clone())
            .await
            .expect("sqlite store reopens")
    }
}

impl<E: Engine> TestFixture<E> {
    /// Insert each product in order and return the assigned ids.
    pub async fn insert_all(&self, products: &[NewProduct]) -> Vec<RecordId> {
        let mut ids = Vec::with_capacity(products.len());
        for product in products {
            ids.push(self.store.insert(product).await.expect("insert"));
        }
        ids
    }

    /// Insert the nine-product sample catalog.
    pub async fn seed_catalog(&self) -> Vec<RecordId> {
        self.insert_all(&sample_catalog()).await
    }

    /// Ids currently stored, ascending.
    pub async fn ids(&self) -> Vec<RecordId> {
        self.store
            .fetch_all()
            .await
            .expect("fetch_all")
            .into_iter()
            .map(|p| p.id)
            .collect()
    }

    /// Whether this fixture is backed by a file.
    pub fn is_persistent(&self) -> bool {
        self.temp_dir.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_fixture_seeds_catalog() {
        let fixture = TestFixture::memory().await;
        let ids = fixture.seed_catalog().await;

        assert_eq!(ids, (1..=9).map(RecordId).collect::<Vec<_>>());
        assert_eq!(fixture.ids().await, ids);
        assert!(!fixture.is_persistent());
    }

    #[tokio::test]
    async fn test_sqlite_fixture_reopens() {
        let fixture = TestFixture::sqlite().await;
        fixture.seed_catalog().await;

        let reopened = fixture.reopen().await;

        assert_eq!(reopened.count().await.unwrap(), 9);
        assert!(fixture.is_persistent());
    }
}
