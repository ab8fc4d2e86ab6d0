//! The product store: a typed facade over one engine collection.
//!
//! The engine handle is opened once and owned by the store. Every
//! operation runs as a single engine transaction and returns only after
//! that transaction has committed or failed.

use std::sync::Arc;

use serde_json::Value;
use shopdb_core::{Record, RecordId, DEFAULT_KEY_PATH};
use shopdb_store::{Engine, MemoryEngine, SqliteEngine, StoreError};

use crate::config::ShopConfig;
use crate::error::{Result, ShopError};
use crate::product::{NewProduct, Product, ProductPatch};

/// Result of an update.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    /// The product existed and now holds the merged fields.
    Updated(Product),
    /// No product has that id. Nothing was written.
    NotFound,
}

impl UpdateOutcome {
    pub fn is_updated(&self) -> bool {
        matches!(self, UpdateOutcome::Updated(_))
    }
}

/// Product record store.
///
/// Cheap to clone; clones share the engine handle.
pub struct ProductStore<E: Engine> {
    /// The engine handle, opened once.
    engine: Arc<E>,
    /// Configuration.
    config: ShopConfig,
}

impl<E: Engine> Clone for ProductStore<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            config: self.config.clone(),
        }
    }
}

impl ProductStore<SqliteEngine> {
    /// Open (or create) the SQLite database at `config.db_path()`.
    pub async fn open(config: ShopConfig) -> Result<Self> {
        let engine = SqliteEngine::open(config.db_path()).map_err(ShopError::Initialization)?;
        Self::with_engine(Arc::new(engine), config).await
    }
}

impl ProductStore<MemoryEngine> {
    /// A store backed by a fresh in-memory engine.
    pub async fn in_memory(config: ShopConfig) -> Result<Self> {
        Self::with_engine(Arc::new(MemoryEngine::new()), config).await
    }
}

impl<E: Engine> ProductStore<E> {
    /// Initialize a store on an existing engine handle.
    ///
    /// Replays pending schema upgrades, creating the product collection on
    /// first use. Calling this again on the same engine and version changes
    /// nothing and keeps every record.
    pub async fn with_engine(engine: Arc<E>, config: ShopConfig) -> Result<Self> {
        let version = engine
            .upgrade(&config.schema())
            .await
            .map_err(ShopError::Initialization)?;

        if engine
            .collection(&config.collection)
            .await
            .map_err(ShopError::Initialization)?
            .is_none()
        {
            return Err(ShopError::Initialization(StoreError::UnknownCollection(
                config.collection.clone(),
            )));
        }

        tracing::info!(
            db = %config.db_name,
            version,
            collection = %config.collection,
            "product store ready"
        );
        Ok(Self { engine, config })
    }

    /// Get the engine handle.
    pub fn engine(&self) -> &Arc<E> {
        &self.engine
    }

    /// Get the configuration.
    pub fn config(&self) -> &ShopConfig {
        &self.config
    }

    fn collection(&self) -> &str {
        &self.config.collection
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Write Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert a product and return the id the engine assigned.
    ///
    /// Returns after the insert has committed.
    pub async fn insert(&self, product: &NewProduct) -> Result<RecordId> {
        let mut record = product.to_record()?;
        if let Some(id) = record.remove(DEFAULT_KEY_PATH) {
            tracing::warn!(%id, "ignoring caller-supplied id on insert");
        }
        validate_fields(&record, true)?;

        let id = self
            .engine
            .add(self.collection(), record)
            .await
            .map_err(ShopError::Write)?;

        tracing::debug!(%id, name = %product.name, "product inserted");
        Ok(id)
    }

    /// Merge `patch` over the product with `id`.
    ///
    /// A missing id is not an error: it is logged and reported as
    /// [`UpdateOutcome::NotFound`], and nothing is written.
    pub async fn update(&self, id: RecordId, patch: &ProductPatch) -> Result<UpdateOutcome> {
        validate_fields(patch.as_record(), false)?;

        let merged = self
            .engine
            .update(self.collection(), id, patch.as_record())
            .await
            .map_err(ShopError::Write)?;

        match merged {
            Some(record) => {
                tracing::debug!(%id, fields = patch.as_record().len(), "product updated");
                Ok(UpdateOutcome::Updated(Product::try_from(record)?))
            }
            None => {
                tracing::warn!(%id, "no product found with id");
                Ok(UpdateOutcome::NotFound)
            }
        }
    }

    /// Delete the product with `id`. Deleting a missing id is a no-op.
    pub async fn delete(&self, id: RecordId) -> Result<()> {
        self.engine
            .delete(self.collection(), id)
            .await
            .map_err(ShopError::Write)?;

        tracing::debug!(%id, "product deleted");
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Read Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Every product, ascending by id.
    pub async fn fetch_all(&self) -> Result<Vec<Product>> {
        let records = self
            .engine
            .get_all(self.collection())
            .await
            .map_err(ShopError::Read)?;

        tracing::debug!(count = records.len(), "fetched all products");
        records.into_iter().map(Product::try_from).collect()
    }

    /// The product with `id`, if any.
    pub async fn get(&self, id: RecordId) -> Result<Option<Product>> {
        self.engine
            .get(self.collection(), id)
            .await
            .map_err(ShopError::Read)?
            .map(Product::try_from)
            .transpose()
    }

    /// Number of stored products.
    pub async fn count(&self) -> Result<u64> {
        self.engine
            .count(self.collection())
            .await
            .map_err(ShopError::Read)
    }
}

/// Reject records that would not decode as a `Product`.
///
/// An insert must carry all three product fields; a patch only needs the
/// fields it sets to be well typed.
fn validate_fields(record: &Record, complete: bool) -> Result<()> {
    check_field(record, "name", complete, Value::is_string, "a string")?;
    check_field(record, "price", complete, is_price, "a finite number")?;
    check_field(record, "stock", complete, is_stock, "a non-negative integer")?;
    Ok(())
}

fn check_field(
    record: &Record,
    field: &str,
    required: bool,
    ok: fn(&Value) -> bool,
    expected: &str,
) -> Result<()> {
    match record.get(field) {
        Some(value) if !ok(value) => Err(ShopError::InvalidProduct(format!(
            "{} must be {}, got {}",
            field, expected, value
        ))),
        None if required => Err(ShopError::InvalidProduct(format!("{} is missing", field))),
        _ => Ok(()),
    }
}

fn is_price(value: &Value) -> bool {
    value.as_f64().is_some_and(f64::is_finite)
}

fn is_stock(value: &Value) -> bool {
    value
        .as_u64()
        .is_some_and(|n| n <= u64::from(u32::MAX))
}
