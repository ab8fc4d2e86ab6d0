//! SQLite implementation of the Engine trait.
//!
//! This is the primary storage engine for shopdb. It uses rusqlite with
//! bundled SQLite, wrapped in async via tokio::spawn_blocking.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use shopdb_core::{CollectionSpec, Record, RecordId, Schema};

use crate::error::{Result, StoreError};
use crate::keys::assign_key;
use crate::migration;
use crate::traits::{Engine, TransactionMode};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-based engine.
///
/// Thread-safe via an internal Mutex around the single connection. Every
/// trait method runs one SQLite transaction on the blocking pool.
#[derive(Clone)]
pub struct SqliteEngine {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
    /// Backing file, `None` for in-memory databases.
    path: Option<PathBuf>,
}

impl SqliteEngine {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file (and its parent directory) if it doesn't exist.
    /// The schema is left at whatever version is stored; call
    /// [`Engine::upgrade`] to bring it forward.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        tracing::trace!(journal_mode = %mode, "journal mode set");
        migration::bootstrap(&conn)?;

        tracing::debug!(path = %path.display(), "opened sqlite engine");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        migration::bootstrap(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            path: None,
        })
    }

    /// Path of the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Run `f` inside one SQLite transaction on the blocking pool.
    ///
    /// Commits when `f` returns `Ok`; the transaction is rolled back when it
    /// is dropped on the error path.
    async fn transact<F, T>(&self, mode: TransactionMode, f: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = conn
                .lock()
                .map_err(|e| StoreError::Poisoned(format!("mutex poisoned: {}", e)))?;

            let behavior = match mode {
                TransactionMode::ReadOnly => TransactionBehavior::Deferred,
                TransactionMode::ReadWrite => TransactionBehavior::Immediate,
            };
            let tx = conn.transaction_with_behavior(behavior)?;
            let out = f(&tx)?;
            tx.commit()?;
            Ok(out)
        })
        .await
        .map_err(|e| StoreError::Task(format!("spawn_blocking failed: {}", e)))?
    }

    async fn insert(&self, collection: &str, record: Record, replace: bool) -> Result<RecordId> {
        let collection = collection.to_string();

        self.transact(TransactionMode::ReadWrite, move |tx| {
            let mut record = record;
            let row = migration::load_collection(tx, &collection)?;

            let mut next_key = row.next_key;
            let id = assign_key(&row.spec, &mut record, &mut next_key)?;
            let key = sql_key(id)?;
            let body = encode_body(&record)?;

            if replace {
                tx.execute(
                    "INSERT OR REPLACE INTO records (collection, id, body) VALUES (?1, ?2, ?3)",
                    params![collection, key, body],
                )?;
            } else {
                let taken: Option<i64> = tx
                    .query_row(
                        "SELECT id FROM records WHERE collection = ?1 AND id = ?2",
                        params![collection, key],
                        |row| row.get(0),
                    )
                    .optional()?;
                if taken.is_some() {
                    return Err(StoreError::ConstraintViolation {
                        collection,
                        key: id,
                    });
                }
                tx.execute(
                    "INSERT INTO records (collection, id, body) VALUES (?1, ?2, ?3)",
                    params![collection, key, body],
                )?;
            }

            if next_key != row.next_key {
                tx.execute(
                    "UPDATE collections SET next_key = ?1 WHERE name = ?2",
                    params![sql_generator(next_key), collection],
                )?;
            }

            Ok(id)
        })
        .await
    }
}

/// Convert a key for SQLite, which stores signed 64-bit integers.
fn sql_key(id: RecordId) -> Result<i64> {
    i64::try_from(id.get())
        .map_err(|_| StoreError::InvalidData(format!("key {} exceeds the storable range", id)))
}

/// Generator values saturate at the storable maximum.
fn sql_generator(next_key: u64) -> i64 {
    i64::try_from(next_key).unwrap_or(i64::MAX)
}

fn encode_body(record: &Record) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(record, &mut buf)
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
    Ok(buf)
}

fn decode_body(bytes: &[u8]) -> Result<Record> {
    ciborium::from_reader(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn read_record(tx: &Transaction<'_>, collection: &str, key: i64) -> Result<Option<Record>> {
    let body: Option<Vec<u8>> = tx
        .query_row(
            "SELECT body FROM records WHERE collection = ?1 AND id = ?2",
            params![collection, key],
            |row| row.get(0),
        )
        .optional()?;
    body.map(|b| decode_body(&b)).transpose()
}

#[async_trait]
impl Engine for SqliteEngine {
    async fn upgrade(&self, schema: &Schema) -> Result<u32> {
        let schema = schema.clone();
        self.transact(TransactionMode::ReadWrite, move |tx| {
            migration::migrate(tx, &schema)
        })
        .await
    }

    async fn version(&self) -> Result<u32> {
        self.transact(TransactionMode::ReadOnly, |tx| migration::stored_version(tx))
            .await
    }

    async fn collection_names(&self) -> Result<Vec<String>> {
        self.transact(TransactionMode::ReadOnly, |tx| {
            let mut stmt = tx.prepare("SELECT name FROM collections ORDER BY name")?;
            let names = stmt
                .query_map([], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<String>>>()?;
            Ok(names)
        })
        .await
    }

    async fn collection(&self, name: &str) -> Result<Option<CollectionSpec>> {
        let name = name.to_string();
        self.transact(TransactionMode::ReadOnly, move |tx| {
            Ok(migration::find_collection(tx, &name)?.map(|row| row.spec))
        })
        .await
    }

    async fn add(&self, collection: &str, record: Record) -> Result<RecordId> {
        self.insert(collection, record, false).await
    }

    async fn put(&self, collection: &str, record: Record) -> Result<RecordId> {
        self.insert(collection, record, true).await
    }

    async fn get(&self, collection: &str, id: RecordId) -> Result<Option<Record>> {
        let collection = collection.to_string();
        self.transact(TransactionMode::ReadOnly, move |tx| {
            migration::load_collection(tx, &collection)?;
            read_record(tx, &collection, sql_key(id)?)
        })
        .await
    }

    async fn get_all(&self, collection: &str) -> Result<Vec<Record>> {
        let collection = collection.to_string();
        self.transact(TransactionMode::ReadOnly, move |tx| {
            migration::load_collection(tx, &collection)?;

            let mut stmt =
                tx.prepare("SELECT body FROM records WHERE collection = ?1 ORDER BY id")?;
            let bodies = stmt
                .query_map(params![collection], |row| row.get::<_, Vec<u8>>(0))?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            bodies.iter().map(|b| decode_body(b)).collect()
        })
        .await
    }

    async fn count(&self, collection: &str) -> Result<u64> {
        let collection = collection.to_string();
        self.transact(TransactionMode::ReadOnly, move |tx| {
            migration::load_collection(tx, &collection)?;
            let count: i64 = tx.query_row(
                "SELECT COUNT(*) FROM records WHERE collection = ?1",
                params![collection],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
        .await
    }

    async fn update(
        &self,
        collection: &str,
        id: RecordId,
        patch: &Record,
    ) -> Result<Option<Record>> {
        let collection = collection.to_string();
        let patch = patch.clone();

        self.transact(TransactionMode::ReadWrite, move |tx| {
            let row = migration::load_collection(tx, &collection)?;
            let key = sql_key(id)?;

            let Some(mut current) = read_record(tx, &collection, key)? else {
                return Ok(None);
            };
            current.merge(&patch, &row.spec.key_path);

            tx.execute(
                "UPDATE records SET body = ?1 WHERE collection = ?2 AND id = ?3",
                params![encode_body(&current)?, collection, key],
            )?;
            Ok(Some(current))
        })
        .await
    }

    async fn delete(&self, collection: &str, id: RecordId) -> Result<()> {
        let collection = collection.to_string();
        self.transact(TransactionMode::ReadWrite, move |tx| {
            migration::load_collection(tx, &collection)?;
            tx.execute(
                "DELETE FROM records WHERE collection = ?1 AND id = ?2",
                params![collection, sql_key(id)?],
            )?;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use shopdb_core::Upgrade;
    use tempfile::TempDir;

    fn products_v1() -> Schema {
        Schema::new(1).upgrade(Upgrade::new(1).create_collection(CollectionSpec::new("products")))
    }

    fn record(value: serde_json::Value) -> Record {
        Record::from_value(value).unwrap()
    }

    async fn engine() -> SqliteEngine {
        let engine = SqliteEngine::open_memory().unwrap();
        engine.upgrade(&products_v1()).await.unwrap();
        engine
    }

    #[tokio::test]
    async fn test_add_and_get_record() {
        let engine = engine().await;

        let id = engine
            .add("products", record(json!({"name": "Tablet", "price": 600, "stock": 8})))
            .await
            .unwrap();
        assert_eq!(id, RecordId(1));

        let got = engine.get("products", id).await.unwrap().unwrap();
        assert_eq!(got.get("name"), Some(&json!("Tablet")));
        assert_eq!(got.key("id").unwrap(), Some(id));
    }

    #[tokio::test]
    async fn test_body_preserves_extra_fields() {
        let engine = engine().await;
        let id = engine
            .add(
                "products",
                record(json!({"name": "Camera", "price": 1199.5, "tags": ["photo"], "meta": {"sku": "C-1"}})),
            )
            .await
            .unwrap();

        let got = engine.get("products", id).await.unwrap().unwrap();
        assert_eq!(got.get("price"), Some(&json!(1199.5)));
        assert_eq!(got.get("tags"), Some(&json!(["photo"])));
        assert_eq!(got.get("meta"), Some(&json!({"sku": "C-1"})));
    }

    #[tokio::test]
    async fn test_get_all_is_key_ordered() {
        let engine = engine().await;
        engine.add("products", record(json!({"id": 7}))).await.unwrap();
        engine.add("products", record(json!({"id": 3}))).await.unwrap();
        engine.add("products", record(json!({}))).await.unwrap();

        let keys: Vec<_> = engine
            .get_all("products")
            .await
            .unwrap()
            .iter()
            .map(|r| r.key("id").unwrap().unwrap().get())
            .collect();
        assert_eq!(keys, vec![3, 7, 8]);
    }

    #[tokio::test]
    async fn test_failed_add_rolls_back_generator() {
        let engine = engine().await;
        engine.add("products", record(json!({}))).await.unwrap();

        let err = engine
            .add("products", record(json!({"id": 1})))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation { .. }));

        assert_eq!(engine.add("products", record(json!({}))).await.unwrap(), RecordId(2));
    }

    #[tokio::test]
    async fn test_update_missing_writes_nothing() {
        let engine = engine().await;
        engine.add("products", record(json!({"name": "A"}))).await.unwrap();

        let out = engine
            .update("products", RecordId(9), &record(json!({"name": "B"})))
            .await
            .unwrap();

        assert!(out.is_none());
        assert_eq!(engine.count("products").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_absent_is_noop() {
        let engine = engine().await;
        engine.add("products", record(json!({"name": "A"}))).await.unwrap();

        engine.delete("products", RecordId(99)).await.unwrap();
        assert_eq!(engine.count("products").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_reopen_file_keeps_records_and_version() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("shopDB.sqlite3");

        {
            let engine = SqliteEngine::open(&path).unwrap();
            engine.upgrade(&products_v1()).await.unwrap();
            engine.add("products", record(json!({"name": "A"}))).await.unwrap();
        }

        let engine = SqliteEngine::open(&path).unwrap();
        assert_eq!(engine.version().await.unwrap(), 1);
        engine.upgrade(&products_v1()).await.unwrap();

        assert_eq!(engine.count("products").await.unwrap(), 1);
        assert_eq!(engine.add("products", record(json!({}))).await.unwrap(), RecordId(2));
        assert_eq!(engine.path(), Some(path.as_path()));
    }

    #[tokio::test]
    async fn test_unknown_collection() {
        let engine = engine().await;
        assert!(matches!(
            engine.count("orders").await,
            Err(StoreError::UnknownCollection(name)) if name == "orders"
        ));
        assert_eq!(engine.collection("orders").await.unwrap(), None);
    }
}
