//! Engine trait: the abstract interface of an embedded record engine.
//!
//! Every method runs as exactly one engine transaction. Implementations
//! include SQLite (primary) and in-memory (for tests).

use async_trait::async_trait;
use shopdb_core::{CollectionSpec, Record, RecordId, Schema};

use crate::error::Result;

/// Scope of an engine transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionMode {
    /// Shared; never writes.
    ReadOnly,
    /// Exclusive; commits all of its writes or none of them.
    ReadWrite,
}

/// The Engine trait: async interface for keyed record persistence.
///
/// # Design Notes
///
/// - **One call, one transaction**: a method either commits completely
///   before returning `Ok` or leaves the database untouched.
/// - **Key generator**: collections with `auto_increment` assign keys
///   starting at 1. A record that already carries an integer key keeps it
///   and pushes the generator past it. Keys are never reused.
/// - **Unknown collections** fail with `StoreError::UnknownCollection`.
#[async_trait]
pub trait Engine: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Schema Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Bring the database to `schema.version`, replaying pending upgrades.
    ///
    /// Idempotent: calling again at the same version changes nothing.
    /// Fails with `VersionConflict` when the stored version is newer.
    async fn upgrade(&self, schema: &Schema) -> Result<u32>;

    /// The stored schema version (0 for a fresh database).
    async fn version(&self) -> Result<u32>;

    /// Names of all collections, sorted.
    async fn collection_names(&self) -> Result<Vec<String>>;

    /// Spec of one collection, if it exists.
    async fn collection(&self, name: &str) -> Result<Option<CollectionSpec>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Record Operations
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert a new record. Fails with `ConstraintViolation` if its key is taken.
    async fn add(&self, collection: &str, record: Record) -> Result<RecordId>;

    /// Insert or replace a record by key.
    async fn put(&self, collection: &str, record: Record) -> Result<RecordId>;

    /// Get a record by key.
    async fn get(&self, collection: &str, id: RecordId) -> Result<Option<Record>>;

    /// Every record, ascending by key.
    async fn get_all(&self, collection: &str) -> Result<Vec<Record>>;

    /// Number of records.
    async fn count(&self, collection: &str) -> Result<u64>;

    /// Read a record, shallow-merge `patch` over it and write it back.
    ///
    /// Returns the merged record, or `None` (and writes nothing) when the
    /// key is absent. The key field itself is never changed.
    async fn update(&self, collection: &str, id: RecordId, patch: &Record)
        -> Result<Option<Record>>;

    /// Delete a record by key. Deleting an absent key is not an error.
    async fn delete(&self, collection: &str, id: RecordId) -> Result<()>;
}
