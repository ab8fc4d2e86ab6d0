//! In-memory implementation of the Engine trait.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use shopdb_core::{CollectionSpec, Record, RecordId, Schema, UpgradeStep};

use crate::error::{Result, StoreError};
use crate::keys::assign_key;
use crate::migration::check_same_spec;
use crate::traits::Engine;

/// In-memory engine.
///
/// All data is lost when the engine is dropped. A read transaction holds
/// the read half of an `RwLock`, a write transaction the write half, so
/// writes are serialized and never observed half-done.
pub struct MemoryEngine {
    inner: RwLock<MemoryEngineInner>,
}

#[derive(Clone, Default)]
struct MemoryEngineInner {
    version: u32,
    collections: BTreeMap<String, MemoryCollection>,
}

#[derive(Clone)]
struct MemoryCollection {
    spec: CollectionSpec,
    next_key: u64,
    records: BTreeMap<RecordId, Record>,
}

impl MemoryCollection {
    fn new(spec: CollectionSpec) -> Self {
        Self {
            spec,
            next_key: RecordId::FIRST.get(),
            records: BTreeMap::new(),
        }
    }
}

impl MemoryEngineInner {
    fn collection(&self, name: &str) -> Result<&MemoryCollection> {
        self.collections
            .get(name)
            .ok_or_else(|| StoreError::UnknownCollection(name.to_string()))
    }

    fn collection_mut(&mut self, name: &str) -> Result<&mut MemoryCollection> {
        self.collections
            .get_mut(name)
            .ok_or_else(|| StoreError::UnknownCollection(name.to_string()))
    }

    fn apply(&mut self, step: &UpgradeStep) -> Result<()> {
        match step {
            UpgradeStep::CreateCollection(spec) => {
                if let Some(existing) = self.collections.get(&spec.name) {
                    check_same_spec(&existing.spec, spec)?;
                    tracing::debug!(collection = %spec.name, "collection exists, skipping create");
                } else {
                    tracing::info!(collection = %spec.name, "creating collection");
                    self.collections
                        .insert(spec.name.clone(), MemoryCollection::new(spec.clone()));
                }
            }
            UpgradeStep::DeleteCollection(name) => {
                if self.collections.remove(name).is_some() {
                    tracing::info!(collection = %name, "deleted collection");
                }
            }
        }
        Ok(())
    }
}

impl MemoryEngine {
    /// Create a new empty in-memory engine at version 0.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryEngineInner::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryEngineInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryEngineInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn insert(&self, collection: &str, mut record: Record, replace: bool) -> Result<RecordId> {
        let mut inner = self.write()?;
        let coll = inner.collection_mut(collection)?;

        // Work on a copy of the generator so an aborted add leaves it alone.
        let mut next_key = coll.next_key;
        let id = assign_key(&coll.spec, &mut record, &mut next_key)?;

        if !replace && coll.records.contains_key(&id) {
            return Err(StoreError::ConstraintViolation {
                collection: collection.to_string(),
                key: id,
            });
        }

        coll.next_key = next_key;
        coll.records.insert(id, record);
        Ok(id)
    }
}

impl Default for MemoryEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Engine for MemoryEngine {
    async fn upgrade(&self, schema: &Schema) -> Result<u32> {
        schema.validate()?;
        let mut inner = self.write()?;

        if inner.version > schema.version {
            return Err(StoreError::VersionConflict {
                stored: inner.version,
                requested: schema.version,
            });
        }
        if inner.version == schema.version {
            return Ok(inner.version);
        }

        let mut next = inner.clone();
        for upgrade in schema.pending(inner.version) {
            for step in &upgrade.steps {
                next.apply(step)?;
            }
            tracing::info!(version = upgrade.version, "applied upgrade");
        }
        next.version = schema.version;
        *inner = next;

        Ok(inner.version)
    }

    async fn version(&self) -> Result<u32> {
        Ok(self.read()?.version)
    }

    async fn collection_names(&self) -> Result<Vec<String>> {
        Ok(self.read()?.collections.keys().cloned().collect())
    }

    async fn collection(&self, name: &str) -> Result<Option<CollectionSpec>> {
        Ok(self.read()?.collections.get(name).map(|c| c.spec.clone()))
    }

    async fn add(&self, collection: &str, record: Record) -> Result<RecordId> {
        self.insert(collection, record, false)
    }

    async fn put(&self, collection: &str, record: Record) -> Result<RecordId> {
        self.insert(collection, record, true)
    }

    async fn get(&self, collection: &str, id: RecordId) -> Result<Option<Record>> {
        let inner = self.read()?;
        Ok(inner.collection(collection)?.records.get(&id).cloned())
    }

    async fn get_all(&self, collection: &str) -> Result<Vec<Record>> {
        let inner = self.read()?;
        Ok(inner.collection(collection)?.records.values().cloned().collect())
    }

    async fn count(&self, collection: &str) -> Result<u64> {
        let inner = self.read()?;
        Ok(inner.collection(collection)?.records.len() as u64)
    }

    async fn update(
        &self,
        collection: &str,
        id: RecordId,
        patch: &Record,
    ) -> Result<Option<Record>> {
        let mut inner = self.write()?;
        let coll = inner.collection_mut(collection)?;
        let key_path = coll.spec.key_path.clone();

        Ok(coll.records.get_mut(&id).map(|current| {
            current.merge(patch, &key_path);
            current.clone()
        }))
    }

    async fn delete(&self, collection: &str, id: RecordId) -> Result<()> {
        let mut inner = self.write()?;
        inner.collection_mut(collection)?.records.remove(&id);
        Ok(())
    }
}
