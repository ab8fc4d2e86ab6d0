//! Schema migrations for the SQLite engine.
//!
//! Two fixed tables hold every collection: `collections` describes each one
//! (key path, generator state) and `records` holds the CBOR-encoded bodies.
//! The user-visible schema version lives in SQLite's `user_version` header
//! field, so it commits or rolls back with the upgrade transaction.

use rusqlite::{params, Connection, OptionalExtension};
use shopdb_core::{CollectionSpec, Schema, UpgradeStep};

use crate::error::{Result, StoreError};

/// Create the fixed tables if they do not exist yet.
///
/// This function is idempotent - it can be called multiple times safely.
pub fn bootstrap(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- One row per collection created by an upgrade
        CREATE TABLE IF NOT EXISTS collections (
            name TEXT PRIMARY KEY,
            key_path TEXT NOT NULL,
            auto_increment INTEGER NOT NULL,   -- 0 or 1
            next_key INTEGER NOT NULL DEFAULT 1 -- next generated key, never decreases
        );

        -- Record bodies, keyed per collection
        CREATE TABLE IF NOT EXISTS records (
            collection TEXT NOT NULL,
            id INTEGER NOT NULL,
            body BLOB NOT NULL,                -- CBOR-encoded field map
            PRIMARY KEY (collection, id)
        ) WITHOUT ROWID;
        "#,
    )?;
    Ok(())
}

/// Read the stored schema version (0 for a fresh database).
pub fn stored_version(conn: &Connection) -> Result<u32> {
    let version: i64 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    u32::try_from(version)
        .map_err(|_| StoreError::InvalidData(format!("user_version out of range: {}", version)))
}

/// Bring the database to `schema.version`.
///
/// Must run inside a write transaction: on error nothing is applied.
pub fn migrate(conn: &Connection, schema: &Schema) -> Result<u32> {
    schema.validate()?;
    let stored = stored_version(conn)?;

    if stored > schema.version {
        return Err(StoreError::VersionConflict {
            stored,
            requested: schema.version,
        });
    }
    if stored == schema.version {
        return Ok(stored);
    }

    for upgrade in schema.pending(stored) {
        for step in &upgrade.steps {
            apply_step(conn, step)?;
        }
        tracing::info!(version = upgrade.version, "applied upgrade");
    }

    conn.pragma_update(None, "user_version", schema.version)?;
    Ok(schema.version)
}

/// Apply one upgrade step.
fn apply_step(conn: &Connection, step: &UpgradeStep) -> Result<()> {
    match step {
        UpgradeStep::CreateCollection(spec) => {
            let created = conn.execute(
                "INSERT OR IGNORE INTO collections (name, key_path, auto_increment, next_key)
                 VALUES (?1, ?2, ?3, 1)",
                params![spec.name, spec.key_path, spec.auto_increment],
            )?;
            if created == 0 {
                let existing = load_collection(conn, &spec.name)?;
                check_same_spec(&existing.spec, spec)?;
                tracing::debug!(collection = %spec.name, "collection exists, skipping create");
            } else {
                tracing::info!(collection = %spec.name, "creating collection");
            }
        }
        UpgradeStep::DeleteCollection(name) => {
            conn.execute("DELETE FROM records WHERE collection = ?1", params![name])?;
            let removed = conn.execute("DELETE FROM collections WHERE name = ?1", params![name])?;
            if removed > 0 {
                tracing::info!(collection = %name, "deleted collection");
            }
        }
    }
    Ok(())
}

/// An upgrade may re-assert a collection, but not redefine it.
pub(crate) fn check_same_spec(
    existing: &CollectionSpec,
    requested: &CollectionSpec,
) -> Result<()> {
    if existing.key_path != requested.key_path
        || existing.auto_increment != requested.auto_increment
    {
        return Err(StoreError::Migration(format!(
            "collection {} exists with key path {:?} (auto_increment {}), \
             upgrade asks for {:?} (auto_increment {})",
            existing.name,
            existing.key_path,
            existing.auto_increment,
            requested.key_path,
            requested.auto_increment
        )));
    }
    Ok(())
}

/// A collection row: its spec plus generator state.
#[derive(Debug, Clone)]
pub(crate) struct CollectionRow {
    pub spec: CollectionSpec,
    pub next_key: u64,
}

/// Look up a collection, failing with `UnknownCollection` if absent.
pub(crate) fn load_collection(conn: &Connection, name: &str) -> Result<CollectionRow> {
    find_collection(conn, name)?.ok_or_else(|| StoreError::UnknownCollection(name.to_string()))
}

pub(crate) fn find_collection(conn: &Connection, name: &str) -> Result<Option<CollectionRow>> {
    let row = conn
        .query_row(
            "SELECT key_path, auto_increment, next_key FROM collections WHERE name = ?1",
            params![name],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, bool>(1)?,
                    row.get::<_, i64>(2)?,
                ))
            },
        )
        .optional()?;

    row.map(|(key_path, auto_increment, next_key)| {
        let next_key = u64::try_from(next_key).map_err(|_| {
            StoreError::InvalidData(format!("negative key generator for {}", name))
        })?;
        Ok(CollectionRow {
            spec: CollectionSpec {
                name: name.to_string(),
                key_path,
                auto_increment,
            },
            next_key,
        })
    })
    .transpose()
}
