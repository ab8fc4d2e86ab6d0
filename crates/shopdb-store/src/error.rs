//! Error types for the store module.

use shopdb_core::{CoreError, RecordId};
use thiserror::Error;

/// Errors that can occur during engine operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Record body could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The collection was never created by an upgrade.
    #[error("unknown collection: {0}")]
    UnknownCollection(String),

    /// An add hit a key that is already taken.
    #[error("constraint violation in {collection}: key {key} already exists")]
    ConstraintViolation { collection: String, key: RecordId },

    /// A record reached a collection without a key generator and without a key.
    #[error("record for {collection} has no key under {key_path:?}")]
    MissingKey { collection: String, key_path: String },

    /// Invalid data in storage.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// The database on disk is newer than the schema asking to open it.
    #[error("version conflict: stored version {stored} is newer than requested {requested}")]
    VersionConflict { stored: u32, requested: u32 },

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),

    /// A lock guarding engine state was poisoned by a panicking writer.
    #[error("engine state poisoned: {0}")]
    Poisoned(String),

    /// The blocking task running a transaction failed to complete.
    #[error("transaction task failed: {0}")]
    Task(String),

    /// Record or schema validation error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
