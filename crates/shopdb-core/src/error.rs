//! Error types for shopdb core.

use thiserror::Error;

/// Errors raised while building or inspecting records and schemas.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid collection name: {0:?}")]
    InvalidCollectionName(String),

    #[error("invalid key path: {0:?}")]
    InvalidKeyPath(String),

    #[error("schema version must be at least 1")]
    ZeroVersion,

    #[error("upgrades out of order: version {current} follows {previous}")]
    UnorderedUpgrades { previous: u32, current: u32 },

    #[error("upgrade to version {upgrade} exceeds schema version {schema}")]
    UpgradeBeyondSchema { upgrade: u32, schema: u32 },

    #[error("field {field:?} is not a valid key: {reason}")]
    InvalidKey { field: String, reason: String },

    #[error("record must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("encoding error: {0}")]
    EncodingError(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
