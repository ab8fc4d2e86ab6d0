//! Error types for the product store.

use shopdb_core::RecordId;
use shopdb_store::StoreError;
use thiserror::Error;

/// Errors that can occur during product store operations.
///
/// Engine failures are classified by the operation that hit them, so a
/// caller can tell "could not open" from "could not write" without
/// inspecting the engine error underneath.
#[derive(Debug, Error)]
pub enum ShopError {
    /// The database could not be opened or upgraded.
    #[error("database initialization failed: {0}")]
    Initialization(#[source] StoreError),

    /// A write transaction (insert, update, delete) aborted.
    #[error("write failed: {0}")]
    Write(#[source] StoreError),

    /// A read transaction aborted.
    #[error("read failed: {0}")]
    Read(#[source] StoreError),

    /// A stored record is not a valid product.
    #[error("malformed product record {id:?}: {reason}")]
    Malformed { id: Option<RecordId>, reason: String },

    /// The product could not be turned into a record.
    #[error("invalid product: {0}")]
    InvalidProduct(String),
}

impl ShopError {
    /// The engine error underneath, if any.
    pub fn store_error(&self) -> Option<&StoreError> {
        match self {
            ShopError::Initialization(e) | ShopError::Write(e) | ShopError::Read(e) => Some(e),
            ShopError::Malformed { .. } | ShopError::InvalidProduct(_) => None,
        }
    }
}

/// Result type for product store operations.
pub type Result<T> = std::result::Result<T, ShopError>;
