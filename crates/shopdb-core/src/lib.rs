//! # shopdb core
//!
//! Pure primitives for shopdb: record keys, open records and versioned
//! collection schemas.
//!
//! This crate does no I/O. Engines in `shopdb-store` consume these types.
//!
//! ## Key Types
//!
//! - [`RecordId`] - Engine-assigned, never-reused record key
//! - [`Record`] - An open JSON object with shallow-merge updates
//! - [`CollectionSpec`] - Name, key path and key generator of a collection
//! - [`Schema`] - Target version plus ordered, idempotent [`Upgrade`]s

pub mod error;
pub mod record;
pub mod schema;
pub mod types;

pub use error::{CoreError, Result};
pub use record::Record;
pub use schema::{validate_name, CollectionSpec, Schema, Upgrade, UpgradeStep, DEFAULT_KEY_PATH};
pub use types::RecordId;
