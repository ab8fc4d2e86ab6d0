//! # shopdb store
//!
//! Embedded record engines for shopdb. The [`Engine`] trait is the whole
//! contract: named collections of keyed records, a per-collection key
//! generator, versioned schema upgrades, and one transaction per call.
//!
//! ## Key Types
//!
//! - [`Engine`] - The async trait for all engine operations
//! - [`SqliteEngine`] - SQLite-based persistent engine
//! - [`MemoryEngine`] - In-memory engine for tests
//! - [`TransactionMode`] - Read-only or read-write transaction scope
//!
//! ## Usage
//!
//! ```rust,no_run
//! use shopdb_core::{CollectionSpec, Record, Schema, Upgrade};
//! use shopdb_store::{Engine, SqliteEngine};
//!
//! async fn example() {
//!     let engine = SqliteEngine::open("data/shopDB.sqlite3").unwrap();
//!     let schema = Schema::new(1)
//!         .upgrade(Upgrade::new(1).create_collection(CollectionSpec::new("products")));
//!     engine.upgrade(&schema).await.unwrap();
//!
//!     let record = Record::from_value(serde_json::json!({"name": "Tablet"})).unwrap();
//!     let id = engine.add("products", record).await.unwrap();
//!     let all = engine.get_all("products").await.unwrap();
//! }
//! ```

pub mod error;
mod keys;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryEngine;
pub use sqlite::SqliteEngine;
pub use traits::{Engine, TransactionMode};
