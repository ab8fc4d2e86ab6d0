//! # shopdb
//!
//! A product record store over an embedded engine.
//!
//! ## Overview
//!
//! One named, versioned database holds one `products` collection keyed by
//! an auto-incrementing `id`. The store exposes five operations, each a
//! single engine transaction:
//!
//! - **Open**: create or upgrade the database, never clearing existing data
//! - **Insert**: add a product, returning its engine-assigned id
//! - **Fetch all**: every product, ascending by id
//! - **Update**: shallow-merge fields into an existing product
//! - **Delete**: remove a product by id
//!
//! ## Usage
//!
//! ```rust,no_run
//! use shopdb::{NewProduct, ProductPatch, ProductStore, ShopConfig};
//!
//! async fn example() -> shopdb::Result<()> {
//!     let store = ProductStore::open(ShopConfig::default().data_dir("./data")).await?;
//!
//!     let id = store.insert(&NewProduct::new("Tablet", 600.0, 8)).await?;
//!     store.update(id, &ProductPatch::new().price(550.0)).await?;
//!
//!     for product in store.fetch_all().await? {
//!         println!("{} {} {}", product.id, product.name, product.price);
//!     }
//!
//!     store.delete(id).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `shopdb::core` - Record ids, records and schemas
//! - `shopdb::engine` - The engine trait and its SQLite and memory engines

pub mod catalog;
pub mod config;
pub mod error;
pub mod product;
pub mod store;

// Re-export component crates
pub use shopdb_core as core;
pub use shopdb_store as engine;

// Re-export main types for convenience
pub use catalog::sample_catalog;
pub use config::ShopConfig;
pub use error::{Result, ShopError};
pub use product::{NewProduct, Product, ProductPatch};
pub use store::{ProductStore, UpdateOutcome};

pub use shopdb_core::RecordId;
pub use shopdb_store::{Engine, MemoryEngine, SqliteEngine};
