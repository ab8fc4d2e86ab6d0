//! Configuration for the product store.

use std::path::PathBuf;

use shopdb_core::{CollectionSpec, Schema, Upgrade};

/// Configuration for opening a product store.
#[derive(Debug, Clone)]
pub struct ShopConfig {
    /// Database name; the SQLite file is `{data_dir}/{db_name}.sqlite3`.
    pub db_name: String,
    /// Schema version to open at.
    pub version: u32,
    /// Collection holding the products.
    pub collection: String,
    /// Directory for database files.
    pub data_dir: PathBuf,
}

impl Default for ShopConfig {
    fn default() -> Self {
        Self {
            db_name: "shopDB".to_string(),
            version: 1,
            collection: "products".to_string(),
            data_dir: PathBuf::from("./shopdb_data"),
        }
    }
}

impl ShopConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn db_name(mut self, name: impl Into<String>) -> Self {
        self.db_name = name.into();
        self
    }

    #[must_use]
    pub const fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    #[must_use]
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.collection = name.into();
        self
    }

    #[must_use]
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Path of the SQLite file for this database.
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(format!("{}.sqlite3", self.db_name))
    }

    /// The product schema at the configured version.
    ///
    /// Version 1 creates the product collection, keyed by an
    /// auto-incrementing `id`. Later versions only re-assert it; the create
    /// step is a no-op when the collection already exists.
    pub fn schema(&self) -> Schema {
        let products = CollectionSpec::new(self.collection.clone());
        let mut schema = Schema::new(self.version);
        if self.version >= 1 {
            schema = schema.upgrade(Upgrade::new(1).create_collection(products.clone()));
        }
        if self.version > 1 {
            schema = schema.upgrade(Upgrade::new(self.version).create_collection(products));
        }
        schema
    }
}
