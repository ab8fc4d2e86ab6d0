//! Product types: the stored shape, the insert shape and partial updates.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use shopdb_core::{Record, RecordId};

use crate::error::{Result, ShopError};

/// A stored product.
///
/// Fields beyond `name`, `price` and `stock` are kept in `extra` and
/// written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: RecordId,
    pub name: String,
    pub price: f64,
    pub stock: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    /// Look up an extra field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }
}

impl TryFrom<Record> for Product {
    type Error = ShopError;

    fn try_from(record: Record) -> Result<Self> {
        record.deserialize().map_err(|e| ShopError::Malformed {
            id: record.key("id").ok().flatten(),
            reason: e.to_string(),
        })
    }
}

/// A product to insert. It has no id: the engine assigns one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub price: f64,
    pub stock: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewProduct {
    pub fn new(name: impl Into<String>, price: f64, stock: u32) -> Self {
        Self {
            name: name.into(),
            price,
            stock,
            extra: Map::new(),
        }
    }

    /// Attach an extra field, kept opaquely alongside the product.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(name.into(), value.into());
        self
    }

    pub(crate) fn to_record(&self) -> Result<Record> {
        Record::from_serialize(self).map_err(|e| ShopError::InvalidProduct(e.to_string()))
    }
}

/// A partial update: only the fields set here are written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPatch {
    fields: Record,
}

impl ProductPatch {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn name(self, name: impl Into<String>) -> Self {
        self.field("name", name.into())
    }

    #[must_use]
    pub fn price(self, price: f64) -> Self {
        self.field("price", price)
    }

    #[must_use]
    pub fn stock(self, stock: u32) -> Self {
        self.field("stock", stock)
    }

    /// Set any top-level field. Nested objects replace the old value whole.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name, value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn as_record(&self) -> &Record {
        &self.fields
    }
}

impl From<Record> for ProductPatch {
    fn from(fields: Record) -> Self {
        Self { fields }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_product_record_has_no_id() {
        let record = NewProduct::new("Tablet", 600.0, 8)
            .with_field("brand", "Acme")
            .to_record()
            .unwrap();

        assert!(!record.contains("id"));
        assert_eq!(record.get("brand"), Some(&json!("Acme")));
        assert_eq!(record.get("stock"), Some(&json!(8)));
    }

    #[test]
    fn test_product_from_record_keeps_extra_fields() {
        let record = Record::from_value(json!({
            "id": 4, "name": "Tablet", "price": 600, "stock": 8, "color": "grey"
        }))
        .unwrap();

        let product = Product::try_from(record).unwrap();

        assert_eq!(product.id, RecordId(4));
        assert_eq!(product.price, 600.0);
        assert_eq!(product.field("color"), Some(&json!("grey")));
        assert!(!product.extra.contains_key("id"));
    }

    #[test]
    fn test_malformed_record() {
        let record = Record::from_value(json!({"id": 4, "name": "Tablet"})).unwrap();

        let err = Product::try_from(record).unwrap_err();
        assert!(matches!(err, ShopError::Malformed { id: Some(RecordId(4)), .. }));
    }

    #[test]
    fn test_patch_builder() {
        let patch = ProductPatch::new().price(1700.0).stock(3);

        assert_eq!(patch.as_record().len(), 2);
        assert_eq!(patch.as_record().get("stock"), Some(&json!(3)));
        assert!(ProductPatch::new().is_empty());
    }
}
