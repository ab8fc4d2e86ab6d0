//! Open records: the unit of storage.
//!
//! A record is a flat-at-the-top JSON object. The engine only cares about
//! the field named by the collection's key path; every other field is
//! carried through untouched.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CoreError, Result};
use crate::types::RecordId;

/// A stored item: field name → JSON value, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Wrap an existing field map.
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Build a record from a JSON value, which must be an object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(CoreError::NotAnObject(kind_of(&other))),
        }
    }

    /// Build a record from anything that serializes to a JSON object.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let value =
            serde_json::to_value(value).map_err(|e| CoreError::EncodingError(e.to_string()))?;
        Self::from_value(value)
    }

    /// Decode this record into a typed value.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T> {
        T::deserialize(Value::Object(self.0.clone()))
            .map_err(|e| CoreError::EncodingError(e.to_string()))
    }

    /// Consume into a JSON value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Borrow the underlying field map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Consume into the underlying field map.
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Read the key stored under `key_path`.
    ///
    /// Returns `Ok(None)` when the field is absent. A present field must be
    /// a non-negative integer.
    pub fn key(&self, key_path: &str) -> Result<Option<RecordId>> {
        match self.0.get(key_path) {
            None => Ok(None),
            Some(Value::Number(n)) => n.as_u64().map(|raw| Some(RecordId(raw))).ok_or_else(|| {
                CoreError::InvalidKey {
                    field: key_path.to_string(),
                    reason: format!("{} is not a non-negative integer", n),
                }
            }),
            Some(other) => Err(CoreError::InvalidKey {
                field: key_path.to_string(),
                reason: format!("expected a number, got {}", kind_of(other)),
            }),
        }
    }

    /// Store `id` under `key_path`, replacing any previous key.
    pub fn set_key(&mut self, key_path: &str, id: RecordId) {
        self.0.insert(key_path.to_string(), Value::from(id.get()));
    }

    /// Shallow merge: every top-level field of `patch` replaces the field of
    /// the same name here. The key field is immutable and is skipped.
    ///
    /// Returns the names of the fields that were written.
    pub fn merge(&mut self, patch: &Record, key_path: &str) -> Vec<String> {
        let mut written = Vec::with_capacity(patch.len());
        for (field, value) in patch.iter() {
            if field == key_path {
                continue;
            }
            self.0.insert(field.clone(), value.clone());
            written.push(field.clone());
        }
        written
    }

    /// Non-mutating variant of [`Record::merge`].
    pub fn merged(&self, patch: &Record, key_path: &str) -> Record {
        let mut out = self.clone();
        out.merge(patch, key_path);
        out
    }
}

impl From<Map<String, Value>> for Record {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl TryFrom<Value> for Record {
    type Error = CoreError;

    fn try_from(value: Value) -> Result<Self> {
        Self::from_value(value)
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
