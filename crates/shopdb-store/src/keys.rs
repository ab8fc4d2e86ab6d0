//! Key assignment shared by the engines.

use shopdb_core::{CollectionSpec, Record, RecordId};

use crate::error::{Result, StoreError};

/// Resolve the key for an incoming record.
///
/// `next_key` is the collection's generator: the key it will hand out next.
/// It is advanced when a key is generated, or when an explicit key would
/// otherwise collide with a future generated one. Callers that abort must
/// discard the advanced value.
pub(crate) fn assign_key(
    spec: &CollectionSpec,
    record: &mut Record,
    next_key: &mut u64,
) -> Result<RecordId> {
    match record.key(&spec.key_path)? {
        Some(id) => {
            if spec.auto_increment && id.get() >= *next_key {
                *next_key = id.get().saturating_add(1);
            }
            Ok(id)
        }
        None if spec.auto_increment => {
            let id = RecordId::new(*next_key);
            *next_key = next_key.saturating_add(1);
            record.set_key(&spec.key_path, id);
            Ok(id)
        }
        None => Err(StoreError::MissingKey {
            collection: spec.name.clone(),
            key_path: spec.key_path.clone(),
        }),
    }
}
