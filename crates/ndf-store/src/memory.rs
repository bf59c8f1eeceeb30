//! In-memory store

use crate::error::StoreResult;
use crate::key::RecordKey;
use crate::store::Store;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;

/// Store backed by a locked hash map
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<RecordKey, Value>>,
}

impl MemoryStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// True if no records are held
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Keys currently held, sorted
    #[must_use]
    pub fn keys(&self) -> Vec<RecordKey> {
        let mut keys: Vec<_> = self.records.read().keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl Store for MemoryStore {
    fn load(&self, key: &RecordKey) -> StoreResult<Option<Value>> {
        key.validate()?;
        Ok(self.records.read().get(key).cloned())
    }

    fn save(&self, key: &RecordKey, record: &Value) -> StoreResult<()> {
        key.validate()?;
        self.records.write().insert(key.clone(), record.clone());
        tracing::trace!(%key, "saved record");
        Ok(())
    }

    fn remove(&self, key: &RecordKey) -> StoreResult<bool> {
        key.validate()?;
        Ok(self.records.write().remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EntityKind, StoreExt};
    use serde_json::json;

    #[test]
    fn save_load_remove() {
        let store = MemoryStore::new();
        let key = RecordKey::user("ann", EntityKind::Node, "water");

        assert_eq!(store.load(&key).unwrap(), None);
        store.save(&key, &json!({"id": "water"})).unwrap();
        assert_eq!(store.load(&key).unwrap(), Some(json!({"id": "water"})));
        assert!(store.remove(&key).unwrap());
        assert!(!store.remove(&key).unwrap());
        assert!(store.is_empty());
    }

    #[test]
    fn graph_scoped_keys_are_distinct() {
        let store = MemoryStore::new();
        store
            .save_as(&RecordKey::graph("ann", "a", EntityKind::Graph, "a"), &1)
            .unwrap();
        store
            .save_as(&RecordKey::graph("ann", "b", EntityKind::Graph, "a"), &2)
            .unwrap();

        let a: Option<i32> = store
            .load_as(&RecordKey::graph("ann", "a", EntityKind::Graph, "a"))
            .unwrap();
        assert_eq!(a, Some(1));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn typed_load_reports_bad_shape() {
        let store = MemoryStore::new();
        let key = RecordKey::user("ann", EntityKind::Schema, "schema");
        store.save(&key, &json!("not a number")).unwrap();
        assert!(store.load_as::<u32>(&key).is_err());
    }
}
