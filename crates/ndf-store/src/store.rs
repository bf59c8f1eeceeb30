//! Persistence contract

use crate::error::{StoreError, StoreResult};
use crate::key::RecordKey;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Keyed JSON record storage
///
/// Implementations are synchronous and provide no cross-call atomicity.
pub trait Store: Send + Sync {
    /// Read a record, or `None` if absent
    ///
    /// # Errors
    /// Returns an error if the record exists but cannot be read.
    fn load(&self, key: &RecordKey) -> StoreResult<Option<Value>>;

    /// Write a record, replacing any previous one
    ///
    /// # Errors
    /// Returns an error if the record cannot be written.
    fn save(&self, key: &RecordKey, record: &Value) -> StoreResult<()>;

    /// Remove a record; returns false if it was absent
    ///
    /// # Errors
    /// Returns an error if the record exists but cannot be removed.
    fn remove(&self, key: &RecordKey) -> StoreResult<bool>;
}

/// Typed helpers over any [`Store`]
pub trait StoreExt: Store {
    /// Load and decode a record
    ///
    /// # Errors
    /// Returns [`StoreError::Json`] if the record does not decode as `T`.
    fn load_as<T: DeserializeOwned>(&self, key: &RecordKey) -> StoreResult<Option<T>> {
        self.load(key)?
            .map(|value| serde_json::from_value(value).map_err(|e| StoreError::json(key, e)))
            .transpose()
    }

    /// Encode and save a record
    ///
    /// # Errors
    /// Returns [`StoreError::Json`] if `record` cannot be encoded.
    fn save_as<T: Serialize + ?Sized>(&self, key: &RecordKey, record: &T) -> StoreResult<()> {
        let value = serde_json::to_value(record).map_err(|e| StoreError::json(key, e))?;
        self.save(key, &value)
    }
}

impl<S: Store + ?Sized> StoreExt for S {}
