//! Filesystem store
//!
//! One pretty-printed JSON file per record:
//!
//! ```text
//! {root}/users/{user}/{kind}/{id}.json
//! {root}/users/{user}/graphs/{graph}/{kind}/{id}.json
//! ```
//!
//! Writes go to a temporary file in the target directory which is then
//! renamed over the record, so readers never see a partial file.

use crate::error::{StoreError, StoreResult};
use crate::key::RecordKey;
use crate::store::Store;
use serde_json::Value;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Store rooted at a directory
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
    pretty: bool,
}

impl FsStore {
    /// Create store rooted at `root`; the directory is created on first write
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            pretty: true,
        }
    }

    /// Set whether records are pretty-printed
    #[must_use]
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// Root directory
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path for a key
    ///
    /// # Errors
    /// Returns [`StoreError::InvalidKey`] if a key segment is unusable.
    pub fn path_for(&self, key: &RecordKey) -> StoreResult<PathBuf> {
        key.validate()?;
        let mut path = self.root.join("users").join(&key.user);
        if let Some(graph) = &key.graph {
            path = path.join("graphs").join(graph);
        }
        Ok(path.join(key.kind.as_str()).join(format!("{}.json", key.id)))
    }

    fn encode(&self, key: &RecordKey, record: &Value) -> StoreResult<Vec<u8>> {
        let encoded = if self.pretty {
            serde_json::to_vec_pretty(record)
        } else {
            serde_json::to_vec(record)
        };
        encoded.map_err(|e| StoreError::json(key, e))
    }
}

impl Store for FsStore {
    fn load(&self, key: &RecordKey) -> StoreResult<Option<Value>> {
        let path = self.path_for(key)?;
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(path, e)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| StoreError::json(key, e))
    }

    fn save(&self, key: &RecordKey, record: &Value) -> StoreResult<()> {
        let path = self.path_for(key)?;
        let dir = path
            .parent()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;

        let bytes = self.encode(key, record)?;
        let mut file = NamedTempFile::new_in(&dir).map_err(|e| StoreError::io(&dir, e))?;
        file.write_all(&bytes)
            .and_then(|()| file.as_file().sync_all())
            .map_err(|e| StoreError::io(file.path(), e))?;
        file.persist(&path)
            .map_err(|e| StoreError::io(&path, e.error))?;

        tracing::trace!(%key, path = %path.display(), "saved record");
        Ok(())
    }

    fn remove(&self, key: &RecordKey) -> StoreResult<bool> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }
}
