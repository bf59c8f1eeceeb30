//! Error types for record persistence

use crate::key::RecordKey;
use std::path::PathBuf;

/// Errors from a [`Store`](crate::Store) implementation
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Filesystem failure
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Record could not be encoded or decoded
    #[error("invalid JSON for record {key}: {source}")]
    Json {
        /// Record key
        key: String,
        /// Underlying error
        #[source]
        source: serde_json::Error,
    },

    /// Key segment cannot be used as a path component
    #[error("invalid key {key}: bad segment '{segment}'")]
    InvalidKey {
        /// Record key
        key: String,
        /// Rejected segment
        segment: String,
    },
}

impl StoreError {
    /// Create I/O error
    #[inline]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create JSON error
    #[inline]
    pub fn json(key: &RecordKey, source: serde_json::Error) -> Self {
        Self::Json {
            key: key.to_string(),
            source,
        }
    }

    /// Create invalid key error
    #[inline]
    pub fn invalid_key(key: &RecordKey, segment: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.to_string(),
            segment: segment.into(),
        }
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
