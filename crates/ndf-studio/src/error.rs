//! Error types for studio operations
//!
//! Wraps the lower layers. Soft outcomes (parse diagnostics, schema
//! suggestions, blocked deletions) are report payloads, never errors.

use ndf_graph::GraphError;
use ndf_store::StoreError;

/// Errors from [`Studio`](crate::Studio) operations
#[derive(Debug, thiserror::Error)]
pub enum StudioError {
    /// Graph operation failed
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Persistence failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Graph has not been created for this user
    #[error("graph '{graph}' not found for user '{user}'")]
    GraphNotFound {
        /// User
        user: String,
        /// Graph id
        graph: String,
    },

    /// Invalid configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Stored record does not match the expected shape
    #[error("corrupt record {key}: {reason}")]
    CorruptRecord {
        /// Record key
        key: String,
        /// What was wrong
        reason: String,
    },
}

impl StudioError {
    /// Create graph not found error
    #[inline]
    pub fn graph_not_found(user: impl Into<String>, graph: impl Into<String>) -> Self {
        Self::GraphNotFound {
            user: user.into(),
            graph: graph.into(),
        }
    }

    /// Create configuration error
    #[inline]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create corrupt record error
    #[inline]
    pub fn corrupt(key: impl ToString, reason: impl Into<String>) -> Self {
        Self::CorruptRecord {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for studio operations
pub type StudioResult<T> = Result<T, StudioError>;
