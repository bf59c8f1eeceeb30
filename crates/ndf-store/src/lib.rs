//! NDF Store
//!
//! Keyed JSON record persistence.
//!
//! # Core Concepts
//!
//! - [`RecordKey`]: `(user, graph?, kind, id)` address of one record
//! - [`Store`]: `load` / `save` / `remove` over JSON values
//! - [`MemoryStore`]: in-process map, for tests and embedding
//! - [`FsStore`]: one JSON file per record, written via temp file and rename
//!
//! # Example
//!
//! ```rust
//! use ndf_store::{EntityKind, MemoryStore, RecordKey, StoreExt};
//!
//! let store = MemoryStore::new();
//! let key = RecordKey::user("ann", EntityKind::Node, "water");
//! store.save_as(&key, &serde_json::json!({"id": "water"})).unwrap();
//! assert!(store.load_as::<serde_json::Value>(&key).unwrap().is_some());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod fs;
pub mod key;
pub mod memory;
pub mod store;

// Re-exports
pub use error::{StoreError, StoreResult};
pub use fs::FsStore;
pub use key::{EntityKind, RecordKey};
pub use memory::MemoryStore;
pub use store::{Store, StoreExt};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
