//! NDF Studio
//!
//! Service layer over the CNL parser, graph assembler and record store.
//!
//! # Core Concepts
//!
//! - [`Studio`]: one instance per store; every call takes a [`Session`]
//! - [`Session`]: the acting user and the graph being edited
//! - [`GraphRecord`]: graph metadata and the ids of the nodes it shows
//! - [`IngestReport`]: what a document changed and what it could not apply
//! - [`StudioConfig`]: data directory, JSON formatting and log filter
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use ndf_store::MemoryStore;
//! use ndf_studio::{Session, Studio, StudioConfig};
//!
//! let studio = Studio::new(StudioConfig::default(), Arc::new(MemoryStore::new()));
//! let session = Session::new("ann", "maths");
//! studio.create_graph(&session, "Collaborations").unwrap();
//!
//! let report = studio.ingest(&session, "# Emmy Noether\n:::cnl\n<worked_with> David Hilbert\n:::").unwrap();
//! assert_eq!(report.nodes, vec!["emmy_noether", "david_hilbert"]);
//!
//! let views = studio.views(&session).unwrap();
//! assert_eq!(views.flat.edges.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod error;
pub mod service;

// Re-exports
pub use config::StudioConfig;
pub use error::{StudioError, StudioResult};
pub use service::{GraphRecord, IngestReport, Session, Studio};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving a studio
    pub use crate::{GraphRecord, IngestReport, Session, Studio, StudioConfig, StudioError};
    pub use ndf_graph::{ComposedViews, DeleteOutcome, MemberKind};
    pub use ndf_store::{FsStore, MemoryStore, Store};
}
