//! NDF Graph
//!
//! Polymorphic node graph built from CNL facts.
//!
//! # Core Concepts
//!
//! - [`Node`]: a named entity with one or more [`Morph`]s; one morph is active
//! - [`Morph`]: one state of a node, listing relation and attribute ids
//! - [`Relation`] / [`Attribute`]: materialized facts with deterministic ids,
//!   shared by every morph that lists them
//! - [`Registry`]: all nodes, relations and attributes of one user
//! - [`Assembler`]: folds facts into the registry, creating stub nodes on demand
//! - [`GraphComposer`]: builds the flat and morph-preserving views of a graph
//!
//! # Example
//!
//! ```rust
//! use ndf_cnl::read_document;
//! use ndf_graph::prelude::*;
//!
//! let doc = read_document("# Alice\n:::cnl\n<knows> Bob\n:::");
//! let mut registry = Registry::new();
//! let mut schema = Schema::default();
//! Assembler::new(&mut registry, &mut schema).apply_all(&doc.facts).finish();
//!
//! let views = GraphComposer::compose("friends", "", ["alice"], &registry);
//! assert_eq!(views.flat.edges.len(), 1);
//!
//! let outcome = registry.delete_node("bob").unwrap();
//! assert!(!outcome.is_deleted());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod assembler;
pub mod compose;
pub mod error;
pub mod hash;
pub mod model;
pub mod morph;
pub mod registry;
pub mod schema;

// Re-exports
pub use assembler::{suggests, Assembler, AssemblyReport};
pub use compose::{
    ComposedViews, EdgeKind, Element, FlatEdge, FlatNode, FlatView, GraphComposer,
    PolymorphicView, VALUE_NODE_PREFIX,
};
pub use error::{GraphError, GraphResult};
pub use hash::FactHash;
pub use model::{
    attribute_id, morph_id, relation_id, Attribute, MemberKind, Morph, Node, Relation,
    DEFAULT_MORPH_NAME, RELATION_ID_SEPARATOR,
};
pub use registry::{DeleteOutcome, DeletionBlocked, Materialized, Registry};
pub use schema::{AttributeType, RelationType, Schema, SchemaSuggestion};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building and composing graphs
    pub use crate::{
        Assembler, AssemblyReport, Attribute, ComposedViews, DeleteOutcome, GraphComposer,
        GraphError, GraphResult, MemberKind, Morph, Node, Registry, Relation, Schema,
    };
}
