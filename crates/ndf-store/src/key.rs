//! Record keys

use crate::error::{StoreError, StoreResult};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Kind of persisted record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Node record
    Node,
    /// Relation record
    Relation,
    /// Attribute record
    Attribute,
    /// Relation and attribute type schema
    Schema,
    /// Graph metadata
    Graph,
    /// Index of a user's entity ids
    Registry,
    /// Flat view
    Composed,
    /// Morph-preserving view
    PolymorphicComposed,
}

impl EntityKind {
    /// Directory name for this kind
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Node => "node",
            Self::Relation => "relation",
            Self::Attribute => "attribute",
            Self::Schema => "schema",
            Self::Graph => "graph",
            Self::Registry => "registry",
            Self::Composed => "composed",
            Self::PolymorphicComposed => "polymorphic_composed",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address of one record
///
/// User-scoped records (nodes, relations, attributes, schema, registry) have
/// no graph; graph-scoped records (graph metadata and views) do.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey {
    /// Owning user
    pub user: String,
    /// Graph, for graph-scoped records
    pub graph: Option<String>,
    /// Record kind
    pub kind: EntityKind,
    /// Record id
    pub id: String,
}

impl RecordKey {
    /// User-scoped key
    #[must_use]
    pub fn user(user: impl Into<String>, kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            graph: None,
            kind,
            id: id.into(),
        }
    }

    /// Graph-scoped key
    #[must_use]
    pub fn graph(
        user: impl Into<String>,
        graph: impl Into<String>,
        kind: EntityKind,
        id: impl Into<String>,
    ) -> Self {
        Self {
            user: user.into(),
            graph: Some(graph.into()),
            kind,
            id: id.into(),
        }
    }

    /// Check that every segment is usable as a single path component
    ///
    /// # Errors
    /// Returns [`StoreError::InvalidKey`] for empty segments, `.`/`..`, or
    /// segments containing path separators or NUL.
    pub fn validate(&self) -> StoreResult<()> {
        let segments = [Some(self.user.as_str()), self.graph.as_deref(), Some(self.id.as_str())];
        for segment in segments.into_iter().flatten() {
            if !is_valid_segment(segment) {
                return Err(StoreError::invalid_key(self, segment));
            }
        }
        Ok(())
    }
}

impl Display for RecordKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match &self.graph {
            Some(graph) => write!(f, "{}/{graph}/{}/{}", self.user, self.kind, self.id),
            None => write!(f, "{}/{}/{}", self.user, self.kind, self.id),
        }
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\', '\0'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_graph_when_scoped() {
        let key = RecordKey::graph("ann", "maths", EntityKind::Composed, "maths");
        assert_eq!(key.to_string(), "ann/maths/composed/maths");
        let key = RecordKey::user("ann", EntityKind::Node, "water");
        assert_eq!(key.to_string(), "ann/node/water");
    }

    #[test]
    fn relation_ids_are_valid_segments() {
        let key = RecordKey::user("ann", EntityKind::Relation, "a::often::likes::b::");
        assert!(key.validate().is_ok());
    }

    #[test]
    fn traversal_segments_rejected() {
        for bad in ["", ".", "..", "a/b", "a\\b"] {
            let key = RecordKey::user("ann", EntityKind::Node, bad);
            assert!(key.validate().is_err(), "{bad:?} accepted");
        }
        let key = RecordKey::graph("ann", "..", EntityKind::Graph, "g");
        assert!(key.validate().is_err());
    }
}
