//! Error types for graph operations
//!
//! Hard failures only. Soft outcomes (blocked deletions, schema suggestions,
//! skipped facts) are returned as report payloads.

use crate::model::MemberKind;

/// Errors from registry, morph and composition operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Node id not present in the registry
    #[error("unknown node: {0}")]
    UnknownNode(String),

    /// Morph id not present on the node
    #[error("node '{node_id}' has no morph '{morph_id}'")]
    UnknownMorph {
        /// Owning node
        node_id: String,
        /// Missing morph
        morph_id: String,
    },

    /// Relation or attribute id not present in the registry
    #[error("unknown {kind}: {id}")]
    UnknownMember {
        /// Member kind
        kind: MemberKind,
        /// Missing id
        id: String,
    },

    /// Morph with this id already exists on the node
    #[error("node '{node_id}' already has morph '{morph_id}'")]
    MorphExists {
        /// Owning node
        node_id: String,
        /// Existing morph
        morph_id: String,
    },

    /// Morph name is empty after normalization
    #[error("invalid morph name: '{0}'")]
    InvalidMorphName(String),

    /// The default morph cannot be removed
    #[error("cannot remove default morph of node '{0}'")]
    DefaultMorph(String),
}

impl GraphError {
    /// Create unknown morph error
    #[inline]
    pub fn unknown_morph(node_id: impl Into<String>, morph_id: impl Into<String>) -> Self {
        Self::UnknownMorph {
            node_id: node_id.into(),
            morph_id: morph_id.into(),
        }
    }

    /// Create unknown member error
    #[inline]
    pub fn unknown_member(kind: MemberKind, id: impl Into<String>) -> Self {
        Self::UnknownMember {
            kind,
            id: id.into(),
        }
    }
}

/// Result type alias for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_member_display() {
        let err = GraphError::unknown_member(MemberKind::Relation, "a::::b::c::");
        assert_eq!(err.to_string(), "unknown relation: a::::b::c::");
    }

    #[test]
    fn unknown_morph_display() {
        let err = GraphError::unknown_morph("water", "gas_water");
        assert_eq!(err.to_string(), "node 'water' has no morph 'gas_water'");
    }
}
