//! Fact records produced by the parser
//!
//! Facts are immutable and consumed once by the graph assembler.

use crate::ident::NodeIdentity;
use serde::{Deserialize, Serialize};

/// A single parsed statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Fact {
    /// Node declaration (heading or `X is a Y.`)
    Node(NodeFact),
    /// Relation between two nodes
    Relation(RelationFact),
    /// Attribute value on a node
    Attribute(AttributeFact),
    /// Relation or attribute type definition
    Define(DefineFact),
}

impl Fact {
    /// Short name of the fact variant, for logging
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Node(_) => "node",
            Self::Relation(_) => "relation",
            Self::Attribute(_) => "attribute",
            Self::Define(_) => "define",
        }
    }
}

/// Declared node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeFact {
    /// Node id
    pub id: String,
    /// Display name
    pub name: String,
    /// Base name
    pub base: String,
    /// Quantifier
    pub quantifier: Option<String>,
    /// Qualifier
    pub qualifier: Option<String>,
    /// Free-text description
    pub description: Option<String>,
    /// Declared class
    pub is_a: Option<String>,
}

impl NodeFact {
    /// Node fact for a composed identity
    #[must_use]
    pub fn from_identity(identity: NodeIdentity) -> Self {
        Self {
            id: identity.id,
            name: identity.name,
            base: identity.base,
            quantifier: identity.quantifier,
            qualifier: identity.qualifier,
            description: None,
            is_a: None,
        }
    }
}

/// Relation statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationFact {
    /// Source node id
    pub subject: String,
    /// Relation type name
    pub name: String,
    /// Target node
    pub object: NodeIdentity,
    /// Adverb
    pub adverb: Option<String>,
    /// Modality
    pub modality: Option<String>,
    /// Target morph name on the source node; default morph when `None`
    pub morph: Option<String>,
}

/// Attribute statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeFact {
    /// Owning node id
    pub target: String,
    /// Attribute type name
    pub name: String,
    /// Value
    pub value: String,
    /// Unit
    pub unit: Option<String>,
    /// Adverb
    pub adverb: Option<String>,
    /// Modality
    pub modality: Option<String>,
    /// Target morph name on the owning node; default morph when `None`
    pub morph: Option<String>,
}

/// Type definition statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefineFact {
    /// Defined type name
    pub name: String,
    /// Type metadata
    pub definition: Definition,
}

impl DefineFact {
    /// Kind of definition
    #[inline]
    #[must_use]
    pub fn kind(&self) -> DefineKind {
        match self.definition {
            Definition::Attribute { .. } => DefineKind::Attribute,
            Definition::Relation { .. } => DefineKind::Relation,
        }
    }
}

/// Definition metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Definition {
    /// `define attribute '<name>' as a <type> ...`
    Attribute {
        /// Value data type
        data_type: String,
        /// Default unit
        unit: Option<String>,
        /// Classes the attribute applies to
        applicable_to: Vec<String>,
    },
    /// `define relation '<name>' with inverse '<inverse>' ...`
    Relation {
        /// Inverse relation name
        inverse: String,
        /// Domain class
        domain: Option<String>,
        /// Range class
        range: Option<String>,
    },
}

/// Kind of type definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefineKind {
    /// Attribute type
    Attribute,
    /// Relation type
    Relation,
}

impl std::fmt::Display for DefineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Attribute => f.write_str("attribute"),
            Self::Relation => f.write_str("relation"),
        }
    }
}
