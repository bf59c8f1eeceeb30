//! Graph data model
//!
//! Nodes own an ordered list of morphs. A morph lists the relation and
//! attribute ids that make up one state of its node. Relations and
//! attributes live in the registry and record which morphs list them.
//!
//! # Identifiers
//!
//! | Entity    | Id                                                 |
//! |-----------|----------------------------------------------------|
//! | Morph     | `{name}_{node_id}`, or `{node_id}` for the default |
//! | Relation  | `{source}::{adverb}::{name}::{target}::{modality}` |
//! | Attribute | `{source}::{name}::{hash of all fields}`           |

use crate::error::{GraphError, GraphResult};
use crate::hash::FactHash;
use indexmap::IndexSet;
use ndf_cnl::normalize_id;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Name of the morph every node starts with
pub const DEFAULT_MORPH_NAME: &str = "basic";

/// Separator between relation id segments
pub const RELATION_ID_SEPARATOR: &str = "::";

/// Derive a morph id from its (unnormalized) name
///
/// # Errors
/// Returns [`GraphError::InvalidMorphName`] if the name normalizes to nothing.
pub fn morph_id(name: &str, node_id: &str) -> GraphResult<String> {
    let normalized = normalize_id(name);
    if normalized.is_empty() {
        return Err(GraphError::InvalidMorphName(name.to_string()));
    }
    if normalized == DEFAULT_MORPH_NAME {
        return Ok(node_id.to_string());
    }
    Ok(format!("{normalized}_{node_id}"))
}

/// Derive a relation id
///
/// Identical tuples always produce the same id.
#[must_use]
pub fn relation_id(
    source: &str,
    name: &str,
    target: &str,
    adverb: Option<&str>,
    modality: Option<&str>,
) -> String {
    [
        source,
        adverb.unwrap_or_default(),
        name,
        target,
        modality.unwrap_or_default(),
    ]
    .join(RELATION_ID_SEPARATOR)
}

/// Derive an attribute id
#[must_use]
pub fn attribute_id(
    source: &str,
    name: &str,
    value: &str,
    unit: Option<&str>,
    adverb: Option<&str>,
    modality: Option<&str>,
) -> String {
    let hash = FactHash::compute_fields(&[
        Some(source),
        Some(name),
        Some(value),
        unit,
        adverb,
        modality,
    ]);
    format!("{source}::{name}::{}", hash.short())
}

/// Relation or attribute, for operations that treat both alike
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    /// Relation
    Relation,
    /// Attribute
    Attribute,
}

impl Display for MemberKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Relation => f.write_str("relation"),
            Self::Attribute => f.write_str("attribute"),
        }
    }
}

/// One state of a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Morph {
    /// Morph id
    pub morph_id: String,
    /// Normalized name
    pub name: String,
    /// Listed relations
    #[serde(default)]
    pub relation_ids: IndexSet<String>,
    /// Listed attributes
    #[serde(default)]
    pub attribute_ids: IndexSet<String>,
}

impl Morph {
    /// Create empty morph
    ///
    /// # Errors
    /// Returns [`GraphError::InvalidMorphName`] for an empty name.
    pub fn new(name: &str, node_id: &str) -> GraphResult<Self> {
        Ok(Self {
            morph_id: morph_id(name, node_id)?,
            name: normalize_id(name),
            relation_ids: IndexSet::new(),
            attribute_ids: IndexSet::new(),
        })
    }

    /// Default morph of a node
    #[must_use]
    pub fn default_for(node_id: &str) -> Self {
        Self {
            morph_id: node_id.to_string(),
            name: DEFAULT_MORPH_NAME.to_string(),
            relation_ids: IndexSet::new(),
            attribute_ids: IndexSet::new(),
        }
    }

    /// Member ids of one kind
    #[inline]
    #[must_use]
    pub fn members(&self, kind: MemberKind) -> &IndexSet<String> {
        match kind {
            MemberKind::Relation => &self.relation_ids,
            MemberKind::Attribute => &self.attribute_ids,
        }
    }

    /// Mutable member ids of one kind
    #[inline]
    pub fn members_mut(&mut self, kind: MemberKind) -> &mut IndexSet<String> {
        match kind {
            MemberKind::Relation => &mut self.relation_ids,
            MemberKind::Attribute => &mut self.attribute_ids,
        }
    }

    /// True if this is the default morph of `node_id`
    #[inline]
    #[must_use]
    pub fn is_default_for(&self, node_id: &str) -> bool {
        self.morph_id == node_id
    }
}

/// Graph node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Node id
    pub id: String,
    /// Display name
    pub name: String,
    /// Base name
    pub base: String,
    /// Quantifier
    #[serde(default)]
    pub quantifier: Option<String>,
    /// Qualifier
    #[serde(default)]
    pub qualifier: Option<String>,
    /// Free-text description
    #[serde(default)]
    pub description: String,
    /// Declared class
    #[serde(default)]
    pub is_a: Option<String>,
    /// Morphs in creation order
    #[serde(default)]
    pub morphs: Vec<Morph>,
    /// Id of the morph currently shown
    #[serde(default)]
    pub active_morph: Option<String>,
}

impl Node {
    /// Create node with only the default morph, active
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, base: impl Into<String>) -> Self {
        let id = id.into();
        let default = Morph::default_for(&id);
        Self {
            active_morph: Some(default.morph_id.clone()),
            morphs: vec![default],
            name: name.into(),
            base: base.into(),
            id,
            quantifier: None,
            qualifier: None,
            description: String::new(),
            is_a: None,
        }
    }

    /// Stub node for an id referenced before it was declared
    #[must_use]
    pub fn stub(id: &str) -> Self {
        Self::new(id, id, id)
    }

    /// True while the node has not been declared explicitly
    #[inline]
    #[must_use]
    pub fn is_stub(&self) -> bool {
        self.name == self.id
    }

    /// Find morph by id
    #[must_use]
    pub fn morph(&self, morph_id: &str) -> Option<&Morph> {
        self.morphs.iter().find(|m| m.morph_id == morph_id)
    }

    /// Find morph by id, mutably
    pub fn morph_mut(&mut self, morph_id: &str) -> Option<&mut Morph> {
        self.morphs.iter_mut().find(|m| m.morph_id == morph_id)
    }

    /// Find morph by id or report it missing
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownMorph`] if absent.
    pub fn require_morph_mut(&mut self, morph_id: &str) -> GraphResult<&mut Morph> {
        let node_id = self.id.clone();
        self.morph_mut(morph_id)
            .ok_or_else(|| GraphError::unknown_morph(node_id, morph_id))
    }

    /// Currently active morph, if set and present
    #[must_use]
    pub fn active(&self) -> Option<&Morph> {
        self.active_morph.as_deref().and_then(|id| self.morph(id))
    }

    /// Default morph, created as the first morph if the node has none
    pub fn ensure_default_morph(&mut self) -> &mut Morph {
        let default_id = self.id.clone();
        let index = match self.morphs.iter().position(|m| m.morph_id == default_id) {
            Some(index) => index,
            None => {
                self.morphs.insert(0, Morph::default_for(&default_id));
                if self.active_morph.is_none() {
                    self.active_morph = Some(default_id);
                }
                0
            }
        };
        &mut self.morphs[index]
    }

    /// Morph with the given name, created empty if absent
    ///
    /// # Errors
    /// Returns [`GraphError::InvalidMorphName`] for an empty name.
    pub fn ensure_morph(&mut self, name: &str) -> GraphResult<&mut Morph> {
        let id = morph_id(name, &self.id)?;
        self.ensure_default_morph();
        let index = match self.morphs.iter().position(|m| m.morph_id == id) {
            Some(index) => index,
            None => {
                self.morphs.push(Morph::new(name, &self.id)?);
                self.morphs.len() - 1
            }
        };
        Ok(&mut self.morphs[index])
    }
}

/// Materialized relation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Relation id
    pub id: String,
    /// Relation type name
    pub name: String,
    /// Source node
    pub source_id: String,
    /// Target node
    pub target_id: String,
    /// Adverb
    #[serde(default)]
    pub adverb: Option<String>,
    /// Modality
    #[serde(default)]
    pub modality: Option<String>,
    /// Morphs listing this relation
    #[serde(default)]
    pub morph_ids: IndexSet<String>,
}

impl Relation {
    /// Create relation with id derived from its fields
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        source_id: impl Into<String>,
        target_id: impl Into<String>,
        adverb: Option<String>,
        modality: Option<String>,
    ) -> Self {
        let name = name.into();
        let source_id = source_id.into();
        let target_id = target_id.into();
        Self {
            id: relation_id(
                &source_id,
                &name,
                &target_id,
                adverb.as_deref(),
                modality.as_deref(),
            ),
            name,
            source_id,
            target_id,
            adverb,
            modality,
            morph_ids: IndexSet::new(),
        }
    }

    /// True if `node_id` is either endpoint
    #[inline]
    #[must_use]
    pub fn touches(&self, node_id: &str) -> bool {
        self.source_id == node_id || self.target_id == node_id
    }
}

/// Materialized attribute
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute id
    pub id: String,
    /// Attribute type name
    pub name: String,
    /// Owning node
    pub source_id: String,
    /// Value
    pub value: String,
    /// Unit
    #[serde(default)]
    pub unit: Option<String>,
    /// Adverb
    #[serde(default)]
    pub adverb: Option<String>,
    /// Modality
    #[serde(default)]
    pub modality: Option<String>,
    /// Morphs listing this attribute
    #[serde(default)]
    pub morph_ids: IndexSet<String>,
}

impl Attribute {
    /// Create attribute with id derived from its fields
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        source_id: impl Into<String>,
        value: impl Into<String>,
        unit: Option<String>,
        adverb: Option<String>,
        modality: Option<String>,
    ) -> Self {
        let name = name.into();
        let source_id = source_id.into();
        let value = value.into();
        Self {
            id: attribute_id(
                &source_id,
                &name,
                &value,
                unit.as_deref(),
                adverb.as_deref(),
                modality.as_deref(),
            ),
            name,
            source_id,
            value,
            unit,
            adverb,
            modality,
            morph_ids: IndexSet::new(),
        }
    }

    /// Value with unit appended, for display
    #[must_use]
    pub fn display_value(&self) -> String {
        match &self.unit {
            Some(unit) => format!("{} {unit}", self.value),
            None => self.value.clone(),
        }
    }
}
