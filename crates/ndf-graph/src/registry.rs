//! Per-user entity registry
//!
//! Holds every node, relation and attribute a user owns, keyed by id.
//! Graphs reference nodes from here by id.

use crate::error::{GraphError, GraphResult};
use crate::model::{Attribute, MemberKind, Node, Relation};
use indexmap::IndexMap;
use ndf_cnl::NodeIdentity;
use serde::{Deserialize, Serialize};

/// Result of materializing a relation or attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Materialized {
    /// Relation or attribute id
    pub id: String,
    /// Morph the member was listed in
    pub morph_id: String,
    /// False if the record already existed
    pub created: bool,
}

/// Deletion refused because relations still reference the node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionBlocked {
    /// Node that was not deleted
    pub node_id: String,
    /// Relations with the node as source or target
    pub relations: Vec<String>,
}

/// Outcome of a node deletion request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeleteOutcome {
    /// Node removed together with its own attributes
    Deleted {
        /// Removed node
        node_id: String,
        /// Attributes removed with it
        removed_attributes: Vec<String>,
    },
    /// Node kept; remove these relations first
    Blocked(DeletionBlocked),
}

impl DeleteOutcome {
    /// True if the node was removed
    #[inline]
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted { .. })
    }
}

/// Nodes, relations and attributes of one user
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registry {
    /// Nodes by id
    #[serde(default)]
    pub nodes: IndexMap<String, Node>,
    /// Relations by id
    #[serde(default)]
    pub relations: IndexMap<String, Relation>,
    /// Attributes by id
    #[serde(default)]
    pub attributes: IndexMap<String, Attribute>,
}

impl Registry {
    /// Create empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Node by id
    #[inline]
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Node by id or [`GraphError::UnknownNode`]
    ///
    /// # Errors
    /// Returns error if the node does not exist.
    pub fn require_node_mut(&mut self, id: &str) -> GraphResult<&mut Node> {
        self.nodes
            .get_mut(id)
            .ok_or_else(|| GraphError::UnknownNode(id.to_string()))
    }

    /// Relation by id
    #[inline]
    #[must_use]
    pub fn relation(&self, id: &str) -> Option<&Relation> {
        self.relations.get(id)
    }

    /// Attribute by id
    #[inline]
    #[must_use]
    pub fn attribute(&self, id: &str) -> Option<&Attribute> {
        self.attributes.get(id)
    }

    /// Source node of a relation or attribute
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownMember`] if absent.
    pub fn member_source(&self, kind: MemberKind, id: &str) -> GraphResult<&str> {
        let source = match kind {
            MemberKind::Relation => self.relations.get(id).map(|r| r.source_id.as_str()),
            MemberKind::Attribute => self.attributes.get(id).map(|a| a.source_id.as_str()),
        };
        source.ok_or_else(|| GraphError::unknown_member(kind, id))
    }

    /// Morph ids recorded on a relation or attribute
    pub(crate) fn member_morph_ids_mut(
        &mut self,
        kind: MemberKind,
        id: &str,
    ) -> GraphResult<&mut indexmap::IndexSet<String>> {
        let ids = match kind {
            MemberKind::Relation => self.relations.get_mut(id).map(|r| &mut r.morph_ids),
            MemberKind::Attribute => self.attributes.get_mut(id).map(|a| &mut a.morph_ids),
        };
        ids.ok_or_else(|| GraphError::unknown_member(kind, id))
    }

    /// Ensure a node exists for `identity`; returns true if a stub was created
    pub fn ensure_node(&mut self, identity: &NodeIdentity) -> bool {
        if self.nodes.contains_key(&identity.id) {
            return false;
        }
        let mut node = Node::stub(&identity.id);
        node.base.clone_from(&identity.base);
        node.quantifier.clone_from(&identity.quantifier);
        node.qualifier.clone_from(&identity.qualifier);
        tracing::debug!(node = %identity.id, "created stub node");
        self.nodes.insert(identity.id.clone(), node);
        true
    }

    /// Ensure a node exists for a bare id; returns true if a stub was created
    pub fn ensure_node_id(&mut self, id: &str) -> bool {
        if self.nodes.contains_key(id) {
            return false;
        }
        tracing::debug!(node = %id, "created stub node");
        self.nodes.insert(id.to_string(), Node::stub(id));
        true
    }

    /// Create or reuse a relation and list it in a morph of its source node
    ///
    /// `morph` is a morph name; `None` selects the default morph. Both
    /// endpoints must already exist.
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownNode`] for a missing endpoint or
    /// [`GraphError::InvalidMorphName`] for an unusable morph name.
    pub fn materialize_relation(
        &mut self,
        relation: Relation,
        morph: Option<&str>,
    ) -> GraphResult<Materialized> {
        if !self.nodes.contains_key(&relation.target_id) {
            return Err(GraphError::UnknownNode(relation.target_id));
        }
        let morph_id = Self::list_in_morph(
            self.require_node_mut(&relation.source_id)?,
            MemberKind::Relation,
            &relation.id,
            morph,
        )?;

        let id = relation.id.clone();
        let created = !self.relations.contains_key(&id);
        let entry = self.relations.entry(id.clone()).or_insert(relation);
        entry.morph_ids.insert(morph_id.clone());

        tracing::debug!(relation = %id, morph = %morph_id, created, "materialized relation");
        Ok(Materialized {
            id,
            morph_id,
            created,
        })
    }

    /// Create or reuse an attribute and list it in a morph of its owner
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownNode`] for a missing owner or
    /// [`GraphError::InvalidMorphName`] for an unusable morph name.
    pub fn materialize_attribute(
        &mut self,
        attribute: Attribute,
        morph: Option<&str>,
    ) -> GraphResult<Materialized> {
        let morph_id = Self::list_in_morph(
            self.require_node_mut(&attribute.source_id)?,
            MemberKind::Attribute,
            &attribute.id,
            morph,
        )?;

        let id = attribute.id.clone();
        let created = !self.attributes.contains_key(&id);
        let entry = self.attributes.entry(id.clone()).or_insert(attribute);
        entry.morph_ids.insert(morph_id.clone());

        tracing::debug!(attribute = %id, morph = %morph_id, created, "materialized attribute");
        Ok(Materialized {
            id,
            morph_id,
            created,
        })
    }

    fn list_in_morph(
        node: &mut Node,
        kind: MemberKind,
        member_id: &str,
        morph: Option<&str>,
    ) -> GraphResult<String> {
        let target = match morph {
            Some(name) => node.ensure_morph(name)?,
            None => node.ensure_default_morph(),
        };
        target.members_mut(kind).insert(member_id.to_string());
        Ok(target.morph_id.clone())
    }

    /// Relations with `node_id` as source or target
    #[must_use]
    pub fn referencing_relations(&self, node_id: &str) -> Vec<String> {
        self.relations
            .values()
            .filter(|r| r.touches(node_id))
            .map(|r| r.id.clone())
            .collect()
    }

    /// Delete a node unless relations still reference it
    ///
    /// A refused deletion is an `Ok(DeleteOutcome::Blocked)`, not an error.
    /// On success the node's own attributes are removed too.
    ///
    /// # Errors
    /// Returns [`GraphError::UnknownNode`] if the node does not exist.
    pub fn delete_node(&mut self, node_id: &str) -> GraphResult<DeleteOutcome> {
        if !self.nodes.contains_key(node_id) {
            return Err(GraphError::UnknownNode(node_id.to_string()));
        }

        let relations = self.referencing_relations(node_id);
        if !relations.is_empty() {
            tracing::warn!(node = %node_id, count = relations.len(), "node deletion blocked");
            return Ok(DeleteOutcome::Blocked(DeletionBlocked {
                node_id: node_id.to_string(),
                relations,
            }));
        }

        self.nodes.shift_remove(node_id);
        let removed_attributes: Vec<String> = self
            .attributes
            .values()
            .filter(|a| a.source_id == node_id)
            .map(|a| a.id.clone())
            .collect();
        for id in &removed_attributes {
            self.attributes.shift_remove(id);
        }

        tracing::info!(node = %node_id, attributes = removed_attributes.len(), "deleted node");
        Ok(DeleteOutcome::Deleted {
            node_id: node_id.to_string(),
            removed_attributes,
        })
    }

    /// Describe every broken cross-reference; empty when consistent
    #[must_use]
    pub fn dangling_references(&self) -> Vec<String> {
        let mut problems = Vec::new();

        for relation in self.relations.values() {
            for endpoint in [&relation.source_id, &relation.target_id] {
                if !self.nodes.contains_key(endpoint) {
                    problems.push(format!("relation {} references missing node {endpoint}", relation.id));
                }
            }
        }
        for attribute in self.attributes.values() {
            if !self.nodes.contains_key(&attribute.source_id) {
                problems.push(format!(
                    "attribute {} references missing node {}",
                    attribute.id, attribute.source_id
                ));
            }
        }
        for node in self.nodes.values() {
            if let Some(active) = &node.active_morph {
                if node.morph(active).is_none() {
                    problems.push(format!("node {} has unknown active morph {active}", node.id));
                }
            }
            for morph in &node.morphs {
                for id in &morph.relation_ids {
                    if !self.relations.contains_key(id) {
                        problems.push(format!("morph {} lists missing relation {id}", morph.morph_id));
                    }
                }
                for id in &morph.attribute_ids {
                    if !self.attributes.contains_key(id) {
                        problems.push(format!("morph {} lists missing attribute {id}", morph.morph_id));
                    }
                }
            }
        }

        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with(ids: &[&str]) -> Registry {
        let mut registry = Registry::new();
        for id in ids {
            registry.ensure_node_id(id);
        }
        registry
    }

    #[test]
    fn materialize_relation_is_idempotent() {
        let mut registry = registry_with(&["a", "b"]);
        let first = registry
            .materialize_relation(Relation::new("likes", "a", "b", None, None), None)
            .unwrap();
        let second = registry
            .materialize_relation(Relation::new("likes", "a", "b", None, None), None)
            .unwrap();

        assert_eq!(first.id, second.id);
        assert!(first.created);
        assert!(!second.created);
        assert_eq!(registry.relations.len(), 1);
        assert_eq!(registry.node("a").unwrap().morphs[0].relation_ids.len(), 1);
    }

    #[test]
    fn materialize_into_second_morph_shares_record() {
        let mut registry = registry_with(&["a", "b"]);
        registry
            .materialize_relation(Relation::new("likes", "a", "b", None, None), None)
            .unwrap();
        let shared = registry
            .materialize_relation(Relation::new("likes", "a", "b", None, None), Some("young"))
            .unwrap();

        assert_eq!(shared.morph_id, "young_a");
        let relation = registry.relation(&shared.id).unwrap();
        assert_eq!(relation.morph_ids.len(), 2);
        assert!(relation.morph_ids.contains("a"));
        assert!(relation.morph_ids.contains("young_a"));
    }

    #[test]
    fn materialize_requires_endpoints() {
        let mut registry = registry_with(&["a"]);
        let result =
            registry.materialize_relation(Relation::new("likes", "a", "ghost", None, None), None);
        assert_eq!(result, Err(GraphError::UnknownNode("ghost".to_string())));
        assert!(registry.relations.is_empty());
    }

    #[test]
    fn distinct_attribute_values_get_distinct_ids() {
        let mut registry = registry_with(&["a"]);
        let one = registry
            .materialize_attribute(Attribute::new("age", "a", "30", None, None, None), None)
            .unwrap();
        let two = registry
            .materialize_attribute(Attribute::new("age", "a", "31", None, None, None), None)
            .unwrap();
        assert_ne!(one.id, two.id);
        assert_eq!(registry.attributes.len(), 2);
    }

    #[test]
    fn delete_blocked_by_incoming_relation() {
        let mut registry = registry_with(&["a", "b"]);
        let rel = registry
            .materialize_relation(Relation::new("likes", "a", "b", None, None), None)
            .unwrap();

        let outcome = registry.delete_node("b").unwrap();
        assert_eq!(
            outcome,
            DeleteOutcome::Blocked(DeletionBlocked {
                node_id: "b".to_string(),
                relations: vec![rel.id],
            })
        );
        assert!(registry.node("b").is_some());
    }

    #[test]
    fn delete_removes_own_attributes() {
        let mut registry = registry_with(&["a"]);
        let attr = registry
            .materialize_attribute(Attribute::new("age", "a", "30", None, None, None), None)
            .unwrap();

        let outcome = registry.delete_node("a").unwrap();
        assert!(outcome.is_deleted());
        assert!(registry.attribute(&attr.id).is_none());
        assert!(registry.dangling_references().is_empty());
    }

    #[test]
    fn delete_unknown_node_is_error() {
        let mut registry = Registry::new();
        assert!(matches!(
            registry.delete_node("nobody"),
            Err(GraphError::UnknownNode(_))
        ));
    }
}
