//! Node/morph assembler
//!
//! Folds parsed facts into a [`Registry`]. Targets that were never declared
//! get stub nodes, relations and attributes are listed in the morph named by
//! their fact (the default morph otherwise), and type names missing from the
//! [`Schema`] produce suggestions rather than failures.
//!
//! # Example
//!
//! ```rust
//! use ndf_cnl::read_document;
//! use ndf_graph::{Assembler, Registry, Schema};
//!
//! let doc = read_document("# Earth\n:::cnl\nhas radius: 6371 *km*\n:::");
//! let mut registry = Registry::new();
//! let mut schema = Schema::default();
//!
//! let report = Assembler::new(&mut registry, &mut schema).apply_all(&doc.facts).finish();
//! assert!(registry.node("earth").is_some());
//! assert_eq!(report.attributes.len(), 1);
//! assert_eq!(report.suggestions.len(), 1);
//! ```

use crate::model::{Attribute, Node, Relation};
use crate::registry::Registry;
use crate::schema::{Schema, SchemaSuggestion};
use indexmap::IndexSet;
use ndf_cnl::{AttributeFact, DefineKind, Fact, NodeFact, RelationFact};
use serde::{Deserialize, Serialize};

/// What one assembly run changed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyReport {
    /// Every node a fact referenced, in first-reference order
    pub touched_nodes: IndexSet<String>,
    /// Nodes that did not exist before this run
    pub created_nodes: IndexSet<String>,
    /// Relations materialized
    pub relations: IndexSet<String>,
    /// Attributes materialized
    pub attributes: IndexSet<String>,
    /// Undefined type names, one per (kind, name)
    pub suggestions: Vec<SchemaSuggestion>,
    /// Facts that could not be applied
    pub diagnostics: Vec<String>,
}

impl AssemblyReport {
    fn suggest(&mut self, suggestion: SchemaSuggestion) {
        let seen = self
            .suggestions
            .iter()
            .any(|s| s.kind == suggestion.kind && s.name == suggestion.name);
        if !seen {
            tracing::debug!(kind = %suggestion.kind, name = %suggestion.name, "suggesting type definition");
            self.suggestions.push(suggestion);
        }
    }

    fn touch(&mut self, node_id: &str, created: bool) {
        self.touched_nodes.insert(node_id.to_string());
        if created {
            self.created_nodes.insert(node_id.to_string());
        }
    }
}

/// Applies facts to a registry and schema
pub struct Assembler<'a> {
    registry: &'a mut Registry,
    schema: &'a mut Schema,
    report: AssemblyReport,
}

impl<'a> Assembler<'a> {
    /// Create assembler over an existing registry and schema
    #[must_use]
    pub fn new(registry: &'a mut Registry, schema: &'a mut Schema) -> Self {
        Self {
            registry,
            schema,
            report: AssemblyReport::default(),
        }
    }

    /// Apply facts in order
    #[must_use]
    pub fn apply_all<'f>(mut self, facts: impl IntoIterator<Item = &'f Fact>) -> Self {
        for fact in facts {
            self.apply(fact);
        }
        self
    }

    /// Apply one fact
    pub fn apply(&mut self, fact: &Fact) {
        match fact {
            Fact::Node(node) => self.apply_node(node),
            Fact::Relation(relation) => self.apply_relation(relation),
            Fact::Attribute(attribute) => self.apply_attribute(attribute),
            Fact::Define(define) => self.schema.define(define),
        }
    }

    /// Finish and return the report
    #[must_use]
    pub fn finish(self) -> AssemblyReport {
        tracing::debug!(
            nodes = self.report.touched_nodes.len(),
            relations = self.report.relations.len(),
            attributes = self.report.attributes.len(),
            "assembly finished"
        );
        self.report
    }

    fn apply_node(&mut self, fact: &NodeFact) {
        let created = match self.registry.nodes.get_mut(&fact.id) {
            Some(node) => {
                if node.is_stub() {
                    node.name.clone_from(&fact.name);
                    node.base.clone_from(&fact.base);
                    node.quantifier.clone_from(&fact.quantifier);
                    node.qualifier.clone_from(&fact.qualifier);
                }
                if let Some(description) = fact.description.as_deref().filter(|d| !d.is_empty()) {
                    node.description = description.to_string();
                }
                if node.is_a.is_none() {
                    node.is_a.clone_from(&fact.is_a);
                }
                false
            }
            None => {
                let mut node = Node::new(&fact.id, &fact.name, &fact.base);
                node.quantifier.clone_from(&fact.quantifier);
                node.qualifier.clone_from(&fact.qualifier);
                node.description = fact.description.clone().unwrap_or_default();
                node.is_a.clone_from(&fact.is_a);
                self.registry.nodes.insert(fact.id.clone(), node);
                true
            }
        };
        tracing::debug!(node = %fact.id, created, "applied node fact");
        self.report.touch(&fact.id, created);
    }

    fn apply_relation(&mut self, fact: &RelationFact) {
        let source_created = self.registry.ensure_node_id(&fact.subject);
        self.report.touch(&fact.subject, source_created);
        let target_created = self.registry.ensure_node(&fact.object);
        self.report.touch(&fact.object.id, target_created);

        if !self.schema.has_relation(&fact.name) {
            self.report.suggest(SchemaSuggestion::relation(&fact.name));
        }

        let relation = Relation::new(
            &fact.name,
            &fact.subject,
            &fact.object.id,
            fact.adverb.clone(),
            fact.modality.clone(),
        );
        match self.registry.materialize_relation(relation, fact.morph.as_deref()) {
            Ok(done) => {
                self.report.relations.insert(done.id);
            }
            Err(err) => {
                tracing::warn!(relation = %fact.name, error = %err, "relation skipped");
                self.report
                    .diagnostics
                    .push(format!("Skipped relation '{}' of {}: {err}", fact.name, fact.subject));
            }
        }
    }

    fn apply_attribute(&mut self, fact: &AttributeFact) {
        let created = self.registry.ensure_node_id(&fact.target);
        self.report.touch(&fact.target, created);

        if !self.schema.has_attribute(&fact.name) {
            self.report.suggest(SchemaSuggestion::attribute(
                &fact.name,
                &fact.value,
                fact.unit.as_deref(),
            ));
        }

        let attribute = Attribute::new(
            &fact.name,
            &fact.target,
            &fact.value,
            fact.unit.clone(),
            fact.adverb.clone(),
            fact.modality.clone(),
        );
        match self.registry.materialize_attribute(attribute, fact.morph.as_deref()) {
            Ok(done) => {
                self.report.attributes.insert(done.id);
            }
            Err(err) => {
                tracing::warn!(attribute = %fact.name, error = %err, "attribute skipped");
                self.report
                    .diagnostics
                    .push(format!("Skipped attribute '{}' of {}: {err}", fact.name, fact.target));
            }
        }
    }
}

/// True if the report suggests defining `name` as `kind`
#[must_use]
pub fn suggests(report: &AssemblyReport, kind: DefineKind, name: &str) -> bool {
    report
        .suggestions
        .iter()
        .any(|s| s.kind == kind && s.name == name)
}
