//! Graph composer
//!
//! Produces the two exported views of a graph from one node-id set:
//!
//! - [`FlatView`]: Cytoscape-style elements. Each node's active morph
//!   contributes relation edges and one value node per attribute.
//! - [`PolymorphicView`]: full node records with every morph, plus the
//!   relations and attributes any of those morphs list.

use crate::model::{Attribute, Node, Relation};
use crate::registry::Registry;
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// Prefix of synthetic value node ids
pub const VALUE_NODE_PREFIX: &str = "value::";

/// Cytoscape element wrapper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element<T> {
    /// Element payload
    pub data: T,
}

/// Flat view node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatNode {
    /// Node id, or `value::{attribute id}` for value nodes
    pub id: String,
    /// Display label
    pub label: String,
}

/// Edge type in the flat view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Relation between two nodes
    Relation,
    /// Node to attribute value
    Attribute,
}

/// Flat view edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatEdge {
    /// Relation or attribute id
    pub id: String,
    /// Source element id
    pub source: String,
    /// Target element id
    pub target: String,
    /// Display label
    pub label: String,
    /// Edge type
    #[serde(rename = "type")]
    pub kind: EdgeKind,
}

/// Simple node/edge view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatView {
    /// Nodes, including value nodes
    pub nodes: Vec<Element<FlatNode>>,
    /// Edges
    pub edges: Vec<Element<FlatEdge>>,
}

impl FlatView {
    /// Node element by id
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&FlatNode> {
        self.nodes.iter().map(|e| &e.data).find(|n| n.id == id)
    }

    /// Edge element by id
    #[must_use]
    pub fn edge(&self, id: &str) -> Option<&FlatEdge> {
        self.edges.iter().map(|e| &e.data).find(|e| e.id == id)
    }
}

/// Morph-preserving view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolymorphicView {
    /// Node records with all morphs
    pub nodes: Vec<Node>,
    /// Relations listed by any morph, deduplicated
    pub relations: Vec<Relation>,
    /// Attributes listed by any morph, deduplicated
    pub attributes: Vec<Attribute>,
    /// Graph id
    pub graph_id: String,
    /// Graph description
    pub description: String,
}

/// Both views of one graph, composed together
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComposedViews {
    /// Flat view
    pub flat: FlatView,
    /// Morph-preserving view
    pub polymorphic: PolymorphicView,
}

/// Composes graph views from a registry
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphComposer;

impl GraphComposer {
    /// Compose both views for `node_ids`
    ///
    /// Ids with no node record are skipped with a warning.
    #[must_use]
    pub fn compose<'n>(
        graph_id: &str,
        description: &str,
        node_ids: impl IntoIterator<Item = &'n str>,
        registry: &Registry,
    ) -> ComposedViews {
        let nodes: Vec<&Node> = node_ids
            .into_iter()
            .collect::<IndexSet<_>>()
            .into_iter()
            .filter_map(|id| {
                let node = registry.node(id);
                if node.is_none() {
                    tracing::warn!(graph = %graph_id, node = %id, "graph lists missing node");
                }
                node
            })
            .collect();

        let views = ComposedViews {
            flat: Self::flat(&nodes, registry),
            polymorphic: Self::polymorphic(graph_id, description, &nodes, registry),
        };
        tracing::debug!(
            graph = %graph_id,
            nodes = views.flat.nodes.len(),
            edges = views.flat.edges.len(),
            "composed views"
        );
        views
    }

    fn flat(nodes: &[&Node], registry: &Registry) -> FlatView {
        let mut elements: IndexMap<String, FlatNode> = nodes
            .iter()
            .map(|n| {
                let element = FlatNode {
                    id: n.id.clone(),
                    label: n.name.clone(),
                };
                (n.id.clone(), element)
            })
            .collect();
        let mut edges = Vec::new();

        for node in nodes {
            let Some(morph) = node.active() else {
                continue;
            };

            for id in &morph.relation_ids {
                let Some(relation) = registry.relation(id) else {
                    tracing::warn!(node = %node.id, relation = %id, "morph lists missing relation");
                    continue;
                };
                let Some(target) = registry.node(&relation.target_id) else {
                    tracing::warn!(relation = %id, target = %relation.target_id, "relation target missing");
                    continue;
                };
                elements
                    .entry(target.id.clone())
                    .or_insert_with(|| FlatNode {
                        id: target.id.clone(),
                        label: target.name.clone(),
                    });
                edges.push(Element {
                    data: FlatEdge {
                        id: relation.id.clone(),
                        source: relation.source_id.clone(),
                        target: relation.target_id.clone(),
                        label: relation_label(relation),
                        kind: EdgeKind::Relation,
                    },
                });
            }

            for id in &morph.attribute_ids {
                let Some(attribute) = registry.attribute(id) else {
                    tracing::warn!(node = %node.id, attribute = %id, "morph lists missing attribute");
                    continue;
                };
                let value_id = format!("{VALUE_NODE_PREFIX}{}", attribute.id);
                elements.entry(value_id.clone()).or_insert_with(|| FlatNode {
                    id: value_id.clone(),
                    label: attribute.display_value(),
                });
                edges.push(Element {
                    data: FlatEdge {
                        id: attribute.id.clone(),
                        source: attribute.source_id.clone(),
                        target: value_id,
                        label: format!("has {}", attribute.name),
                        kind: EdgeKind::Attribute,
                    },
                });
            }
        }

        FlatView {
            nodes: elements.into_values().map(|data| Element { data }).collect(),
            edges,
        }
    }

    fn polymorphic(
        graph_id: &str,
        description: &str,
        nodes: &[&Node],
        registry: &Registry,
    ) -> PolymorphicView {
        let mut relations: IndexMap<&str, Relation> = IndexMap::new();
        let mut attributes: IndexMap<&str, Attribute> = IndexMap::new();

        for morph in nodes.iter().flat_map(|n| &n.morphs) {
            for id in &morph.relation_ids {
                match registry.relation(id) {
                    Some(relation) => {
                        relations.entry(id.as_str()).or_insert_with(|| relation.clone());
                    }
                    None => tracing::warn!(morph = %morph.morph_id, relation = %id, "morph lists missing relation"),
                }
            }
            for id in &morph.attribute_ids {
                match registry.attribute(id) {
                    Some(attribute) => {
                        attributes.entry(id.as_str()).or_insert_with(|| attribute.clone());
                    }
                    None => tracing::warn!(morph = %morph.morph_id, attribute = %id, "morph lists missing attribute"),
                }
            }
        }

        PolymorphicView {
            nodes: nodes.iter().map(|n| (*n).clone()).collect(),
            relations: relations.into_values().collect(),
            attributes: attributes.into_values().collect(),
            graph_id: graph_id.to_string(),
            description: description.to_string(),
        }
    }
}

fn relation_label(relation: &Relation) -> String {
    let label = match &relation.adverb {
        Some(adverb) => format!("{adverb} {}", relation.name),
        None => relation.name.clone(),
    };
    match &relation.modality {
        Some(modality) => format!("{label} [{modality}]"),
        None => label,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Assembler, Schema};
    use ndf_cnl::read_document;
    use pretty_assertions::assert_eq;

    fn registry_from(text: &str) -> Registry {
        let doc = read_document(text);
        let mut registry = Registry::new();
        let mut schema = Schema::default();
        Assembler::new(&mut registry, &mut schema).apply_all(&doc.facts).finish();
        registry
    }

    #[test]
    fn flat_view_renders_relations_and_values() {
        let registry = registry_from(
            "# *all* **female** mathematicians\n:::cnl\n<collaborates_with> *some* **male** mathematicians [often]\nhas field: mathematics\n:::",
        );
        let views = GraphComposer::compose(
            "g",
            "",
            ["all_female_mathematicians"],
            &registry,
        );

        let flat = &views.flat;
        assert_eq!(flat.nodes.len(), 3);
        assert!(flat.node("some_male_mathematicians").is_some());
        let relation = flat
            .edges
            .iter()
            .map(|e| &e.data)
            .find(|e| e.kind == EdgeKind::Relation)
            .unwrap();
        assert_eq!(relation.label, "collaborates_with [often]");
        let attribute = flat
            .edges
            .iter()
            .map(|e| &e.data)
            .find(|e| e.kind == EdgeKind::Attribute)
            .unwrap();
        assert_eq!(attribute.label, "has field");
        assert_eq!(flat.node(&attribute.target).unwrap().label, "mathematics");
    }

    #[test]
    fn flat_view_uses_active_morph_only() {
        let mut registry = registry_from("# Water\n:::cnl\nhas state: liquid\n:::\n:::cnl ice\nhas state: solid\n:::");
        let liquid = GraphComposer::compose("g", "", ["water"], &registry);
        assert_eq!(liquid.flat.edges.len(), 1);
        assert_eq!(liquid.flat.nodes[1].data.label, "liquid");

        registry.set_active_morph("water", "ice_water").unwrap();
        let ice = GraphComposer::compose("g", "", ["water"], &registry);
        assert_eq!(ice.flat.nodes[1].data.label, "solid");

        assert_eq!(ice.polymorphic.attributes.len(), 2);
        assert_eq!(ice.polymorphic.nodes[0].morphs.len(), 2);
    }

    #[test]
    fn node_without_active_morph_has_no_edges() {
        let mut registry = registry_from("# Water\n:::cnl\nhas state: liquid\n:::");
        registry.nodes.get_mut("water").unwrap().active_morph = None;

        let views = GraphComposer::compose("g", "", ["water"], &registry);
        assert_eq!(views.flat.nodes.len(), 1);
        assert!(views.flat.edges.is_empty());
        assert_eq!(views.polymorphic.attributes.len(), 1);
    }

    #[test]
    fn shared_relation_appears_once() {
        let mut registry = registry_from("# A\n:::cnl\n<likes> B\n:::");
        registry.create_morph("a", "young", Some("a")).unwrap();

        let views = GraphComposer::compose("g", "desc", ["a", "b", "a"], &registry);
        assert_eq!(views.polymorphic.relations.len(), 1);
        assert_eq!(views.polymorphic.nodes.len(), 2);
        assert_eq!(views.polymorphic.description, "desc");
    }

    #[test]
    fn missing_nodes_are_skipped() {
        let registry = registry_from("# A");
        let views = GraphComposer::compose("g", "", ["a", "ghost"], &registry);
        assert_eq!(views.flat.nodes.len(), 1);
        assert_eq!(views.polymorphic.nodes.len(), 1);
    }

    #[test]
    fn flat_view_serializes_as_cytoscape_elements() {
        let registry = registry_from("# A\n:::cnl\n<likes> B\n:::");
        let views = GraphComposer::compose("g", "", ["a"], &registry);
        let json = serde_json::to_value(&views.flat).unwrap();

        assert_eq!(json["nodes"][0]["data"]["id"], "a");
        assert_eq!(json["edges"][0]["data"]["type"], "relation");
        assert_eq!(json["edges"][0]["data"]["target"], "b");
    }
}
