//! Studio service
//!
//! Wires the pipeline to a [`Store`]. Each mutating call loads the user's
//! registry and the session's graph record, applies one operation, then
//! writes back the records that changed together with freshly composed
//! flat and polymorphic views.

use crate::config::StudioConfig;
use crate::error::{StudioError, StudioResult};
use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use ndf_cnl::DocumentReader;
use ndf_graph::{
    Assembler, ComposedViews, DeleteOutcome, FactHash, GraphComposer, MemberKind, Registry,
    Schema, SchemaSuggestion,
};
use ndf_store::{EntityKind, FsStore, RecordKey, Store, StoreExt};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const REGISTRY_INDEX_ID: &str = "index";
const SCHEMA_ID: &str = "schema";

/// Who is acting on which graph
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Session {
    /// User id
    pub user: String,
    /// Graph id
    pub graph: String,
}

impl Session {
    /// Create session
    #[must_use]
    pub fn new(user: impl Into<String>, graph: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            graph: graph.into(),
        }
    }

    /// Store key of a node, relation or attribute record
    ///
    /// Entity ids carry user text, so the key id is the Blake3 digest of
    /// the entity id; the id itself lives inside the record.
    #[must_use]
    pub fn record_key(&self, kind: EntityKind, id: &str) -> RecordKey {
        RecordKey::user(&self.user, kind, FactHash::compute(id.as_bytes()).to_string())
    }

    fn user_key(&self, kind: EntityKind, id: &str) -> RecordKey {
        RecordKey::user(&self.user, kind, id)
    }

    fn graph_key(&self, kind: EntityKind) -> RecordKey {
        graph_key(&self.user, &self.graph, kind)
    }
}

fn graph_key(user: &str, graph: &str, kind: EntityKind) -> RecordKey {
    RecordKey::graph(user, graph, kind, graph)
}

/// Stored graph metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphRecord {
    /// Graph id
    pub graph_id: String,
    /// Free-text description
    #[serde(default)]
    pub description: String,
    /// Nodes shown in this graph
    #[serde(default)]
    pub node_ids: IndexSet<String>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last modification time
    pub modified_at: DateTime<Utc>,
}

/// Ids of every graph and entity a user owns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
struct RegistryIndex {
    #[serde(default)]
    graphs: Vec<String>,
    #[serde(default)]
    nodes: Vec<String>,
    #[serde(default)]
    relations: Vec<String>,
    #[serde(default)]
    attributes: Vec<String>,
}

impl RegistryIndex {
    fn of(graphs: &IndexSet<String>, registry: &Registry) -> Self {
        Self {
            graphs: graphs.iter().cloned().collect(),
            nodes: registry.nodes.keys().cloned().collect(),
            relations: registry.relations.keys().cloned().collect(),
            attributes: registry.attributes.keys().cloned().collect(),
        }
    }
}

/// Result of ingesting one document
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Graph the document was ingested into
    pub graph_id: String,
    /// Lines the reader or parser skipped
    pub parse_diagnostics: Vec<String>,
    /// Facts the assembler could not apply
    pub assembly_diagnostics: Vec<String>,
    /// Type names used without a definition
    pub suggestions: Vec<SchemaSuggestion>,
    /// Nodes the document referenced
    pub nodes: Vec<String>,
    /// Nodes that did not exist before
    pub created_nodes: Vec<String>,
    /// Relations materialized
    pub relations: Vec<String>,
    /// Attributes materialized
    pub attributes: Vec<String>,
}

impl IngestReport {
    /// True if nothing was skipped
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.parse_diagnostics.is_empty() && self.assembly_diagnostics.is_empty()
    }
}

/// Registry, schema and graph list as loaded, plus the working copies
struct Workspace {
    graphs: IndexSet<String>,
    registry: Registry,
    schema: Schema,
    loaded_index: RegistryIndex,
    loaded_registry: Registry,
    loaded_schema: Schema,
}

/// The studio service
pub struct Studio {
    config: StudioConfig,
    store: Arc<dyn Store>,
    reader: DocumentReader,
}

impl Studio {
    /// Create studio over any store
    #[must_use]
    pub fn new(config: StudioConfig, store: Arc<dyn Store>) -> Self {
        Self {
            config,
            store,
            reader: DocumentReader::new(),
        }
    }

    /// Create studio over a filesystem store at `config.data_dir`
    #[must_use]
    pub fn open(config: StudioConfig) -> Self {
        let store = FsStore::new(&config.data_dir).with_pretty(config.pretty_json);
        Self::new(config, Arc::new(store))
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &StudioConfig {
        &self.config
    }

    /// Create a graph, or return the existing one unchanged
    ///
    /// # Errors
    /// Returns an error if the store fails.
    pub fn create_graph(&self, session: &Session, description: &str) -> StudioResult<GraphRecord> {
        if let Some(existing) = self.load_graph(session)? {
            return Ok(existing);
        }
        let now = Utc::now();
        let graph = GraphRecord {
            graph_id: session.graph.clone(),
            description: description.to_string(),
            node_ids: IndexSet::new(),
            created_at: now,
            modified_at: now,
        };
        let mut workspace = self.load_workspace(session)?;
        self.save_graph(&session.user, &graph, &workspace.registry)?;
        workspace.graphs.insert(session.graph.clone());
        self.save_index(session, &workspace)?;

        tracing::info!(user = %session.user, graph = %session.graph, "created graph");
        Ok(graph)
    }

    /// Graph record for the session
    ///
    /// # Errors
    /// Returns [`StudioError::GraphNotFound`] if the graph was never created.
    pub fn graph(&self, session: &Session) -> StudioResult<GraphRecord> {
        self.load_graph(session)?
            .ok_or_else(|| StudioError::graph_not_found(&session.user, &session.graph))
    }

    /// The user's registry as stored
    ///
    /// # Errors
    /// Returns an error if the store fails or a listed record is missing.
    pub fn registry(&self, session: &Session) -> StudioResult<Registry> {
        Ok(self.load_workspace(session)?.registry)
    }

    /// The user's schema as stored
    ///
    /// # Errors
    /// Returns an error if the store fails.
    pub fn schema(&self, session: &Session) -> StudioResult<Schema> {
        Ok(self.load_workspace(session)?.schema)
    }

    /// Parse a CNL document and fold it into the session's graph
    ///
    /// # Errors
    /// Returns [`StudioError::GraphNotFound`] if the graph does not exist,
    /// or an error if the store fails.
    pub fn ingest(&self, session: &Session, text: &str) -> StudioResult<IngestReport> {
        let mut graph = self.graph(session)?;
        let mut workspace = self.load_workspace(session)?;

        let doc = self.reader.read(text);
        for diagnostic in &doc.diagnostics {
            tracing::warn!(graph = %session.graph, "{diagnostic}");
        }
        let assembly = Assembler::new(&mut workspace.registry, &mut workspace.schema)
            .apply_all(&doc.facts)
            .finish();
        graph.node_ids.extend(assembly.touched_nodes.iter().cloned());

        self.commit(session, &mut workspace, &mut graph)?;

        tracing::info!(
            user = %session.user,
            graph = %session.graph,
            facts = doc.facts.len(),
            nodes = assembly.touched_nodes.len(),
            suggestions = assembly.suggestions.len(),
            "ingested document"
        );
        Ok(IngestReport {
            graph_id: graph.graph_id,
            parse_diagnostics: doc.diagnostics,
            assembly_diagnostics: assembly.diagnostics,
            suggestions: assembly.suggestions,
            nodes: assembly.touched_nodes.into_iter().collect(),
            created_nodes: assembly.created_nodes.into_iter().collect(),
            relations: assembly.relations.into_iter().collect(),
            attributes: assembly.attributes.into_iter().collect(),
        })
    }

    /// Create a morph on a node, optionally copying another morph
    ///
    /// # Errors
    /// Returns an error if the graph, node or reference morph does not
    /// exist, the morph already exists, or the store fails.
    pub fn create_morph(
        &self,
        session: &Session,
        node_id: &str,
        name: &str,
        copy_from: Option<&str>,
    ) -> StudioResult<String> {
        self.mutate(session, "create_morph", |registry| {
            registry.create_morph(node_id, name, copy_from)
        })
    }

    /// Make a morph the node's active morph
    ///
    /// # Errors
    /// Returns an error if the graph, node or morph does not exist, or the
    /// store fails.
    pub fn set_active_morph(&self, session: &Session, node_id: &str, morph_id: &str) -> StudioResult<()> {
        self.mutate(session, "set_active_morph", |registry| {
            registry.set_active_morph(node_id, morph_id)
        })
    }

    /// Delete a non-default morph
    ///
    /// # Errors
    /// Returns an error for the default morph, a missing graph, node or
    /// morph, or a store failure.
    pub fn delete_morph(&self, session: &Session, node_id: &str, morph_id: &str) -> StudioResult<()> {
        self.mutate(session, "delete_morph", |registry| {
            registry.delete_morph(node_id, morph_id)
        })
    }

    /// Also list a relation or attribute in another morph
    ///
    /// # Errors
    /// Returns an error if the graph, member or morph does not exist, or
    /// the store fails.
    pub fn copy_member(
        &self,
        session: &Session,
        kind: MemberKind,
        member_id: &str,
        to_morph: &str,
    ) -> StudioResult<()> {
        self.mutate(session, "copy_member", |registry| {
            registry.copy_member(kind, member_id, to_morph)
        })
    }

    /// Move a relation or attribute between morphs
    ///
    /// # Errors
    /// Returns an error if the graph, member or either morph does not
    /// exist, or the store fails.
    pub fn move_member(
        &self,
        session: &Session,
        kind: MemberKind,
        member_id: &str,
        from_morph: &str,
        to_morph: &str,
    ) -> StudioResult<()> {
        self.mutate(session, "move_member", |registry| {
            registry.move_member(kind, member_id, from_morph, to_morph)
        })
    }

    /// Remove a relation or attribute from one morph
    ///
    /// # Errors
    /// Returns an error if the graph, member or morph does not exist, or
    /// the store fails.
    pub fn unlist_member(
        &self,
        session: &Session,
        kind: MemberKind,
        member_id: &str,
        morph: &str,
    ) -> StudioResult<()> {
        self.mutate(session, "unlist_member", |registry| {
            registry.unlist_member(kind, member_id, morph)
        })
    }

    /// Delete a node unless relations reference it
    ///
    /// A refusal is returned as [`DeleteOutcome::Blocked`] and changes
    /// nothing. On success the node and its attributes are removed from the
    /// store and from the session's graph.
    ///
    /// # Errors
    /// Returns an error if the graph or node does not exist, or the store
    /// fails.
    pub fn delete_node(&self, session: &Session, node_id: &str) -> StudioResult<DeleteOutcome> {
        let mut graph = self.graph(session)?;
        let mut workspace = self.load_workspace(session)?;

        let outcome = workspace.registry.delete_node(node_id)?;
        if outcome.is_deleted() {
            graph.node_ids.shift_remove(node_id);
            self.commit(session, &mut workspace, &mut graph)?;
            tracing::info!(user = %session.user, graph = %session.graph, node = %node_id, "deleted node");
        }
        Ok(outcome)
    }

    /// Compose both views without persisting them
    ///
    /// # Errors
    /// Returns an error if the graph does not exist or the store fails.
    pub fn views(&self, session: &Session) -> StudioResult<ComposedViews> {
        let graph = self.graph(session)?;
        let workspace = self.load_workspace(session)?;
        Ok(compose(&graph, &workspace.registry))
    }

    fn mutate<T>(
        &self,
        session: &Session,
        operation: &str,
        apply: impl FnOnce(&mut Registry) -> ndf_graph::GraphResult<T>,
    ) -> StudioResult<T> {
        let mut graph = self.graph(session)?;
        let mut workspace = self.load_workspace(session)?;
        let result = apply(&mut workspace.registry)?;
        self.commit(session, &mut workspace, &mut graph)?;
        tracing::info!(user = %session.user, graph = %session.graph, operation, "applied morph operation");
        Ok(result)
    }

    fn load_graph(&self, session: &Session) -> StudioResult<Option<GraphRecord>> {
        Ok(self.store.load_as(&session.graph_key(EntityKind::Graph))?)
    }

    fn load_workspace(&self, session: &Session) -> StudioResult<Workspace> {
        let loaded_index: RegistryIndex = self
            .store
            .load_as(&session.user_key(EntityKind::Registry, REGISTRY_INDEX_ID))?
            .unwrap_or_default();
        let schema: Schema = self
            .store
            .load_as(&session.user_key(EntityKind::Schema, SCHEMA_ID))?
            .unwrap_or_default();

        let registry = Registry {
            nodes: self.load_all(session, EntityKind::Node, &loaded_index.nodes)?,
            relations: self.load_all(session, EntityKind::Relation, &loaded_index.relations)?,
            attributes: self.load_all(session, EntityKind::Attribute, &loaded_index.attributes)?,
        };
        tracing::debug!(
            user = %session.user,
            nodes = registry.nodes.len(),
            relations = registry.relations.len(),
            attributes = registry.attributes.len(),
            "loaded registry"
        );

        Ok(Workspace {
            graphs: loaded_index.graphs.iter().cloned().collect(),
            loaded_registry: registry.clone(),
            loaded_schema: schema.clone(),
            loaded_index,
            registry,
            schema,
        })
    }

    fn load_all<T: DeserializeOwned>(
        &self,
        session: &Session,
        kind: EntityKind,
        ids: &[String],
    ) -> StudioResult<IndexMap<String, T>> {
        ids.iter()
            .map(|id| -> StudioResult<(String, T)> {
                let key = session.record_key(kind, id);
                let record = self
                    .store
                    .load_as(&key)?
                    .ok_or_else(|| StudioError::corrupt(&key, "listed in registry index but missing"))?;
                Ok((id.clone(), record))
            })
            .collect()
    }

    /// Write changed records and the session's graph, then refresh every
    /// other graph of the user when the registry changed
    fn commit(
        &self,
        session: &Session,
        workspace: &mut Workspace,
        graph: &mut GraphRecord,
    ) -> StudioResult<()> {
        let registry = &workspace.registry;
        let loaded = &workspace.loaded_registry;

        let mut written = 0;
        written += self.sync(session, EntityKind::Node, &loaded.nodes, &registry.nodes)?;
        written += self.sync(session, EntityKind::Relation, &loaded.relations, &registry.relations)?;
        written += self.sync(session, EntityKind::Attribute, &loaded.attributes, &registry.attributes)?;

        if workspace.schema != workspace.loaded_schema {
            self.store
                .save_as(&session.user_key(EntityKind::Schema, SCHEMA_ID), &workspace.schema)?;
        }

        graph.node_ids.retain(|id| registry.nodes.contains_key(id));
        graph.modified_at = Utc::now();
        self.save_graph(&session.user, graph, registry)?;

        if written > 0 {
            for other in workspace.graphs.iter().filter(|g| **g != session.graph) {
                self.refresh_graph(&session.user, other, registry)?;
            }
        }

        workspace.graphs.insert(session.graph.clone());
        self.save_index(session, workspace)?;

        tracing::debug!(user = %session.user, graph = %session.graph, records = written, "committed");
        Ok(())
    }

    /// Recompose another graph of the same user, dropping deleted nodes
    fn refresh_graph(&self, user: &str, graph_id: &str, registry: &Registry) -> StudioResult<()> {
        let key = graph_key(user, graph_id, EntityKind::Graph);
        let Some(mut graph) = self.store.load_as::<GraphRecord>(&key)? else {
            tracing::warn!(user = %user, graph = %graph_id, "registry index lists missing graph");
            return Ok(());
        };

        let before = graph.node_ids.len();
        graph.node_ids.retain(|id| registry.nodes.contains_key(id));
        if graph.node_ids.len() != before {
            graph.modified_at = Utc::now();
        }
        self.save_graph(user, &graph, registry)?;

        tracing::debug!(user = %user, graph = %graph_id, "refreshed graph views");
        Ok(())
    }

    fn save_index(&self, session: &Session, workspace: &Workspace) -> StudioResult<()> {
        let index = RegistryIndex::of(&workspace.graphs, &workspace.registry);
        if index != workspace.loaded_index {
            self.store
                .save_as(&session.user_key(EntityKind::Registry, REGISTRY_INDEX_ID), &index)?;
        }
        Ok(())
    }

    /// Save records that differ from what was loaded and remove vanished ones
    fn sync<T: Serialize + PartialEq>(
        &self,
        session: &Session,
        kind: EntityKind,
        before: &IndexMap<String, T>,
        after: &IndexMap<String, T>,
    ) -> StudioResult<usize> {
        let mut count = 0;
        for (id, record) in after {
            if before.get(id) != Some(record) {
                self.store.save_as(&session.record_key(kind, id), record)?;
                count += 1;
            }
        }
        for id in before.keys().filter(|id| !after.contains_key(*id)) {
            self.store.remove(&session.record_key(kind, id))?;
            count += 1;
        }
        Ok(count)
    }

    /// Save a graph record together with both of its views
    fn save_graph(&self, user: &str, graph: &GraphRecord, registry: &Registry) -> StudioResult<()> {
        let views = compose(graph, registry);
        let id = &graph.graph_id;
        self.store
            .save_as(&graph_key(user, id, EntityKind::Composed), &views.flat)?;
        self.store
            .save_as(&graph_key(user, id, EntityKind::PolymorphicComposed), &views.polymorphic)?;
        self.store.save_as(&graph_key(user, id, EntityKind::Graph), graph)?;
        Ok(())
    }
}

fn compose(graph: &GraphRecord, registry: &Registry) -> ComposedViews {
    GraphComposer::compose(
        &graph.graph_id,
        &graph.description,
        graph.node_ids.iter().map(String::as_str),
        registry,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndf_store::MemoryStore;

    fn studio() -> (Studio, Arc<MemoryStore>, Session) {
        let store = Arc::new(MemoryStore::new());
        let studio = Studio::new(StudioConfig::default(), store.clone());
        let session = Session::new("ann", "friends");
        studio.create_graph(&session, "who knows whom").unwrap();
        (studio, store, session)
    }

    #[test]
    fn create_graph_is_idempotent() {
        let (studio, _, session) = studio();
        let first = studio.graph(&session).unwrap();
        let again = studio.create_graph(&session, "other text").unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn ingest_requires_graph() {
        let store = Arc::new(MemoryStore::new());
        let studio = Studio::new(StudioConfig::default(), store);
        let err = studio
            .ingest(&Session::new("ann", "missing"), "# A")
            .unwrap_err();
        assert!(matches!(err, StudioError::GraphNotFound { .. }));
    }

    #[test]
    fn ingest_persists_entities_and_views() {
        let (studio, store, session) = studio();
        let report = studio
            .ingest(&session, "# Alice\n:::cnl\n<knows> Bob\nhas age: 30\n:::")
            .unwrap();

        assert!(report.is_clean());
        assert_eq!(report.nodes, vec!["alice", "bob"]);
        for key in [
            session.record_key(EntityKind::Node, "alice"),
            session.record_key(EntityKind::Node, "bob"),
            session.record_key(EntityKind::Relation, &report.relations[0]),
            session.record_key(EntityKind::Attribute, &report.attributes[0]),
            RecordKey::user("ann", EntityKind::Registry, REGISTRY_INDEX_ID),
            RecordKey::graph("ann", "friends", EntityKind::Composed, "friends"),
            RecordKey::graph("ann", "friends", EntityKind::PolymorphicComposed, "friends"),
        ] {
            assert!(store.load(&key).unwrap().is_some(), "missing {key}");
        }
        assert!(studio.registry(&session).unwrap().dangling_references().is_empty());
    }

    #[test]
    fn define_statements_persist_schema() {
        let (studio, _, session) = studio();
        studio
            .ingest(&session, "define relation 'knows' with inverse 'known_by'.")
            .unwrap();
        assert!(studio.schema(&session).unwrap().has_relation("known_by"));
    }

    #[test]
    fn record_keys_are_valid_for_any_entity_id() {
        let session = Session::new("ann", "g");
        let key = session.record_key(EntityKind::Relation, "a::::likes/loves::b::now/then");
        assert!(key.validate().is_ok());
        assert_eq!(key.id.len(), 64);
        assert_ne!(key, session.record_key(EntityKind::Relation, "a::::likes::b::"));
    }

    #[test]
    fn index_lists_created_graphs() {
        let (studio, store, session) = studio();
        studio.create_graph(&Session::new("ann", "second"), "").unwrap();

        let index: RegistryIndex = store
            .load_as(&session.user_key(EntityKind::Registry, REGISTRY_INDEX_ID))
            .unwrap()
            .unwrap();
        assert_eq!(index.graphs, vec!["friends", "second"]);
    }

    #[test]
    fn missing_listed_record_is_corrupt() {
        let (studio, store, session) = studio();
        studio.ingest(&session, "# Alice").unwrap();
        store
            .remove(&session.record_key(EntityKind::Node, "alice"))
            .unwrap();

        assert!(matches!(
            studio.registry(&session),
            Err(StudioError::CorruptRecord { .. })
        ));
    }
}
