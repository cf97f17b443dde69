//! Editing session controller
//!
//! Owns the active graph together with its history, the connection gesture, the
//! attribute draft and the cache binding. Every accepted operation follows the same
//! path: apply to the graph, record one history entry, write the cache blob, notify
//! observers.

use super::cache::GraphCache;
use crate::aggregate::{ArgumentGraph, GraphSnapshot, GraphState};
use crate::commands::{GraphCommand, GraphError, GraphResult};
use crate::config::EditorConfig;
use crate::conversion::{self, AifDocument, ArguebufDocument, DocumentFormat};
use crate::demo::demo_graph;
use crate::events::{GraphEvent, NodeMoved, NodeUpdated};
use crate::history::History;
use crate::identifiers::{IdGenerator, NodeId};
use crate::interaction::{
    apply_plan, AttributeDraft, Connection, EdgeCreationPolicy, GestureEvent, GestureState,
};
use crate::projections::{GraphObserver, RenderPayload};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Where a pending replacement graph came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetSource {
    Import(DocumentFormat),
    Empty,
    Demo,
}

/// A fully built replacement graph waiting for confirmation.
///
/// Nothing in the session changes until it is passed to
/// [`SessionController::reset_graph`]; dropping it cancels the reset.
#[derive(Debug)]
pub struct PendingReset {
    graph: ArgumentGraph,
    source: ResetSource,
}

impl PendingReset {
    pub fn source(&self) -> ResetSource {
        self.source
    }

    /// The graph that would be installed
    pub fn graph(&self) -> &GraphState {
        self.graph.state()
    }
}

/// Controller of one editing session
pub struct SessionController {
    config: EditorConfig,
    cache: Arc<dyn GraphCache>,
    graph: ArgumentGraph,
    history: History,
    policy: EdgeCreationPolicy,
    draft: Option<AttributeDraft>,
    observers: Vec<Arc<dyn GraphObserver>>,
}

impl SessionController {
    /// Create a session with an empty graph; call [`Self::load_graph`] to restore the cache
    pub fn new(config: EditorConfig, cache: Arc<dyn GraphCache>) -> Self {
        let graph = ArgumentGraph::new(IdGenerator::from(config.id_strategy));
        let history = History::new(graph.snapshot(), config.history_limit);
        Self {
            config,
            cache,
            graph,
            history,
            policy: EdgeCreationPolicy::new(),
            draft: None,
            observers: Vec::new(),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The active graph
    pub fn graph(&self) -> &GraphState {
        self.graph.state()
    }

    pub fn subscribe(&mut self, observer: Arc<dyn GraphObserver>) {
        self.observers.push(observer);
    }

    pub fn render_payload(&self) -> RenderPayload {
        RenderPayload::from_state(self.graph.state())
    }

    /// Restore the cached graph, or start empty when there is none
    pub async fn load_graph(&mut self) -> GraphResult<RenderPayload> {
        let blob = match self.cache.get(&self.config.cache_key).await {
            Ok(blob) => blob,
            Err(err) => {
                tracing::warn!(error = %err, "Cache read failed, starting with an empty graph");
                None
            }
        };

        let graph = match blob {
            Some(blob) => match conversion::import_bytes(blob.as_bytes(), self.fresh_ids()) {
                Ok(graph) => graph,
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        "Cached graph is unreadable, starting with an empty graph"
                    );
                    ArgumentGraph::new(self.fresh_ids())
                }
            },
            None => ArgumentGraph::new(self.fresh_ids()),
        };

        tracing::info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Session graph loaded"
        );
        self.install(graph);
        self.notify(&[self.replaced_event()]);
        Ok(self.render_payload())
    }

    /// Apply one structural or attribute command as one history entry
    pub async fn execute(&mut self, command: GraphCommand) -> GraphResult<Vec<GraphEvent>> {
        let events = self.apply(command)?;
        self.commit(&events).await;
        Ok(events)
    }

    fn apply(&mut self, command: GraphCommand) -> GraphResult<Vec<GraphEvent>> {
        match command {
            GraphCommand::AddAtom { text, position } => {
                let text = text.unwrap_or_else(|| self.config.default_atom_text.clone());
                let atom = self.graph.add_atom_at(text, position)?;
                Ok(vec![GraphEvent::node_added(
                    &atom.id,
                    crate::aggregate::NodeKind::Atom,
                    position,
                )])
            }

            GraphCommand::AddScheme {
                scheme_type,
                position,
            } => {
                let scheme = self.graph.add_scheme_at(scheme_type, position)?;
                Ok(vec![GraphEvent::node_added(
                    &scheme.id,
                    crate::aggregate::NodeKind::Scheme,
                    position,
                )])
            }

            GraphCommand::RemoveElement { id } => {
                let removal = self.graph.remove_element(&id)?;
                let drafted_removed = self.draft.as_ref().is_some_and(|draft| {
                    removal.nodes.iter().any(|node| node.id() == draft.node_id())
                });
                if drafted_removed {
                    self.draft = None;
                }
                Ok(GraphEvent::removed(&removal))
            }

            GraphCommand::MoveNode { id, position } => {
                self.graph.move_node(&id, position)?;
                Ok(vec![GraphEvent::NodeMoved(NodeMoved {
                    node_id: id,
                    position,
                })])
            }

            GraphCommand::UpdateNode { id, patch } => {
                let node = self.graph.update_node(&id, patch)?.clone();
                Ok(vec![GraphEvent::NodeUpdated(NodeUpdated { node_id: id, node })])
            }

            GraphCommand::SetMajorClaim { id } => {
                self.graph.set_major_claim(id.as_ref())?;
                Ok(vec![GraphEvent::MajorClaimChanged { node_id: id }])
            }
        }
    }

    /// Feed a pointer event to the connection gesture; a completed connection is
    /// applied as one history entry
    pub async fn gesture(&mut self, event: GestureEvent) -> GraphResult<Option<Connection>> {
        let Some(plan) = self.policy.handle(event, self.graph.state()) else {
            return Ok(None);
        };
        let Some(connection) = apply_plan(&mut self.graph, plan, self.config.connection_scheme)?
        else {
            return Ok(None);
        };

        let mut events = Vec::with_capacity(3);
        if let Some(scheme) = &connection.scheme {
            events.push(GraphEvent::node_added(
                &scheme.id,
                crate::aggregate::NodeKind::Scheme,
                self.graph.position(&scheme.id),
            ));
        }
        events.extend(connection.edges.iter().map(GraphEvent::edge_added));

        self.commit(&events).await;
        Ok(Some(connection))
    }

    pub fn gesture_state(&self) -> &GestureState {
        self.policy.state()
    }

    /// Start editing the attributes of one node, dropping any previous draft
    pub fn select(&mut self, id: &NodeId) -> GraphResult<&mut AttributeDraft> {
        let node = self
            .graph
            .node(id)
            .ok_or_else(|| GraphError::ElementNotFound(id.to_string()))?;
        Ok(self.draft.insert(AttributeDraft::new(node)))
    }

    pub fn draft(&self) -> Option<&AttributeDraft> {
        self.draft.as_ref()
    }

    pub fn draft_mut(&mut self) -> Option<&mut AttributeDraft> {
        self.draft.as_mut()
    }

    /// Commit the draft as a single update; a clean or missing draft changes nothing
    pub async fn save_draft(&mut self) -> GraphResult<Vec<GraphEvent>> {
        let Some(draft) = self.draft.take() else {
            return Ok(Vec::new());
        };
        if !draft.is_dirty() {
            return Ok(Vec::new());
        }

        let id = draft.node_id().clone();
        self.execute(GraphCommand::UpdateNode {
            id,
            patch: draft.into_patch(),
        })
        .await
    }

    pub fn discard_draft(&mut self) {
        self.draft = None;
    }

    /// Step back one history entry; `false` when there is nothing to undo
    pub async fn undo(&mut self) -> bool {
        if !self.history.undo(&mut self.graph) {
            return false;
        }
        self.after_history_step().await;
        true
    }

    /// Step forward one history entry; `false` when there is nothing to redo
    pub async fn redo(&mut self) -> bool {
        if !self.history.redo(&mut self.graph) {
            return false;
        }
        self.after_history_step().await;
        true
    }

    pub fn undoable(&self) -> bool {
        self.history.undoable()
    }

    pub fn redoable(&self) -> bool {
        self.history.redoable()
    }

    /// Parse an uploaded file into a replacement graph
    pub fn prepare_import(&self, bytes: &[u8]) -> GraphResult<PendingReset> {
        let document: serde_json::Value = std::str::from_utf8(bytes)
            .map_err(|_| crate::commands::ImportError::InvalidUtf8)
            .and_then(|text| serde_json::from_str(text).map_err(Into::into))?;
        let format = DocumentFormat::detect(&document)?;
        let graph = conversion::import_as(&document, format, self.fresh_ids())?;
        Ok(PendingReset {
            graph,
            source: ResetSource::Import(format),
        })
    }

    pub fn prepare_empty(&self) -> PendingReset {
        PendingReset {
            graph: ArgumentGraph::new(self.fresh_ids()),
            source: ResetSource::Empty,
        }
    }

    pub fn prepare_demo(&self) -> GraphResult<PendingReset> {
        Ok(PendingReset {
            graph: demo_graph(self.fresh_ids())?,
            source: ResetSource::Demo,
        })
    }

    /// Swap in a confirmed replacement graph and start its history afresh
    pub async fn reset_graph(&mut self, pending: PendingReset) -> RenderPayload {
        tracing::info!(
            source = ?pending.source,
            nodes = pending.graph.node_count(),
            edges = pending.graph.edge_count(),
            "Session graph replaced"
        );
        self.install(pending.graph);
        self.persist().await;
        self.notify(&[self.replaced_event()]);
        self.render_payload()
    }

    /// Immutable copy of the active graph
    pub fn export_state(&self) -> GraphSnapshot {
        self.graph.snapshot()
    }

    pub fn export_aif(&self) -> AifDocument {
        conversion::export_aif(self.graph.state())
    }

    pub fn export_arguebuf(&self) -> ArguebufDocument {
        conversion::export_arguebuf(self.graph.state())
    }

    /// Pretty-printed document in `format`
    pub fn export_json(&self, format: DocumentFormat) -> GraphResult<String> {
        conversion::export_json(self.graph.state(), format)
    }

    /// File name for an export made now
    pub fn export_filename(&self) -> String {
        export_filename(Utc::now())
    }

    /// Drop the cached blob; the active graph is left alone
    pub async fn clear_cache(&self) -> GraphResult<()> {
        self.cache.clear(&self.config.cache_key).await?;
        tracing::info!(key = %self.config.cache_key, "Graph cache cleared");
        Ok(())
    }

    fn fresh_ids(&self) -> IdGenerator {
        IdGenerator::from(self.config.id_strategy)
    }

    fn install(&mut self, graph: ArgumentGraph) {
        self.graph = graph;
        self.history.reset(self.graph.snapshot());
        self.policy.reset();
        self.draft = None;
    }

    fn replaced_event(&self) -> GraphEvent {
        GraphEvent::GraphReplaced {
            node_count: self.graph.node_count(),
            edge_count: self.graph.edge_count(),
        }
    }

    async fn commit(&mut self, events: &[GraphEvent]) {
        self.history.record(self.graph.snapshot());
        self.persist().await;
        self.notify(events);
    }

    async fn after_history_step(&mut self) {
        self.draft = None;
        self.policy.reset();
        self.persist().await;
        let event = GraphEvent::HistoryRestored {
            undo_depth: self.history.undo_depth(),
            redo_depth: self.history.redo_depth(),
        };
        self.notify(&[event]);
    }

    async fn persist(&self) {
        let blob = match serde_json::to_string(&self.export_arguebuf()) {
            Ok(blob) => blob,
            Err(err) => {
                tracing::warn!(error = %err, "Could not serialize graph for the cache");
                return;
            }
        };
        if let Err(err) = self.cache.set(&self.config.cache_key, blob).await {
            tracing::warn!(error = %err, "Could not write graph to the cache");
        }
    }

    fn notify(&self, events: &[GraphEvent]) {
        for observer in &self.observers {
            observer.graph_changed(events, self.graph.state());
        }
    }
}

/// `yyyy-MM-dd-HH-mm-ss.json`
pub fn export_filename(at: DateTime<Utc>) -> String {
    format!("{}.json", at.format("%Y-%m-%d-%H-%M-%S"))
}
