//! Argument Graph Aggregate
//!
//! The canonical in-memory argument graph: atoms and schemes joined by directed edges,
//! plus graph-level metadata and layout positions. [`GraphState`] is the plain data and
//! answers every query; [`ArgumentGraph`] owns a state together with its identifier
//! source and is the only place mutations happen.
//!
//! After every completed mutation:
//! - node and edge ids are unique across both maps,
//! - every edge endpoint resolves to a node,
//! - no edge joins two atoms.

use crate::aggregate::node::{Atom, Edge, ElementRef, Node, NodeKind, NodePatch, Scheme};
use crate::aggregate::validation::ValidationReport;
use crate::commands::{GraphError, GraphResult};
use crate::identifiers::{EdgeId, IdGenerator, NodeId};
use crate::value_objects::{Metadata, Position2D, Resource, SchemeType, Timestamps};
use indexmap::IndexMap;
use petgraph::graph::DiGraph;
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::sync::Arc;

/// Graph-level annotations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphMeta {
    pub timestamps: Timestamps,
    /// The atom holding the central claim, if one was chosen
    pub major_claim: Option<NodeId>,
    /// Source documents referenced by atoms
    pub resources: IndexMap<String, Resource>,
    pub userdata: Metadata,
}

impl Default for GraphMeta {
    fn default() -> Self {
        Self {
            timestamps: Timestamps::now(),
            major_claim: None,
            resources: IndexMap::new(),
            userdata: Metadata::new(),
        }
    }
}

/// Plain graph data with all structural queries
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GraphState {
    pub meta: GraphMeta,
    nodes: IndexMap<NodeId, Node>,
    edges: IndexMap<EdgeId, Edge>,
    positions: IndexMap<NodeId, Position2D>,
}

impl GraphState {
    /// Get a node by id
    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Get an edge by id
    pub fn edge(&self, id: &EdgeId) -> Option<&Edge> {
        self.edges.get(id)
    }

    /// Resolve a raw id to whichever element carries it
    pub fn element(&self, id: &str) -> Option<ElementRef<'_>> {
        if let Some(node) = self.nodes.get(&NodeId::from(id)) {
            return Some(ElementRef::Node(node));
        }
        self.edges.get(&EdgeId::from(id)).map(ElementRef::Edge)
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// All edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    pub fn atoms(&self) -> impl Iterator<Item = &Atom> {
        self.nodes.values().filter_map(Node::as_atom)
    }

    pub fn schemes(&self) -> impl Iterator<Item = &Scheme> {
        self.nodes.values().filter_map(Node::as_scheme)
    }

    pub fn node_kind(&self, id: &NodeId) -> Option<NodeKind> {
        self.nodes.get(id).map(Node::kind)
    }

    /// Get incoming edges for a node
    pub fn incoming_edges(&self, node_id: &NodeId) -> Vec<&Edge> {
        self.edges.values().filter(|edge| &edge.target == node_id).collect()
    }

    /// Get outgoing edges for a node
    pub fn outgoing_edges(&self, node_id: &NodeId) -> Vec<&Edge> {
        self.edges.values().filter(|edge| &edge.source == node_id).collect()
    }

    /// Edges with `node_id` at either end
    pub fn incident_edges(&self, node_id: &NodeId) -> Vec<&Edge> {
        self.edges.values().filter(|edge| edge.touches(node_id)).collect()
    }

    /// Whether an edge `source -> target` already exists
    pub fn has_edge(&self, source: &NodeId, target: &NodeId) -> bool {
        self.edges
            .values()
            .any(|edge| &edge.source == source && &edge.target == target)
    }

    pub fn position(&self, id: &NodeId) -> Option<Position2D> {
        self.positions.get(id).copied()
    }

    pub fn positions(&self) -> impl Iterator<Item = (&NodeId, &Position2D)> {
        self.positions.iter()
    }

    /// Whether any node or edge already uses `id`
    pub fn contains_id(&self, id: &str) -> bool {
        self.nodes.contains_key(&NodeId::from(id)) || self.edges.contains_key(&EdgeId::from(id))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check the structural invariants and flag incomplete schemes
    pub fn validate(&self) -> ValidationReport {
        ValidationReport::inspect(self)
    }

    /// Whether both graphs hold the same content under some relabeling of ids.
    ///
    /// Nodes match when their kind, content (text, reference and metadata for atoms; type,
    /// argumentation scheme and metadata for schemes) and position are equal. Ids and
    /// timestamps are not compared.
    pub fn is_isomorphic_to(&self, other: &GraphState) -> bool {
        if self.node_count() != other.node_count() || self.edge_count() != other.edge_count() {
            return false;
        }
        let left = self.to_petgraph();
        let right = other.to_petgraph();
        petgraph::algo::is_isomorphic_matching(
            &left,
            &right,
            |a, b| content_eq(a, b) && self.position(a.id()) == other.position(b.id()),
            |_, _| true,
        )
    }

    /// Store a node without structural checks beyond id uniqueness
    pub(crate) fn push_node(&mut self, node: Node) -> GraphResult<()> {
        let id = node.id().clone();
        if self.contains_id(id.as_str()) {
            return Err(GraphError::DuplicateId(id.to_string()));
        }
        self.nodes.insert(id, node);
        Ok(())
    }

    /// Store an edge without endpoint checks; callers validate afterwards
    pub(crate) fn push_edge(&mut self, edge: Edge) -> GraphResult<()> {
        if self.contains_id(edge.id.as_str()) {
            return Err(GraphError::DuplicateId(edge.id.to_string()));
        }
        self.edges.insert(edge.id.clone(), edge);
        Ok(())
    }

    pub(crate) fn place(&mut self, id: NodeId, position: Position2D) {
        self.positions.insert(id, position);
    }

    /// Project into a petgraph digraph carrying the node records as weights
    pub fn to_petgraph(&self) -> DiGraph<&Node, ()> {
        let mut graph = DiGraph::with_capacity(self.nodes.len(), self.edges.len());
        let indices: IndexMap<&NodeId, _> = self
            .nodes
            .iter()
            .map(|(id, node)| (id, graph.add_node(node)))
            .collect();
        for edge in self.edges.values() {
            if let (Some(&source), Some(&target)) =
                (indices.get(&edge.source), indices.get(&edge.target))
            {
                graph.add_edge(source, target, ());
            }
        }
        graph
    }
}

fn content_eq(a: &Node, b: &Node) -> bool {
    match (a, b) {
        (Node::Atom(a), Node::Atom(b)) => {
            a.text == b.text && a.reference == b.reference && a.metadata == b.metadata
        }
        (Node::Scheme(a), Node::Scheme(b)) => {
            a.scheme_type == b.scheme_type
                && a.argumentation_scheme == b.argumentation_scheme
                && a.metadata == b.metadata
        }
        _ => false,
    }
}

/// Immutable, cheaply clonable copy of a graph state
#[derive(Debug, Clone, PartialEq)]
pub struct GraphSnapshot(Arc<GraphState>);

impl GraphSnapshot {
    pub fn state(&self) -> &GraphState {
        &self.0
    }
}

impl Deref for GraphSnapshot {
    type Target = GraphState;

    fn deref(&self) -> &GraphState {
        &self.0
    }
}

impl From<GraphState> for GraphSnapshot {
    fn from(state: GraphState) -> Self {
        Self(Arc::new(state))
    }
}

/// What a removal took out of the graph
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Removal {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// The mutable argument graph of an editing session
#[derive(Debug, Clone)]
pub struct ArgumentGraph {
    state: GraphState,
    ids: IdGenerator,
}

impl Default for ArgumentGraph {
    fn default() -> Self {
        Self::new(IdGenerator::default())
    }
}

impl Deref for ArgumentGraph {
    type Target = GraphState;

    fn deref(&self) -> &GraphState {
        &self.state
    }
}

impl ArgumentGraph {
    /// Create an empty graph
    pub fn new(ids: IdGenerator) -> Self {
        Self {
            state: GraphState::default(),
            ids,
        }
    }

    /// Build a graph from existing data, checking invariants 1-4
    pub fn from_state(state: GraphState, ids: IdGenerator) -> GraphResult<Self> {
        let report = state.validate();
        if let Some(error) = report.first_error() {
            return Err(error);
        }
        Ok(Self { state, ids })
    }

    pub fn state(&self) -> &GraphState {
        &self.state
    }

    /// Take an immutable copy of the current state
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot::from(self.state.clone())
    }

    /// Replace the current state with a snapshot
    pub fn restore(&mut self, snapshot: &GraphSnapshot) {
        self.state = snapshot.state().clone();
        tracing::debug!(
            nodes = self.state.node_count(),
            edges = self.state.edge_count(),
            "Graph restored from snapshot"
        );
    }

    /// Add an atom at the origin
    pub fn add_atom(&mut self, text: impl Into<String>) -> GraphResult<Atom> {
        self.add_atom_at(text, None)
    }

    /// Add an atom, optionally placing it
    pub fn add_atom_at(
        &mut self,
        text: impl Into<String>,
        position: Option<Position2D>,
    ) -> GraphResult<Atom> {
        let id = self.fresh_node_id();
        let atom = Atom::new(id, text);
        self.insert_node(Node::Atom(atom.clone()), position)?;
        Ok(atom)
    }

    /// Add a scheme at the origin
    pub fn add_scheme(&mut self, scheme_type: Option<SchemeType>) -> GraphResult<Scheme> {
        self.add_scheme_at(scheme_type, None)
    }

    /// Add a scheme, optionally placing it
    pub fn add_scheme_at(
        &mut self,
        scheme_type: Option<SchemeType>,
        position: Option<Position2D>,
    ) -> GraphResult<Scheme> {
        let id = self.fresh_node_id();
        let scheme = Scheme::new(id, scheme_type.unwrap_or_default());
        self.insert_node(Node::Scheme(scheme.clone()), position)?;
        Ok(scheme)
    }

    /// Insert a fully built node; its id must be new to the graph
    pub fn insert_node(&mut self, node: Node, position: Option<Position2D>) -> GraphResult<()> {
        let id = node.id().clone();
        let kind = node.kind();
        self.state.push_node(node)?;

        tracing::debug!(node_id = %id, kind = ?kind, "Node added");
        if let Some(position) = position {
            self.state.place(id, position);
        }
        self.state.meta.timestamps.touch();
        Ok(())
    }

    /// Connect two nodes.
    ///
    /// Both endpoints must exist and at most one of them may be an atom.
    pub fn add_edge(&mut self, source: &NodeId, target: &NodeId) -> GraphResult<Edge> {
        self.check_edge(source, target)?;
        let id = self.fresh_edge_id();
        let edge = Edge::new(id, source.clone(), target.clone());
        self.insert_edge(edge.clone())?;
        Ok(edge)
    }

    /// Check that `source -> target` would be a legal edge without adding it
    pub fn check_edge(&self, source: &NodeId, target: &NodeId) -> GraphResult<()> {
        let source_kind = self.endpoint_kind(source)?;
        let target_kind = self.endpoint_kind(target)?;
        if source_kind == NodeKind::Atom && target_kind == NodeKind::Atom {
            return Err(GraphError::InvalidEdge {
                from: source.clone(),
                to: target.clone(),
            });
        }
        Ok(())
    }

    fn endpoint_kind(&self, id: &NodeId) -> GraphResult<NodeKind> {
        self.state
            .node_kind(id)
            .ok_or_else(|| GraphError::DanglingReference {
                edge: "(new)".to_string(),
                node: id.to_string(),
            })
    }

    fn insert_edge(&mut self, edge: Edge) -> GraphResult<()> {
        tracing::debug!(
            edge_id = %edge.id,
            source = %edge.source,
            target = %edge.target,
            "Edge added"
        );
        self.state.push_edge(edge)?;
        self.state.meta.timestamps.touch();
        Ok(())
    }

    /// Remove a node (with every edge touching it) or a single edge
    pub fn remove_element(&mut self, id: &str) -> GraphResult<Removal> {
        let node_id = NodeId::from(id);
        if let Some(node) = self.state.nodes.shift_remove(&node_id) {
            let connected: Vec<EdgeId> = self
                .state
                .edges
                .values()
                .filter(|edge| edge.touches(&node_id))
                .map(|edge| edge.id.clone())
                .collect();

            let mut removal = Removal {
                nodes: vec![node],
                edges: Vec::with_capacity(connected.len()),
            };
            for edge_id in connected {
                if let Some(edge) = self.state.edges.shift_remove(&edge_id) {
                    removal.edges.push(edge);
                }
            }

            self.state.positions.shift_remove(&node_id);
            if self.state.meta.major_claim.as_ref() == Some(&node_id) {
                self.state.meta.major_claim = None;
            }
            self.state.meta.timestamps.touch();
            tracing::debug!(node_id = %node_id, cascaded = removal.edges.len(), "Node removed");
            return Ok(removal);
        }

        let edge_id = EdgeId::from(id);
        if let Some(edge) = self.state.edges.shift_remove(&edge_id) {
            self.state.meta.timestamps.touch();
            tracing::debug!(edge_id = %edge_id, "Edge removed");
            return Ok(Removal {
                nodes: Vec::new(),
                edges: vec![edge],
            });
        }

        Err(GraphError::ElementNotFound(id.to_string()))
    }

    /// Apply a partial attribute update to one node
    pub fn update_node(&mut self, id: &NodeId, patch: NodePatch) -> GraphResult<&Node> {
        let node = self
            .state
            .nodes
            .get_mut(id)
            .ok_or_else(|| GraphError::ElementNotFound(id.to_string()))?;
        node.apply(patch)?;
        self.state.meta.timestamps.touch();
        tracing::debug!(node_id = %id, "Node updated");
        Ok(&self.state.nodes[id])
    }

    /// Reposition a node
    pub fn move_node(&mut self, id: &NodeId, position: Position2D) -> GraphResult<()> {
        if !self.state.nodes.contains_key(id) {
            return Err(GraphError::ElementNotFound(id.to_string()));
        }
        self.state.place(id.clone(), position);
        tracing::debug!(node_id = %id, x = position.x, y = position.y, "Node moved");
        Ok(())
    }

    /// Choose the atom that holds the central claim
    pub fn set_major_claim(&mut self, id: Option<&NodeId>) -> GraphResult<()> {
        if let Some(id) = id {
            match self.state.node_kind(id) {
                Some(NodeKind::Atom) => {}
                Some(NodeKind::Scheme) => {
                    return Err(GraphError::KindMismatch {
                        id: id.to_string(),
                        expected: "an atom",
                    })
                }
                None => return Err(GraphError::ElementNotFound(id.to_string())),
            }
        }
        self.state.meta.major_claim = id.cloned();
        self.state.meta.timestamps.touch();
        Ok(())
    }

    /// Attach a free-form value to the graph itself
    pub fn set_userdata_entry(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.state.meta.userdata.insert(key.into(), value);
        self.state.meta.timestamps.touch();
    }

    /// Register a source document atoms can reference
    pub fn add_resource(&mut self, key: impl Into<String>, resource: Resource) {
        self.state.meta.resources.insert(key.into(), resource);
        self.state.meta.timestamps.touch();
    }

    pub(crate) fn fresh_node_id(&mut self) -> NodeId {
        let state = &self.state;
        self.ids.next_free_node_id(|candidate| state.contains_id(candidate))
    }

    pub(crate) fn fresh_edge_id(&mut self) -> EdgeId {
        let state = &self.state;
        self.ids.next_free_edge_id(|candidate| state.contains_id(candidate))
    }
}
