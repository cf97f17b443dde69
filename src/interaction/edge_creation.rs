//! Edge creation gestures
//!
//! Dragging a connection from one node to another is turned into a structural edit
//! here. Two atoms are never joined directly: a scheme is synthesized between them.

use crate::aggregate::{ArgumentGraph, Edge, GraphState, NodeKind, Scheme};
use crate::commands::GraphResult;
use crate::identifiers::NodeId;
use crate::value_objects::{Position2D, SchemeType};
use serde::{Deserialize, Serialize};

/// Where the connection gesture currently is
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum GestureState {
    #[default]
    Idle,
    /// Pointer rests over a node that could start a connection
    CandidateHover(NodeId),
    /// A connection is being dragged out of the source node
    Connecting(NodeId),
}

/// Pointer input forwarded by the rendering collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GestureEvent {
    PointerEnter(NodeId),
    PointerLeave,
    /// A node was grabbed for repositioning
    NodeGrabbed,
    /// The canvas was panned or zoomed
    ViewportChanged,
    DragStart(NodeId),
    /// The drag ended, over `target` or over empty canvas
    Release { target: Option<NodeId> },
    Cancel,
}

/// Why a completed gesture produced no edit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    SelfLoop,
    DuplicateEdge,
    MissingNode,
}

/// The structural edit a completed gesture asks for
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectionPlan {
    /// One edge `source -> target`
    Direct { source: NodeId, target: NodeId },
    /// A new scheme at `position` plus edges `source -> scheme -> target`
    ViaScheme {
        source: NodeId,
        target: NodeId,
        position: Position2D,
    },
    Rejected { reason: RejectReason },
}

/// What [`apply_plan`] added to the graph
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    /// The synthesized scheme, for atom-to-atom connections
    pub scheme: Option<Scheme>,
    pub edges: Vec<Edge>,
}

/// Gesture state machine for one canvas
#[derive(Debug, Clone, Default)]
pub struct EdgeCreationPolicy {
    state: GestureState,
}

impl EdgeCreationPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    /// Feed one pointer event; a plan is returned only when a connection completes
    pub fn handle(&mut self, event: GestureEvent, graph: &GraphState) -> Option<ConnectionPlan> {
        let state = std::mem::take(&mut self.state);
        let (next, plan) = match (state, event) {
            (GestureState::Connecting(source), GestureEvent::Release { target: Some(target) }) => {
                (GestureState::Idle, Some(plan_connection(graph, &source, &target)))
            }
            (GestureState::Connecting(_), GestureEvent::Release { target: None })
            | (GestureState::Connecting(_), GestureEvent::Cancel)
            | (GestureState::Connecting(_), GestureEvent::ViewportChanged) => {
                (GestureState::Idle, None)
            }
            (connecting @ GestureState::Connecting(_), _) => (connecting, None),

            (_, GestureEvent::DragStart(source)) => (GestureState::Connecting(source), None),
            (_, GestureEvent::PointerEnter(node)) => (GestureState::CandidateHover(node), None),
            (_, GestureEvent::PointerLeave)
            | (_, GestureEvent::NodeGrabbed)
            | (_, GestureEvent::ViewportChanged)
            | (_, GestureEvent::Release { .. })
            | (_, GestureEvent::Cancel) => (GestureState::Idle, None),
        };

        self.state = next;
        plan
    }

    /// Abandon any gesture in progress
    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
    }
}

/// Decide what connecting `source` to `target` should do
pub fn plan_connection(graph: &GraphState, source: &NodeId, target: &NodeId) -> ConnectionPlan {
    if source == target {
        return ConnectionPlan::Rejected {
            reason: RejectReason::SelfLoop,
        };
    }

    let (Some(source_kind), Some(target_kind)) = (graph.node_kind(source), graph.node_kind(target))
    else {
        return ConnectionPlan::Rejected {
            reason: RejectReason::MissingNode,
        };
    };

    if source_kind == NodeKind::Atom && target_kind == NodeKind::Atom {
        let from = graph.position(source).unwrap_or_default();
        let to = graph.position(target).unwrap_or_default();
        return ConnectionPlan::ViaScheme {
            source: source.clone(),
            target: target.clone(),
            position: from.midpoint(&to),
        };
    }

    if graph.has_edge(source, target) {
        return ConnectionPlan::Rejected {
            reason: RejectReason::DuplicateEdge,
        };
    }

    ConnectionPlan::Direct {
        source: source.clone(),
        target: target.clone(),
    }
}

/// Carry out a plan as one unit.
///
/// On any failure the graph is put back exactly as it was. Rejected plans return
/// `Ok(None)` without touching the graph.
pub fn apply_plan(
    graph: &mut ArgumentGraph,
    plan: ConnectionPlan,
    scheme_type: SchemeType,
) -> GraphResult<Option<Connection>> {
    match plan {
        ConnectionPlan::Rejected { reason } => {
            tracing::debug!(?reason, "Connection rejected");
            Ok(None)
        }
        ConnectionPlan::Direct { source, target } => {
            let edge = graph.add_edge(&source, &target)?;
            Ok(Some(Connection {
                scheme: None,
                edges: vec![edge],
            }))
        }
        ConnectionPlan::ViaScheme {
            source,
            target,
            position,
        } => {
            let rollback = graph.snapshot();
            let result = connect_via_scheme(graph, &source, &target, position, scheme_type);
            if result.is_err() {
                graph.restore(&rollback);
            }
            result.map(Some)
        }
    }
}

fn connect_via_scheme(
    graph: &mut ArgumentGraph,
    source: &NodeId,
    target: &NodeId,
    position: Position2D,
    scheme_type: SchemeType,
) -> GraphResult<Connection> {
    let scheme = graph.add_scheme_at(Some(scheme_type), Some(position))?;
    let incoming = graph.add_edge(source, &scheme.id)?;
    let outgoing = graph.add_edge(&scheme.id, target)?;
    Ok(Connection {
        scheme: Some(scheme),
        edges: vec![incoming, outgoing],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::IdGenerator;

    fn graph_with_atoms() -> (ArgumentGraph, NodeId, NodeId) {
        let mut graph = ArgumentGraph::new(IdGenerator::sequential());
        let a = graph
            .add_atom_at("A", Some(Position2D::new(0.0, 0.0)))
            .unwrap();
        let b = graph
            .add_atom_at("B", Some(Position2D::new(100.0, 50.0)))
            .unwrap();
        (graph, a.id, b.id)
    }

    #[test]
    fn test_drag_and_release_yields_plan() {
        let (graph, a, b) = graph_with_atoms();
        let mut policy = EdgeCreationPolicy::new();

        assert_eq!(policy.handle(GestureEvent::PointerEnter(a.clone()), &graph), None);
        assert_eq!(policy.state(), &GestureState::CandidateHover(a.clone()));
        assert_eq!(policy.handle(GestureEvent::DragStart(a.clone()), &graph), None);
        assert_eq!(policy.state(), &GestureState::Connecting(a.clone()));

        let plan = policy.handle(GestureEvent::Release { target: Some(b.clone()) }, &graph);
        assert_eq!(
            plan,
            Some(ConnectionPlan::ViaScheme {
                source: a,
                target: b,
                position: Position2D::new(50.0, 25.0),
            })
        );
        assert_eq!(policy.state(), &GestureState::Idle);
    }

    #[test]
    fn test_release_over_canvas_cancels() {
        let (graph, a, _) = graph_with_atoms();
        let mut policy = EdgeCreationPolicy::new();
        policy.handle(GestureEvent::DragStart(a), &graph);

        assert_eq!(policy.handle(GestureEvent::Release { target: None }, &graph), None);
        assert_eq!(policy.state(), &GestureState::Idle);
    }

    #[test]
    fn test_grab_and_viewport_clear_candidate() {
        let (graph, a, _) = graph_with_atoms();
        let mut policy = EdgeCreationPolicy::new();

        policy.handle(GestureEvent::PointerEnter(a.clone()), &graph);
        policy.handle(GestureEvent::NodeGrabbed, &graph);
        assert_eq!(policy.state(), &GestureState::Idle);

        policy.handle(GestureEvent::PointerEnter(a), &graph);
        policy.handle(GestureEvent::ViewportChanged, &graph);
        assert_eq!(policy.state(), &GestureState::Idle);
    }

    #[test]
    fn test_hover_while_connecting_keeps_source() {
        let (graph, a, b) = graph_with_atoms();
        let mut policy = EdgeCreationPolicy::new();
        policy.handle(GestureEvent::DragStart(a.clone()), &graph);
        policy.handle(GestureEvent::PointerEnter(b), &graph);

        assert_eq!(policy.state(), &GestureState::Connecting(a));
    }

    #[test]
    fn test_self_loop_and_missing_node_rejected() {
        let (graph, a, _) = graph_with_atoms();
        assert_eq!(
            plan_connection(&graph, &a, &a),
            ConnectionPlan::Rejected {
                reason: RejectReason::SelfLoop
            }
        );
        assert_eq!(
            plan_connection(&graph, &a, &NodeId::from("ghost")),
            ConnectionPlan::Rejected {
                reason: RejectReason::MissingNode
            }
        );
    }

    #[test]
    fn test_atom_pair_synthesizes_scheme() {
        let (mut graph, a, b) = graph_with_atoms();
        let plan = plan_connection(&graph, &a, &b);

        let connection = apply_plan(&mut graph, plan, SchemeType::Support)
            .unwrap()
            .unwrap();
        let scheme = connection.scheme.unwrap();
        assert_eq!(scheme.scheme_type, SchemeType::Support);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        assert!(graph.has_edge(&a, &scheme.id));
        assert!(graph.has_edge(&scheme.id, &b));
        assert_eq!(graph.position(&scheme.id), Some(Position2D::new(50.0, 25.0)));
    }

    #[test]
    fn test_atom_to_scheme_is_direct_and_duplicate_rejected() {
        let (mut graph, a, _) = graph_with_atoms();
        let scheme = graph.add_scheme(None).unwrap();

        let plan = plan_connection(&graph, &a, &scheme.id);
        assert!(matches!(plan, ConnectionPlan::Direct { .. }));
        let connection = apply_plan(&mut graph, plan, SchemeType::Support)
            .unwrap()
            .unwrap();
        assert_eq!(connection.edges.len(), 1);
        assert!(connection.scheme.is_none());

        assert_eq!(
            plan_connection(&graph, &a, &scheme.id),
            ConnectionPlan::Rejected {
                reason: RejectReason::DuplicateEdge
            }
        );
    }

    #[test]
    fn test_failed_plan_leaves_graph_untouched() {
        let (mut graph, a, _) = graph_with_atoms();
        let before = graph.snapshot();

        let plan = ConnectionPlan::ViaScheme {
            source: a,
            target: NodeId::from("ghost"),
            position: Position2D::default(),
        };
        assert!(apply_plan(&mut graph, plan, SchemeType::Support).is_err());
        assert_eq!(graph.state(), before.state());
    }
}
