//! Argument graph events
//!
//! Change notifications emitted by the session controller after a mutation has been
//! applied and recorded. The rendering collaborator refreshes from them.

use crate::aggregate::{Edge, Node, NodeKind, Removal};
use crate::identifiers::{EdgeId, NodeId};
use crate::value_objects::Position2D;
use serde::{Deserialize, Serialize};

/// Node added event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeAdded {
    /// The unique identifier of the node
    pub node_id: NodeId,
    /// Atom or scheme
    pub kind: NodeKind,
    /// Where the node was placed, if anywhere
    pub position: Option<Position2D>,
}

/// Node removed event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRemoved {
    /// The ID of the node that was removed
    pub node_id: NodeId,
}

/// Node updated event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeUpdated {
    /// The ID of the node that was updated
    pub node_id: NodeId,
    /// The node after the update
    pub node: Node,
}

/// Node moved event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeMoved {
    pub node_id: NodeId,
    pub position: Position2D,
}

/// Edge added event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeAdded {
    /// The unique identifier of the edge
    pub edge_id: EdgeId,
    /// The source node of the edge
    pub source_id: NodeId,
    /// The target node of the edge
    pub target_id: NodeId,
}

/// Edge removed event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRemoved {
    /// The ID of the edge that was removed
    pub edge_id: EdgeId,
}

/// Enum wrapper for argument graph events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GraphEvent {
    /// A node was added to the graph
    NodeAdded(NodeAdded),
    /// A node was removed from the graph
    NodeRemoved(NodeRemoved),
    /// A node's attributes changed
    NodeUpdated(NodeUpdated),
    /// A node was repositioned
    NodeMoved(NodeMoved),
    /// An edge was added between nodes
    EdgeAdded(EdgeAdded),
    /// An edge was removed from the graph
    EdgeRemoved(EdgeRemoved),
    /// The major claim changed
    MajorClaimChanged { node_id: Option<NodeId> },
    /// The whole graph was swapped out (load, import, reset)
    GraphReplaced { node_count: usize, edge_count: usize },
    /// The graph was restored from history
    HistoryRestored { undo_depth: usize, redo_depth: usize },
}

impl GraphEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::NodeAdded(_) => "NodeAdded",
            Self::NodeRemoved(_) => "NodeRemoved",
            Self::NodeUpdated(_) => "NodeUpdated",
            Self::NodeMoved(_) => "NodeMoved",
            Self::EdgeAdded(_) => "EdgeAdded",
            Self::EdgeRemoved(_) => "EdgeRemoved",
            Self::MajorClaimChanged { .. } => "MajorClaimChanged",
            Self::GraphReplaced { .. } => "GraphReplaced",
            Self::HistoryRestored { .. } => "HistoryRestored",
        }
    }

    pub fn node_added(node_id: &NodeId, kind: NodeKind, position: Option<Position2D>) -> Self {
        Self::NodeAdded(NodeAdded {
            node_id: node_id.clone(),
            kind,
            position,
        })
    }

    pub fn edge_added(edge: &Edge) -> Self {
        Self::EdgeAdded(EdgeAdded {
            edge_id: edge.id.clone(),
            source_id: edge.source.clone(),
            target_id: edge.target.clone(),
        })
    }

    /// Events describing a removal, edges first
    pub fn removed(removal: &Removal) -> Vec<Self> {
        let edges = removal.edges.iter().map(|edge| {
            Self::EdgeRemoved(EdgeRemoved {
                edge_id: edge.id.clone(),
            })
        });
        let nodes = removal.nodes.iter().map(|node| {
            Self::NodeRemoved(NodeRemoved {
                node_id: node.id().clone(),
            })
        });
        edges.chain(nodes).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Atom;

    #[test]
    fn test_event_types() {
        let event = GraphEvent::node_added(&NodeId::from("n1"), NodeKind::Atom, None);
        assert_eq!(event.event_type(), "NodeAdded");

        let event = GraphEvent::GraphReplaced {
            node_count: 0,
            edge_count: 0,
        };
        assert_eq!(event.event_type(), "GraphReplaced");
    }

    #[test]
    fn test_removal_lists_edges_before_nodes() {
        let removal = Removal {
            nodes: vec![Node::Atom(Atom::new(NodeId::from("a"), "A"))],
            edges: vec![Edge::new(
                EdgeId::from("e"),
                NodeId::from("a"),
                NodeId::from("s"),
            )],
        };

        let events = GraphEvent::removed(&removal);
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], GraphEvent::EdgeRemoved(_)));
        assert!(matches!(events[1], GraphEvent::NodeRemoved(_)));
    }
}
