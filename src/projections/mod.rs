//! Render projections
//!
//! The rendering collaborator receives plain node and edge records with positions and
//! is told about every change through [`GraphObserver`].

use crate::aggregate::{GraphState, Node, NodeKind};
use crate::events::GraphEvent;
use crate::identifiers::{EdgeId, NodeId};
use crate::value_objects::{ArgumentationScheme, Position2D};
use serde::{Deserialize, Serialize};

/// A node as the canvas draws it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderNode {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Atom text, or the scheme's name
    pub label: String,
    pub position: Option<Position2D>,
    /// Whether this atom is the major claim
    pub major_claim: bool,
}

/// An edge as the canvas draws it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderEdge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
}

/// Everything the canvas needs to draw the graph
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RenderPayload {
    pub nodes: Vec<RenderNode>,
    pub edges: Vec<RenderEdge>,
    /// False while a scheme is not connected to anything
    pub complete: bool,
}

impl RenderPayload {
    pub fn from_state(state: &GraphState) -> Self {
        let nodes = state
            .nodes()
            .map(|node| RenderNode {
                id: node.id().clone(),
                kind: node.kind(),
                label: label(node),
                position: state.position(node.id()),
                major_claim: state.meta.major_claim.as_ref() == Some(node.id()),
            })
            .collect();
        let edges = state
            .edges()
            .map(|edge| RenderEdge {
                id: edge.id.clone(),
                source: edge.source.clone(),
                target: edge.target.clone(),
            })
            .collect();

        Self {
            nodes,
            edges,
            complete: state.validate().is_complete(),
        }
    }
}

/// Display label of a node
pub fn label(node: &Node) -> String {
    match node {
        Node::Atom(atom) => atom.text.clone(),
        Node::Scheme(scheme) => match scheme.argumentation_scheme {
            ArgumentationScheme::Unknown => scheme.scheme_type.as_str().to_string(),
            named => named.as_str().to_string(),
        },
    }
}

/// Receives change notifications from a session
pub trait GraphObserver: Send + Sync {
    /// Called once per applied operation, after history and cache are updated
    fn graph_changed(&self, events: &[GraphEvent], graph: &GraphState);
}
