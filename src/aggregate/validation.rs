//! Structural validation of argument graphs

use crate::aggregate::argument_graph::GraphState;
use crate::aggregate::node::{Edge, NodeKind};
use crate::commands::GraphError;
use crate::identifiers::{EdgeId, NodeId};
use std::collections::HashSet;

/// Findings of a validation pass over one graph state
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValidationReport {
    /// Schemes without any incident edge (tolerated, reported only)
    pub dangling_schemes: Vec<NodeId>,
    /// Edges joining two atoms
    pub atom_edges: Vec<Edge>,
    /// Edges with an endpoint that is not a node, paired with the missing node id
    pub dangling_edges: Vec<(EdgeId, NodeId)>,
    /// Ids used by more than one element
    pub duplicate_ids: Vec<String>,
}

impl ValidationReport {
    pub(crate) fn inspect(state: &GraphState) -> Self {
        let mut report = ValidationReport::default();

        let mut seen: HashSet<&str> = HashSet::new();
        for node in state.nodes() {
            if !seen.insert(node.id().as_str()) {
                report.duplicate_ids.push(node.id().to_string());
            }
        }
        for edge in state.edges() {
            if !seen.insert(edge.id.as_str()) {
                report.duplicate_ids.push(edge.id.to_string());
            }
        }

        let mut connected: HashSet<&NodeId> = HashSet::new();
        for edge in state.edges() {
            let source = state.node_kind(&edge.source);
            let target = state.node_kind(&edge.target);

            if source.is_none() {
                report
                    .dangling_edges
                    .push((edge.id.clone(), edge.source.clone()));
            }
            if target.is_none() {
                report
                    .dangling_edges
                    .push((edge.id.clone(), edge.target.clone()));
            }
            if source == Some(NodeKind::Atom) && target == Some(NodeKind::Atom) {
                report.atom_edges.push(edge.clone());
            }

            connected.insert(&edge.source);
            connected.insert(&edge.target);
        }

        report.dangling_schemes = state
            .schemes()
            .filter(|scheme| !connected.contains(&scheme.id))
            .map(|scheme| scheme.id.clone())
            .collect();

        report
    }

    /// Whether invariants 1-4 hold
    pub fn is_valid(&self) -> bool {
        self.atom_edges.is_empty()
            && self.dangling_edges.is_empty()
            && self.duplicate_ids.is_empty()
    }

    /// Whether the graph is valid and has no dangling schemes
    pub fn is_complete(&self) -> bool {
        self.is_valid() && self.dangling_schemes.is_empty()
    }

    /// The first invariant violation, as the error the model would have raised
    pub fn first_error(&self) -> Option<GraphError> {
        if let Some(id) = self.duplicate_ids.first() {
            return Some(GraphError::DuplicateId(id.clone()));
        }
        if let Some((edge, node)) = self.dangling_edges.first() {
            return Some(GraphError::DanglingReference {
                edge: edge.to_string(),
                node: node.to_string(),
            });
        }
        self.atom_edges.first().map(|edge| GraphError::InvalidEdge {
            from: edge.source.clone(),
            to: edge.target.clone(),
        })
    }
}
