//! Conversion between the argument graph and external interchange documents
//!
//! Two formats are supported:
//! - **AIF**: flat node/edge lists as used by AIFdb. Export drops metadata, references,
//!   positions and modification times.
//! - **Arguebuf**: keyed node/edge maps with timestamps, references, metadata and the
//!   scheme taxonomy. Exporting and re-importing is lossless.
//!
//! Imports are all-or-nothing: the document is turned into a complete, validated graph
//! or rejected with an [`ImportError`].

pub mod aif;
pub mod arguebuf;
pub mod detect;

pub use aif::{AifDocument, AifTranslator};
pub use arguebuf::{ArguebufDocument, ArguebufTranslator};
pub use detect::DocumentFormat;

use crate::aggregate::{ArgumentGraph, Edge, GraphState, Node, NodeKind};
use crate::commands::{GraphError, GraphResult, ImportError};
use crate::identifiers::{EdgeId, IdGenerator, NodeId};
use crate::value_objects::Position2D;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashSet;

/// Translates between the graph model and one document format
pub trait GraphTranslator {
    /// The document shape of the format
    type Document: Serialize + DeserializeOwned;

    /// Build a document from the current graph state
    fn export(&self, graph: &GraphState) -> Self::Document;

    /// Build a validated graph from a document
    fn import(&self, document: Self::Document, ids: IdGenerator) -> GraphResult<ArgumentGraph>;
}

/// Export a graph as an AIF document
pub fn export_aif(graph: &GraphState) -> AifDocument {
    AifTranslator.export(graph)
}

/// Export a graph as an Arguebuf document
pub fn export_arguebuf(graph: &GraphState) -> ArguebufDocument {
    ArguebufTranslator.export(graph)
}

/// Export a graph in `format` as pretty-printed JSON
pub fn export_json(graph: &GraphState, format: DocumentFormat) -> GraphResult<String> {
    let json = match format {
        DocumentFormat::Aif => serde_json::to_string_pretty(&export_aif(graph)),
        DocumentFormat::Arguebuf => serde_json::to_string_pretty(&export_arguebuf(graph)),
    };
    json.map_err(|err| GraphError::Import(err.into()))
}

/// Import a document of either format
pub fn import_graph(document: &Value, ids: IdGenerator) -> GraphResult<ArgumentGraph> {
    let format = DocumentFormat::detect(document)?;
    import_as(document, format, ids)
}

/// Import a document already known to be in `format`
pub fn import_as(
    document: &Value,
    format: DocumentFormat,
    ids: IdGenerator,
) -> GraphResult<ArgumentGraph> {
    tracing::debug!(%format, "Importing document");

    match format {
        DocumentFormat::Aif => {
            let document: AifDocument =
                serde_json::from_value(document.clone()).map_err(ImportError::from)?;
            AifTranslator.import(document, ids)
        }
        DocumentFormat::Arguebuf => {
            let document: ArguebufDocument =
                serde_json::from_value(document.clone()).map_err(ImportError::from)?;
            ArguebufTranslator.import(document, ids)
        }
    }
}

/// Import raw file contents, which must be UTF-8 JSON
pub fn import_bytes(bytes: &[u8], ids: IdGenerator) -> GraphResult<ArgumentGraph> {
    let text = std::str::from_utf8(bytes).map_err(|_| ImportError::InvalidUtf8)?;
    let document: Value = serde_json::from_str(text).map_err(ImportError::from)?;
    import_graph(&document, ids)
}

/// Incrementally assembles an imported graph, resolving ids as it goes
pub(crate) struct GraphBuilder {
    state: GraphState,
    ids: IdGenerator,
    /// Every id spelled out in the document, so generated ids never shadow one
    reserved: HashSet<String>,
}

impl GraphBuilder {
    pub(crate) fn new(ids: IdGenerator, reserved: HashSet<String>) -> Self {
        Self {
            state: GraphState::default(),
            ids,
            reserved,
        }
    }

    pub(crate) fn state_mut(&mut self) -> &mut GraphState {
        &mut self.state
    }

    /// Use the document's node id, or issue one when it is missing or empty
    pub(crate) fn node_id(&mut self, raw: Option<String>) -> Result<NodeId, ImportError> {
        match raw.filter(|id| !id.is_empty()) {
            Some(id) if self.state.contains_id(&id) => Err(ImportError::DuplicateId(id)),
            Some(id) => Ok(NodeId::from(id)),
            None => {
                let (state, reserved) = (&self.state, &self.reserved);
                Ok(self
                    .ids
                    .next_free_node_id(|candidate| taken(state, reserved, candidate)))
            }
        }
    }

    pub(crate) fn add_node(
        &mut self,
        node: Node,
        position: Option<Position2D>,
    ) -> Result<(), ImportError> {
        let id = node.id().clone();
        self.state
            .push_node(node)
            .map_err(|_| ImportError::DuplicateId(id.to_string()))?;
        if let Some(position) = position {
            self.state.place(id, position);
        }
        Ok(())
    }

    /// Use the document's edge id, or issue one when it is missing or already taken
    pub(crate) fn edge_id(&mut self, raw: Option<String>) -> EdgeId {
        match raw.filter(|id| !id.is_empty()) {
            Some(id) if !self.state.contains_id(&id) => EdgeId::from(id),
            _ => {
                let (state, reserved) = (&self.state, &self.reserved);
                self.ids
                    .next_free_edge_id(|candidate| taken(state, reserved, candidate))
            }
        }
    }

    /// Add an edge whose endpoints must already be present and not both atoms
    pub(crate) fn add_edge(
        &mut self,
        raw_id: Option<String>,
        source: NodeId,
        target: NodeId,
    ) -> Result<(), ImportError> {
        let label = raw_id.clone().unwrap_or_else(|| format!("{source}->{target}"));
        let source_kind = self.endpoint(&label, &source)?;
        let target_kind = self.endpoint(&label, &target)?;
        if source_kind == NodeKind::Atom && target_kind == NodeKind::Atom {
            return Err(ImportError::AtomToAtomEdge { edge: label });
        }

        let id = self.edge_id(raw_id);
        self.state
            .push_edge(Edge::new(id.clone(), source, target))
            .map_err(|_| ImportError::DuplicateId(id.to_string()))
    }

    fn endpoint(&self, edge: &str, node: &NodeId) -> Result<NodeKind, ImportError> {
        self.state
            .node_kind(node)
            .ok_or_else(|| ImportError::DanglingEdge {
                edge: edge.to_string(),
                node: node.to_string(),
            })
    }

    /// Validate the assembled state and hand it over as a live graph
    pub(crate) fn finish(self) -> GraphResult<ArgumentGraph> {
        let graph = ArgumentGraph::from_state(self.state, self.ids)?;
        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Document imported"
        );
        Ok(graph)
    }
}

fn taken(state: &GraphState, reserved: &HashSet<String>, candidate: &str) -> bool {
    state.contains_id(candidate) || reserved.contains(candidate)
}
