//! AIF (Argument Interchange Format) documents, AIFdb JSON flavour

use super::{GraphBuilder, GraphTranslator};
use crate::aggregate::{ArgumentGraph, Atom, GraphState, Node, Scheme};
use crate::commands::{GraphResult, ImportError};
use crate::identifiers::{IdGenerator, NodeId};
use crate::value_objects::{ArgumentationScheme, SchemeType, Timestamps};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// `YYYY-MM-DD HH:MM:SS`, always UTC
pub const AIF_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Node types of locutions and dialogue moves; carried by AIFdb corpora but not by
/// argument graphs.
const DIALOGICAL_TYPES: [&str; 3] = ["L", "YA", "TA"];

/// A complete AIF document
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AifDocument {
    pub nodes: Vec<AifNode>,
    #[serde(default)]
    pub edges: Vec<AifEdge>,
    #[serde(default)]
    pub locutions: Vec<serde_json::Value>,
}

/// AIF node record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AifNode {
    #[serde(rename = "nodeID", default)]
    pub node_id: Option<AifId>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(rename = "type", default)]
    pub node_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// AIF edge record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AifEdge {
    #[serde(rename = "edgeID", default)]
    pub edge_id: Option<AifId>,
    #[serde(rename = "fromID", default)]
    pub from_id: Option<AifId>,
    #[serde(rename = "toID", default)]
    pub to_id: Option<AifId>,
    #[serde(rename = "formEdgeID", default)]
    pub form_edge_id: Option<serde_json::Value>,
}

/// AIFdb writes ids as strings, some tools as numbers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AifId {
    Text(String),
    Number(serde_json::Number),
}

impl fmt::Display for AifId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AifId::Text(text) => f.write_str(text),
            AifId::Number(number) => write!(f, "{number}"),
        }
    }
}

impl From<&str> for AifId {
    fn from(value: &str) -> Self {
        AifId::Text(value.to_string())
    }
}

/// AIF node type of a scheme
pub fn scheme_node_type(scheme_type: SchemeType) -> &'static str {
    match scheme_type {
        SchemeType::Support | SchemeType::Unknown => "RA",
        SchemeType::Attack => "CA",
        SchemeType::Rephrase => "MA",
        SchemeType::Preference => "PA",
    }
}

/// Scheme type of an AIF node type, `None` for atoms and unknown types
pub fn scheme_type_of(node_type: &str) -> Option<SchemeType> {
    match node_type {
        "RA" => Some(SchemeType::Support),
        "CA" => Some(SchemeType::Attack),
        "MA" => Some(SchemeType::Rephrase),
        "PA" => Some(SchemeType::Preference),
        _ => None,
    }
}

/// Text AIFdb shows for a scheme without a named argumentation scheme
fn default_scheme_text(scheme_type: SchemeType) -> &'static str {
    match scheme_type {
        SchemeType::Support | SchemeType::Unknown => "Default Inference",
        SchemeType::Attack => "Default Conflict",
        SchemeType::Rephrase => "Default Rephrase",
        SchemeType::Preference => "Default Preference",
    }
}

fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.format(AIF_TIMESTAMP_FORMAT).to_string()
}

fn parse_timestamp(raw: Option<&str>) -> Result<Timestamps, ImportError> {
    match raw {
        None => Ok(Timestamps::now()),
        Some(raw) => NaiveDateTime::parse_from_str(raw, AIF_TIMESTAMP_FORMAT)
            .map(|naive| Timestamps::at(naive.and_utc()))
            .map_err(|_| ImportError::InvalidTimestamp(raw.to_string())),
    }
}

/// Translator for AIF documents
#[derive(Debug, Clone, Copy, Default)]
pub struct AifTranslator;

impl GraphTranslator for AifTranslator {
    type Document = AifDocument;

    fn export(&self, graph: &GraphState) -> AifDocument {
        let nodes = graph
            .nodes()
            .map(|node| match node {
                Node::Atom(atom) => AifNode {
                    node_id: Some(AifId::from(atom.id.as_str())),
                    text: Some(atom.text.clone()),
                    node_type: Some("I".to_string()),
                    timestamp: Some(format_timestamp(&atom.timestamps.created)),
                },
                Node::Scheme(scheme) => {
                    let text = match scheme.argumentation_scheme {
                        ArgumentationScheme::Unknown => default_scheme_text(scheme.scheme_type),
                        named => named.as_str(),
                    };
                    AifNode {
                        node_id: Some(AifId::from(scheme.id.as_str())),
                        text: Some(text.to_string()),
                        node_type: Some(scheme_node_type(scheme.scheme_type).to_string()),
                        timestamp: Some(format_timestamp(&scheme.timestamps.created)),
                    }
                }
            })
            .collect();

        let edges = graph
            .edges()
            .map(|edge| AifEdge {
                edge_id: Some(AifId::from(edge.id.as_str())),
                from_id: Some(AifId::from(edge.source.as_str())),
                to_id: Some(AifId::from(edge.target.as_str())),
                form_edge_id: None,
            })
            .collect();

        AifDocument {
            nodes,
            edges,
            locutions: Vec::new(),
        }
    }

    fn import(&self, document: AifDocument, ids: IdGenerator) -> GraphResult<ArgumentGraph> {
        let reserved: HashSet<String> = document
            .nodes
            .iter()
            .filter_map(|node| node.node_id.as_ref().map(AifId::to_string))
            .chain(
                document
                    .edges
                    .iter()
                    .filter_map(|edge| edge.edge_id.as_ref().map(AifId::to_string)),
            )
            .collect();
        let mut builder = GraphBuilder::new(ids, reserved);
        let mut skipped: HashSet<String> = HashSet::new();

        for (index, node) in document.nodes.into_iter().enumerate() {
            let raw_id = node.node_id.as_ref().map(AifId::to_string);
            let label = raw_id.clone().unwrap_or_else(|| format!("#{index}"));
            let node_type = node.node_type.ok_or_else(|| ImportError::MissingField {
                element: format!("node {label}"),
                field: "type",
            })?;

            if DIALOGICAL_TYPES.contains(&node_type.as_str()) {
                tracing::warn!(
                    node = %label,
                    node_type = %node_type,
                    "Skipping dialogical AIF node"
                );
                if let Some(id) = raw_id {
                    skipped.insert(id);
                }
                continue;
            }

            let text = node.text.ok_or_else(|| ImportError::MissingField {
                element: format!("node {label}"),
                field: "text",
            })?;
            let timestamps = parse_timestamp(node.timestamp.as_deref())?;
            let id = builder.node_id(raw_id)?;

            let record = if node_type == "I" {
                let mut atom = Atom::new(id, text);
                atom.timestamps = timestamps;
                Node::Atom(atom)
            } else if let Some(scheme_type) = scheme_type_of(&node_type) {
                let mut scheme = Scheme::new(id, scheme_type);
                scheme.argumentation_scheme =
                    ArgumentationScheme::from_name(&text).unwrap_or_default();
                scheme.timestamps = timestamps;
                Node::Scheme(scheme)
            } else {
                return Err(ImportError::MalformedNode {
                    id: label,
                    reason: format!("unknown node type '{node_type}'"),
                }
                .into());
            };
            builder.add_node(record, None)?;
        }

        for (index, edge) in document.edges.into_iter().enumerate() {
            let raw_id = edge.edge_id.as_ref().map(AifId::to_string);
            let label = raw_id.clone().unwrap_or_else(|| format!("#{index}"));
            let from = edge.from_id.ok_or_else(|| ImportError::MissingField {
                element: format!("edge {label}"),
                field: "fromID",
            })?;
            let to = edge.to_id.ok_or_else(|| ImportError::MissingField {
                element: format!("edge {label}"),
                field: "toID",
            })?;

            let (from, to) = (from.to_string(), to.to_string());
            if skipped.contains(&from) || skipped.contains(&to) {
                tracing::warn!(edge = %label, "Skipping edge attached to a dialogical node");
                continue;
            }
            builder.add_edge(raw_id, NodeId::from(from), NodeId::from(to))?;
        }

        builder.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::GraphError;
    use serde_json::json;

    fn import(document: serde_json::Value) -> GraphResult<ArgumentGraph> {
        let document: AifDocument = serde_json::from_value(document).unwrap();
        AifTranslator.import(document, IdGenerator::sequential())
    }

    #[test]
    fn test_export_field_names() {
        let mut graph = ArgumentGraph::new(IdGenerator::sequential());
        let a = graph.add_atom("Claim").unwrap();
        let s = graph.add_scheme(Some(SchemeType::Attack)).unwrap();
        graph.add_edge(&s.id, &a.id).unwrap();

        let json = serde_json::to_value(AifTranslator.export(&graph)).unwrap();
        assert_eq!(json["nodes"][0]["nodeID"], "n1");
        assert_eq!(json["nodes"][0]["type"], "I");
        assert_eq!(json["nodes"][0]["text"], "Claim");
        assert_eq!(json["nodes"][1]["type"], "CA");
        assert_eq!(json["nodes"][1]["text"], "Default Conflict");
        assert_eq!(json["edges"][0]["fromID"], "n2");
        assert_eq!(json["edges"][0]["toID"], "n1");
        assert!(json["edges"][0]["formEdgeID"].is_null());
        assert_eq!(json["locutions"], json!([]));
    }

    #[test]
    fn test_named_scheme_exported_as_text() {
        let mut graph = ArgumentGraph::new(IdGenerator::sequential());
        let s = graph.add_scheme(Some(SchemeType::Support)).unwrap();
        graph
            .update_node(
                &s.id,
                crate::aggregate::NodePatch::Scheme(crate::aggregate::SchemePatch {
                    argumentation_scheme: Some(ArgumentationScheme::ExpertOpinion),
                    ..Default::default()
                }),
            )
            .unwrap();

        let document = AifTranslator.export(&graph);
        assert_eq!(document.nodes[0].text.as_deref(), Some("Expert Opinion"));
        assert_eq!(document.nodes[0].node_type.as_deref(), Some("RA"));
    }

    #[test]
    fn test_import_numeric_ids_and_timestamps() {
        let graph = import(json!({
            "nodes": [
                { "nodeID": 1, "text": "Premise", "type": "I", "timestamp": "2020-05-01 12:30:00" },
                { "nodeID": 2, "text": "Expert Opinion", "type": "RA" },
                { "nodeID": 3, "text": "Conclusion", "type": "I" }
            ],
            "edges": [
                { "edgeID": 10, "fromID": 1, "toID": 2 },
                { "edgeID": 11, "fromID": 2, "toID": 3 }
            ]
        }))
        .unwrap();

        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 2);
        let atom = graph.node(&NodeId::from("1")).and_then(Node::as_atom).unwrap();
        assert_eq!(format_timestamp(&atom.timestamps.created), "2020-05-01 12:30:00");
        let scheme = graph.node(&NodeId::from("2")).and_then(Node::as_scheme).unwrap();
        assert_eq!(scheme.argumentation_scheme, ArgumentationScheme::ExpertOpinion);
    }

    #[test]
    fn test_dialogical_nodes_skipped() {
        let graph = import(json!({
            "nodes": [
                { "nodeID": "1", "text": "Claim", "type": "I" },
                { "nodeID": "2", "text": "Bob: claim", "type": "L" },
                { "nodeID": "3", "text": "Asserting", "type": "YA" }
            ],
            "edges": [
                { "edgeID": "4", "fromID": "2", "toID": "3" },
                { "edgeID": "5", "fromID": "3", "toID": "1" }
            ]
        }))
        .unwrap();

        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_import_rejections() {
        let missing_text = import(json!({ "nodes": [{ "nodeID": "1", "type": "I" }] }));
        assert!(matches!(
            missing_text,
            Err(GraphError::Import(ImportError::MissingField { field: "text", .. }))
        ));

        let unknown_type = import(json!({
            "nodes": [{ "nodeID": "1", "text": "x", "type": "ZZ" }]
        }));
        assert!(matches!(
            unknown_type,
            Err(GraphError::Import(ImportError::MalformedNode { .. }))
        ));

        let atom_edge = import(json!({
            "nodes": [
                { "nodeID": "1", "text": "A", "type": "I" },
                { "nodeID": "2", "text": "B", "type": "I" }
            ],
            "edges": [{ "edgeID": "3", "fromID": "1", "toID": "2" }]
        }));
        assert!(matches!(
            atom_edge,
            Err(GraphError::Import(ImportError::AtomToAtomEdge { .. }))
        ));

        let dangling = import(json!({
            "nodes": [{ "nodeID": "1", "text": "A", "type": "I" }],
            "edges": [{ "edgeID": "3", "fromID": "1", "toID": "9" }]
        }));
        assert!(matches!(
            dangling,
            Err(GraphError::Import(ImportError::DanglingEdge { .. }))
        ));

        let bad_time = import(json!({
            "nodes": [{ "nodeID": "1", "text": "A", "type": "I", "timestamp": "yesterday" }]
        }));
        assert!(matches!(
            bad_time,
            Err(GraphError::Import(ImportError::InvalidTimestamp(_)))
        ));
    }

    #[test]
    fn test_colliding_edge_id_is_reissued() {
        let graph = import(json!({
            "nodes": [
                { "nodeID": "1", "text": "A", "type": "I" },
                { "nodeID": "2", "text": "Default Inference", "type": "RA" }
            ],
            "edges": [{ "edgeID": "1", "fromID": "1", "toID": "2" }]
        }))
        .unwrap();

        let edge = graph.edges().next().unwrap();
        assert_ne!(edge.id.as_str(), "1");
        assert_eq!(graph.edge_count(), 1);
    }
}
