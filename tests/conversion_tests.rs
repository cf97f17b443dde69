//! Interchange Format Integration Tests

use cim_domain_argument::{
    aggregate::{ArgumentGraph, AtomPatch, Node, NodePatch},
    commands::{GraphError, ImportError},
    conversion::{export_aif, export_arguebuf, import_bytes, import_graph, DocumentFormat},
    demo::demo_graph,
    identifiers::{IdGenerator, NodeId},
    value_objects::{Metadata, Position2D, Reference, SchemeType},
};
use serde_json::json;

fn sample_graph() -> ArgumentGraph {
    let mut graph = ArgumentGraph::new(IdGenerator::sequential());
    let claim = graph
        .add_atom_at("Cities should ban cars", Some(Position2D::new(0.0, 0.0)))
        .unwrap();
    let premise = graph
        .add_atom_at("Cars pollute", Some(Position2D::new(0.0, 200.0)))
        .unwrap();
    let scheme = graph
        .add_scheme_at(Some(SchemeType::Support), Some(Position2D::new(0.0, 100.0)))
        .unwrap();
    graph.add_edge(&premise.id, &scheme.id).unwrap();
    graph.add_edge(&scheme.id, &claim.id).unwrap();

    let mut metadata = Metadata::new();
    metadata.insert("confidence".to_string(), json!(0.5));
    graph
        .update_node(
            &premise.id,
            NodePatch::Atom(AtomPatch {
                reference: Some(Some(Reference {
                    text: "cars cause pollution".to_string(),
                    resource: Some("r1".to_string()),
                    offset: Some(42),
                })),
                metadata: Some(metadata),
                ..AtomPatch::default()
            }),
        )
        .unwrap();
    graph
}

#[test]
fn test_arguebuf_round_trip_is_isomorphic() {
    let graph = sample_graph();
    let document = serde_json::to_value(export_arguebuf(&graph)).unwrap();

    let restored = import_graph(&document, IdGenerator::Uuid).unwrap();

    assert!(restored.is_isomorphic_to(&graph));
    assert_eq!(restored.state(), graph.state());
}

#[test]
fn test_demo_graph_round_trips() {
    let graph = demo_graph(IdGenerator::Uuid).unwrap();
    let document = serde_json::to_string(&export_arguebuf(&graph)).unwrap();

    let restored = import_bytes(document.as_bytes(), IdGenerator::Uuid).unwrap();

    assert_eq!(restored.state(), graph.state());
}

#[test]
fn test_export_is_idempotent() {
    let graph = sample_graph();

    let first = serde_json::to_string(&export_arguebuf(&graph)).unwrap();
    let second = serde_json::to_string(&export_arguebuf(&graph)).unwrap();
    assert_eq!(first, second);

    let first = serde_json::to_string(&export_aif(&graph)).unwrap();
    let second = serde_json::to_string(&export_aif(&graph)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_aif_round_trip_keeps_structure() {
    let graph = sample_graph();
    let document = serde_json::to_value(export_aif(&graph)).unwrap();
    assert_eq!(DocumentFormat::detect(&document), Ok(DocumentFormat::Aif));

    let restored = import_graph(&document, IdGenerator::sequential()).unwrap();

    assert_eq!(restored.node_count(), graph.node_count());
    assert_eq!(restored.edge_count(), graph.edge_count());
    let premise = restored
        .node(&NodeId::from("n2"))
        .and_then(Node::as_atom)
        .unwrap();
    assert_eq!(premise.text, "Cars pollute");
    assert!(premise.reference.is_none());
    assert!(premise.metadata.is_empty());
}

#[test]
fn test_missing_ids_are_generated() {
    let document = json!({
        "nodes": [
            { "text": "No id", "type": "I" },
            { "nodeID": "n1", "text": "Has id", "type": "I" }
        ],
        "edges": []
    });

    let graph = import_graph(&document, IdGenerator::sequential()).unwrap();

    assert_eq!(graph.node_count(), 2);
    assert!(graph.node(&NodeId::from("n1")).is_some());
}

#[test]
fn test_duplicate_node_ids_fail_the_import() {
    let document = json!({
        "nodes": [
            { "nodeID": "1", "text": "A", "type": "I" },
            { "nodeID": "1", "text": "B", "type": "I" }
        ],
        "edges": []
    });

    assert_eq!(
        import_graph(&document, IdGenerator::sequential()).unwrap_err(),
        GraphError::Import(ImportError::DuplicateId("1".to_string()))
    );
}

#[test]
fn test_unrecognized_documents_rejected() {
    let result = import_bytes(br#"{ "graph": [] }"#, IdGenerator::sequential());
    assert!(matches!(
        result,
        Err(GraphError::Import(ImportError::UnrecognizedFormat(_)))
    ));
}
