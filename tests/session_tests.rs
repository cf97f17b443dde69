//! Editing Session Integration Tests

use cim_domain_argument::{
    aggregate::{GraphState, Node, NodePatch, SchemePatch},
    commands::{GraphCommand, GraphError, ImportError},
    config::EditorConfig,
    events::GraphEvent,
    handlers::{GraphCache, InMemoryGraphCache, ResetSource, SessionController},
    identifiers::{IdStrategy, NodeId},
    interaction::GestureEvent,
    projections::GraphObserver,
    value_objects::{Metadata, Position2D, SchemeType},
};
use serde_json::json;
use std::sync::{Arc, Mutex};

const CACHE_KEY: &str = "argument-graph";

fn config() -> EditorConfig {
    EditorConfig {
        id_strategy: IdStrategy::Sequential,
        ..EditorConfig::default()
    }
}

async fn session_with(cache: Arc<InMemoryGraphCache>) -> SessionController {
    let mut session = SessionController::new(config(), cache);
    session.load_graph().await.unwrap();
    session
}

async fn session() -> SessionController {
    session_with(Arc::new(InMemoryGraphCache::new())).await
}

async fn add_atom(session: &mut SessionController, text: &str, x: f64) -> NodeId {
    session
        .execute(GraphCommand::AddAtom {
            text: Some(text.to_string()),
            position: Some(Position2D::new(x, 0.0)),
        })
        .await
        .unwrap();
    session
        .graph()
        .atoms()
        .find(|atom| atom.text == text)
        .map(|atom| atom.id.clone())
        .unwrap()
}

async fn connect(session: &mut SessionController, source: &NodeId, target: &NodeId) {
    session
        .gesture(GestureEvent::PointerEnter(source.clone()))
        .await
        .unwrap();
    session
        .gesture(GestureEvent::DragStart(source.clone()))
        .await
        .unwrap();
    session
        .gesture(GestureEvent::Release {
            target: Some(target.clone()),
        })
        .await
        .unwrap();
}

#[derive(Default)]
struct RecordingObserver {
    events: Mutex<Vec<GraphEvent>>,
}

impl GraphObserver for RecordingObserver {
    fn graph_changed(&self, events: &[GraphEvent], _graph: &GraphState) {
        if let Ok(mut seen) = self.events.lock() {
            seen.extend_from_slice(events);
        }
    }
}

#[tokio::test]
async fn test_connect_two_atoms_then_undo() {
    let mut session = session().await;
    let a = add_atom(&mut session, "A", 0.0).await;
    let b = add_atom(&mut session, "B", 100.0).await;

    connect(&mut session, &a, &b).await;

    assert_eq!(session.graph().node_count(), 3);
    assert_eq!(session.graph().edge_count(), 2);
    assert_eq!(session.graph().schemes().count(), 1);
    assert!(session.undoable());

    let aif = session.export_aif();
    assert_eq!(aif.nodes.len(), 3);
    assert_eq!(aif.edges.len(), 2);

    assert!(session.undo().await);
    assert_eq!(session.graph().node_count(), 2);
    assert_eq!(session.graph().edge_count(), 0);
}

#[tokio::test]
async fn test_synthesized_scheme_uses_configured_type_and_midpoint() {
    let mut session = session().await;
    let a = add_atom(&mut session, "A", 0.0).await;
    let b = add_atom(&mut session, "B", 100.0).await;

    connect(&mut session, &a, &b).await;

    let scheme = session.graph().schemes().next().unwrap().clone();
    assert_eq!(scheme.scheme_type, SchemeType::Support);
    assert_eq!(
        session.graph().position(&scheme.id),
        Some(Position2D::new(50.0, 0.0))
    );
}

#[tokio::test]
async fn test_self_loop_records_nothing() {
    let mut session = session().await;
    let a = add_atom(&mut session, "A", 0.0).await;
    let before = session.export_state();

    connect(&mut session, &a, &a).await;

    assert_eq!(session.graph(), before.state());
    assert!(session.undo().await);
    assert!(!session.undoable());
}

#[tokio::test]
async fn test_undo_redo_and_truncation() {
    let mut session = session().await;
    add_atom(&mut session, "A", 0.0).await;
    add_atom(&mut session, "B", 0.0).await;

    assert!(session.undo().await);
    assert!(session.redoable());
    assert!(session.redo().await);
    assert_eq!(session.graph().node_count(), 2);
    assert!(!session.redo().await);

    assert!(session.undo().await);
    add_atom(&mut session, "C", 0.0).await;
    assert!(!session.redoable());
}

#[tokio::test]
async fn test_history_boundaries_are_safe() {
    let mut session = session().await;
    assert!(!session.undoable());
    assert!(!session.redoable());
    assert!(!session.undo().await);
    assert!(!session.redo().await);
}

#[tokio::test]
async fn test_draft_commits_as_one_entry() {
    let mut session = session().await;
    let a = add_atom(&mut session, "A", 0.0).await;

    let draft = session.select(&a).unwrap();
    draft.set_text("first").unwrap();
    draft.set_text("second").unwrap();
    draft.set_reference_text("the original wording").unwrap();
    session.save_draft().await.unwrap();

    let atom = session.graph().node(&a).and_then(Node::as_atom).unwrap().clone();
    assert_eq!(atom.text, "second");
    assert_eq!(
        atom.reference.map(|reference| reference.text).as_deref(),
        Some("the original wording")
    );

    assert!(session.undo().await);
    let atom = session.graph().node(&a).and_then(Node::as_atom).unwrap();
    assert_eq!(atom.text, "A");
    assert!(atom.reference.is_none());
}

#[tokio::test]
async fn test_discarded_draft_touches_nothing() {
    let mut session = session().await;
    let a = add_atom(&mut session, "A", 0.0).await;
    let before = session.export_state();

    session.select(&a).unwrap().set_text("changed").unwrap();
    session.discard_draft();

    assert_eq!(session.graph(), before.state());
    assert!(session.draft().is_none());
    assert!(session.undo().await);
    assert!(!session.undoable());
}

#[tokio::test]
async fn test_removing_drafted_node_discards_draft() {
    let mut session = session().await;
    let a = add_atom(&mut session, "A", 0.0).await;
    session.select(&a).unwrap();

    session
        .execute(GraphCommand::RemoveElement {
            id: a.to_string(),
        })
        .await
        .unwrap();

    assert!(session.draft().is_none());
}

#[tokio::test]
async fn test_rejected_import_leaves_session_unchanged() {
    let mut session = session().await;
    add_atom(&mut session, "A", 0.0).await;
    let before = session.export_state();

    let document = br#"{ "nodes": { "x": { "atom": {} } }, "edges": {} }"#;
    let result = session.prepare_import(document);

    assert!(matches!(
        result,
        Err(GraphError::Import(ImportError::MissingField { .. }))
    ));
    assert_eq!(session.graph(), before.state());
    assert!(session.undoable());
}

#[tokio::test]
async fn test_cancelled_reset_leaves_session_unchanged() {
    let mut session = session().await;
    add_atom(&mut session, "A", 0.0).await;
    let before = session.export_state();

    let pending = session.prepare_demo().unwrap();
    assert_eq!(pending.source(), ResetSource::Demo);
    drop(pending);

    assert_eq!(session.graph(), before.state());
    assert!(session.undoable());
}

#[tokio::test]
async fn test_reset_installs_graph_and_clears_history() {
    let mut session = session().await;
    add_atom(&mut session, "A", 0.0).await;

    let pending = session.prepare_demo().unwrap();
    session.reset_graph(pending).await;

    assert_eq!(session.graph().node_count(), 5);
    assert!(!session.undoable());
    assert!(!session.redoable());

    let pending = session.prepare_empty();
    let payload = session.reset_graph(pending).await;
    assert!(payload.nodes.is_empty());
    assert!(!session.undoable());
}

#[tokio::test]
async fn test_import_from_exported_document() {
    let mut session = session().await;
    let a = add_atom(&mut session, "A", 0.0).await;
    let b = add_atom(&mut session, "B", 10.0).await;
    connect(&mut session, &a, &b).await;
    let exported = session.export_json(cim_domain_argument::DocumentFormat::Arguebuf).unwrap();

    let mut other = session_with(Arc::new(InMemoryGraphCache::new())).await;
    let pending = other.prepare_import(exported.as_bytes()).unwrap();
    assert_eq!(
        pending.source(),
        ResetSource::Import(cim_domain_argument::DocumentFormat::Arguebuf)
    );
    other.reset_graph(pending).await;

    assert!(other.graph().is_isomorphic_to(session.graph()));
}

#[tokio::test]
async fn test_cache_is_written_and_restored() {
    let cache = Arc::new(InMemoryGraphCache::new());
    let mut session = session_with(cache.clone()).await;
    add_atom(&mut session, "Persisted", 0.0).await;

    assert!(cache.get(CACHE_KEY).await.unwrap().is_some());

    let restored = session_with(cache.clone()).await;
    assert_eq!(restored.graph().node_count(), 1);
    assert!(!restored.undoable());

    restored.clear_cache().await.unwrap();
    assert!(cache.get(CACHE_KEY).await.unwrap().is_none());
    assert_eq!(restored.graph().node_count(), 1);
}

#[tokio::test]
async fn test_cache_restores_metadata_named_like_internal_keys() {
    let cache = Arc::new(InMemoryGraphCache::new());
    let mut session = session_with(cache.clone()).await;
    session
        .execute(GraphCommand::AddScheme {
            scheme_type: Some(SchemeType::Support),
            position: None,
        })
        .await
        .unwrap();
    let scheme = session.graph().schemes().next().unwrap().id.clone();

    let mut metadata = Metadata::new();
    metadata.insert("argumentationScheme".to_string(), json!("Expert Opinion"));
    metadata.insert("layout".to_string(), json!("dagre"));
    session
        .execute(GraphCommand::UpdateNode {
            id: scheme.clone(),
            patch: NodePatch::Scheme(SchemePatch {
                metadata: Some(metadata.clone()),
                ..SchemePatch::default()
            }),
        })
        .await
        .unwrap();

    let restored = session_with(cache).await;
    assert_eq!(restored.graph(), session.graph());
    let restored_scheme = restored.graph().node(&scheme).and_then(Node::as_scheme).unwrap();
    assert_eq!(restored_scheme.metadata, metadata);
}

#[tokio::test]
async fn test_unreadable_cache_starts_empty() {
    let cache = Arc::new(InMemoryGraphCache::with_blob(CACHE_KEY, "not a graph"));
    let session = session_with(cache).await;
    assert_eq!(session.graph().node_count(), 0);
}

#[tokio::test]
async fn test_observers_receive_events() {
    let observer = Arc::new(RecordingObserver::default());
    let mut session = session().await;
    session.subscribe(observer.clone());

    let a = add_atom(&mut session, "A", 0.0).await;
    session
        .execute(GraphCommand::MoveNode {
            id: a.clone(),
            position: Position2D::new(1.0, 1.0),
        })
        .await
        .unwrap();
    session.undo().await;

    let events = observer.events.lock().unwrap();
    let types: Vec<&str> = events.iter().map(GraphEvent::event_type).collect();
    assert_eq!(types, vec!["NodeAdded", "NodeMoved", "HistoryRestored"]);
}
