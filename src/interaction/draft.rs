//! Staged attribute edits for the selected node

use crate::aggregate::{AtomPatch, Node, NodePatch, SchemePatch};
use crate::commands::{GraphError, GraphResult};
use crate::identifiers::NodeId;
use crate::value_objects::{ArgumentationScheme, Reference, SchemeType};

/// Working copy of one node that collects edits until they are saved or dropped.
///
/// The graph is never touched by a draft; saving turns it into a single [`NodePatch`].
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDraft {
    original: Node,
    working: Node,
}

impl AttributeDraft {
    /// Start a draft from the node as it currently is
    pub fn new(node: &Node) -> Self {
        Self {
            original: node.clone(),
            working: node.clone(),
        }
    }

    pub fn node_id(&self) -> &NodeId {
        self.original.id()
    }

    /// The node with all staged edits applied
    pub fn preview(&self) -> &Node {
        &self.working
    }

    pub fn set_text(&mut self, text: impl Into<String>) -> GraphResult<()> {
        match &mut self.working {
            Node::Atom(atom) => {
                atom.text = text.into();
                Ok(())
            }
            Node::Scheme(scheme) => Err(mismatch(&scheme.id, "an atom")),
        }
    }

    /// Set the original wording; an empty text removes the reference
    pub fn set_reference_text(&mut self, text: impl Into<String>) -> GraphResult<()> {
        let text = text.into();
        match &mut self.working {
            Node::Atom(atom) if text.is_empty() => {
                atom.reference = None;
                Ok(())
            }
            Node::Atom(atom) => {
                match &mut atom.reference {
                    Some(reference) => reference.text = text,
                    None => atom.reference = Some(Reference::text(text)),
                }
                Ok(())
            }
            Node::Scheme(scheme) => Err(mismatch(&scheme.id, "an atom")),
        }
    }

    pub fn set_scheme_type(&mut self, scheme_type: SchemeType) -> GraphResult<()> {
        match &mut self.working {
            Node::Scheme(scheme) => {
                scheme.scheme_type = scheme_type;
                Ok(())
            }
            Node::Atom(atom) => Err(mismatch(&atom.id, "a scheme")),
        }
    }

    pub fn set_argumentation_scheme(&mut self, scheme: ArgumentationScheme) -> GraphResult<()> {
        match &mut self.working {
            Node::Scheme(node) => {
                node.argumentation_scheme = scheme;
                Ok(())
            }
            Node::Atom(atom) => Err(mismatch(&atom.id, "a scheme")),
        }
    }

    pub fn set_metadata_entry(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.metadata_mut().insert(key.into(), value);
    }

    pub fn remove_metadata_entry(&mut self, key: &str) -> Option<serde_json::Value> {
        self.metadata_mut().shift_remove(key)
    }

    /// Whether any staged value differs from the node the draft started from
    pub fn is_dirty(&self) -> bool {
        self.working != self.original
    }

    /// Turn the staged changes into a patch carrying only what differs
    pub fn into_patch(self) -> NodePatch {
        match (self.original, self.working) {
            (Node::Atom(before), Node::Atom(after)) => NodePatch::Atom(AtomPatch {
                text: changed(before.text, after.text),
                reference: changed(before.reference, after.reference),
                metadata: changed(before.metadata, after.metadata),
            }),
            (Node::Scheme(before), Node::Scheme(after)) => NodePatch::Scheme(SchemePatch {
                scheme_type: changed(before.scheme_type, after.scheme_type),
                argumentation_scheme: changed(
                    before.argumentation_scheme,
                    after.argumentation_scheme,
                ),
                metadata: changed(before.metadata, after.metadata),
            }),
            // setters never change the kind of the working copy
            (Node::Atom(_), Node::Scheme(_)) => NodePatch::Atom(AtomPatch::default()),
            (Node::Scheme(_), Node::Atom(_)) => NodePatch::Scheme(SchemePatch::default()),
        }
    }

    fn metadata_mut(&mut self) -> &mut crate::value_objects::Metadata {
        match &mut self.working {
            Node::Atom(atom) => &mut atom.metadata,
            Node::Scheme(scheme) => &mut scheme.metadata,
        }
    }
}

fn changed<T: PartialEq>(before: T, after: T) -> Option<T> {
    (before != after).then_some(after)
}

fn mismatch(id: &NodeId, expected: &'static str) -> GraphError {
    GraphError::KindMismatch {
        id: id.to_string(),
        expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{Atom, Scheme};

    fn atom() -> Node {
        Node::Atom(Atom::new(NodeId::from("a"), "claim"))
    }

    #[test]
    fn test_fresh_draft_is_clean() {
        let draft = AttributeDraft::new(&atom());
        assert!(!draft.is_dirty());
        assert!(draft.into_patch().is_empty());
    }

    #[test]
    fn test_patch_contains_only_changes() {
        let mut draft = AttributeDraft::new(&atom());
        draft.set_text("new claim").unwrap();
        draft.set_metadata_entry("speaker", serde_json::json!("alice"));
        assert!(draft.is_dirty());

        match draft.into_patch() {
            NodePatch::Atom(patch) => {
                assert_eq!(patch.text.as_deref(), Some("new claim"));
                assert!(patch.reference.is_none());
                assert_eq!(patch.metadata.map(|m| m.len()), Some(1));
            }
            other => panic!("unexpected patch {other:?}"),
        }
    }

    #[test]
    fn test_reverting_an_edit_is_clean() {
        let mut draft = AttributeDraft::new(&atom());
        draft.set_text("other").unwrap();
        draft.set_text("claim").unwrap();
        assert!(!draft.is_dirty());
    }

    #[test]
    fn test_empty_reference_text_removes_reference() {
        let mut node = Atom::new(NodeId::from("a"), "claim");
        node.reference = Some(Reference::text("original"));
        let mut draft = AttributeDraft::new(&Node::Atom(node));

        draft.set_reference_text("").unwrap();
        match draft.into_patch() {
            NodePatch::Atom(patch) => assert_eq!(patch.reference, Some(None)),
            other => panic!("unexpected patch {other:?}"),
        }
    }

    #[test]
    fn test_wrong_kind_setter_rejected() {
        let mut draft = AttributeDraft::new(&Node::Scheme(Scheme::new(
            NodeId::from("s"),
            SchemeType::Support,
        )));

        assert!(matches!(
            draft.set_text("text"),
            Err(GraphError::KindMismatch { .. })
        ));
        draft.set_scheme_type(SchemeType::Attack).unwrap();
        draft
            .set_argumentation_scheme(ArgumentationScheme::ExpertOpinion)
            .unwrap();
        assert!(draft.is_dirty());
    }
}
