//! Atom, scheme and edge records

use crate::commands::{GraphError, GraphResult};
use crate::identifiers::{EdgeId, NodeId};
use crate::value_objects::{ArgumentationScheme, Metadata, Reference, SchemeType, Timestamps};
use serde::{Deserialize, Serialize};

/// A node holding one claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    pub id: NodeId,
    /// Current claim text
    pub text: String,
    /// Original wording and where it came from
    pub reference: Option<Reference>,
    pub metadata: Metadata,
    pub timestamps: Timestamps,
}

impl Atom {
    /// Create a new atom
    pub fn new(id: NodeId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            reference: None,
            metadata: Metadata::new(),
            timestamps: Timestamps::now(),
        }
    }
}

/// A connector applying an argumentation scheme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scheme {
    pub id: NodeId,
    pub scheme_type: SchemeType,
    pub argumentation_scheme: ArgumentationScheme,
    pub metadata: Metadata,
    pub timestamps: Timestamps,
}

impl Scheme {
    /// Create a new scheme without a named argumentation scheme
    pub fn new(id: NodeId, scheme_type: SchemeType) -> Self {
        Self {
            id,
            scheme_type,
            argumentation_scheme: ArgumentationScheme::Unknown,
            metadata: Metadata::new(),
            timestamps: Timestamps::now(),
        }
    }
}

/// Node of an argument graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Node {
    Atom(Atom),
    Scheme(Scheme),
}

impl Node {
    pub fn id(&self) -> &NodeId {
        match self {
            Node::Atom(atom) => &atom.id,
            Node::Scheme(scheme) => &scheme.id,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Atom(_) => NodeKind::Atom,
            Node::Scheme(_) => NodeKind::Scheme,
        }
    }

    pub fn is_atom(&self) -> bool {
        matches!(self, Node::Atom(_))
    }

    pub fn metadata(&self) -> &Metadata {
        match self {
            Node::Atom(atom) => &atom.metadata,
            Node::Scheme(scheme) => &scheme.metadata,
        }
    }

    pub fn timestamps(&self) -> &Timestamps {
        match self {
            Node::Atom(atom) => &atom.timestamps,
            Node::Scheme(scheme) => &scheme.timestamps,
        }
    }

    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            Node::Atom(atom) => Some(atom),
            Node::Scheme(_) => None,
        }
    }

    pub fn as_scheme(&self) -> Option<&Scheme> {
        match self {
            Node::Atom(_) => None,
            Node::Scheme(scheme) => Some(scheme),
        }
    }

    /// Apply a patch of the matching kind; nothing changes on a kind mismatch.
    pub(crate) fn apply(&mut self, patch: NodePatch) -> GraphResult<()> {
        match (self, patch) {
            (Node::Atom(atom), NodePatch::Atom(patch)) => {
                if let Some(text) = patch.text {
                    atom.text = text;
                }
                if let Some(reference) = patch.reference {
                    atom.reference = reference;
                }
                if let Some(metadata) = patch.metadata {
                    atom.metadata = metadata;
                }
                atom.timestamps.touch();
                Ok(())
            }
            (Node::Scheme(scheme), NodePatch::Scheme(patch)) => {
                if let Some(scheme_type) = patch.scheme_type {
                    scheme.scheme_type = scheme_type;
                }
                if let Some(argumentation_scheme) = patch.argumentation_scheme {
                    scheme.argumentation_scheme = argumentation_scheme;
                }
                if let Some(metadata) = patch.metadata {
                    scheme.metadata = metadata;
                }
                scheme.timestamps.touch();
                Ok(())
            }
            (node, NodePatch::Atom(_)) => Err(GraphError::KindMismatch {
                id: node.id().to_string(),
                expected: "an atom",
            }),
            (node, NodePatch::Scheme(_)) => Err(GraphError::KindMismatch {
                id: node.id().to_string(),
                expected: "a scheme",
            }),
        }
    }
}

/// Discriminant of [`Node`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Atom,
    Scheme,
}

/// Directed connection between two nodes
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
}

impl Edge {
    pub fn new(id: EdgeId, source: NodeId, target: NodeId) -> Self {
        Self { id, source, target }
    }

    /// Whether either endpoint is `node_id`
    pub fn touches(&self, node_id: &NodeId) -> bool {
        &self.source == node_id || &self.target == node_id
    }
}

/// Borrowed view of whatever element an id resolves to
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ElementRef<'a> {
    Node(&'a Node),
    Edge(&'a Edge),
}

/// Partial attribute update for one node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NodePatch {
    Atom(AtomPatch),
    Scheme(SchemePatch),
}

impl NodePatch {
    /// Whether the patch would change anything
    pub fn is_empty(&self) -> bool {
        match self {
            NodePatch::Atom(patch) => {
                patch.text.is_none() && patch.reference.is_none() && patch.metadata.is_none()
            }
            NodePatch::Scheme(patch) => {
                patch.scheme_type.is_none()
                    && patch.argumentation_scheme.is_none()
                    && patch.metadata.is_none()
            }
        }
    }
}

/// Atom attributes to change; `None` leaves the attribute untouched
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AtomPatch {
    pub text: Option<String>,
    /// `Some(None)` removes the reference
    pub reference: Option<Option<Reference>>,
    pub metadata: Option<Metadata>,
}

/// Scheme attributes to change; `None` leaves the attribute untouched
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchemePatch {
    pub scheme_type: Option<SchemeType>,
    pub argumentation_scheme: Option<ArgumentationScheme>,
    pub metadata: Option<Metadata>,
}
