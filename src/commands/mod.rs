//! Argument graph commands
//!
//! Commands represent intent to modify the active graph. They are processed by the
//! session controller which applies them to the graph model, records one history entry
//! per accepted command and emits the corresponding events.

use crate::aggregate::NodePatch;
use crate::identifiers::NodeId;
use crate::value_objects::{Position2D, SchemeType};
use serde::{Deserialize, Serialize};

/// Structural and attribute-edit commands issued by the UI shell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GraphCommand {
    /// Add a claim node
    AddAtom {
        /// Claim text; the configured default text is used when absent
        text: Option<String>,
        /// Where the pointer was when the atom was requested
        position: Option<Position2D>,
    },

    /// Add a scheme connector node
    AddScheme {
        /// Scheme type; unclassified when absent
        scheme_type: Option<SchemeType>,
        /// Where the pointer was when the scheme was requested
        position: Option<Position2D>,
    },

    /// Remove a node (cascading to its edges) or a single edge
    RemoveElement {
        /// Raw id of the node or edge
        id: String,
    },

    /// Reposition a node without touching its structure
    MoveNode {
        /// The node to move
        id: NodeId,
        /// New layout position
        position: Position2D,
    },

    /// Apply a committed attribute edit
    UpdateNode {
        /// The node to update
        id: NodeId,
        /// Attributes to change
        patch: NodePatch,
    },

    /// Mark (or unmark) the graph's major claim
    SetMajorClaim {
        /// Atom holding the major claim, or `None` to clear it
        id: Option<NodeId>,
    },
}

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors that can occur while editing, importing or persisting a graph
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GraphError {
    /// A direct edge between two atoms was attempted
    #[error("Invalid edge: atoms {from} and {to} must be connected through a scheme")]
    InvalidEdge { from: NodeId, to: NodeId },

    /// An edge would reference a node that does not exist
    #[error("Dangling reference: edge {edge} points to missing node {node}")]
    DanglingReference { edge: String, node: String },

    /// An identifier was issued twice
    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    /// No node or edge carries this id
    #[error("Element not found: {0}")]
    ElementNotFound(String),

    /// The command addressed a node of the other kind
    #[error("Node {id} is not {expected}")]
    KindMismatch { id: String, expected: &'static str },

    /// An external document could not be imported
    #[error("Import failed: {0}")]
    Import(#[from] ImportError),

    /// The persistence collaborator failed
    #[error("Cache error: {0}")]
    Cache(String),

    /// Configuration could not be read
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Reasons an external document is rejected
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ImportError {
    #[error("document is not valid JSON: {0}")]
    Json(String),

    #[error("document is not valid UTF-8")]
    InvalidUtf8,

    #[error("unrecognized document format: {0}")]
    UnrecognizedFormat(String),

    #[error("{element} is missing required field '{field}'")]
    MissingField { element: String, field: &'static str },

    #[error("node {id} is malformed: {reason}")]
    MalformedNode { id: String, reason: String },

    #[error("edge {edge} references missing node {node}")]
    DanglingEdge { edge: String, node: String },

    #[error("edge {edge} connects two atoms directly")]
    AtomToAtomEdge { edge: String },

    #[error("id {0} is used more than once")]
    DuplicateId(String),

    #[error("invalid timestamp '{0}'")]
    InvalidTimestamp(String),
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::Json(err.to_string())
    }
}
