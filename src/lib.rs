//! Argument graph domain
//!
//! The editing core of an argumentation graph editor: an in-memory graph of atoms
//! (claims) and schemes (support, attack, ...) that keeps itself structurally valid
//! under interactive edits, snapshot-based undo/redo, and conversion to and from the
//! AIF and Arguebuf interchange formats.

pub mod aggregate;
pub mod commands;
pub mod config;
pub mod conversion;
pub mod demo;
pub mod events;
pub mod handlers;
pub mod history;
pub mod identifiers;
pub mod interaction;
pub mod projections;
pub mod value_objects;

// Re-export main types
pub use aggregate::*;
pub use events::GraphEvent;
pub use identifiers::{EdgeId, IdGenerator, IdStrategy, NodeId};

// Re-export commands and their types
pub use commands::{GraphCommand, GraphError, GraphResult, ImportError};

pub use config::EditorConfig;
pub use conversion::{
    export_aif, export_arguebuf, import_bytes, import_graph, AifDocument, ArguebufDocument,
    DocumentFormat,
};
pub use history::History;
pub use interaction::{
    AttributeDraft, Connection, ConnectionPlan, EdgeCreationPolicy, GestureEvent, GestureState,
    RejectReason,
};

// Re-export session handling
pub use handlers::{GraphCache, InMemoryGraphCache, PendingReset, SessionController};

// Re-export value objects
pub use value_objects::{
    ArgumentationScheme, Metadata, Position2D, Reference, Resource, SchemeType, Timestamps,
};

pub use projections::{GraphObserver, RenderPayload};
