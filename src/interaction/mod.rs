//! Interactive editing: connection gestures and staged attribute edits

pub mod draft;
pub mod edge_creation;

pub use draft::AttributeDraft;
pub use edge_creation::{
    apply_plan, plan_connection, Connection, ConnectionPlan, EdgeCreationPolicy, GestureEvent,
    GestureState, RejectReason,
};
