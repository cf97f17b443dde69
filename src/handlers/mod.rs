//! Session handling
//!
//! The session controller processes commands, gestures and resets against the active
//! graph and keeps the persistence cache in step with it.

mod cache;
mod session;

pub use cache::{GraphCache, InMemoryGraphCache};
pub use session::{export_filename, PendingReset, ResetSource, SessionController};
