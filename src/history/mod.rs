//! Undo/redo history
//!
//! The undo stack always ends with the snapshot of the graph as it currently is; the
//! entries below it are the states that `undo` walks back through. `redo` holds the
//! states that were undone, most recent last.

use crate::aggregate::{ArgumentGraph, GraphSnapshot};

/// Default number of undo entries kept per session
pub const DEFAULT_HISTORY_LIMIT: usize = 128;

/// Snapshot history of one editing session
#[derive(Debug, Clone)]
pub struct History {
    undo: Vec<GraphSnapshot>,
    redo: Vec<GraphSnapshot>,
    limit: usize,
}

impl History {
    /// Start a history whose only entry is `initial`.
    ///
    /// `limit` is clamped to at least one entry.
    pub fn new(initial: GraphSnapshot, limit: usize) -> Self {
        Self {
            undo: vec![initial],
            redo: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Push the state after a completed mutation and forget the undone future
    pub fn record(&mut self, snapshot: GraphSnapshot) {
        self.undo.push(snapshot);
        self.redo.clear();

        if self.undo.len() > self.limit {
            let excess = self.undo.len() - self.limit;
            self.undo.drain(0..excess);
            tracing::warn!(
                dropped = excess,
                limit = self.limit,
                "History limit reached, oldest entries dropped"
            );
        }
    }

    /// Step back one entry; returns `false` if only the initial state is recorded
    pub fn undo(&mut self, graph: &mut ArgumentGraph) -> bool {
        if !self.undoable() {
            return false;
        }
        let Some(current) = self.undo.pop() else {
            return false;
        };
        self.redo.push(current);

        if let Some(previous) = self.undo.last() {
            graph.restore(previous);
        }
        true
    }

    /// Step forward one entry; returns `false` if nothing was undone
    pub fn redo(&mut self, graph: &mut ArgumentGraph) -> bool {
        let Some(next) = self.redo.pop() else {
            return false;
        };
        graph.restore(&next);
        self.undo.push(next);
        true
    }

    pub fn undoable(&self) -> bool {
        self.undo.len() > 1
    }

    pub fn redoable(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Forget everything and start over from `current`
    pub fn reset(&mut self, current: GraphSnapshot) {
        self.undo.clear();
        self.redo.clear();
        self.undo.push(current);
    }

    /// The snapshot matching the graph's present state
    pub fn current(&self) -> Option<&GraphSnapshot> {
        self.undo.last()
    }

    /// Number of `undo` calls that would succeed
    pub fn undo_depth(&self) -> usize {
        self.undo.len().saturating_sub(1)
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}
