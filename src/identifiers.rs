//! Identifier service
//!
//! Every node and edge carries a string identifier that is unique within its graph
//! for the whole editing session. Identifiers are issued by an [`IdGenerator`]; the
//! graph rejects any identifier it already knows instead of overwriting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an atom or scheme node
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

/// Identifier of an edge
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(String);

macro_rules! string_id {
    ($name:ident) => {
        impl $name {
            /// Wrap an existing identifier
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw identifier
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(NodeId);
string_id!(EdgeId);

/// How new identifiers are produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// Random v4 UUIDs (collision resistant)
    #[default]
    Uuid,
    /// Monotonic counters (`n1`, `e1`, ...), deterministic across runs
    Sequential,
}

/// Source of fresh node and edge identifiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdGenerator {
    /// Random v4 UUIDs rendered without hyphens
    Uuid,
    /// Monotonic counter shared by nodes and edges
    Sequential {
        /// Next counter value to hand out
        next: u64,
    },
}

impl Default for IdGenerator {
    fn default() -> Self {
        IdGenerator::Uuid
    }
}

impl From<IdStrategy> for IdGenerator {
    fn from(strategy: IdStrategy) -> Self {
        match strategy {
            IdStrategy::Uuid => IdGenerator::Uuid,
            IdStrategy::Sequential => IdGenerator::sequential(),
        }
    }
}

impl IdGenerator {
    /// A sequential generator starting at 1
    pub fn sequential() -> Self {
        IdGenerator::Sequential { next: 1 }
    }

    /// Issue a fresh node identifier
    pub fn next_node_id(&mut self) -> NodeId {
        NodeId(self.next_raw("n"))
    }

    /// Issue a fresh edge identifier
    pub fn next_edge_id(&mut self) -> EdgeId {
        EdgeId(self.next_raw("e"))
    }

    /// Issue a node identifier that `taken` does not already contain.
    ///
    /// Sequential generators skip over occupied values, which happens after a graph
    /// with foreign identifiers has been imported. Random identifiers are returned as-is:
    /// a UUID collision is left for the graph to report.
    pub fn next_free_node_id(&mut self, taken: impl Fn(&str) -> bool) -> NodeId {
        loop {
            let id = self.next_node_id();
            if !taken(id.as_str()) || matches!(self, IdGenerator::Uuid) {
                return id;
            }
        }
    }

    /// Edge counterpart of [`IdGenerator::next_free_node_id`]
    pub fn next_free_edge_id(&mut self, taken: impl Fn(&str) -> bool) -> EdgeId {
        loop {
            let id = self.next_edge_id();
            if !taken(id.as_str()) || matches!(self, IdGenerator::Uuid) {
                return id;
            }
        }
    }

    fn next_raw(&mut self, prefix: &str) -> String {
        match self {
            IdGenerator::Uuid => uuid::Uuid::new_v4().simple().to_string(),
            IdGenerator::Sequential { next } => {
                let value = *next;
                *next += 1;
                format!("{prefix}{value}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_sequential_ids_are_monotonic() {
        let mut ids = IdGenerator::sequential();
        assert_eq!(ids.next_node_id().as_str(), "n1");
        assert_eq!(ids.next_edge_id().as_str(), "e2");
        assert_eq!(ids.next_node_id().as_str(), "n3");
    }

    #[test]
    fn test_uuid_ids_are_unique() {
        let mut ids = IdGenerator::Uuid;
        let issued: HashSet<NodeId> = (0..256).map(|_| ids.next_node_id()).collect();
        assert_eq!(issued.len(), 256);
    }

    #[test]
    fn test_free_id_skips_taken_values() {
        let mut ids = IdGenerator::sequential();
        let id = ids.next_free_node_id(|candidate| candidate == "n1" || candidate == "n2");
        assert_eq!(id.as_str(), "n3");
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let id = NodeId::from("atom-1");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"atom-1\"");
    }

    #[test]
    fn test_strategy_builds_generator() {
        assert_eq!(IdGenerator::from(IdStrategy::Sequential), IdGenerator::sequential());
        assert_eq!(IdGenerator::from(IdStrategy::Uuid), IdGenerator::Uuid);
    }
}
