//! Argument graph aggregate

pub mod argument_graph;
pub mod node;
pub mod validation;

pub use argument_graph::*;
pub use node::*;
pub use validation::*;
