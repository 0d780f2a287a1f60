//! DAG Module - dependency graph structure
//!
//! Contains the graph representation and its validation:
//! - `graph`: Graph built from a project model (arena + index adjacency)
//! - `cycle`: exhaustive cycle detection
//!
//! The Graph is immutable after construction and must pass `check_cycle`
//! before it is walked.

mod cycle;
mod graph;

// Re-export public types
pub use graph::{Adjacency, Graph, Vertex};

use crate::ast::Project;
use crate::error::Result;

/// Build a graph and reject it if it contains a dependency cycle
pub fn build_validated<P>(project: Project<P>) -> Result<Graph<P>> {
    let graph = Graph::new(project)?;
    graph.check_cycle()?;
    Ok(graph)
}
