//! Cycle detection - exhaustive DFS over child edges
//!
//! Every vertex is used as a starting point in sorted key order, so the
//! reported cycle is the same on every run. A vertex whose subtree was fully
//! explored during the current walk is not entered again within that walk;
//! nothing is remembered between walks.

use rustc_hash::FxHashSet;

use crate::error::{GraphError, Result};

use super::graph::Graph;

impl<P> Graph<P> {
    /// Validate that the graph has no dependency cycle.
    ///
    /// Returns `Err(GraphError::DependencyCycle)` with the offending path,
    /// from the first occurrence of the repeated unit back to itself.
    pub fn check_cycle(&self) -> Result<()> {
        for start in 0..self.len() {
            let mut path: Vec<usize> = Vec::new();
            let mut explored: FxHashSet<usize> = FxHashSet::default();

            if let Some(cycle) = self.walk_path(start, &mut path, &mut explored) {
                return Err(GraphError::DependencyCycle {
                    path: cycle
                        .into_iter()
                        .map(|idx| self.vertex_at(idx).key().to_string())
                        .collect(),
                });
            }
        }

        Ok(())
    }

    fn walk_path(
        &self,
        node: usize,
        path: &mut Vec<usize>,
        explored: &mut FxHashSet<usize>,
    ) -> Option<Vec<usize>> {
        if let Some(first) = path.iter().position(|&idx| idx == node) {
            let mut cycle = path[first..].to_vec();
            cycle.push(node);
            return Some(cycle);
        }
        if explored.contains(&node) {
            return None;
        }

        path.push(node);
        for &child in self.children_of(node) {
            if let Some(cycle) = self.walk_path(child, path, explored) {
                return Some(cycle);
            }
        }
        path.pop();
        explored.insert(node);

        None
    }
}
