//! Graph - arena of unit vertices with index-based adjacency
//!
//! Performance notes:
//! - Vertices live in a `Vec`, addressed by index; keys map to indices via FxHashMap
//! - Adjacency tables are owned by the graph and hold indices, never references
//! - SmallVec keeps small dependency lists (0-4 items) on the stack
//!
//! Construction is deterministic: vertices are created in sorted key order and
//! dependencies are resolved in sorted order, so the first reported error is
//! stable across runs.

use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, VecDeque};
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;
use tracing::debug;

use crate::ast::{Dependency, Project};
use crate::error::{GraphError, Result};

/// Stack-allocated adjacency: most units have 0-4 neighbors
pub type Adjacency = SmallVec<[usize; 4]>;

/// One unit in the graph
#[derive(Debug)]
pub struct Vertex<P> {
    key: Arc<str>,
    payload: Arc<P>,
    /// Resolved `depends_on` declarations (unresolved optional ones removed)
    dependencies: BTreeMap<String, Dependency>,
}

impl<P> Vertex<P> {
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn payload(&self) -> &P {
        &self.payload
    }

    pub fn dependencies(&self) -> &BTreeMap<String, Dependency> {
        &self.dependencies
    }

    pub(crate) fn shared_key(&self) -> Arc<str> {
        Arc::clone(&self.key)
    }

    pub(crate) fn shared_payload(&self) -> Arc<P> {
        Arc::clone(&self.payload)
    }
}

/// Dependency graph of a project's enabled units
///
/// Immutable after construction.
#[derive(Debug)]
pub struct Graph<P> {
    vertices: Vec<Vertex<P>>,
    index: FxHashMap<Arc<str>, usize>,
    /// vertex -> units it depends on
    children: Vec<Adjacency>,
    /// vertex -> units depending on it
    parents: Vec<Adjacency>,
}

impl<P> Graph<P> {
    /// Build the graph, consuming the project model.
    ///
    /// Fails on the first (in sorted order) required dependency that cannot
    /// be resolved.
    pub fn new(project: Project<P>) -> Result<Self> {
        let Project { units, disabled } = project;
        let capacity = units.len();

        let mut vertices = Vec::with_capacity(capacity);
        let mut index: FxHashMap<Arc<str>, usize> =
            FxHashMap::with_capacity_and_hasher(capacity, Default::default());
        let mut declared = Vec::with_capacity(capacity);

        // BTreeMap iteration: indices follow sorted key order
        for (name, unit) in units {
            let key: Arc<str> = Arc::from(name.as_str());
            index.insert(Arc::clone(&key), vertices.len());
            vertices.push(Vertex {
                key,
                payload: Arc::new(unit.payload),
                dependencies: BTreeMap::new(),
            });
            declared.push(unit.depends_on);
        }

        let mut children = vec![Adjacency::new(); capacity];
        let mut parents = vec![Adjacency::new(); capacity];

        for (idx, depends_on) in declared.into_iter().enumerate() {
            let mut resolved = BTreeMap::new();
            for (dep_name, dependency) in depends_on {
                match index.get(dep_name.as_str()) {
                    Some(&dep_idx) => {
                        children[idx].push(dep_idx);
                        parents[dep_idx].push(idx);
                        resolved.insert(dep_name, dependency);
                    }
                    None if dependency.required => {
                        let unit = vertices[idx].key().to_string();
                        return Err(match disabled.get(&dep_name) {
                            Some(d) => GraphError::DisabledDependency {
                                unit,
                                dependency: dep_name,
                                profiles: d.profiles.clone(),
                            },
                            None => GraphError::UnknownDependency {
                                unit,
                                dependency: dep_name,
                            },
                        });
                    }
                    None => {
                        debug!(
                            unit = vertices[idx].key(),
                            dependency = %dep_name,
                            "dropping unresolved optional dependency"
                        );
                    }
                }
            }
            vertices[idx].dependencies = resolved;
        }

        Ok(Self {
            vertices,
            index,
            children,
            parents,
        })
    }

    /// Build the graph from a borrowed project
    pub fn from_project(project: &Project<P>) -> Result<Self>
    where
        P: Clone,
    {
        Self::new(project.clone())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    #[inline]
    pub fn contains(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// All unit keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.vertices.iter().map(Vertex::key)
    }

    pub fn vertex(&self, key: &str) -> Option<&Vertex<P>> {
        self.index_of(key).map(|idx| &self.vertices[idx])
    }

    pub fn payload(&self, key: &str) -> Option<&P> {
        self.vertex(key).map(Vertex::payload)
    }

    /// Resolved dependency declarations of a unit
    pub fn dependencies(&self, key: &str) -> Option<&BTreeMap<String, Dependency>> {
        self.vertex(key).map(Vertex::dependencies)
    }

    /// Units `key` depends on
    pub fn children(&self, key: &str) -> Vec<&str> {
        self.index_of(key)
            .map(|idx| self.keys_of(&self.children[idx]))
            .unwrap_or_default()
    }

    /// Units depending on `key`
    pub fn parents(&self, key: &str) -> Vec<&str> {
        self.index_of(key)
            .map(|idx| self.keys_of(&self.parents[idx]))
            .unwrap_or_default()
    }

    /// Units with no dependencies (first to come up)
    pub fn leaves(&self) -> Vec<&str> {
        self.leaf_indices()
            .map(|idx| self.vertices[idx].key())
            .collect()
    }

    /// Units nothing depends on (first to go down)
    pub fn roots(&self) -> Vec<&str> {
        self.root_indices()
            .map(|idx| self.vertices[idx].key())
            .collect()
    }

    /// Check whether `from` transitively depends on `to` (BFS over child edges)
    pub fn has_path(&self, from: &str, to: &str) -> bool {
        let (Some(start), Some(goal)) = (self.index_of(from), self.index_of(to)) else {
            return false;
        };
        if start == goal {
            return true;
        }

        let mut visited: FxHashSet<usize> = FxHashSet::default();
        let mut queue: VecDeque<usize> = VecDeque::new();
        queue.push_back(start);
        visited.insert(start);

        while let Some(current) = queue.pop_front() {
            for &next in &self.children[current] {
                if next == goal {
                    return true;
                }
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        false
    }

    /// Deterministic bring-up order (Kahn, ties broken by key)
    ///
    /// Units caught in a cycle are left out; run `check_cycle` first.
    pub fn topological_order(&self) -> Vec<&str> {
        let mut pending: Vec<usize> = self.children.iter().map(SmallVec::len).collect();
        let mut ready: BinaryHeap<Reverse<usize>> =
            self.leaf_indices().map(Reverse).collect();
        let mut order = Vec::with_capacity(self.len());

        while let Some(Reverse(idx)) = ready.pop() {
            order.push(self.vertices[idx].key());
            for &parent in &self.parents[idx] {
                pending[parent] -= 1;
                if pending[parent] == 0 {
                    ready.push(Reverse(parent));
                }
            }
        }

        order
    }

    // ─────────────────────────────────────────────────────────────
    // Index-level access for the cycle detector and the walker
    // ─────────────────────────────────────────────────────────────

    #[inline]
    pub(crate) fn index_of(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    #[inline]
    pub(crate) fn vertex_at(&self, idx: usize) -> &Vertex<P> {
        &self.vertices[idx]
    }

    #[inline]
    pub(crate) fn children_of(&self, idx: usize) -> &[usize] {
        &self.children[idx]
    }

    #[inline]
    pub(crate) fn parents_of(&self, idx: usize) -> &[usize] {
        &self.parents[idx]
    }

    pub(crate) fn leaf_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).filter(|&idx| self.children[idx].is_empty())
    }

    pub(crate) fn root_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.len()).filter(|&idx| self.parents[idx].is_empty())
    }

    fn keys_of(&self, adjacency: &[usize]) -> Vec<&str> {
        adjacency
            .iter()
            .map(|&idx| self.vertices[idx].key())
            .collect()
    }
}
