//! AST Module - project model handed to the engine
//!
//! Contains the already-normalized description of a project:
//! - `project`: Project, UnitDef, Dependency, DisabledUnit
//!
//! These types represent the "what" - static structure the graph is built from.
//! For traversal, see the `runtime` module.

mod project;

// Re-export all public types
pub use project::{Dependency, DependencyCondition, DisabledUnit, Project, UnitDef};
