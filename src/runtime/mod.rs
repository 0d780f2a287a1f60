//! Runtime Module - dependency-ordered traversal
//!
//! Contains the runtime execution components:
//! - `traversal`: Walker (coordinator + worker tasks) and project-level entry points
//! - `visitor`: the per-unit capability trait and its closure adapter
//! - `options`: direction, concurrency bound, start subset, cancellation
//! - `results`: per-unit value collection
//!
//! This module represents the "how" - runtime execution.
//! For static structure, see the `dag` module.

mod options;
mod results;
mod traversal;
mod visitor;

// Re-export public types
pub use options::{Direction, WalkOptions};
pub use results::Results;
pub use traversal::{
    collect, in_dependency_order, in_reverse_dependency_order, walk, Walker,
};
pub use visitor::{visit_fn, FnVisitor, Visitor};
