//! depwalk - dependency-ordered concurrent traversal of unit graphs
//!
//! ## Module Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        DOMAIN MODEL                          │
//! │  ast/       Project, UnitDef, Dependency, DisabledUnit       │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      APPLICATION LAYER                       │
//! │  dag/       Graph (arena + adjacency), cycle detection       │
//! │  runtime/   Walker, Visitor, WalkOptions, Results            │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    INFRASTRUCTURE LAYER                      │
//! │  event/     EventLog, EventEmitter                           │
//! │  config     Defaults from config file + environment          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick start
//!
//! ```
//! use depwalk::{collect, visit_fn, Project, UnitDef, WalkOptions};
//! use tokio_util::sync::CancellationToken;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let project = Project::new()
//!     .with_unit("web", UnitDef::new("nginx").depends_on("db"))
//!     .with_unit("db", UnitDef::new("postgres"));
//!
//! let results = collect(
//!     project,
//!     visit_fn(|key: String, image: &'static str, _: CancellationToken| async move {
//!         Ok::<_, String>(format!("{key} ({image}) up"))
//!     }),
//!     WalkOptions::new().with_max_concurrency(2),
//! )
//! .await
//! .unwrap();
//!
//! assert_eq!(results.get("db").unwrap(), "db (postgres) up");
//! # }
//! ```

// ═══════════════════════════════════════════════════════════════
// DOMAIN MODEL
// ═══════════════════════════════════════════════════════════════
pub mod ast;

// ═══════════════════════════════════════════════════════════════
// APPLICATION LAYER
// ═══════════════════════════════════════════════════════════════
pub mod dag;
pub mod runtime;

// ═══════════════════════════════════════════════════════════════
// INFRASTRUCTURE LAYER
// ═══════════════════════════════════════════════════════════════
pub mod event;

// ═══════════════════════════════════════════════════════════════
// CROSS-CUTTING - Error handling, configuration
// ═══════════════════════════════════════════════════════════════
pub mod config;
pub mod error;

// ═══════════════════════════════════════════════════════════════
// PUBLIC API RE-EXPORTS
// ═══════════════════════════════════════════════════════════════

pub use ast::{Dependency, DependencyCondition, DisabledUnit, Project, UnitDef};
pub use config::DepwalkConfig;
pub use dag::{build_validated, Graph, Vertex};
pub use error::{FixSuggestion, GraphError, WalkError};
pub use event::{Event, EventEmitter, EventKind, EventLog, NoopEmitter};
pub use runtime::{
    collect, in_dependency_order, in_reverse_dependency_order, visit_fn, walk, Direction,
    FnVisitor, Results, Visitor, WalkOptions, Walker,
};
