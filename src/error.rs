// The #[error] attribute from thiserror uses struct fields via string interpolation,
// but Rust's unused_assignments lint doesn't recognize this.
#![allow(unused_assignments)]

//! Error types with error codes and fix suggestions
//!
//! Error code ranges:
//! - DEPWALK-000-009: Project loading errors
//! - DEPWALK-010-019: Graph construction errors
//! - DEPWALK-020-029: DAG structure errors
//! - DEPWALK-030-039: Configuration errors
//!
//! Visitor errors are not part of this enum: they travel verbatim inside
//! [`WalkError::Visit`].

use miette::Diagnostic;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

/// Errors raised before any visitor runs.
///
/// Implements both `thiserror::Error` for std error compatibility
/// and `miette::Diagnostic` for fancy terminal error display.
#[derive(Error, Debug, Diagnostic)]
pub enum GraphError {
    // ═══════════════════════════════════════════
    // PROJECT ERRORS (000-009)
    // ═══════════════════════════════════════════
    #[error("[DEPWALK-001] Failed to parse project: {details}")]
    #[diagnostic(
        code(depwalk::parse_error),
        help("Check YAML syntax: indentation and quoting")
    )]
    Parse { details: String },

    #[error("[DEPWALK-002] Cannot read project file '{path}': {source}")]
    #[diagnostic(code(depwalk::io_error), help("Check the file path exists"))]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ═══════════════════════════════════════════
    // CONSTRUCTION ERRORS (010-019)
    // ═══════════════════════════════════════════
    #[error("[DEPWALK-010] Unit '{unit}' depends on unknown unit '{dependency}'")]
    #[diagnostic(
        code(depwalk::unknown_dependency),
        help("Declare the missing unit or mark the dependency as `required: false`")
    )]
    UnknownDependency { unit: String, dependency: String },

    #[error(
        "[DEPWALK-011] Unit '{dependency}' is required by '{unit}' but is disabled; enable it with profile(s) {}",
        format_profiles(.profiles)
    )]
    #[diagnostic(
        code(depwalk::disabled_dependency),
        help("Activate one of the listed profiles or mark the dependency as `required: false`")
    )]
    DisabledDependency {
        unit: String,
        dependency: String,
        profiles: Vec<String>,
    },

    #[error("[DEPWALK-012] Start unit '{unit}' is not part of the project")]
    #[diagnostic(
        code(depwalk::unknown_start_unit),
        help("Only enabled units can be used as traversal starting points")
    )]
    UnknownStartUnit { unit: String },

    // ═══════════════════════════════════════════
    // DAG ERRORS (020-029)
    // ═══════════════════════════════════════════
    #[error("[DEPWALK-020] dependency cycle detected: {}", .path.join(" -> "))]
    #[diagnostic(
        code(depwalk::dependency_cycle),
        help("Remove one of the depends_on declarations along the cycle")
    )]
    DependencyCycle { path: Vec<String> },

    // ═══════════════════════════════════════════
    // CONFIG ERRORS (030-039)
    // ═══════════════════════════════════════════
    #[error("[DEPWALK-030] Configuration error: {reason}")]
    #[diagnostic(code(depwalk::config_error))]
    Config { reason: String },
}

fn format_profiles(profiles: &[String]) -> String {
    if profiles.is_empty() {
        return "(none declared)".to_string();
    }
    profiles
        .iter()
        .map(|p| format!("'{p}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl GraphError {
    /// Get the error code (e.g., "DEPWALK-010")
    pub fn code(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "DEPWALK-001",
            Self::Io { .. } => "DEPWALK-002",
            Self::UnknownDependency { .. } => "DEPWALK-010",
            Self::DisabledDependency { .. } => "DEPWALK-011",
            Self::UnknownStartUnit { .. } => "DEPWALK-012",
            Self::DependencyCycle { .. } => "DEPWALK-020",
            Self::Config { .. } => "DEPWALK-030",
        }
    }
}

impl FixSuggestion for GraphError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            GraphError::Parse { .. } => Some("Check YAML syntax: indentation and quoting"),
            GraphError::Io { .. } => Some("Check the file path exists and is readable"),
            GraphError::UnknownDependency { .. } => {
                Some("Declare the missing unit or mark the dependency as `required: false`")
            }
            GraphError::DisabledDependency { .. } => {
                Some("Activate one of the listed profiles or mark the dependency as `required: false`")
            }
            GraphError::UnknownStartUnit { .. } => Some("Check the unit name for typos"),
            GraphError::DependencyCycle { .. } => {
                Some("Remove one of the depends_on declarations along the cycle")
            }
            GraphError::Config { .. } => Some("Check ~/.config/depwalk/config.toml"),
        }
    }
}

/// Error returned by a traversal.
///
/// `E` is the visitor's own error type, returned untouched.
#[derive(Error, Debug)]
pub enum WalkError<E> {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("{0}")]
    Visit(E),

    #[error("[DEPWALK-021] Visitor for unit '{unit}' panicked")]
    Panicked { unit: String },

    #[error("[DEPWALK-022] Traversal cancelled before all units were visited")]
    Cancelled,
}

impl<E> WalkError<E> {
    /// Returns the visitor error, if that is what stopped the walk
    pub fn into_visit(self) -> Option<E> {
        match self {
            Self::Visit(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the construction/structure error, if any
    pub fn as_graph(&self) -> Option<&GraphError> {
        match self {
            Self::Graph(e) => Some(e),
            _ => None,
        }
    }
}

impl<E> FixSuggestion for WalkError<E> {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            WalkError::Graph(e) => e.fix_suggestion(),
            WalkError::Visit(_) => None,
            WalkError::Panicked { .. } => {
                Some("The visitor must return an error instead of panicking")
            }
            WalkError::Cancelled => Some("The walk was stopped by its caller; rerun to finish it"),
        }
    }
}
