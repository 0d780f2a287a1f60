//! Event Module - traversal audit trail
//!
//! Key types:
//! - `Event`: Envelope with id + timestamp + kind
//! - `EventKind`: walk-level and unit-level variants
//! - `EventLog`: Thread-safe, append-only log
//! - `EventEmitter`: Trait for dependency injection
//! - `NoopEmitter`: Zero-cost default

mod emitter;
mod log;

// Re-export all public types
pub use emitter::{EventEmitter, NoopEmitter};
pub use log::{Event, EventKind, EventLog};
