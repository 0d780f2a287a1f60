//! EventEmitter - where a walk reports its progress
//!
//! `WalkOptions::with_emitter` takes any implementation. Workers emit from
//! their own tasks, so implementations must tolerate concurrent calls.

use super::log::{EventKind, EventLog};

/// Sink for walk and unit events
///
/// The returned id is only meaningful to the sink itself; the walker ignores it.
pub trait EventEmitter: Send + Sync {
    fn emit(&self, kind: EventKind) -> u64;
}

impl EventEmitter for EventLog {
    fn emit(&self, kind: EventKind) -> u64 {
        EventLog::emit(self, kind)
    }
}

/// Discards every event; the default sink of `WalkOptions`
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEmitter;

impl EventEmitter for NoopEmitter {
    fn emit(&self, _kind: EventKind) -> u64 {
        0
    }
}
