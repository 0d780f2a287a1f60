//! EventLog - append-only record of a traversal
//!
//! - Event: envelope with id + timestamp + kind
//! - EventKind: walk-level and unit-level variants
//! - EventLog: thread-safe, append-only log

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::RwLock;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::runtime::Direction;

/// Single event in the traversal log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Monotonic sequence ID (for ordering)
    pub id: u64,
    /// Time since log creation (ms)
    pub timestamp_ms: u64,
    /// Event type and data
    pub kind: EventKind,
}

/// All possible event types
///
/// Uses Arc<str> for unit fields to enable zero-cost cloning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    // ═══════════════════════════════════════════
    // WALK LEVEL
    // ═══════════════════════════════════════════
    WalkStarted {
        unit_count: usize,
        direction: Direction,
    },
    WalkCompleted {
        visited: usize,
        duration_ms: u64,
    },
    /// Dispatch stopped early (visitor error or caller cancellation)
    WalkCancelled {
        reason: String,
    },

    // ═══════════════════════════════════════════
    // UNIT LEVEL
    // ═══════════════════════════════════════════
    /// Unit entered and handed to a worker task
    UnitScheduled {
        unit: Arc<str>,
    },
    /// Visitor call begins (permit acquired)
    UnitStarted {
        unit: Arc<str>,
    },
    /// Outside the start subset: visited without calling the visitor
    UnitSkipped {
        unit: Arc<str>,
    },
    UnitCompleted {
        unit: Arc<str>,
        duration_ms: u64,
    },
    UnitFailed {
        unit: Arc<str>,
        error: String,
        duration_ms: u64,
    },
}

impl EventKind {
    /// Extract the unit key if event is unit-related
    pub fn unit(&self) -> Option<&str> {
        match self {
            Self::UnitScheduled { unit }
            | Self::UnitStarted { unit }
            | Self::UnitSkipped { unit }
            | Self::UnitCompleted { unit, .. }
            | Self::UnitFailed { unit, .. } => Some(unit),
            Self::WalkStarted { .. } | Self::WalkCompleted { .. } | Self::WalkCancelled { .. } => {
                None
            }
        }
    }

    /// Check if this is a walk-level event
    pub fn is_walk_event(&self) -> bool {
        matches!(
            self,
            Self::WalkStarted { .. } | Self::WalkCompleted { .. } | Self::WalkCancelled { .. }
        )
    }
}

/// Thread-safe, append-only event log
#[derive(Clone)]
pub struct EventLog {
    events: Arc<RwLock<Vec<Event>>>,
    start_time: Instant,
    next_id: Arc<AtomicU64>,
}

impl EventLog {
    pub fn new() -> Self {
        Self {
            events: Arc::new(RwLock::new(Vec::new())),
            start_time: Instant::now(),
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Emit an event (thread-safe, returns event ID)
    pub fn emit(&self, kind: EventKind) -> u64 {
        // id allocation and push under one write lock: ids match log order
        let mut events = self.events.write();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        events.push(Event {
            id,
            timestamp_ms: self.start_time.elapsed().as_millis() as u64,
            kind,
        });
        id
    }

    /// Get all events (cloned - use `with_events` for zero-copy access)
    pub fn events(&self) -> Vec<Event> {
        self.events.read().clone()
    }

    /// Zero-copy access to events via callback
    ///
    /// Holds read lock for duration of callback - keep it short.
    pub fn with_events<T>(&self, f: impl FnOnce(&[Event]) -> T) -> T {
        f(&self.events.read())
    }

    /// Events of one unit, in emission order
    pub fn filter_unit(&self, unit: &str) -> Vec<Event> {
        self.with_events(|events| {
            events
                .iter()
                .filter(|e| e.kind.unit() == Some(unit))
                .cloned()
                .collect()
        })
    }

    /// Count events for a specific unit (no allocation)
    pub fn count_unit(&self, unit: &str) -> usize {
        self.with_events(|events| {
            events
                .iter()
                .filter(|e| e.kind.unit() == Some(unit))
                .count()
        })
    }

    /// Units in the order their visitor call completed
    pub fn completion_order(&self) -> Vec<Arc<str>> {
        self.with_events(|events| {
            events
                .iter()
                .filter_map(|e| match &e.kind {
                    EventKind::UnitCompleted { unit, .. } => Some(Arc::clone(unit)),
                    _ => None,
                })
                .collect()
        })
    }

    /// Serialize to JSON for debugging
    pub fn to_json(&self) -> Value {
        self.with_events(|events| serde_json::to_value(events).unwrap_or(Value::Null))
    }

    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog")
            .field("len", &self.len())
            .finish()
    }
}
