//! Walk options - direction, concurrency bound, start subset
//!
//! Options compose through builder methods:
//!
//! ```
//! use depwalk::runtime::{Direction, WalkOptions};
//!
//! let options = WalkOptions::new()
//!     .with_max_concurrency(4)
//!     .with_start_from(["web"])
//!     .reverse();
//! assert_eq!(options.direction(), Direction::Inverse);
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::event::{EventEmitter, NoopEmitter};

/// Traversal direction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Dependencies before dependents (bring-up order)
    #[default]
    Forward,
    /// Dependents before dependencies (tear-down order)
    Inverse,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Forward => f.write_str("forward"),
            Direction::Inverse => f.write_str("inverse"),
        }
    }
}

/// Options for one traversal
#[derive(Clone)]
pub struct WalkOptions {
    direction: Direction,
    /// 0 = unbounded
    max_concurrency: usize,
    start_from: Vec<String>,
    cancel: CancellationToken,
    emitter: Arc<dyn EventEmitter>,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            direction: Direction::Forward,
            max_concurrency: 0,
            start_from: Vec::new(),
            cancel: CancellationToken::new(),
            emitter: Arc::new(NoopEmitter),
        }
    }
}

impl WalkOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Walk dependents before their dependencies
    pub fn reverse(self) -> Self {
        self.with_direction(Direction::Inverse)
    }

    /// Cap simultaneously running visitor calls (0 = unbounded)
    pub fn with_max_concurrency(mut self, max: usize) -> Self {
        self.max_concurrency = max;
        self
    }

    /// Only invoke the visitor for these units and everything downstream of
    /// them: their dependents in forward walks, their dependencies in inverse
    /// walks. Other units are skipped. An empty set means "all units".
    pub fn with_start_from<I, S>(mut self, units: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.start_from = units.into_iter().map(Into::into).collect();
        self
    }

    /// Parent token: cancelling it stops further dispatch
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn with_emitter(mut self, emitter: Arc<dyn EventEmitter>) -> Self {
        self.emitter = emitter;
        self
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[inline]
    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    pub fn start_from(&self) -> &[String] {
        &self.start_from
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub(crate) fn emitter(&self) -> &Arc<dyn EventEmitter> {
        &self.emitter
    }
}

impl fmt::Debug for WalkOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WalkOptions")
            .field("direction", &self.direction)
            .field("max_concurrency", &self.max_concurrency)
            .field("start_from", &self.start_from)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}
