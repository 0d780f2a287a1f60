//! Walker - concurrent dependency-ordered traversal with tokio
//!
//! One coordinating loop (the caller's task) plus one worker task per unit:
//! - extremity units (leaves forward, roots inverse) are dispatched first
//! - each completion is joined by the coordinator, which dispatches the
//!   neighbors that just became ready
//! - status table, results and first failure share ONE lock
//! - a semaphore bounds running visitor calls; the coordinator holds no permit
//!
//! A visitor error cancels the walk-scoped token: nothing new is dispatched,
//! in-flight calls run to completion, then the first error is returned.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::ast::Project;
use crate::dag::{build_validated, Graph};
use crate::error::{GraphError, WalkError};
use crate::event::{EventEmitter, EventKind};

use super::options::{Direction, WalkOptions};
use super::results::Results;
use super::visitor::Visitor;

/// Per-vertex traversal status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Unvisited,
    Entered,
    Visited,
}

/// Shared mutable state of one walk
struct WalkState<T, E> {
    status: Vec<Status>,
    results: Results<T>,
    failure: Option<WalkError<E>>,
}

impl<T, E> WalkState<T, E> {
    fn new(len: usize) -> Self {
        Self {
            status: vec![Status::Unvisited; len],
            results: Results::with_capacity(len),
            failure: None,
        }
    }

    /// Unvisited -> Entered. False when another completion already won.
    fn try_enter(&mut self, idx: usize) -> bool {
        if self.status[idx] != Status::Unvisited {
            return false;
        }
        self.status[idx] = Status::Entered;
        true
    }

    fn is_visited(&self, idx: usize) -> bool {
        self.status[idx] == Status::Visited
    }

    fn finish(&mut self, idx: usize, key: &str, value: T) {
        debug_assert_eq!(self.status[idx], Status::Entered);
        self.status[idx] = Status::Visited;
        let fresh = self.results.record(key, value);
        debug_assert!(fresh, "unit '{key}' recorded twice");
    }

    /// Keep the first failure only
    fn fail(&mut self, error: WalkError<E>) {
        if self.failure.is_none() {
            self.failure = Some(error);
        }
    }
}

/// Units that must be visited before `idx` in this direction
fn prerequisites<P>(graph: &Graph<P>, direction: Direction, idx: usize) -> &[usize] {
    match direction {
        Direction::Forward => graph.children_of(idx),
        Direction::Inverse => graph.parents_of(idx),
    }
}

/// Units that may become ready once `idx` is visited
fn successors<P>(graph: &Graph<P>, direction: Direction, idx: usize) -> &[usize] {
    match direction {
        Direction::Forward => graph.parents_of(idx),
        Direction::Inverse => graph.children_of(idx),
    }
}

/// Walks a validated graph; reusable across walks
pub struct Walker<P> {
    graph: Arc<Graph<P>>,
}

impl<P> Clone for Walker<P> {
    fn clone(&self) -> Self {
        Self {
            graph: Arc::clone(&self.graph),
        }
    }
}

impl<P> Walker<P>
where
    P: Send + Sync + 'static,
{
    /// Wrap a graph after checking it for cycles
    pub fn new(graph: Graph<P>) -> Result<Self, GraphError> {
        graph.check_cycle()?;
        Ok(Self {
            graph: Arc::new(graph),
        })
    }

    /// Build and validate the graph of a project
    pub fn from_project(project: Project<P>) -> Result<Self, GraphError> {
        Ok(Self {
            graph: Arc::new(build_validated(project)?),
        })
    }

    pub fn graph(&self) -> &Graph<P> {
        &self.graph
    }

    /// Visit every unit once, honoring dependency order, and collect the
    /// visitor's values.
    #[instrument(
        name = "walk",
        skip_all,
        fields(units = self.graph.len(), direction = %options.direction())
    )]
    pub async fn walk<V>(
        &self,
        visitor: V,
        options: WalkOptions,
    ) -> Result<Results<V::Output>, WalkError<V::Error>>
    where
        V: Visitor<P>,
    {
        let total = self.graph.len();
        let direction = options.direction();
        let selected = self.select(options.start_from(), direction)?;
        let started = Instant::now();
        let walk_token = options.cancellation().child_token();
        // dropping the walk future must stop workers still waiting for a permit
        let _abandon = walk_token.clone().drop_guard();

        let dispatcher = Dispatcher {
            graph: Arc::clone(&self.graph),
            visitor: Arc::new(visitor),
            state: Arc::new(Mutex::new(WalkState::new(total))),
            limiter: (options.max_concurrency() > 0)
                .then(|| Arc::new(Semaphore::new(options.max_concurrency()))),
            cancel: walk_token,
            emitter: Arc::clone(options.emitter()),
            selected,
            direction,
        };

        dispatcher.emitter.emit(EventKind::WalkStarted {
            unit_count: total,
            direction,
        });
        info!(max_concurrency = options.max_concurrency(), "starting walk");

        let mut tasks: JoinSet<Option<usize>> = JoinSet::new();
        let extremities: Vec<usize> = match direction {
            Direction::Forward => self.graph.leaf_indices().collect(),
            Direction::Inverse => self.graph.root_indices().collect(),
        };
        dispatcher.dispatch(&mut tasks, extremities);

        let mut visited = 0;
        while visited < total {
            tokio::select! {
                biased;
                _ = dispatcher.cancel.cancelled() => break,
                joined = tasks.join_next() => match joined {
                    Some(Ok(Some(idx))) => {
                        visited += 1;
                        dispatcher.dispatch(
                            &mut tasks,
                            successors(&self.graph, direction, idx).iter().copied(),
                        );
                    }
                    // failed, or never started
                    Some(Ok(None)) => {}
                    Some(Err(e)) => warn!(error = %e, "worker task aborted"),
                    None => {
                        warn!(visited, total, "no work in flight before every unit was visited");
                        break;
                    }
                },
            }
        }

        if visited < total {
            dispatcher.cancel.cancel();
        }

        // Let in-flight work settle; completions still record their results
        while let Some(joined) = tasks.join_next().await {
            if let Ok(Some(_)) = joined {
                visited += 1;
            }
        }

        let (failure, results) = {
            let mut state = dispatcher.state.lock();
            (state.failure.take(), std::mem::take(&mut state.results))
        };

        if let Some(failure) = failure {
            dispatcher.emitter.emit(EventKind::WalkCancelled {
                reason: failure.to_string(),
            });
            warn!(visited, total, error = %failure, "walk failed");
            return Err(failure);
        }
        if visited < total {
            dispatcher.emitter.emit(EventKind::WalkCancelled {
                reason: "cancelled by caller".to_string(),
            });
            warn!(visited, total, "walk cancelled");
            return Err(WalkError::Cancelled);
        }

        let duration_ms = started.elapsed().as_millis() as u64;
        dispatcher.emitter.emit(EventKind::WalkCompleted {
            visited,
            duration_ms,
        });
        info!(visited, duration_ms, "walk completed");

        Ok(results)
    }

    /// Start subset plus everything downstream of it in this direction
    fn select(
        &self,
        start_from: &[String],
        direction: Direction,
    ) -> Result<Option<Vec<bool>>, GraphError> {
        if start_from.is_empty() {
            return Ok(None);
        }

        let mut selected = vec![false; self.graph.len()];
        let mut stack = Vec::with_capacity(start_from.len());
        for key in start_from {
            let idx = self
                .graph
                .index_of(key)
                .ok_or_else(|| GraphError::UnknownStartUnit { unit: key.clone() })?;
            stack.push(idx);
        }

        while let Some(idx) = stack.pop() {
            if std::mem::replace(&mut selected[idx], true) {
                continue;
            }
            stack.extend_from_slice(successors(&self.graph, direction, idx));
        }

        Ok(Some(selected))
    }
}

/// Everything a worker task needs, shared by the coordinator
struct Dispatcher<P, V>
where
    P: Send + Sync + 'static,
    V: Visitor<P>,
{
    graph: Arc<Graph<P>>,
    visitor: Arc<V>,
    state: Arc<Mutex<WalkState<V::Output, V::Error>>>,
    limiter: Option<Arc<Semaphore>>,
    cancel: CancellationToken,
    emitter: Arc<dyn EventEmitter>,
    /// None = every unit is visited
    selected: Option<Vec<bool>>,
    direction: Direction,
}

impl<P, V> Dispatcher<P, V>
where
    P: Send + Sync + 'static,
    V: Visitor<P>,
{
    /// Spawn a worker for every candidate that is ready and not yet entered
    fn dispatch(
        &self,
        tasks: &mut JoinSet<Option<usize>>,
        candidates: impl IntoIterator<Item = usize>,
    ) {
        if self.cancel.is_cancelled() {
            return;
        }

        for idx in candidates {
            {
                let mut state = self.state.lock();
                let ready = prerequisites(&self.graph, self.direction, idx)
                    .iter()
                    .all(|&dep| state.is_visited(dep));
                if !ready || !state.try_enter(idx) {
                    continue;
                }
            }

            let unit = self.graph.vertex_at(idx).shared_key();
            debug!(unit = %unit, "dispatching");
            self.emitter.emit(EventKind::UnitScheduled {
                unit: Arc::clone(&unit),
            });

            let work = self.work(idx);
            let state = Arc::clone(&self.state);
            let cancel = self.cancel.clone();
            // inner task isolates visitor panics so the unit stays known
            tasks.spawn(async move {
                match tokio::spawn(work).await {
                    Ok(done) => done,
                    Err(e) => {
                        warn!(unit = %unit, error = %e, "visitor panicked");
                        state.lock().fail(WalkError::Panicked {
                            unit: unit.to_string(),
                        });
                        cancel.cancel();
                        None
                    }
                }
            });
        }
    }

    /// Worker body: Some(idx) once the unit is visited, None otherwise
    fn work(&self, idx: usize) -> impl Future<Output = Option<usize>> + Send + 'static {
        let vertex = self.graph.vertex_at(idx);
        let unit = vertex.shared_key();
        let payload = vertex.shared_payload();
        let skip = self.selected.as_ref().is_some_and(|s| !s[idx]);
        let visitor = Arc::clone(&self.visitor);
        let state = Arc::clone(&self.state);
        let limiter = self.limiter.clone();
        let cancel = self.cancel.clone();
        let emitter = Arc::clone(&self.emitter);

        async move {
            if skip {
                emitter.emit(EventKind::UnitSkipped {
                    unit: Arc::clone(&unit),
                });
                state.lock().finish(idx, &unit, V::Output::default());
                return Some(idx);
            }

            let _permit = match limiter {
                Some(semaphore) => Some(semaphore.acquire_owned().await.ok()?),
                None => None,
            };
            if cancel.is_cancelled() {
                debug!(unit = %unit, "cancelled before start");
                return None;
            }

            emitter.emit(EventKind::UnitStarted {
                unit: Arc::clone(&unit),
            });
            let start = Instant::now();
            let outcome = visitor.visit(&unit, &payload, &cancel).await;
            let duration_ms = start.elapsed().as_millis() as u64;

            match outcome {
                Ok(value) => {
                    state.lock().finish(idx, &unit, value);
                    emitter.emit(EventKind::UnitCompleted { unit, duration_ms });
                    Some(idx)
                }
                Err(error) => {
                    let message = error.to_string();
                    warn!(unit = %unit, error = %message, "visitor failed");
                    emitter.emit(EventKind::UnitFailed {
                        unit,
                        error: message,
                        duration_ms,
                    });
                    state.lock().fail(WalkError::Visit(error));
                    cancel.cancel();
                    None
                }
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════
// PROJECT-LEVEL ENTRY POINTS (graph rebuilt and validated per call)
// ═══════════════════════════════════════════════════════════════

/// Walk a project and collect each visitor value per unit
pub async fn collect<P, V>(
    project: Project<P>,
    visitor: V,
    options: WalkOptions,
) -> Result<Results<V::Output>, WalkError<V::Error>>
where
    P: Send + Sync + 'static,
    V: Visitor<P>,
{
    Walker::from_project(project)?.walk(visitor, options).await
}

/// Walk a project, discarding visitor values
pub async fn walk<P, V>(
    project: Project<P>,
    visitor: V,
    options: WalkOptions,
) -> Result<(), WalkError<V::Error>>
where
    P: Send + Sync + 'static,
    V: Visitor<P>,
{
    collect(project, visitor, options).await.map(drop)
}

/// Dependencies before dependents
pub async fn in_dependency_order<P, V>(
    project: Project<P>,
    visitor: V,
    options: WalkOptions,
) -> Result<(), WalkError<V::Error>>
where
    P: Send + Sync + 'static,
    V: Visitor<P>,
{
    walk(project, visitor, options.with_direction(Direction::Forward)).await
}

/// Dependents before dependencies
pub async fn in_reverse_dependency_order<P, V>(
    project: Project<P>,
    visitor: V,
    options: WalkOptions,
) -> Result<(), WalkError<V::Error>>
where
    P: Send + Sync + 'static,
    V: Visitor<P>,
{
    walk(project, visitor, options.with_direction(Direction::Inverse)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::UnitDef;
    use crate::runtime::visit_fn;

    #[test]
    fn enter_is_idempotent() {
        let mut state: WalkState<(), String> = WalkState::new(2);
        assert!(state.try_enter(0));
        assert!(!state.try_enter(0));
        state.finish(0, "a", ());
        assert!(!state.try_enter(0));
        assert!(state.is_visited(0));
        assert!(!state.is_visited(1));
    }

    #[test]
    fn first_failure_wins() {
        let mut state: WalkState<(), String> = WalkState::new(1);
        state.fail(WalkError::Visit("first".into()));
        state.fail(WalkError::Visit("second".into()));
        assert_eq!(
            state.failure.and_then(WalkError::into_visit).as_deref(),
            Some("first")
        );
    }

    fn chain() -> Project<()> {
        // a -> b -> c
        Project::new()
            .with_unit("a", UnitDef::new(()).depends_on("b"))
            .with_unit("b", UnitDef::new(()).depends_on("c"))
            .with_unit("c", UnitDef::new(()))
    }

    #[test]
    fn select_follows_successors() {
        let walker = Walker::from_project(chain()).unwrap();

        // forward: b and what depends on it
        let forward = walker.select(&["b".to_string()], Direction::Forward).unwrap();
        assert_eq!(forward, Some(vec![true, true, false]));

        // inverse: b and what it depends on
        let inverse = walker.select(&["b".to_string()], Direction::Inverse).unwrap();
        assert_eq!(inverse, Some(vec![false, true, true]));

        assert_eq!(walker.select(&[], Direction::Forward).unwrap(), None);
    }

    #[test]
    fn select_rejects_unknown_unit() {
        let walker = Walker::from_project(chain()).unwrap();
        let err = walker
            .select(&["nope".to_string()], Direction::Forward)
            .unwrap_err();
        assert_eq!(err.code(), "DEPWALK-012");
    }

    #[tokio::test]
    async fn walker_is_reusable() {
        let walker = Walker::from_project(chain()).unwrap();
        for _ in 0..3 {
            let results = walker
                .walk(
                    visit_fn(|key: String, _: (), _: CancellationToken| async move {
                        Ok::<_, String>(key.len())
                    }),
                    WalkOptions::new(),
                )
                .await
                .unwrap();
            assert_eq!(results.len(), 3);
        }
    }
}
