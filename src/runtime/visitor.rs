//! Visitor - the per-unit capability the walker invokes
//!
//! The walker is polymorphic over any `Visitor` and never inspects it.
//! `visit_fn` adapts an async closure for the common case.

use std::fmt::Display;
use std::future::Future;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Work to perform for one unit
///
/// `cancel` is the walk-scoped token: it fires when another visitor failed
/// or the caller cancelled. Honoring it is up to the implementation; the
/// walker never interrupts a running call.
#[async_trait]
pub trait Visitor<P>: Send + Sync + 'static
where
    P: Send + Sync + 'static,
{
    /// Collected per unit; skipped units get `Default::default()`
    type Output: Default + Send + 'static;
    type Error: Display + Send + 'static;

    async fn visit(
        &self,
        key: &str,
        payload: &P,
        cancel: &CancellationToken,
    ) -> Result<Self::Output, Self::Error>;
}

/// Visitor built from an async closure, see [`visit_fn`]
#[derive(Debug, Clone)]
pub struct FnVisitor<F> {
    f: F,
}

/// Wrap `Fn(key, payload, cancel) -> Future<Output = Result<T, E>>`
///
/// The closure receives owned copies so the returned future can be `'static`.
pub fn visit_fn<F>(f: F) -> FnVisitor<F> {
    FnVisitor { f }
}

#[async_trait]
impl<P, F, Fut, T, E> Visitor<P> for FnVisitor<F>
where
    P: Clone + Send + Sync + 'static,
    F: Fn(String, P, CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, E>> + Send + 'static,
    T: Default + Send + 'static,
    E: Display + Send + 'static,
{
    type Output = T;
    type Error = E;

    async fn visit(&self, key: &str, payload: &P, cancel: &CancellationToken) -> Result<T, E> {
        (self.f)(key.to_string(), payload.clone(), cancel.clone()).await
    }
}
