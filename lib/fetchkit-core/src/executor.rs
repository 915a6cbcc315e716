//! Executor and middleware contracts.
//!
//! - [`Executor`] - resolves a [`FetchInit`] into an output (usually a
//!   [`ResponseFuture`] or a response handle)
//! - [`Middleware`] - sits in front of an executor and may rewrite the
//!   descriptor, short-circuit, or post-process the output
//! - [`Layered`] - a middleware applied to an executor, itself an executor
//!
//! Requirements between neighbours are expressed as trait bounds on the
//! executor output, so an ill-ordered pipeline fails to compile instead of
//! failing at call time.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use crate::{Error, FetchInit, Response, Result};

/// Future returned by request-level executors.
pub type ResponseFuture = Pin<Box<dyn Future<Output = Result<Response>> + Send + 'static>>;

/// Resolves a request descriptor into an output.
pub trait Executor: Clone + Send + Sync + 'static {
    /// What a call produces.
    type Output;

    /// Run the executor.
    fn execute(&self, init: FetchInit) -> Self::Output;
}

/// Wraps an executor, contributing to the request and/or the result.
///
/// A middleware receives the descriptor and the next executor. It may call
/// `next` with the descriptor unchanged or extended, not call it at all, or
/// call it and transform what comes back.
pub trait Middleware<E: Executor>: Clone + Send + Sync + 'static {
    /// What the wrapped executor produces.
    type Output;

    /// Handle one call.
    fn call(&self, init: FetchInit, next: &E) -> Self::Output;
}

/// Executor outputs that can carry an error raised before the next stage runs.
///
/// Request-building middlewares use it to fail fast on a bad descriptor while
/// keeping the output type of the stage they wrap.
pub trait Fallible: Sized {
    /// Build an output that resolves to `error`.
    fn from_error(error: Error) -> Self;
}

impl<T> Fallible for Result<T> {
    fn from_error(error: Error) -> Self {
        Err(error)
    }
}

impl<T: Send + 'static> Fallible for Pin<Box<dyn Future<Output = Result<T>> + Send>> {
    fn from_error(error: Error) -> Self {
        Box::pin(std::future::ready(Err(error)))
    }
}

/// A middleware applied to an executor.
#[derive(Debug, Clone)]
pub struct Layered<M, E> {
    middleware: M,
    inner: E,
}

impl<M, E> Layered<M, E> {
    /// The wrapped executor.
    #[must_use]
    pub const fn inner(&self) -> &E {
        &self.inner
    }
}

impl<M, E> Executor for Layered<M, E>
where
    M: Middleware<E>,
    E: Executor,
{
    type Output = M::Output;

    fn execute(&self, init: FetchInit) -> Self::Output {
        self.middleware.call(init, &self.inner)
    }
}

/// Apply a middleware to an executor.
///
/// The returned executor calls `middleware` with `executor` as its next stage.
pub fn apply_middleware<E, M>(executor: E, middleware: M) -> Layered<M, E>
where
    E: Executor,
    M: Middleware<E>,
{
    Layered {
        middleware,
        inner: executor,
    }
}

/// Apply a closure middleware to an executor.
pub fn apply_middleware_fn<E, F, O>(executor: E, f: F) -> Layered<MiddlewareFn<F>, E>
where
    E: Executor,
    F: Fn(FetchInit, &E) -> O + Clone + Send + Sync + 'static,
{
    apply_middleware(executor, MiddlewareFn(f))
}

/// Executor built from a closure, see [`executor_fn`].
#[derive(Clone)]
pub struct ExecutorFn<F>(F);

impl<F> fmt::Debug for ExecutorFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutorFn").finish_non_exhaustive()
    }
}

/// Build an executor from a closure.
///
/// ```
/// use fetchkit_core::{Executor, FetchInit, executor_fn};
///
/// let echo = executor_fn(|init: FetchInit| init.url);
/// assert_eq!(echo.execute(FetchInit::new().with_url("https://a.b")).as_deref(), Some("https://a.b"));
/// ```
pub fn executor_fn<F, O>(f: F) -> ExecutorFn<F>
where
    F: Fn(FetchInit) -> O + Clone + Send + Sync + 'static,
{
    ExecutorFn(f)
}

impl<F, O> Executor for ExecutorFn<F>
where
    F: Fn(FetchInit) -> O + Clone + Send + Sync + 'static,
{
    type Output = O;

    fn execute(&self, init: FetchInit) -> O {
        (self.0)(init)
    }
}

/// Middleware built from a closure taking the descriptor and the next stage.
#[derive(Clone)]
pub struct MiddlewareFn<F>(F);

impl<F> MiddlewareFn<F> {
    /// Wrap a closure.
    pub const fn new(f: F) -> Self {
        Self(f)
    }
}

/// Build a middleware from a closure.
///
/// The closure's `next` parameter has to be annotated when the executor type
/// is not known at the call site; [`apply_middleware_fn`] infers it.
pub const fn middleware_fn<F>(f: F) -> MiddlewareFn<F> {
    MiddlewareFn::new(f)
}

impl<F> fmt::Debug for MiddlewareFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareFn").finish_non_exhaustive()
    }
}

impl<F, E, O> Middleware<E> for MiddlewareFn<F>
where
    E: Executor,
    F: Fn(FetchInit, &E) -> O + Clone + Send + Sync + 'static,
{
    type Output = O;

    fn call(&self, init: FetchInit, next: &E) -> O {
        (self.0)(init, next)
    }
}
