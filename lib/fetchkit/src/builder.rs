//! Pipeline builder and defaults.

use std::fmt;
use std::sync::Arc;

use crate::{Executor, FetchInit, Layered, Middleware, MiddlewareFn, apply_middleware};

/// Builds a pipeline by attaching middlewares around a base executor.
///
/// Each middleware passed to [`with`](Self::with) wraps everything attached
/// before it: a request enters the most recently attached middleware first,
/// and the first attached one sits next to the base executor.
///
/// ```
/// use fetchkit::{Executor, FetchBuilder, FetchInit, executor_fn};
/// use fetchkit::middleware::UrlBuilder;
///
/// let base = executor_fn(|init: FetchInit| -> fetchkit::Result<Option<String>> { Ok(init.url) });
/// let fetch = FetchBuilder::new(base)
///     .with(UrlBuilder)
///     .with_defaults(FetchInit::new().with_base_url("https://api.example.com"))
///     .build();
///
/// let url = fetch.execute(FetchInit::new().with_path("/users")).expect("url");
/// assert_eq!(url.as_deref(), Some("https://api.example.com/users"));
/// ```
#[derive(Debug, Clone)]
pub struct FetchBuilder<E> {
    executor: E,
}

impl<E: Executor> FetchBuilder<E> {
    /// Start from a base executor.
    pub const fn new(executor: E) -> Self {
        Self { executor }
    }

    /// Attach a middleware as the new outermost stage.
    pub fn with<M: Middleware<E>>(self, middleware: M) -> FetchBuilder<Layered<M, E>> {
        FetchBuilder {
            executor: apply_middleware(self.executor, middleware),
        }
    }

    /// Attach a closure middleware as the new outermost stage.
    ///
    /// ```
    /// use fetchkit::{Executor, FetchBuilder, FetchInit, executor_fn};
    ///
    /// let fetch = FetchBuilder::new(executor_fn(|init: FetchInit| init.path))
    ///     .with_fn(|init, next| next.execute(init.with_path("/rewritten")))
    ///     .build();
    ///
    /// assert_eq!(fetch.execute(FetchInit::new()).as_deref(), Some("/rewritten"));
    /// ```
    pub fn with_fn<F, O>(self, f: F) -> FetchBuilder<Layered<MiddlewareFn<F>, E>>
    where
        F: Fn(FetchInit, &E) -> O + Clone + Send + Sync + 'static,
    {
        FetchBuilder {
            executor: crate::apply_middleware_fn(self.executor, f),
        }
    }

    /// Merge `defaults` under every descriptor, as the new outermost stage.
    pub fn with_defaults(
        self,
        defaults: impl Into<Defaults>,
    ) -> FetchBuilder<Layered<Defaults, E>> {
        self.with(defaults.into())
    }

    /// The assembled executor.
    pub fn build(self) -> E {
        self.executor
    }
}

impl<E: Executor> From<E> for FetchBuilder<E> {
    fn from(executor: E) -> Self {
        Self::new(executor)
    }
}

/// Descriptor defaults merged under the caller's descriptor.
///
/// Fields set by the caller always win; headers merge name by name.
#[derive(Clone)]
pub enum Defaults {
    /// The same defaults for every call.
    Static(FetchInit),
    /// Defaults computed from the incoming descriptor.
    Computed(Arc<dyn Fn(&FetchInit) -> FetchInit + Send + Sync>),
}

impl Defaults {
    /// Defaults computed from each incoming descriptor.
    pub fn computed(f: impl Fn(&FetchInit) -> FetchInit + Send + Sync + 'static) -> Self {
        Self::Computed(Arc::new(f))
    }

    /// Merge the defaults under `init`.
    #[must_use]
    pub fn apply(&self, init: FetchInit) -> FetchInit {
        match self {
            Self::Static(defaults) => init.or(defaults.clone()),
            Self::Computed(compute) => {
                let defaults = compute(&init);
                init.or(defaults)
            }
        }
    }
}

impl fmt::Debug for Defaults {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(defaults) => f.debug_tuple("Static").field(defaults).finish(),
            Self::Computed(_) => f.debug_tuple("Computed").finish_non_exhaustive(),
        }
    }
}

impl From<FetchInit> for Defaults {
    fn from(defaults: FetchInit) -> Self {
        Self::Static(defaults)
    }
}

impl<E: Executor> Middleware<E> for Defaults {
    type Output = E::Output;

    fn call(&self, init: FetchInit, next: &E) -> Self::Output {
        next.execute(self.apply(init))
    }
}

/// Wrap `executor` so every call sees `defaults` merged under its descriptor.
pub fn with_defaults<E: Executor>(
    executor: E,
    defaults: impl Into<Defaults>,
) -> Layered<Defaults, E> {
    apply_middleware(executor, defaults.into())
}
