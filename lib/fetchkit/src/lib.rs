//! Composable fetch-like HTTP client.
//!
//! A pipeline is a single [`Executor`] assembled from a base executor and a
//! stack of [`Middleware`]s. Every stage receives a [`FetchInit`] descriptor,
//! may extend it, and hands it to the next stage; the base executor sends the
//! resolved request through a [`Transport`].
//!
//! # Example
//!
//! ```no_run
//! use fetchkit::prelude::*;
//!
//! #[derive(Debug, Deserialize)]
//! pub struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! # async fn run() -> fetchkit::Result<()> {
//! let fetch = make_fetch();
//! let user: User = fetch
//!     .execute(
//!         FetchInit::new()
//!             .with_base_url("https://api.example.com")
//!             .with_path("/users/42")
//!             .with_retry(3),
//!     )
//!     .json()
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! Custom pipelines are built with [`FetchBuilder`]; see [`middleware`] for
//! the request stages and [`response`] for the decoration chain.

mod builder;
mod config;
mod connector;
mod executor;
mod fetch;
pub mod graphql;
pub mod middleware;
pub mod prelude;
pub mod response;
mod transport;

pub use builder::{Defaults, FetchBuilder, with_defaults};
pub use config::{
    ENV_VAR, ExecutorConfig, ExecutorConfigBuilder, TransportConfig, TransportConfigBuilder,
};
pub use executor::BasicExecutor;
pub use fetch::{DefaultFetch, fetch_with, make_fetch};
pub use transport::{HyperTransport, ServiceFuture, ServiceTransport};

// Re-export tower for transport composition
pub use tower;

// Re-export core types
pub use fetchkit_core::{
    ContentType, ECONNREFUSED, ECONNRESET, ETIMEDOUT, Error, Executor, ExecutorFn, Fallible,
    FetchInit, Form, FormValue, Layered, Logger, Method, Middleware, MiddlewareFn, Part, Request,
    RequestBuilder, Response, ResponseFuture, Result, Retry, RetryOverrides, SharedLogger,
    Transport, TracingLogger, apply_middleware, apply_middleware_fn, executor_fn, flatten,
    from_json, from_json_value, headers_to_string, middleware_fn, request_line, status_line,
    to_form, to_json, to_query_string,
};

// Re-export http types for status codes and headers
pub use fetchkit_core::{StatusCode, header};
