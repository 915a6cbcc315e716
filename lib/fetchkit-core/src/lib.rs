//! Core types and contracts for the fetchkit request pipeline.
//!
//! This crate provides the pieces every pipeline stage shares:
//! - [`FetchInit`] - the request descriptor threaded through the stages
//! - [`Executor`] and [`Middleware`] - the composition contracts
//! - [`Transport`] - the leaf contract performing one HTTP exchange
//! - [`Request`] and [`Response`] - transport-level messages
//! - [`Error`] and [`Result`] - error handling
//! - [`Retry`] and [`RetryOverrides`] - caller-facing retry settings
//! - [`Logger`] - the diagnostics sink
//! - [`FormValue`], [`flatten`], [`Form`] - query, form and multipart encoding

mod body;
mod display;
mod error;
mod executor;
mod init;
mod logger;
mod method;
mod multipart;
pub mod prelude;
mod request;
mod response;
mod retry;
mod transport;
mod value;

pub use body::{ContentType, from_json, from_json_value, to_form, to_json, to_query_string};
pub use display::{headers_to_string, request_line, status_line};
pub use error::{ECONNREFUSED, ECONNRESET, ETIMEDOUT, Error, Result};
pub use executor::{
    Executor, ExecutorFn, Fallible, Layered, Middleware, MiddlewareFn, ResponseFuture,
    apply_middleware, apply_middleware_fn, executor_fn, middleware_fn,
};
pub use init::FetchInit;
pub use logger::{Logger, SharedLogger, TracingLogger};
pub use method::Method;
pub use multipart::{Form, Part};
pub use request::{Request, RequestBuilder};
pub use response::Response;
pub use retry::{Retry, RetryOverrides};
pub use transport::Transport;
pub use value::{FormValue, flatten};

// Re-export http crate types for status codes and headers
pub use http::{StatusCode, header};
