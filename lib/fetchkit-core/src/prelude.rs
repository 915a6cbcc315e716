//! Prelude module for convenient imports.
//!
//! ```
//! use fetchkit_core::prelude::*;
//! ```

pub use crate::{
    Error, Executor, FetchInit, FormValue, Logger, Method, Middleware, Request, Response,
    ResponseFuture, Result, Retry, RetryOverrides, Transport,
};
