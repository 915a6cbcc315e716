//! Prelude module for convenient imports.
//!
//! ```ignore
//! use fetchkit::prelude::*;
//! ```

pub use crate::middleware::{Auth, BodyBuilder, Retrier, UrlBuilder};
pub use crate::response::{
    BaseResponse, BufferResponse, ExecuteResponse, JsonResponse, TextResponse, VoidResponse,
};
pub use crate::{
    BasicExecutor, Defaults, Error, Executor, ExecutorConfig, FetchBuilder, FetchInit, FormValue,
    HyperTransport, Method, Middleware, Response, Result, Retry, RetryOverrides, Transport,
    TransportConfig, make_fetch,
};
pub use serde::{Deserialize, Serialize};
