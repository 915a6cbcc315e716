//! Transport contract.
//!
//! A [`Transport`] is the leaf of every pipeline: it takes a fully-resolved
//! [`Request`] and performs one exchange. The pipeline never looks at a
//! transport error's message, only at its [`code`](crate::Error::code).
//!
//! Implement it directly for mocks, or for a host-provided HTTP stack.

use std::future::Future;
use std::sync::Arc;

use crate::{Request, Response, Result};

/// Executes one HTTP exchange.
pub trait Transport: Send + Sync {
    /// Send a request and read the full response.
    ///
    /// # Errors
    ///
    /// Returns an error if the exchange fails for any reason:
    /// - network errors, reported as [`Error::Transport`](crate::Error::Transport) with a code
    /// - TLS errors
    /// - timeouts
    /// - cancellation
    fn execute(&self, request: Request) -> impl Future<Output = Result<Response>> + Send;
}

impl<T: Transport> Transport for Arc<T> {
    fn execute(&self, request: Request) -> impl Future<Output = Result<Response>> + Send {
        (**self).execute(request)
    }
}
