//! Diagnostics sink carried by request descriptors.

use std::fmt;
use std::sync::Arc;

/// Logger contract used by the pipeline.
///
/// The base executor emits `debug`/`trace` lines when verbose, the retry
/// middleware emits one `warn` line per attempt.
pub trait Logger: Send + Sync {
    /// Debug-level message.
    fn debug(&self, message: &str);
    /// Trace-level message.
    fn trace(&self, message: &str);
    /// Warning-level message.
    fn warn(&self, message: &str);
}

/// Default logger forwarding to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn debug(&self, message: &str) {
        tracing::debug!(target: "fetchkit", "{message}");
    }

    fn trace(&self, message: &str) {
        tracing::trace!(target: "fetchkit", "{message}");
    }

    fn warn(&self, message: &str) {
        tracing::warn!(target: "fetchkit", "{message}");
    }
}

/// Shared, cloneable handle to a [`Logger`].
#[derive(Clone)]
pub struct SharedLogger(Arc<dyn Logger>);

impl SharedLogger {
    /// Wrap a logger.
    pub fn new(logger: impl Logger + 'static) -> Self {
        Self(Arc::new(logger))
    }
}

impl Default for SharedLogger {
    fn default() -> Self {
        Self::new(TracingLogger)
    }
}

impl From<Arc<dyn Logger>> for SharedLogger {
    fn from(logger: Arc<dyn Logger>) -> Self {
        Self(logger)
    }
}

impl std::ops::Deref for SharedLogger {
    type Target = dyn Logger;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

impl fmt::Debug for SharedLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedLogger").finish_non_exhaustive()
    }
}
