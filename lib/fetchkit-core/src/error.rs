//! Error types for fetchkit.
//!
//! Errors fall into four families:
//! - configuration errors ([`Error::Configuration`]), raised before any network call;
//! - transport errors ([`Error::Transport`], [`Error::Tls`], [`Error::Timeout`],
//!   [`Error::Cancelled`]), raised by the transport adapter;
//! - encoding errors, raised while building a request body;
//! - decoding errors, raised lazily by response accessors.
//!
//! The retry middleware only ever looks at [`Error::code`].

use derive_more::{Display, Error, From};

/// Code reported for connection resets.
pub const ECONNRESET: &str = "ECONNRESET";
/// Code reported for refused connections.
pub const ECONNREFUSED: &str = "ECONNREFUSED";
/// Code reported for timeouts.
pub const ETIMEDOUT: &str = "ETIMEDOUT";

/// Main error type for fetchkit operations.
#[derive(Debug, Display, Error, From)]
pub enum Error {
    /// The request descriptor cannot be turned into a request.
    #[display("configuration error: {_0}")]
    #[from(skip)]
    Configuration(#[error(not(source))] String),

    /// Network-level failure surfaced by the transport.
    #[display("transport error [{code}]: {message}")]
    #[from(skip)]
    Transport {
        /// Discriminating error code (e.g. `ECONNRESET`).
        code: String,
        /// Error message.
        message: String,
    },

    /// TLS/SSL errors.
    #[display("TLS error: {_0}")]
    #[from(skip)]
    Tls(#[error(not(source))] String),

    /// Request timeout.
    #[display("request timeout")]
    #[from(skip)]
    Timeout,

    /// The exchange was cancelled by the caller.
    #[display("request cancelled")]
    #[from(skip)]
    Cancelled,

    /// Invalid request for the transport.
    #[display("invalid request: {_0}")]
    #[from(skip)]
    InvalidRequest(#[error(not(source))] String),

    /// The response does not have the expected shape.
    #[display("invalid response: {_0}")]
    #[from(skip)]
    InvalidResponse(#[error(not(source))] String),

    /// JSON serialization error.
    #[display("JSON serialization error: {_0}")]
    #[from]
    JsonSerialization(serde_json::Error),

    /// JSON deserialization error with path context.
    #[display("JSON deserialization error at '{path}': {message}")]
    #[from(skip)]
    JsonDeserialization {
        /// JSON path to the error (e.g., "user.address.city").
        path: String,
        /// Error message.
        message: String,
    },

    /// Response body is not valid UTF-8.
    #[display("invalid UTF-8 body: {_0}")]
    #[from]
    InvalidUtf8(std::string::FromUtf8Error),

    /// URL parsing error.
    #[display("invalid URL: {_0}")]
    #[from]
    InvalidUrl(url::ParseError),

    /// A GraphQL endpoint answered with errors.
    #[display("GraphQL error: {message}")]
    #[from(skip)]
    GraphQl {
        /// Error messages joined with `; `.
        message: String,
        /// Individual error messages.
        errors: Vec<String>,
        /// Partial data sent along with the errors.
        data: Option<serde_json::Value>,
    },
}

/// Result type alias using [`crate::Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create a transport error with a code.
    #[must_use]
    pub fn transport(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create a TLS error.
    #[must_use]
    pub fn tls(message: impl Into<String>) -> Self {
        Self::Tls(message.into())
    }

    /// Create an invalid request error.
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    /// Create an invalid response error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse(message.into())
    }

    /// Create a JSON deserialization error with path context.
    #[must_use]
    pub fn json_deserialization(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::JsonDeserialization {
            path: path.into(),
            message: message.into(),
        }
    }

    /// The discriminating code of this error, if it has one.
    ///
    /// Cancellation never reports a code, so it cannot be matched by a
    /// retry policy.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Transport { code, .. } => Some(code),
            Self::Timeout => Some(ETIMEDOUT),
            _ => None,
        }
    }

    /// Returns `true` if this is a configuration error.
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// Returns `true` if this is a transport error.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// Returns `true` if the exchange was cancelled.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Returns `true` if this error comes from decoding a response body.
    #[must_use]
    pub const fn is_decoding(&self) -> bool {
        matches!(self, Self::JsonDeserialization { .. } | Self::InvalidUtf8(_))
    }
}
