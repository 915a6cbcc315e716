//! The request descriptor threaded through a pipeline.
//!
//! A [`FetchInit`] is the union of every field a middleware may read or write
//! before the request reaches the transport. Stages receive it by value and
//! hand a new value to the next stage, so nothing a stage does is visible to
//! the caller or to a sibling invocation.
//!
//! # Example
//!
//! ```
//! use fetchkit_core::{FetchInit, Method};
//!
//! let init = FetchInit::new()
//!     .with_base_url("https://api.example.com/")
//!     .with_path("/v1/users")
//!     .with_query(serde_json::json!({"page": 2}))
//!     .with_bearer_token("secret")
//!     .with_retry(3_u32);
//!
//! assert_eq!(init.method, None);
//! assert_eq!(init.path.as_deref(), Some("/v1/users"));
//! ```

use std::collections::HashMap;

use bytes::Bytes;

use crate::{FormValue, Logger, Method, Retry, SharedLogger};

/// Request descriptor.
///
/// Fields are grouped by the middleware that consumes them; see each group.
#[derive(Debug, Clone, Default)]
pub struct FetchInit {
    // ---------------------------------------------------------------- target
    /// Resolved absolute URL; wins over the resolution inputs below.
    pub url: Option<String>,
    /// Scheme used with `host`; inferred from the host when absent.
    pub scheme: Option<String>,
    /// Host used to synthesize a base URL.
    pub host: Option<String>,
    /// Port used with `host`.
    pub port: Option<u16>,
    /// Base URL joined with `path`.
    pub base_url: Option<String>,
    /// Path appended to the base URL.
    pub path: Option<String>,
    /// Query parameters, flattened into bracketed keys.
    pub query: Option<FormValue>,

    // ------------------------------------------------------------------ body
    /// JSON body.
    pub json: Option<serde_json::Value>,
    /// Plain text body.
    pub plain: Option<String>,
    /// Form URL-encoded body.
    pub urlencoded: Option<FormValue>,
    /// Multipart body; binary leaves become file parts.
    pub multipart: Option<FormValue>,
    /// Raw body; when set, the body fields above are ignored.
    pub body: Option<Bytes>,

    // -------------------------------------------------------------- envelope
    /// Explicit method; inferred from the body when absent.
    pub method: Option<Method>,
    /// Headers, names lower-cased.
    pub headers: HashMap<String, String>,

    // ----------------------------------------------------------- credentials
    /// Username and password for basic authentication.
    pub basic_auth: Option<(String, String)>,
    /// Bearer token; wins over `basic_auth`.
    pub bearer_token: Option<String>,

    // ----------------------------------------------------------------- misc
    /// Retry settings.
    pub retry: Option<Retry>,
    /// Diagnostics sink; the tracing logger is used when absent.
    pub logger: Option<SharedLogger>,
}

impl FetchInit {
    /// Empty descriptor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the resolved URL.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the scheme.
    #[must_use]
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    /// Set the host.
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Set the port.
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the path.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Set the query parameters.
    #[must_use]
    pub fn with_query(mut self, query: impl Into<FormValue>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Set a JSON body.
    #[must_use]
    pub fn with_json(mut self, json: serde_json::Value) -> Self {
        self.json = Some(json);
        self
    }

    /// Set a plain text body.
    #[must_use]
    pub fn with_plain(mut self, text: impl Into<String>) -> Self {
        self.plain = Some(text.into());
        self
    }

    /// Set a form URL-encoded body.
    #[must_use]
    pub fn with_urlencoded(mut self, form: impl Into<FormValue>) -> Self {
        self.urlencoded = Some(form.into());
        self
    }

    /// Set a multipart body.
    #[must_use]
    pub fn with_multipart(mut self, form: impl Into<FormValue>) -> Self {
        self.multipart = Some(form.into());
        self
    }

    /// Set a raw body.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set the method.
    #[must_use]
    pub const fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Set a header; the name is stored lower-cased.
    #[must_use]
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
        self
    }

    /// Set basic authentication credentials.
    #[must_use]
    pub fn with_basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.basic_auth = Some((username.into(), password.into()));
        self
    }

    /// Set a bearer token.
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Set the retry settings.
    #[must_use]
    pub fn with_retry(mut self, retry: impl Into<Retry>) -> Self {
        self.retry = Some(retry.into());
        self
    }

    /// Set the logger.
    #[must_use]
    pub fn with_logger(mut self, logger: impl Logger + 'static) -> Self {
        self.logger = Some(SharedLogger::new(logger));
        self
    }

    /// Single header value by name, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// The logger to use for this request.
    #[must_use]
    pub fn logger(&self) -> SharedLogger {
        self.logger.clone().unwrap_or_default()
    }

    /// Fill every absent field from `defaults`.
    ///
    /// Fields present on `self` always win. Headers merge name by name, again
    /// with `self` winning.
    #[must_use]
    pub fn or(self, defaults: Self) -> Self {
        let mut headers = defaults.headers;
        headers.extend(self.headers);

        Self {
            url: self.url.or(defaults.url),
            scheme: self.scheme.or(defaults.scheme),
            host: self.host.or(defaults.host),
            port: self.port.or(defaults.port),
            base_url: self.base_url.or(defaults.base_url),
            path: self.path.or(defaults.path),
            query: self.query.or(defaults.query),
            json: self.json.or(defaults.json),
            plain: self.plain.or(defaults.plain),
            urlencoded: self.urlencoded.or(defaults.urlencoded),
            multipart: self.multipart.or(defaults.multipart),
            body: self.body.or(defaults.body),
            method: self.method.or(defaults.method),
            headers,
            basic_auth: self.basic_auth.or(defaults.basic_auth),
            bearer_token: self.bearer_token.or(defaults.bearer_token),
            retry: self.retry.or(defaults.retry),
            logger: self.logger.or(defaults.logger),
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn with_header_lowercases_names() {
        let init = FetchInit::new().with_header("X-Request-Id", "42");
        assert_eq!(init.headers.get("x-request-id").map(String::as_str), Some("42"));
        assert_eq!(init.header("X-REQUEST-ID"), Some("42"));
    }

    #[test]
    fn or_keeps_caller_fields() {
        let caller = FetchInit::new()
            .with_path("/users")
            .with_method(Method::Put)
            .with_header("accept", "text/plain");
        let defaults = FetchInit::new()
            .with_base_url("https://api.example.com")
            .with_path("/ignored")
            .with_header("accept", "application/json")
            .with_header("user-agent", "fetchkit");

        let merged = caller.or(defaults);

        assert_eq!(merged.base_url.as_deref(), Some("https://api.example.com"));
        assert_eq!(merged.path.as_deref(), Some("/users"));
        assert_eq!(merged.method, Some(Method::Put));
        assert_eq!(merged.header("accept"), Some("text/plain"));
        assert_eq!(merged.header("user-agent"), Some("fetchkit"));
    }

    #[test]
    fn clone_is_independent() {
        let original = FetchInit::new().with_header("a", "1");
        let changed = original.clone().with_header("a", "2");
        assert_eq!(original.header("a"), Some("1"));
        assert_eq!(changed.header("a"), Some("2"));
    }
}
