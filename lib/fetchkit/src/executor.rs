//! The base executor, leaf of every pipeline.

use std::sync::Arc;
use std::time::Instant;

use crate::{
    Error, ExecutorConfig, FetchInit, HyperTransport, Request, Response, ResponseFuture, Result,
    Transport, headers_to_string, request_line, status_line,
};

/// Sends a resolved descriptor through a [`Transport`].
///
/// Only `url`, `method`, `headers` and `body` are read; every other field must
/// have been consumed by an outer middleware. A missing `url` fails with
/// `url must be provided` before the transport is called.
pub struct BasicExecutor<T> {
    transport: Arc<T>,
    config: ExecutorConfig,
}

impl<T> Clone for BasicExecutor<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            config: self.config,
        }
    }
}

impl<T> std::fmt::Debug for BasicExecutor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicExecutor")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<T> BasicExecutor<T> {
    /// Executor over `transport`.
    pub fn new(transport: T, config: ExecutorConfig) -> Self {
        Self::from_shared(Arc::new(transport), config)
    }

    /// Executor over a transport shared with other pipelines.
    pub const fn from_shared(transport: Arc<T>, config: ExecutorConfig) -> Self {
        Self { transport, config }
    }

    /// The underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The executor configuration.
    #[must_use]
    pub const fn config(&self) -> ExecutorConfig {
        self.config
    }
}

impl BasicExecutor<HyperTransport> {
    /// Executor over the default hyper transport, configured from the environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(HyperTransport::new(), ExecutorConfig::from_env())
    }
}

impl<T: Transport + 'static> crate::Executor for BasicExecutor<T> {
    type Output = ResponseFuture;

    fn execute(&self, init: FetchInit) -> ResponseFuture {
        let transport = Arc::clone(&self.transport);
        let verbose = self.config.verbose;
        Box::pin(async move { send(transport.as_ref(), init, verbose).await })
    }
}

async fn send<T: Transport>(transport: &T, init: FetchInit, verbose: bool) -> Result<Response> {
    let logger = init.logger();
    let request = into_request(init)?;

    if verbose {
        logger.debug(&request_line(&request));
        logger.trace(&headers_to_string(request.headers()));
    }

    let start = Instant::now();
    let response = transport.execute(request).await?;

    if verbose {
        logger.debug(&format!(
            ">....{}ms {}",
            start.elapsed().as_millis(),
            status_line(&response)
        ));
        logger.trace(&headers_to_string(response.headers()));
    }

    Ok(response)
}

fn into_request(init: FetchInit) -> Result<Request> {
    let url = init
        .url
        .filter(|url| !url.is_empty())
        .ok_or_else(|| Error::configuration("url must be provided"))?;
    let url = url::Url::parse(&url)?;

    Ok(Request::builder(init.method.unwrap_or_default(), url)
        .headers(init.headers)
        .maybe_body(init.body)
        .build())
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::Method;

    #[test]
    fn missing_url_is_a_configuration_error() {
        let error = into_request(FetchInit::new()).expect_err("no url");
        assert_eq!(error.to_string(), "configuration error: url must be provided");

        let error = into_request(FetchInit::new().with_url("")).expect_err("empty url");
        assert!(error.is_configuration());
    }

    #[test]
    fn method_defaults_to_get() {
        let request = into_request(FetchInit::new().with_url("https://example.com/a")).expect("request");
        assert_eq!(request.method(), Method::Get);
        assert!(request.body().is_none());
    }

    #[test]
    fn forwards_headers_and_body() {
        let init = FetchInit::new()
            .with_url("https://example.com/a")
            .with_method(Method::Post)
            .with_header("content-type", "text/plain")
            .with_body("hello")
            .with_plain("ignored");

        let request = into_request(init).expect("request");

        assert_eq!(request.method(), Method::Post);
        assert_eq!(request.header("Content-Type"), Some("text/plain"));
        assert_eq!(request.body(), Some(&bytes::Bytes::from_static(b"hello")));
    }

    #[test]
    fn invalid_url() {
        let error = into_request(FetchInit::new().with_url("not a url")).expect_err("invalid");
        assert!(matches!(error, Error::InvalidUrl(_)));
    }
}
