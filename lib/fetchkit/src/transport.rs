//! Transport adapters.
//!
//! - [`HyperTransport`] - hyper-util client over rustls, the default leaf
//! - [`ServiceTransport`] - any tower [`Service`] used as a transport
//!
//! Both report network failures as [`Error::Transport`] with a code the retry
//! middleware can match on.

use std::collections::HashMap;
use std::error::Error as StdError;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnector;
use hyper_util::{
    client::legacy::{Client, connect::HttpConnector},
    rt::TokioExecutor,
};
use tower::ServiceExt;
use tower_service::Service;

use crate::{
    ECONNREFUSED, ECONNRESET, ETIMEDOUT, Error, Request, Response, Result, Transport,
    TransportConfig, connector::https_connector,
};

/// Future returned by the tower [`Service`] implementations.
pub type ServiceFuture = Pin<Box<dyn Future<Output = Result<Response>> + Send + 'static>>;

/// Transport backed by a pooled hyper-util client.
///
/// # Example
///
/// ```no_run
/// use fetchkit::{HyperTransport, TransportConfig};
/// use std::time::Duration;
///
/// let transport = HyperTransport::with_config(
///     TransportConfig::builder().timeout(Duration::from_secs(5)).build(),
/// );
/// ```
#[derive(Clone)]
pub struct HyperTransport {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    config: TransportConfig,
}

impl std::fmt::Debug for HyperTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperTransport")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl HyperTransport {
    /// Transport with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(TransportConfig::default())
    }

    /// Transport with a custom configuration.
    #[must_use]
    pub fn with_config(config: TransportConfig) -> Self {
        let inner = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_idle_per_host)
            .build(https_connector(&config));

        Self { inner, config }
    }

    /// The transport configuration.
    #[must_use]
    pub const fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn build_hyper_request(request: Request) -> Result<http::Request<Full<Bytes>>> {
        let (method, url, headers, body) = request.into_parts();

        let mut builder = http::Request::builder()
            .method(http::Method::from(method))
            .uri(url.as_str());

        for (name, value) in &headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder
            .body(body.map_or_else(Full::default, Full::new))
            .map_err(|e| Error::invalid_request(e.to_string()))
    }

    fn extract_headers(headers: &http::HeaderMap) -> HashMap<String, String> {
        headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.to_string(), v.to_string()))
            })
            .collect()
    }

    async fn exchange(&self, request: Request) -> Result<Response> {
        let hyper_request = Self::build_hyper_request(request)?;
        tracing::trace!(method = %hyper_request.method(), uri = %hyper_request.uri(), "sending request");

        let response = self
            .inner
            .request(hyper_request)
            .await
            .map_err(map_client_error)
            .inspect_err(|error| tracing::debug!(%error, "exchange failed"))?;

        let status = response.status().as_u16();
        let headers = Self::extract_headers(response.headers());

        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| transport_error(&e))?
            .to_bytes();

        Ok(Response::new(status, headers, body))
    }
}

impl Transport for HyperTransport {
    async fn execute(&self, request: Request) -> Result<Response> {
        tokio::time::timeout(self.config.timeout, self.exchange(request))
            .await
            .map_err(|_| {
                tracing::debug!(timeout = ?self.config.timeout, "request timed out");
                Error::Timeout
            })?
    }
}

impl Service<Request> for HyperTransport {
    type Response = Response;
    type Error = Error;
    type Future = ServiceFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let transport = self.clone();
        Box::pin(async move { Transport::execute(&transport, request).await })
    }
}

#[allow(clippy::needless_pass_by_value)]
fn map_client_error(err: hyper_util::client::legacy::Error) -> Error {
    if io_code(&err).is_none() {
        let msg = err.to_string().to_ascii_lowercase();
        if msg.contains("ssl") || msg.contains("tls") || msg.contains("certificate") {
            return Error::tls(error_chain(&err));
        }
        if err.is_connect() {
            return Error::transport(ECONNREFUSED, error_chain(&err));
        }
    }
    transport_error(&err)
}

fn transport_error(err: &(dyn StdError + 'static)) -> Error {
    Error::transport(io_code(err).unwrap_or(ECONNRESET), error_chain(err))
}

/// Code of the first recognized I/O error in the source chain.
fn io_code(err: &(dyn StdError + 'static)) -> Option<&'static str> {
    let mut current = Some(err);
    while let Some(err) = current {
        if let Some(io) = err.downcast_ref::<io::Error>() {
            if let Some(code) = io_kind_code(io.kind()) {
                return Some(code);
            }
            // io::Error::source skips the wrapped error itself
            if let Some(inner) = io.get_ref() {
                current = Some(inner as &(dyn StdError + 'static));
                continue;
            }
        }
        current = err.source();
    }
    None
}

const fn io_kind_code(kind: io::ErrorKind) -> Option<&'static str> {
    match kind {
        io::ErrorKind::ConnectionReset => Some(ECONNRESET),
        io::ErrorKind::ConnectionRefused => Some(ECONNREFUSED),
        io::ErrorKind::TimedOut => Some(ETIMEDOUT),
        io::ErrorKind::ConnectionAborted => Some("ECONNABORTED"),
        io::ErrorKind::BrokenPipe => Some("EPIPE"),
        io::ErrorKind::AddrNotAvailable => Some("EADDRNOTAVAIL"),
        _ => None,
    }
}

fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut current = err.source();
    while let Some(source) = current {
        message.push_str(": ");
        message.push_str(&source.to_string());
        current = source.source();
    }
    message
}

/// Any tower service handling [`Request`]s, used as a transport.
///
/// Each exchange drives a clone of the service to readiness then calls it.
///
/// ```
/// use fetchkit::{Error, Request, Response, ServiceTransport};
///
/// let transport = ServiceTransport::new(tower::service_fn(|_request: Request| async {
///     Ok::<_, Error>(Response::new(204, Default::default(), ""))
/// }));
/// ```
#[derive(Debug, Clone)]
pub struct ServiceTransport<S> {
    inner: S,
}

impl<S> ServiceTransport<S> {
    /// Wrap a service.
    pub const fn new(inner: S) -> Self {
        Self { inner }
    }

    /// The wrapped service.
    pub const fn get_ref(&self) -> &S {
        &self.inner
    }
}

impl<S> Transport for ServiceTransport<S>
where
    S: Service<Request, Response = Response, Error = Error> + Clone + Send + Sync + 'static,
    S::Future: Send,
{
    fn execute(&self, request: Request) -> impl Future<Output = Result<Response>> + Send {
        self.inner.clone().oneshot(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_map_to_codes() {
        let reset = io::Error::from(io::ErrorKind::ConnectionReset);
        let refused = io::Error::from(io::ErrorKind::ConnectionRefused);
        let other = io::Error::other("boom");

        assert_eq!(io_code(&reset), Some(ECONNRESET));
        assert_eq!(io_code(&refused), Some(ECONNREFUSED));
        assert_eq!(io_code(&other), None);
    }

    #[test]
    fn codes_are_found_in_source_chain() {
        let wrapped = io::Error::other(io::Error::from(io::ErrorKind::ConnectionReset));
        let error = transport_error(&wrapped);
        assert_eq!(error.code(), Some(ECONNRESET));
    }

    #[test]
    fn build_request_carries_headers_and_body() {
        let url = url::Url::parse("https://example.com/x").expect("url");
        let request = Request::builder(crate::Method::Put, url)
            .header("X-Id", "1")
            .body("payload")
            .build();

        let hyper_request = HyperTransport::build_hyper_request(request).expect("request");

        assert_eq!(hyper_request.method(), http::Method::PUT);
        assert_eq!(hyper_request.uri(), "https://example.com/x");
        assert_eq!(
            hyper_request.headers().get("x-id").and_then(|v| v.to_str().ok()),
            Some("1")
        );
    }
}
