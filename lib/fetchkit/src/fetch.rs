//! Default pipeline assembly.

use crate::middleware::{Auth, BodyBuilder, Retrier, UrlBuilder};
use crate::response::{BaseResponse, BufferResponse, JsonResponse, TextResponse, VoidResponse};
use crate::{BasicExecutor, ExecutorConfig, FetchBuilder, HyperTransport, Layered, Transport};

/// Executor returned by [`make_fetch`] and [`fetch_with`].
///
/// Listed outermost first: the decorations, then authentication, URL and body
/// building, and the retry loop right above the base executor.
pub type DefaultFetch<T = HyperTransport> = Layered<
    VoidResponse,
    Layered<
        BufferResponse,
        Layered<
            TextResponse,
            Layered<
                JsonResponse,
                Layered<
                    BaseResponse,
                    Layered<
                        Auth,
                        Layered<UrlBuilder, Layered<BodyBuilder, Layered<Retrier, BasicExecutor<T>>>>,
                    >,
                >,
            >,
        >,
    >,
>;

/// The default pipeline over the hyper transport.
///
/// Verbosity comes from the `FETCHKIT_ENV` environment variable, see
/// [`ExecutorConfig::from_env`].
///
/// ```no_run
/// use fetchkit::{Executor, FetchInit, make_fetch};
///
/// # async fn run() -> fetchkit::Result<()> {
/// let fetch = make_fetch();
/// let user: serde_json::Value = fetch
///     .execute(
///         FetchInit::new()
///             .with_base_url("https://api.example.com")
///             .with_path("/users/42")
///             .with_bearer_token("secret")
///             .with_retry(true),
///     )
///     .json()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[must_use]
pub fn make_fetch() -> DefaultFetch {
    fetch_with(HyperTransport::new(), ExecutorConfig::from_env())
}

/// The default pipeline over any transport.
pub fn fetch_with<T: Transport + 'static>(transport: T, config: ExecutorConfig) -> DefaultFetch<T> {
    FetchBuilder::new(BasicExecutor::new(transport, config))
        .with(Retrier)
        .with(BodyBuilder)
        .with(UrlBuilder)
        .with(Auth)
        .with(BaseResponse)
        .with(JsonResponse)
        .with(TextResponse)
        .with(BufferResponse)
        .with(VoidResponse)
        .build()
}
