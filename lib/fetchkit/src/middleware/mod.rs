//! Request middlewares.
//!
//! Each middleware reads a group of [`FetchInit`](crate::FetchInit) fields and
//! hands an extended descriptor to the next stage:
//!
//! - [`UrlBuilder`] - resolves `url` from `base_url`, `host`, `path` and `query`
//! - [`BodyBuilder`] - encodes `plain`, `json`, `urlencoded` or `multipart` into `body`
//! - [`Auth`] - turns `basic_auth` or `bearer_token` into an `authorization` header
//! - [`Retrier`] - repeats the exchange under the descriptor's retry policy
//!
//! The URL and body middlewares fail fast on a bad descriptor, so the stage
//! they wrap must produce a [`Fallible`](crate::Fallible) output. The retrier
//! needs a response future from the stage it wraps.
//!
//! # Example
//!
//! ```no_run
//! use fetchkit::{BasicExecutor, Executor, FetchBuilder, FetchInit};
//! use fetchkit::middleware::{Auth, Retrier, UrlBuilder};
//!
//! # async fn run() -> fetchkit::Result<()> {
//! let fetch = FetchBuilder::new(BasicExecutor::from_env())
//!     .with(Retrier)
//!     .with(UrlBuilder)
//!     .with(Auth)
//!     .build();
//!
//! let response = fetch
//!     .execute(FetchInit::new().with_host("api.example.com").with_path("/health").with_retry(true))
//!     .await?;
//! # Ok(())
//! # }
//! ```

mod auth;
mod body;
mod retry;
mod url;

pub use auth::{Auth, apply_credentials};
pub use body::{BodyBuilder, encode_body};
pub use retry::{Retrier, RetryPolicy};
pub use url::{UrlBuilder, resolve_url};
