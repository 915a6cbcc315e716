//! Response decoration chain.
//!
//! [`BaseResponse`] turns a request-level executor into one returning a
//! [`ResponseHandle`]: nothing is sent until the handle is executed. Each
//! outer decoration wraps the handle it receives and adds one accessor:
//!
//! | middleware         | handle            | accessor                      |
//! |--------------------|-------------------|-------------------------------|
//! | [`JsonResponse`]   | [`JsonHandle`]    | `json::<T>()`                 |
//! | [`TextResponse`]   | [`TextHandle`]    | `text()`                      |
//! | [`BufferResponse`] | [`BufferHandle`]  | `buffer()`                    |
//! | [`VoidResponse`]   | [`VoidHandle`]    | `void()`                      |
//!
//! Handles deref to the handle they wrap, so every accessor added further in
//! stays callable. Accessors do not share results: each call executes the
//! request again.

use std::fmt;
use std::future::Future;
use std::ops::Deref;
use std::sync::Arc;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::{Executor, FetchInit, Middleware, Response, ResponseFuture, Result};

/// Handles able to run the underlying request.
pub trait ExecuteResponse {
    /// Send the request and return the raw response.
    fn execute(&self) -> ResponseFuture;
}

/// Innermost handle, holding the deferred request.
#[derive(Clone)]
pub struct ResponseHandle {
    execute: Arc<dyn Fn() -> ResponseFuture + Send + Sync>,
}

impl fmt::Debug for ResponseHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResponseHandle").finish_non_exhaustive()
    }
}

impl ResponseHandle {
    /// Handle running `execute` each time the request is sent.
    pub fn new(execute: impl Fn() -> ResponseFuture + Send + Sync + 'static) -> Self {
        Self {
            execute: Arc::new(execute),
        }
    }

    /// Send the request and return the raw response.
    #[must_use]
    pub fn execute(&self) -> ResponseFuture {
        (self.execute)()
    }
}

impl ExecuteResponse for ResponseHandle {
    fn execute(&self) -> ResponseFuture {
        (self.execute)()
    }
}

/// Wraps a response future executor into a [`ResponseHandle`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseResponse;

impl<E> Middleware<E> for BaseResponse
where
    E: Executor,
    E::Output: Future<Output = Result<Response>> + Send + 'static,
{
    type Output = ResponseHandle;

    fn call(&self, init: FetchInit, next: &E) -> Self::Output {
        let next = next.clone();
        ResponseHandle::new(move || Box::pin(next.execute(init.clone())))
    }
}

macro_rules! decoration {
    ($(#[$doc:meta])* $middleware:ident => $handle:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $middleware;

        impl<E> Middleware<E> for $middleware
        where
            E: Executor,
            E::Output: ExecuteResponse,
        {
            type Output = $handle<E::Output>;

            fn call(&self, init: FetchInit, next: &E) -> Self::Output {
                $handle {
                    inner: next.execute(init),
                }
            }
        }

        #[doc = concat!("Handle added by [`", stringify!($middleware), "`].")]
        #[derive(Debug, Clone)]
        pub struct $handle<H> {
            inner: H,
        }

        impl<H> $handle<H> {
            /// The wrapped handle.
            pub fn into_inner(self) -> H {
                self.inner
            }
        }

        impl<H> Deref for $handle<H> {
            type Target = H;

            fn deref(&self) -> &H {
                &self.inner
            }
        }

        impl<H: ExecuteResponse> ExecuteResponse for $handle<H> {
            fn execute(&self) -> ResponseFuture {
                self.inner.execute()
            }
        }
    };
}

decoration!(
    /// Adds `json::<T>()` to the handle.
    JsonResponse => JsonHandle
);
decoration!(
    /// Adds `text()` to the handle.
    TextResponse => TextHandle
);
decoration!(
    /// Adds `buffer()` to the handle.
    BufferResponse => BufferHandle
);
decoration!(
    /// Adds `void()` to the handle.
    VoidResponse => VoidHandle
);

impl<H: ExecuteResponse> JsonHandle<H> {
    /// Send the request and deserialize the body as JSON.
    ///
    /// # Errors
    ///
    /// Fails on transport errors, and when the body does not deserialize into
    /// `T` (the error names the offending path).
    pub async fn json<T: DeserializeOwned>(&self) -> Result<T> {
        self.inner.execute().await?.json()
    }
}

impl<H: ExecuteResponse> TextHandle<H> {
    /// Send the request and decode the body as UTF-8.
    pub async fn text(&self) -> Result<String> {
        self.inner.execute().await?.text()
    }
}

impl<H: ExecuteResponse> BufferHandle<H> {
    /// Send the request and return the raw body.
    pub async fn buffer(&self) -> Result<Bytes> {
        Ok(self.inner.execute().await?.into_body())
    }
}

impl<H: ExecuteResponse> VoidHandle<H> {
    /// Send the request and discard the body.
    pub async fn void(&self) -> Result<()> {
        self.inner.execute().await.map(drop)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::{Error, FetchBuilder, executor_fn};

    fn counting_executor(
        body: &'static str,
    ) -> (Arc<AtomicU32>, impl Executor<Output = ResponseFuture>) {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let executor = executor_fn(move |_init: FetchInit| -> ResponseFuture {
            counter.fetch_add(1, Ordering::SeqCst);
            Box::pin(async move { Ok(Response::new(200, HashMap::new(), body)) })
        });
        (calls, executor)
    }

    #[tokio::test]
    async fn building_a_handle_sends_nothing() {
        let (calls, executor) = counting_executor("{}");
        let fetch = FetchBuilder::new(executor)
            .with(BaseResponse)
            .with(JsonResponse)
            .build();

        let _handle = fetch.execute(FetchInit::new());

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn every_accessor_is_reachable_from_the_outermost_handle() {
        let (calls, executor) = counting_executor(r#"{"id":7}"#);
        let fetch = FetchBuilder::new(executor)
            .with(BaseResponse)
            .with(JsonResponse)
            .with(TextResponse)
            .with(BufferResponse)
            .with(VoidResponse)
            .build();

        let handle = fetch.execute(FetchInit::new());

        let value: serde_json::Value = handle.json().await.expect("json");
        assert_eq!(value, serde_json::json!({"id": 7}));
        assert_eq!(handle.text().await.expect("text"), r#"{"id":7}"#);
        assert_eq!(handle.buffer().await.expect("buffer"), Bytes::from_static(br#"{"id":7}"#));
        handle.void().await.expect("void");
        assert_eq!(handle.execute().await.expect("execute").status(), 200);

        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn accessors_are_not_memoized() {
        let (calls, executor) = counting_executor(r#"{"id":7}"#);
        let fetch = FetchBuilder::new(executor)
            .with(BaseResponse)
            .with(JsonResponse)
            .with(TextResponse)
            .build();

        let handle = fetch.execute(FetchInit::new());
        let _: serde_json::Value = handle.json().await.expect("json");
        let _ = handle.text().await.expect("text");

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn decoding_errors_surface_in_accessors() {
        let (_calls, executor) = counting_executor("not json");
        let fetch = FetchBuilder::new(executor)
            .with(BaseResponse)
            .with(JsonResponse)
            .build();

        let handle = fetch.execute(FetchInit::new());
        let error = handle.json::<serde_json::Value>().await.expect_err("invalid json");

        assert!(error.is_decoding());
    }

    #[tokio::test]
    async fn invalid_utf8_fails_text() {
        let executor = executor_fn(|_init: FetchInit| -> ResponseFuture {
            Box::pin(async { Ok(Response::new(200, HashMap::new(), vec![0xC3_u8, 0x28])) })
        });
        let handle = FetchBuilder::new(executor)
            .with(BaseResponse)
            .with(TextResponse)
            .build()
            .execute(FetchInit::new());

        assert!(matches!(handle.text().await, Err(Error::InvalidUtf8(_))));
    }

    #[tokio::test]
    async fn handle_replays_the_same_descriptor() {
        let executor = executor_fn(|init: FetchInit| -> ResponseFuture {
            let path = init.path.unwrap_or_default();
            Box::pin(async move { Ok(Response::new(200, HashMap::new(), path)) })
        });
        let handle = FetchBuilder::new(executor)
            .with(BaseResponse)
            .with(TextResponse)
            .build()
            .execute(FetchInit::new().with_path("/same"));

        assert_eq!(handle.text().await.expect("first"), "/same");
        assert_eq!(handle.text().await.expect("second"), "/same");
    }
}
