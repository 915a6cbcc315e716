//! Authentication middleware.
//!
//! Turns the descriptor credentials into an `authorization` header:
//! - `basic_auth` gives `Basic <base64(user:pass)>`
//! - `bearer_token` gives `Bearer <token>`, and wins over basic credentials

use base64::Engine;

use crate::{Executor, FetchInit, Middleware};

/// Sets the `authorization` header from the descriptor credentials.
///
/// Other headers are left untouched, and so is an existing `authorization`
/// header when the descriptor carries no credentials.
#[derive(Debug, Clone, Copy, Default)]
pub struct Auth;

impl Auth {
    /// Create the middleware.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl<E: Executor> Middleware<E> for Auth {
    type Output = E::Output;

    fn call(&self, init: FetchInit, next: &E) -> Self::Output {
        next.execute(apply_credentials(init))
    }
}

/// Apply the descriptor credentials to its headers.
#[must_use]
pub fn apply_credentials(init: FetchInit) -> FetchInit {
    let bearer_token = init.bearer_token.as_deref().filter(|token| !token.is_empty());
    let authorization = match (bearer_token, &init.basic_auth) {
        (Some(token), _) => Some(format!("Bearer {token}")),
        (None, Some((username, password))) => {
            let encoded =
                base64::engine::general_purpose::STANDARD.encode(format!("{username}:{password}"));
            Some(format!("Basic {encoded}"))
        }
        (None, None) => None,
    };

    match authorization {
        Some(value) => init.with_header("authorization", value),
        None => init,
    }
}
