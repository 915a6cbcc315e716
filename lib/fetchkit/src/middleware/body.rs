//! Body encoding middleware.

use crate::{
    ContentType, Executor, Fallible, FetchInit, Form, Method, Middleware, Result, to_form, to_json,
};

/// Encodes `plain`, `json`, `urlencoded` or `multipart` into `body`.
///
/// Nothing happens when `body` is already set. Otherwise the fields are
/// encoded in that order, a later one overriding an earlier one, and the
/// matching `content-type` is merged into the headers. Without an explicit
/// method, the request becomes a `POST` when a body was produced and a `GET`
/// otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct BodyBuilder;

impl BodyBuilder {
    /// Create the middleware.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl<E> Middleware<E> for BodyBuilder
where
    E: Executor,
    E::Output: Fallible,
{
    type Output = E::Output;

    fn call(&self, init: FetchInit, next: &E) -> Self::Output {
        if init.body.is_some() {
            return next.execute(init);
        }
        match encode_body(init) {
            Ok(init) => next.execute(init),
            Err(error) => E::Output::from_error(error),
        }
    }
}

/// Encode the body fields of a descriptor.
///
/// # Errors
///
/// Fails when the JSON body cannot be serialized.
pub fn encode_body(init: FetchInit) -> Result<FetchInit> {
    if init.body.is_some() {
        return Ok(init);
    }

    let mut encoded = None;

    if let Some(plain) = &init.plain {
        encoded = Some((ContentType::PlainText.to_string(), plain.clone().into()));
    }
    if let Some(json) = &init.json {
        encoded = Some((ContentType::Json.to_string(), to_json(json)?));
    }
    if let Some(form) = &init.urlencoded {
        encoded = Some((ContentType::FormUrlEncoded.to_string(), to_form(form)));
    }
    if let Some(multipart) = &init.multipart {
        encoded = Some(Form::from_value(multipart).into_body());
    }

    let method = init.method;
    Ok(match encoded {
        Some((content_type, body)) => init
            .with_header("content-type", content_type)
            .with_body(body)
            .with_method(method.unwrap_or(Method::Post)),
        None => init.with_method(method.unwrap_or(Method::Get)),
    })
}
