//! GraphQL over a fetch pipeline.
//!
//! ```no_run
//! use fetchkit::graphql::{GraphQlApi, GraphQlMethod};
//! use fetchkit::FetchInit;
//! use serde::Deserialize;
//! use serde_json::json;
//!
//! #[derive(Debug, Deserialize)]
//! struct Viewer {
//!     login: String,
//! }
//!
//! # async fn run() -> fetchkit::Result<()> {
//! let api = GraphQlApi::with_default_fetch("https://api.example.com/graphql", GraphQlMethod::Post);
//! let viewer: Viewer = api
//!     .execute(json!({"query": "{ viewer { login } }"}), FetchInit::new())
//!     .await?;
//! # Ok(())
//! # }
//! ```

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::response::ExecuteResponse;
use crate::{DefaultFetch, Error, Executor, FetchInit, FormValue, Method, Result, make_fetch};

/// HTTP method used to send GraphQL operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GraphQlMethod {
    /// Operation fields sent as the query string.
    Get,
    /// Operation sent as the JSON body.
    #[default]
    Post,
}

impl From<GraphQlMethod> for Method {
    fn from(method: GraphQlMethod) -> Self {
        match method {
            GraphQlMethod::Get => Self::Get,
            GraphQlMethod::Post => Self::Post,
        }
    }
}

/// A GraphQL endpoint reached through an executor.
#[derive(Debug, Clone)]
pub struct GraphQlApi<E> {
    base_url: String,
    method: GraphQlMethod,
    executor: E,
}

impl GraphQlApi<DefaultFetch> {
    /// Endpoint reached through [`make_fetch`].
    pub fn with_default_fetch(base_url: impl Into<String>, method: GraphQlMethod) -> Self {
        Self::new(base_url, method, make_fetch())
    }
}

impl<E> GraphQlApi<E>
where
    E: Executor,
    E::Output: ExecuteResponse,
{
    /// Endpoint at `base_url` reached through `executor`.
    ///
    /// The executor needs URL resolution and body encoding, as the default
    /// pipeline provides.
    pub fn new(base_url: impl Into<String>, method: GraphQlMethod, executor: E) -> Self {
        Self {
            base_url: base_url.into(),
            method,
            executor,
        }
    }

    /// The endpoint URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send an operation and decode its `data`.
    ///
    /// `init` wins over the endpoint URL and method. With `GET`, every field of
    /// `input` becomes a query parameter, objects and arrays JSON-encoded. With
    /// any other method, `input` is the JSON body.
    ///
    /// # Errors
    ///
    /// - [`Error::GraphQl`] when the response carries `errors`
    /// - [`Error::InvalidResponse`] when it carries neither `errors` nor `data`
    /// - transport and decoding errors from the pipeline
    pub async fn execute<T: DeserializeOwned>(
        &self,
        input: impl Serialize,
        init: FetchInit,
    ) -> Result<T> {
        let input = serde_json::to_value(input)?;
        let method = init.method.unwrap_or_else(|| self.method.into());

        let init = init
            .or(FetchInit::new().with_base_url(self.base_url.clone()))
            .with_method(method);
        let init = if method == Method::Get {
            init.with_query(query_fields(input)?)
        } else {
            init.with_json(input)
        };

        let response = self.executor.execute(init).execute().await?;
        let envelope: Value = response.json()?;
        into_data(envelope)
    }
}

fn query_fields(input: Value) -> Result<FormValue> {
    let Value::Object(fields) = input else {
        return Err(Error::invalid_request("graphql input must be an object"));
    };

    Ok(fields
        .into_iter()
        .map(|(name, value)| {
            let value = match value {
                Value::String(text) => text,
                other => other.to_string(),
            };
            (name, FormValue::from(value))
        })
        .collect())
}

fn into_data<T: DeserializeOwned>(envelope: Value) -> Result<T> {
    if let Some(errors) = envelope.get("errors").filter(|errors| !errors.is_null()) {
        let errors: Vec<String> = errors
            .as_array()
            .map(|errors| {
                errors
                    .iter()
                    .map(|error| {
                        error
                            .get("message")
                            .and_then(Value::as_str)
                            .filter(|message| !message.is_empty())
                            .unwrap_or("unknown_error")
                            .to_string()
                    })
                    .collect()
            })
            .unwrap_or_default();
        return Err(Error::GraphQl {
            message: errors.join("; "),
            errors,
            data: envelope.get("data").cloned(),
        });
    }

    match envelope.get("data") {
        Some(data) if !data.is_null() => crate::from_json_value(data.clone()),
        _ => Err(Error::invalid_response(format!(
            "graphql query failed with invalid response: {envelope}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn data_is_decoded() {
        let data: Value = into_data(json!({"data": {"id": 1}})).expect("data");
        assert_eq!(data, json!({"id": 1}));
    }

    #[test]
    fn errors_win_over_data() {
        let result: Result<Value> = into_data(json!({
            "data": {"partial": true},
            "errors": [{"message": "denied"}, {"path": ["x"]}],
        }));

        let Err(Error::GraphQl { message, errors, data }) = result else {
            panic!("expected a GraphQL error");
        };
        assert_eq!(message, "denied; unknown_error");
        assert_eq!(errors, vec!["denied".to_string(), "unknown_error".to_string()]);
        assert_eq!(data, Some(json!({"partial": true})));
    }

    #[test]
    fn missing_data_is_an_invalid_response() {
        let result: Result<Value> = into_data(json!({"data": null}));

        let Err(Error::InvalidResponse(message)) = result else {
            panic!("expected an invalid response error");
        };
        assert_eq!(message, r#"graphql query failed with invalid response: {"data":null}"#);
    }

    #[test]
    fn query_fields_encode_structured_values() {
        let fields = query_fields(json!({
            "query": "{ viewer { login } }",
            "variables": {"id": "1"},
            "operationName": null,
            "limit": 10,
        }))
        .expect("fields");

        let FormValue::Map(mut fields) = fields else {
            panic!("expected a map");
        };
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            fields,
            vec![
                ("limit".to_string(), FormValue::from("10")),
                ("operationName".to_string(), FormValue::from("null")),
                ("query".to_string(), FormValue::from("{ viewer { login } }")),
                ("variables".to_string(), FormValue::from(r#"{"id":"1"}"#)),
            ]
        );
    }

    #[test]
    fn non_object_input_cannot_go_in_a_query() {
        let error = query_fields(json!([1, 2])).expect_err("not an object");
        assert_eq!(error.to_string(), "invalid request: graphql input must be an object");
    }
}
