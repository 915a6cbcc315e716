//! Body serialization utilities.

use bytes::Bytes;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_encode};

use crate::{FormValue, Result, flatten};

/// Characters escaped in query strings and urlencoded bodies.
///
/// Brackets stay readable so flattened keys look like `filter[active]`.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'*')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'[')
    .remove(b']');

/// Content type for request bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// JSON content type (`application/json`).
    Json,
    /// Form URL-encoded content type (`application/x-www-form-urlencoded`).
    FormUrlEncoded,
    /// Plain text content type (`text/plain`).
    PlainText,
    /// Binary content type (`application/octet-stream`).
    OctetStream,
}

impl ContentType {
    /// Get the MIME type string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::FormUrlEncoded => "application/x-www-form-urlencoded",
            Self::PlainText => "text/plain",
            Self::OctetStream => "application/octet-stream",
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Serialize a value to JSON bytes.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
///
/// # Example
///
/// ```
/// use fetchkit_core::to_json;
///
/// let bytes = to_json(&serde_json::json!({"x": 1})).expect("serialize");
/// assert_eq!(bytes.as_ref(), br#"{"x":1}"#);
/// ```
pub fn to_json<T: serde::Serialize>(value: &T) -> Result<Bytes> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(Into::into)
}

/// Serialize a nested value to a query string.
///
/// The value is [flattened](crate::flatten) first, then every key and value is
/// percent-encoded. Pairs are joined with `&`, without a leading `?`.
///
/// # Example
///
/// ```
/// use fetchkit_core::{FormValue, to_query_string};
///
/// let query = FormValue::from(serde_json::json!({"page": 1, "filter": {"active": true}}));
/// assert_eq!(to_query_string(&query), "filter[active]=true&page=1");
/// ```
#[must_use]
pub fn to_query_string(value: &FormValue) -> String {
    flatten(value)
        .into_iter()
        .map(|(key, leaf)| {
            let key = percent_encode(key.as_bytes(), QUERY_COMPONENT);
            match leaf {
                FormValue::Binary(data) => format!("{key}={}", percent_encode(data, QUERY_COMPONENT)),
                _ => {
                    let text = leaf.to_scalar_string().unwrap_or_default();
                    format!("{key}={}", percent_encode(text.as_bytes(), QUERY_COMPONENT))
                }
            }
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// Serialize a nested value to a form URL-encoded body.
///
/// Same encoding as [`to_query_string`].
#[must_use]
pub fn to_form(value: &FormValue) -> Bytes {
    Bytes::from(to_query_string(value))
}

/// Deserialize JSON bytes to a value with path-aware error messages.
///
/// Uses `serde_path_to_error` to provide detailed error messages that include
/// the exact path to the field that failed to deserialize.
///
/// # Errors
///
/// Returns an error if JSON deserialization fails, with the error message
/// including the path to the problematic field (e.g., "user.address.city").
///
/// # Example
///
/// ```
/// use fetchkit_core::from_json;
/// use serde::Deserialize;
///
/// #[derive(Debug, PartialEq, Deserialize)]
/// struct User { name: String }
///
/// let bytes = br#"{"name":"Alice"}"#;
/// let user: User = from_json(bytes).expect("deserialize");
/// assert_eq!(user, User { name: "Alice".to_string() });
/// ```
pub fn from_json<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    let mut deserializer = serde_json::Deserializer::from_slice(bytes);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        crate::Error::json_deserialization(e.path().to_string(), e.inner().to_string())
    })
}

/// Deserialize an already-parsed JSON value, with path-aware error messages.
///
/// # Errors
///
/// Returns an error if the value does not match `T`.
pub fn from_json_value<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> Result<T> {
    serde_path_to_error::deserialize(value).map_err(|e| {
        crate::Error::json_deserialization(e.path().to_string(), e.inner().to_string())
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn content_type_as_str() {
        assert_eq!(ContentType::Json.as_str(), "application/json");
        assert_eq!(
            ContentType::FormUrlEncoded.as_str(),
            "application/x-www-form-urlencoded"
        );
        assert_eq!(ContentType::PlainText.to_string(), "text/plain");
    }

    #[test]
    fn to_json_serialize() {
        let bytes = to_json(&json!({"x": 1})).expect("serialize");
        assert_eq!(bytes.as_ref(), br#"{"x":1}"#);
    }

    #[test]
    fn query_string_keeps_brackets() {
        let query = FormValue::from(json!({"a": {"b": 1}}));
        assert_eq!(to_query_string(&query), "a[b]=1");
    }

    #[test]
    fn query_string_escapes_reserved_characters() {
        let query = FormValue::from(json!({"q": "rust & tokio", "path": "a/b?c=d"}));
        assert_eq!(
            to_query_string(&query),
            "path=a%2Fb%3Fc%3Dd&q=rust%20%26%20tokio"
        );
    }

    #[test]
    fn query_string_of_empty_object_is_empty() {
        assert_eq!(to_query_string(&FormValue::from(json!({}))), "");
    }

    #[test]
    fn form_body_uses_query_encoding() {
        let form = FormValue::from(json!({"username": "alice", "remember": true}));
        assert_eq!(
            to_form(&form).as_ref(),
            b"remember=true&username=alice"
        );
    }

    #[test]
    fn from_json_value_reports_path() {
        #[derive(Debug, serde::Deserialize)]
        struct Page {
            #[allow(dead_code)]
            items: Vec<u32>,
        }

        let error = from_json_value::<Page>(json!({"items": [1, "two"]})).expect_err("invalid");
        assert!(matches!(
            error,
            crate::Error::JsonDeserialization { ref path, .. } if path == "items[1]"
        ));
    }

    #[test]
    fn from_json_missing_field_error_with_path() {
        #[derive(Debug, serde::Deserialize)]
        struct Address {
            #[allow(dead_code)]
            city: String,
        }

        #[derive(Debug, serde::Deserialize)]
        struct User {
            #[allow(dead_code)]
            address: Address,
        }

        let bytes = br#"{"address":{}}"#;
        let result: Result<User> = from_json(bytes);

        let err = result.expect_err("should fail");
        let msg = err.to_string();
        assert!(
            msg.contains("address"),
            "Expected path 'address' in error: {msg}"
        );
        assert!(
            msg.contains("city"),
            "Expected field 'city' mentioned in error: {msg}"
        );
    }

    #[test]
    fn from_json_syntax_error() {
        let result: Result<serde_json::Value> = from_json(b"not json");
        let err = result.expect_err("should fail");
        assert!(err.to_string().contains("JSON deserialization error"));
    }
}
