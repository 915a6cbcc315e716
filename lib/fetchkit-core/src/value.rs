//! Structured values for query strings and form bodies.
//!
//! [`FormValue`] is a JSON-like tree that can also carry binary payloads,
//! which is what multipart bodies need. Plain JSON values convert into it
//! losslessly.

use bytes::Bytes;

/// A nested value that may contain binary leaves.
///
/// # Example
///
/// ```
/// use fetchkit_core::FormValue;
/// use bytes::Bytes;
///
/// let form: FormValue = [
///     ("name", FormValue::from("avatar")),
///     ("upload", FormValue::from(Bytes::from_static(b"\x89PNG"))),
/// ]
/// .into_iter()
/// .collect();
/// assert!(form.is_map());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    /// `null`.
    Null,
    /// A boolean.
    Bool(bool),
    /// A number.
    Number(serde_json::Number),
    /// A string.
    Text(String),
    /// Raw bytes, sent as a file part in multipart bodies.
    Binary(Bytes),
    /// A list; flattened with index keys (`tags[0]`).
    List(Vec<FormValue>),
    /// An ordered map; flattened with bracketed keys (`filter[active]`).
    Map(Vec<(String, FormValue)>),
}

impl FormValue {
    /// Returns `true` for [`FormValue::Map`].
    #[must_use]
    pub const fn is_map(&self) -> bool {
        matches!(self, Self::Map(_))
    }

    /// Returns `true` for [`FormValue::Binary`].
    #[must_use]
    pub const fn is_binary(&self) -> bool {
        matches!(self, Self::Binary(_))
    }

    /// String form of a scalar, as it appears in a query string or a text part.
    ///
    /// Containers have no scalar form and return `None`; binary leaves are
    /// decoded lossily.
    #[must_use]
    pub fn to_scalar_string(&self) -> Option<String> {
        match self {
            Self::Null => Some("null".to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Number(n) => Some(n.to_string()),
            Self::Text(s) => Some(s.clone()),
            Self::Binary(data) => Some(String::from_utf8_lossy(data).into_owned()),
            Self::List(_) | Self::Map(_) => None,
        }
    }
}

impl From<serde_json::Value> for FormValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n),
            serde_json::Value::String(s) => Self::Text(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(entries) => Self::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&serde_json::Value> for FormValue {
    fn from(value: &serde_json::Value) -> Self {
        Self::from(value.clone())
    }
}

impl From<&str> for FormValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FormValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<bool> for FormValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for FormValue {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for FormValue {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<Bytes> for FormValue {
    fn from(value: Bytes) -> Self {
        Self::Binary(value)
    }
}

impl From<Vec<u8>> for FormValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Binary(Bytes::from(value))
    }
}

impl<K: Into<String>, V: Into<FormValue>> FromIterator<(K, V)> for FormValue {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::Map(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Flattens a nested value into bracketed keys.
///
/// Top-level keys are kept as-is, nested keys are wrapped in brackets, and list
/// items use their index. Scalars and binary values become leaves; empty
/// containers disappear. A scalar at the root has no key and yields nothing.
///
/// ```
/// use fetchkit_core::{FormValue, flatten};
///
/// let value = FormValue::from(serde_json::json!({"page": 1, "filter": {"active": true}}));
/// let keys: Vec<_> = flatten(&value).into_iter().map(|(key, _)| key).collect();
/// assert_eq!(keys, ["filter[active]", "page"]);
/// ```
#[must_use]
pub fn flatten(value: &FormValue) -> Vec<(String, &FormValue)> {
    let mut leaves = Vec::new();
    match value {
        FormValue::Map(entries) => {
            for (key, value) in entries {
                flatten_into(key.clone(), value, &mut leaves);
            }
        }
        FormValue::List(items) => {
            for (index, value) in items.iter().enumerate() {
                flatten_into(index.to_string(), value, &mut leaves);
            }
        }
        _ => {}
    }
    leaves
}

fn flatten_into<'a>(key: String, value: &'a FormValue, leaves: &mut Vec<(String, &'a FormValue)>) {
    match value {
        FormValue::Map(entries) => {
            for (child, value) in entries {
                flatten_into(format!("{key}[{child}]"), value, leaves);
            }
        }
        FormValue::List(items) => {
            for (index, value) in items.iter().enumerate() {
                flatten_into(format!("{key}[{index}]"), value, leaves);
            }
        }
        _ => leaves.push((key, value)),
    }
}
