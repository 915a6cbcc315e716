//! Multipart form data encoding.
//!
//! Forms are usually built from a nested [`FormValue`]: every flattened leaf
//! becomes one part, binary leaves become file parts named `file`.
//!
//! ```
//! use bytes::Bytes;
//! use fetchkit_core::{Form, FormValue};
//!
//! let value: FormValue = [
//!     ("title", FormValue::from("holidays")),
//!     ("photo", FormValue::from(Bytes::from_static(b"\xFF\xD8"))),
//! ]
//! .into_iter()
//! .collect();
//!
//! let form = Form::from_value(&value);
//! assert_eq!(form.parts().len(), 2);
//! assert_eq!(form.parts().last().and_then(|part| part.filename()), Some("file"));
//! ```

use bytes::{BufMut, Bytes, BytesMut};

use crate::{FormValue, flatten};

/// Filename given to binary leaves.
const BINARY_FILENAME: &str = "file";

/// A single part in a multipart form.
#[derive(Debug, Clone)]
pub struct Part {
    name: String,
    filename: Option<String>,
    content_type: Option<String>,
    data: Bytes,
}

impl Part {
    /// Field part without filename nor content type.
    #[must_use]
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            filename: None,
            content_type: None,
            data: data.into(),
        }
    }

    /// File part, sent as `application/octet-stream`.
    #[must_use]
    pub fn file(
        name: impl Into<String>,
        filename: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            filename: Some(filename.into()),
            content_type: Some("application/octet-stream".to_string()),
            data: data.into(),
        }
    }

    /// Override the content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Part name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Filename, if any.
    #[must_use]
    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    /// Content type, if any.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Part payload.
    #[must_use]
    pub const fn data(&self) -> &Bytes {
        &self.data
    }
}

/// A multipart form.
#[derive(Debug, Clone)]
pub struct Form {
    parts: Vec<Part>,
    boundary: String,
}

impl Default for Form {
    fn default() -> Self {
        Self::new()
    }
}

impl Form {
    /// Empty form with a generated boundary.
    #[must_use]
    pub fn new() -> Self {
        Self::with_boundary(generate_boundary())
    }

    /// Empty form with a fixed boundary.
    #[must_use]
    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            parts: Vec::new(),
            boundary: boundary.into(),
        }
    }

    /// Form holding one part per flattened leaf of `value`.
    ///
    /// Binary leaves become file parts; other scalars are sent as their
    /// string form.
    #[must_use]
    pub fn from_value(value: &FormValue) -> Self {
        flatten(value)
            .into_iter()
            .fold(Self::new(), |form, (name, leaf)| match leaf {
                FormValue::Binary(data) => form.part(Part::file(name, BINARY_FILENAME, data.clone())),
                _ => form.part(Part::new(name, leaf.to_scalar_string().unwrap_or_default())),
            })
    }

    /// Add a part.
    #[must_use]
    pub fn part(mut self, part: Part) -> Self {
        self.parts.push(part);
        self
    }

    /// Boundary string.
    #[must_use]
    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    /// Parts, in insertion order.
    #[must_use]
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// `multipart/form-data; boundary=<boundary>`.
    #[must_use]
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Consume into `(content type, body)`.
    #[must_use]
    pub fn into_body(self) -> (String, Bytes) {
        let content_type = self.content_type();
        let body = self.encode();
        (content_type, body)
    }

    fn encode(&self) -> Bytes {
        let mut buf = BytesMut::new();

        for part in &self.parts {
            buf.put_slice(b"--");
            buf.put_slice(self.boundary.as_bytes());
            buf.put_slice(b"\r\n");

            buf.put_slice(b"Content-Disposition: form-data; name=\"");
            buf.put_slice(part.name.as_bytes());
            buf.put_slice(b"\"");
            if let Some(filename) = &part.filename {
                buf.put_slice(b"; filename=\"");
                buf.put_slice(filename.as_bytes());
                buf.put_slice(b"\"");
            }
            buf.put_slice(b"\r\n");

            if let Some(content_type) = &part.content_type {
                buf.put_slice(b"Content-Type: ");
                buf.put_slice(content_type.as_bytes());
                buf.put_slice(b"\r\n");
            }

            buf.put_slice(b"\r\n");
            buf.put_slice(&part.data);
            buf.put_slice(b"\r\n");
        }

        buf.put_slice(b"--");
        buf.put_slice(self.boundary.as_bytes());
        buf.put_slice(b"--\r\n");

        buf.freeze()
    }
}

fn generate_boundary() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or(0);

    format!("----FetchkitBoundary{timestamp:x}")
}
