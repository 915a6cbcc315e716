//! One-line renderings used in diagnostics.

use std::collections::HashMap;

use crate::{Request, Response};

/// `METHOD url`.
///
/// ```
/// use fetchkit_core::{Method, Request, request_line};
///
/// let url = url::Url::parse("https://example.com/a?b=1").expect("url");
/// let request = Request::builder(Method::Post, url).build();
/// assert_eq!(request_line(&request), "POST https://example.com/a?b=1");
/// ```
#[must_use]
pub fn request_line(request: &Request) -> String {
    format!("{} {}", request.method(), request.url())
}

/// `status reason`, or just the status when the reason is unknown.
#[must_use]
pub fn status_line(response: &Response) -> String {
    match response.status_text() {
        "" => response.status().to_string(),
        text => format!("{} {text}", response.status()),
    }
}

/// One `name: value` line per header, sorted by name.
#[must_use]
pub fn headers_to_string(headers: &HashMap<String, String>) -> String {
    let mut lines: Vec<_> = headers
        .iter()
        .map(|(name, value)| format!("{name}: {value}"))
        .collect();
    lines.sort_unstable();
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    #[test]
    fn status_line_with_and_without_reason() {
        let ok = Response::new(200, HashMap::new(), Bytes::new());
        let odd = Response::new(599, HashMap::new(), Bytes::new());

        assert_eq!(status_line(&ok), "200 OK");
        assert_eq!(status_line(&odd), "599");
    }

    #[test]
    fn headers_are_sorted() {
        let headers = HashMap::from([
            ("x-b".to_string(), "2".to_string()),
            ("accept".to_string(), "*/*".to_string()),
        ]);

        assert_eq!(headers_to_string(&headers), "accept: */*\nx-b: 2");
        assert_eq!(headers_to_string(&HashMap::new()), "");
    }
}
