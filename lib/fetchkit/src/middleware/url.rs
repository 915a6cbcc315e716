//! URL resolution middleware.

use crate::{
    Error, Executor, Fallible, FetchInit, Middleware, Result, to_query_string,
};

/// Resolves `url` from `base_url`, `host`, `path` and `query`.
///
/// Resolution order:
/// 1. a non-empty `url` is kept as-is;
/// 2. without `base_url`, a `host` gives `<scheme>://<host>[:<port>]`;
/// 3. a `base_url` is joined with `path` using exactly one slash;
/// 4. otherwise the call fails before reaching the next stage.
///
/// A non-empty `query` is then appended with `?`, or `&` when the URL
/// already has a query string.
///
/// ```
/// use fetchkit::{FetchInit, middleware::resolve_url};
///
/// let init = FetchInit::new()
///     .with_base_url("https://api.example.com/v1/")
///     .with_path("/users")
///     .with_query(serde_json::json!({"page": 2}));
/// assert_eq!(resolve_url(&init).expect("url"), "https://api.example.com/v1/users?page=2");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct UrlBuilder;

impl UrlBuilder {
    /// Create the middleware.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl<E> Middleware<E> for UrlBuilder
where
    E: Executor,
    E::Output: Fallible,
{
    type Output = E::Output;

    fn call(&self, init: FetchInit, next: &E) -> Self::Output {
        match resolve_url(&init) {
            Ok(url) => next.execute(init.with_url(url)),
            Err(error) => E::Output::from_error(error),
        }
    }
}

/// Compute the URL a descriptor targets.
///
/// # Errors
///
/// Fails with a configuration error when neither `url`, `base_url` nor `host`
/// is given.
pub fn resolve_url(init: &FetchInit) -> Result<String> {
    let mut url = match init.url.as_deref().filter(|url| !url.is_empty()) {
        Some(url) => url.to_string(),
        None => {
            let base_url = init
                .base_url
                .clone()
                .filter(|base_url| !base_url.is_empty())
                .or_else(|| host_base_url(init))
                .ok_or_else(|| Error::configuration("one of url and baseUrl must be defined"))?;
            join_path(&base_url, init.path.as_deref())
        }
    };

    if let Some(query) = &init.query {
        let query = to_query_string(query);
        if !query.is_empty() {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&query);
        }
    }

    Ok(url)
}

fn host_base_url(init: &FetchInit) -> Option<String> {
    let host = init.host.as_deref().filter(|host| !host.is_empty())?;
    let scheme = init
        .scheme
        .as_deref()
        .filter(|scheme| !scheme.is_empty())
        .unwrap_or(if host.ends_with(".local") { "http" } else { "https" });

    Some(match init.port {
        Some(port) => format!("{scheme}://{host}:{port}"),
        None => format!("{scheme}://{host}"),
    })
}

fn join_path(base_url: &str, path: Option<&str>) -> String {
    match path.filter(|path| !path.is_empty()) {
        Some(path) => format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        ),
        None => base_url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::executor_fn;

    #[test]
    fn explicit_url_wins() {
        let init = FetchInit::new()
            .with_url("https://a.example.com/x")
            .with_base_url("https://b.example.com")
            .with_path("/y");

        assert_eq!(resolve_url(&init).expect("url"), "https://a.example.com/x");
    }

    #[test]
    fn single_slash_between_base_and_path() {
        for (base, path) in [
            ("https://h", "p"),
            ("https://h/", "/p"),
            ("https://h///", "///p"),
        ] {
            let init = FetchInit::new().with_base_url(base).with_path(path);
            assert_eq!(resolve_url(&init).expect("url"), "https://h/p");
        }
    }

    #[test]
    fn base_url_verbatim_without_path() {
        let init = FetchInit::new().with_base_url("https://h/api/");
        assert_eq!(resolve_url(&init).expect("url"), "https://h/api/");
    }

    #[test]
    fn scheme_inferred_from_host() {
        let local = FetchInit::new().with_host("printer.local").with_port(8080);
        let public = FetchInit::new().with_host("example.com").with_path("/x");
        let explicit = FetchInit::new().with_host("printer.local").with_scheme("https");

        assert_eq!(resolve_url(&local).expect("url"), "http://printer.local:8080");
        assert_eq!(resolve_url(&public).expect("url"), "https://example.com/x");
        assert_eq!(resolve_url(&explicit).expect("url"), "https://printer.local");
    }

    #[test]
    fn empty_scheme_is_inferred() {
        let local = FetchInit::new().with_host("printer.local").with_scheme("");
        let public = FetchInit::new().with_host("example.com").with_scheme("");

        assert_eq!(resolve_url(&local).expect("url"), "http://printer.local");
        assert_eq!(resolve_url(&public).expect("url"), "https://example.com");
    }

    #[test]
    fn base_url_wins_over_host() {
        let init = FetchInit::new()
            .with_base_url("https://base.example.com")
            .with_host("host.example.com");
        assert_eq!(resolve_url(&init).expect("url"), "https://base.example.com");
    }

    #[test]
    fn query_appended_with_right_separator() {
        let fresh = FetchInit::new()
            .with_url("https://h/p")
            .with_query(json!({"a": 1}));
        let existing = FetchInit::new()
            .with_url("https://h/p?x=1")
            .with_query(json!({"a": 1}));
        let empty = FetchInit::new()
            .with_url("https://h/p")
            .with_query(json!({}));

        assert_eq!(resolve_url(&fresh).expect("url"), "https://h/p?a=1");
        assert_eq!(resolve_url(&existing).expect("url"), "https://h/p?x=1&a=1");
        assert_eq!(resolve_url(&empty).expect("url"), "https://h/p");
    }

    #[test]
    fn nested_query_is_flattened() {
        let init = FetchInit::new()
            .with_url("https://h")
            .with_query(json!({"filter": {"active": true}, "ids": [1, 2]}));
        assert_eq!(resolve_url(&init).expect("url"), "https://h?filter[active]=true&ids[0]=1&ids[1]=2");
    }

    #[test]
    fn unresolvable_target_fails_before_next_stage() {
        let next = executor_fn(|_init: FetchInit| -> Result<&'static str> {
            panic!("next stage must not run")
        });

        let result = UrlBuilder.call(FetchInit::new().with_path("/x"), &next);

        let error = result.expect_err("configuration error");
        assert!(error.is_configuration());
        assert!(error.to_string().contains("one of url and baseUrl must be defined"));
    }

    #[test]
    fn next_stage_sees_resolved_url() {
        let next = executor_fn(|init: FetchInit| -> Result<Option<String>> { Ok(init.url) });

        let url = UrlBuilder
            .call(FetchInit::new().with_host("example.com").with_path("v1"), &next)
            .expect("url");

        assert_eq!(url.as_deref(), Some("https://example.com/v1"));
    }
}
