//! Retry middleware.
//!
//! The policy is resolved once per request from the descriptor `retry` field.
//! Only the outcome of the latest attempt decides whether to try again:
//! a status listed in [`RetryPolicy::statuses`], or a transport error whose
//! code is listed in [`RetryPolicy::errors`].

use std::future::Future;
use std::time::Duration;

use crate::{
    ECONNRESET, Executor, FetchInit, Logger, Middleware, Response, ResponseFuture, Result, Retry,
};

/// A complete retry policy.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Number of retries after the first attempt.
    pub count: u32,
    /// Retryable HTTP statuses.
    pub statuses: Vec<u16>,
    /// Retryable transport error codes.
    pub errors: Vec<String>,
    /// Wait before the first retry.
    pub delay: Duration,
    /// Multiplier applied to the wait after each retry.
    pub backoff_factor: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            count: 3,
            statuses: vec![429, 500, 502, 503, 504],
            errors: vec![ECONNRESET.to_string()],
            delay: Duration::from_millis(5000),
            backoff_factor: 1.2,
        }
    }
}

impl RetryPolicy {
    /// Resolve the policy for a descriptor `retry` field.
    ///
    /// ```
    /// use fetchkit::{Retry, RetryOverrides, middleware::RetryPolicy};
    ///
    /// assert_eq!(RetryPolicy::resolve(None).count, 0);
    /// assert_eq!(RetryPolicy::resolve(Some(&Retry::Toggle(true))), RetryPolicy::default());
    ///
    /// let policy = RetryPolicy::resolve(Some(&RetryOverrides::new().count(1).into()));
    /// assert_eq!(policy.count, 1);
    /// assert_eq!(policy.statuses, RetryPolicy::default().statuses);
    /// ```
    #[must_use]
    pub fn resolve(retry: Option<&Retry>) -> Self {
        let defaults = Self::default();
        match retry {
            None | Some(Retry::Toggle(false)) => Self {
                count: 0,
                ..defaults
            },
            Some(Retry::Toggle(true)) => defaults,
            Some(Retry::Count(count)) => Self {
                count: *count,
                ..defaults
            },
            Some(Retry::Statuses(statuses)) => Self {
                statuses: statuses.clone(),
                ..defaults
            },
            Some(Retry::Custom(overrides)) => Self {
                count: overrides.count.unwrap_or(defaults.count),
                statuses: overrides.statuses.clone().unwrap_or(defaults.statuses),
                errors: overrides.errors.clone().unwrap_or(defaults.errors),
                delay: overrides
                    .delay_ms
                    .map_or(defaults.delay, Duration::from_millis),
                backoff_factor: overrides.backoff_factor.unwrap_or(defaults.backoff_factor),
            },
        }
    }

    /// Whether an outcome calls for another attempt.
    #[must_use]
    pub fn is_retryable(&self, outcome: &Result<Response>) -> bool {
        match outcome {
            Ok(response) => self.statuses.contains(&response.status()),
            Err(error) => error
                .code()
                .is_some_and(|code| self.errors.iter().any(|retryable| retryable == code)),
        }
    }

    /// The wait that follows `delay` after one retry.
    fn next_delay(&self, delay: Duration) -> Duration {
        let secs = (delay.as_secs_f64() * self.backoff_factor).max(0.0);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }
}

/// Repeats the exchange under the descriptor's retry policy.
///
/// Waits between attempts honor a `retry-after` header (in seconds) when the
/// latest response carries one, and follow the backoff series otherwise.
/// When attempts are exhausted, the latest response is returned if there is
/// one, else the most recent earlier response, else the latest error.
#[derive(Debug, Clone, Copy, Default)]
pub struct Retrier;

impl Retrier {
    /// Create the middleware.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl<E> Middleware<E> for Retrier
where
    E: Executor,
    E::Output: Future<Output = Result<Response>> + Send + 'static,
{
    type Output = ResponseFuture;

    fn call(&self, init: FetchInit, next: &E) -> Self::Output {
        let next = next.clone();
        Box::pin(async move {
            let policy = RetryPolicy::resolve(init.retry.as_ref());
            let logger = init.logger();
            retry_loop(&policy, &*logger, || next.execute(init.clone())).await
        })
    }
}

async fn retry_loop<F, Fut>(policy: &RetryPolicy, logger: &dyn Logger, attempt: F) -> Result<Response>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Response>>,
{
    let mut outcome = attempt().await;
    let mut earlier_response = None;
    let mut attempts_left = policy.count;
    let mut delay = policy.delay;

    while policy.is_retryable(&outcome) && attempts_left > 0 {
        attempts_left -= 1;

        let wait = retry_after(&outcome).unwrap_or(delay);
        logger.warn(&format!(
            "failed to fetch [{}]: retrying after {:.0} seconds; {attempts_left} attempts left",
            cause(&outcome),
            wait.as_secs_f64().round(),
        ));

        tokio::time::sleep(wait).await;

        if let Ok(response) = std::mem::replace(&mut outcome, attempt().await) {
            earlier_response = Some(response);
        }
        delay = policy.next_delay(delay);
    }

    match outcome {
        Ok(response) => Ok(response),
        Err(error) => earlier_response.ok_or(error),
    }
}

fn cause(outcome: &Result<Response>) -> String {
    match outcome {
        Ok(response) => response.status().to_string(),
        Err(error) => error.code().unwrap_or("unknown").to_string(),
    }
}

/// Wait requested by a `retry-after` header, read as whole seconds.
fn retry_after(outcome: &Result<Response>) -> Option<Duration> {
    let header = outcome.as_ref().ok()?.header("retry-after")?;
    let secs = parse_leading_integer(header)?;
    Some(Duration::from_secs(u64::try_from(secs).unwrap_or(0)))
}

/// Integer at the start of `value`, ignoring leading whitespace and trailing
/// garbage (`"12abc"` is 12).
fn parse_leading_integer(value: &str) -> Option<i64> {
    let value = value.trim_start();
    let (negative, digits) = match value.as_bytes().first() {
        Some(b'-') => (true, value.get(1..)?),
        Some(b'+') => (false, value.get(1..)?),
        _ => (false, value),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let magnitude: i64 = digits.get(..end)?.parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::{ECONNREFUSED, Error, RetryOverrides};

    #[derive(Default)]
    struct RecordingLogger(Mutex<Vec<String>>);

    impl Logger for RecordingLogger {
        fn debug(&self, _message: &str) {}
        fn trace(&self, _message: &str) {}
        fn warn(&self, message: &str) {
            self.0
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .push(message.to_string());
        }
    }

    fn response(status: u16) -> Response {
        Response::new(status, HashMap::new(), "")
    }

    fn policy(count: u32) -> RetryPolicy {
        RetryPolicy {
            count,
            delay: Duration::from_millis(100),
            backoff_factor: 2.0,
            ..RetryPolicy::default()
        }
    }

    /// Replays scripted outcomes, one per attempt.
    fn script(outcomes: Vec<Result<Response>>) -> (Arc<Mutex<u32>>, impl Fn() -> std::future::Ready<Result<Response>>) {
        let calls = Arc::new(Mutex::new(0_u32));
        let outcomes = Arc::new(Mutex::new(outcomes.into_iter()));
        let counter = Arc::clone(&calls);
        let attempt = move || {
            *counter.lock().expect("lock") += 1;
            let next = outcomes
                .lock()
                .expect("lock")
                .next()
                .unwrap_or_else(|| Ok(response(200)));
            std::future::ready(next)
        };
        (calls, attempt)
    }

    #[test]
    fn resolve_shapes() {
        assert_eq!(RetryPolicy::resolve(Some(&Retry::Toggle(false))).count, 0);
        assert_eq!(RetryPolicy::resolve(Some(&Retry::Count(7))).count, 7);

        let statuses = RetryPolicy::resolve(Some(&Retry::Statuses(vec![418])));
        assert_eq!(statuses.statuses, [418]);
        assert_eq!(statuses.count, 3);

        let custom = RetryPolicy::resolve(Some(&Retry::Custom(
            RetryOverrides::new().delay_ms(10).errors(["EPIPE"]),
        )));
        assert_eq!(custom.delay, Duration::from_millis(10));
        assert_eq!(custom.errors, ["EPIPE"]);
        assert_eq!(custom.backoff_factor, 1.2);
    }

    #[test]
    fn retryable_outcomes() {
        let policy = RetryPolicy::default();
        assert!(policy.is_retryable(&Ok(response(503))));
        assert!(!policy.is_retryable(&Ok(response(404))));
        assert!(policy.is_retryable(&Err(Error::transport(ECONNRESET, "reset"))));
        assert!(!policy.is_retryable(&Err(Error::transport(ECONNREFUSED, "refused"))));
        assert!(!policy.is_retryable(&Err(Error::Cancelled)));
        assert!(!policy.is_retryable(&Err(Error::configuration("no url"))));
    }

    #[test]
    fn leading_integer() {
        assert_eq!(parse_leading_integer("12"), Some(12));
        assert_eq!(parse_leading_integer("  3abc"), Some(3));
        assert_eq!(parse_leading_integer("-2"), Some(-2));
        assert!(parse_leading_integer("Wed, 21 Oct 2015 07:28:00 GMT").is_none());
        assert!(parse_leading_integer("").is_none());
    }

    #[test]
    fn retry_after_header() {
        let mut headers = HashMap::new();
        headers.insert("retry-after".to_string(), "2".to_string());
        let with_header = Ok(Response::new(429, headers, ""));

        assert_eq!(retry_after(&with_header), Some(Duration::from_secs(2)));
        assert!(retry_after(&Ok(response(429))).is_none());
        assert!(retry_after(&Err(Error::Timeout)).is_none());
    }

    #[test]
    fn delay_grows_geometrically() {
        let policy = policy(3);
        assert_eq!(policy.next_delay(Duration::from_millis(100)), Duration::from_millis(200));

        let shrinking = RetryPolicy {
            backoff_factor: -1.0,
            ..policy
        };
        assert_eq!(shrinking.next_delay(Duration::from_millis(100)), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_until_success() {
        let logger = RecordingLogger::default();
        let (calls, attempt) = script(vec![Ok(response(503)), Ok(response(502))]);

        let started = tokio::time::Instant::now();
        let response = retry_loop(&policy(3), &logger, attempt).await.expect("response");

        assert_eq!(response.status(), 200);
        assert_eq!(*calls.lock().expect("lock"), 3);
        // 100ms then 200ms
        assert_eq!(started.elapsed(), Duration::from_millis(300));

        let warnings = logger.0.lock().expect("lock").clone();
        assert_eq!(
            warnings,
            [
                "failed to fetch [503]: retrying after 0 seconds; 2 attempts left",
                "failed to fetch [502]: retrying after 0 seconds; 1 attempts left",
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_return_last_response() {
        let logger = RecordingLogger::default();
        let (calls, attempt) = script(vec![
            Ok(response(500)),
            Ok(response(502)),
            Ok(response(503)),
        ]);

        let response = retry_loop(&policy(2), &logger, attempt).await.expect("response");

        assert_eq!(response.status(), 503);
        assert_eq!(*calls.lock().expect("lock"), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_retries_reraise_last_error() {
        let logger = RecordingLogger::default();
        let (calls, attempt) = script(vec![
            Err(Error::transport(ECONNRESET, "first")),
            Err(Error::transport(ECONNRESET, "second")),
        ]);

        let error = retry_loop(&policy(1), &logger, attempt).await.expect_err("error");

        assert_eq!(*calls.lock().expect("lock"), 2);
        assert_eq!(error.to_string(), "transport error [ECONNRESET]: second");
        let warnings = logger.0.lock().expect("lock").clone();
        assert_eq!(warnings, ["failed to fetch [ECONNRESET]: retrying after 0 seconds; 0 attempts left"]);
    }

    #[tokio::test(start_paused = true)]
    async fn earlier_response_survives_final_error() {
        let logger = RecordingLogger::default();
        let (_calls, attempt) = script(vec![
            Ok(response(503)),
            Err(Error::transport(ECONNRESET, "reset")),
        ]);

        let response = retry_loop(&policy(1), &logger, attempt).await.expect("response");

        assert_eq!(response.status(), 503);
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_error_stops_the_loop() {
        let logger = RecordingLogger::default();
        let (calls, attempt) = script(vec![
            Ok(response(503)),
            Err(Error::transport(ECONNREFUSED, "refused")),
        ]);

        let response = retry_loop(&policy(5), &logger, attempt).await.expect("response");

        assert_eq!(response.status(), 503);
        assert_eq!(*calls.lock().expect("lock"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_count_makes_one_attempt() {
        let logger = RecordingLogger::default();
        let (calls, attempt) = script(vec![Ok(response(503))]);

        let response = retry_loop(&policy(0), &logger, attempt).await.expect("response");

        assert_eq!(response.status(), 503);
        assert_eq!(*calls.lock().expect("lock"), 1);
        assert!(logger.0.lock().expect("lock").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn retry_after_overrides_backoff() {
        let logger = RecordingLogger::default();
        let mut headers = HashMap::new();
        headers.insert("Retry-After".to_string(), "3".to_string());
        let (_calls, attempt) = script(vec![Ok(Response::new(429, headers, ""))]);

        let started = tokio::time::Instant::now();
        retry_loop(&policy(1), &logger, attempt).await.expect("response");

        assert_eq!(started.elapsed(), Duration::from_secs(3));
        let warnings = logger.0.lock().expect("lock").clone();
        assert_eq!(warnings, ["failed to fetch [429]: retrying after 3 seconds; 0 attempts left"]);
    }
}
