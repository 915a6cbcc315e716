//! Retry settings carried by a request descriptor.
//!
//! These are the caller-facing shapes; the retry middleware resolves them into
//! a complete policy once per request.

use serde::Deserialize;

/// Retry settings for a single request.
///
/// Deserializes from the same shapes a JSON configuration would use:
///
/// ```
/// use fetchkit_core::Retry;
///
/// let retry: Retry = serde_json::from_str("true").expect("toggle");
/// assert_eq!(retry, Retry::Toggle(true));
///
/// let retry: Retry = serde_json::from_str("[500, 503]").expect("statuses");
/// assert_eq!(retry, Retry::Statuses(vec![500, 503]));
///
/// let retry: Retry = serde_json::from_str(r#"{"count": 2, "delayMs": 10}"#).expect("custom");
/// assert!(matches!(retry, Retry::Custom(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Retry {
    /// `false` disables retries, `true` uses the defaults.
    Toggle(bool),
    /// Defaults with this many retries.
    Count(u32),
    /// Defaults with these retryable statuses.
    Statuses(Vec<u16>),
    /// Defaults overridden field by field.
    Custom(RetryOverrides),
}

impl From<bool> for Retry {
    fn from(enabled: bool) -> Self {
        Self::Toggle(enabled)
    }
}

impl From<u32> for Retry {
    fn from(count: u32) -> Self {
        Self::Count(count)
    }
}

impl From<Vec<u16>> for Retry {
    fn from(statuses: Vec<u16>) -> Self {
        Self::Statuses(statuses)
    }
}

impl From<RetryOverrides> for Retry {
    fn from(overrides: RetryOverrides) -> Self {
        Self::Custom(overrides)
    }
}

/// Partial retry policy; absent fields keep their default.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RetryOverrides {
    /// Number of retries after the first attempt.
    pub count: Option<u32>,
    /// Retryable HTTP statuses.
    pub statuses: Option<Vec<u16>>,
    /// Retryable transport error codes.
    pub errors: Option<Vec<String>>,
    /// Initial delay in milliseconds.
    pub delay_ms: Option<u64>,
    /// Multiplier applied to the delay after each retry.
    #[serde(alias = "exponentialBackOffFactor")]
    pub backoff_factor: Option<f64>,
}

impl RetryOverrides {
    /// Empty overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the retry count.
    #[must_use]
    pub const fn count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    /// Override the retryable statuses.
    #[must_use]
    pub fn statuses(mut self, statuses: impl Into<Vec<u16>>) -> Self {
        self.statuses = Some(statuses.into());
        self
    }

    /// Override the retryable error codes.
    #[must_use]
    pub fn errors<S: Into<String>>(mut self, errors: impl IntoIterator<Item = S>) -> Self {
        self.errors = Some(errors.into_iter().map(Into::into).collect());
        self
    }

    /// Override the initial delay.
    #[must_use]
    pub const fn delay_ms(mut self, delay_ms: u64) -> Self {
        self.delay_ms = Some(delay_ms);
        self
    }

    /// Override the backoff multiplier.
    #[must_use]
    pub const fn backoff_factor(mut self, factor: f64) -> Self {
        self.backoff_factor = Some(factor);
        self
    }
}
