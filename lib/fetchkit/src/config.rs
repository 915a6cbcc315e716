//! Executor and transport configuration.

use std::time::Duration;

/// Environment variable read by [`ExecutorConfig::from_env`].
pub const ENV_VAR: &str = "FETCHKIT_ENV";

/// Configuration for the base executor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExecutorConfig {
    /// Emit debug and trace lines for every exchange.
    pub verbose: bool,
}

impl ExecutorConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> ExecutorConfigBuilder {
        ExecutorConfigBuilder::default()
    }

    /// Verbose unless `FETCHKIT_ENV` is `production`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(ENV_VAR).ok().as_deref())
    }

    fn from_env_value(value: Option<&str>) -> Self {
        Self {
            verbose: value != Some("production"),
        }
    }
}

/// Builder for [`ExecutorConfig`].
#[derive(Debug, Clone, Default)]
pub struct ExecutorConfigBuilder {
    verbose: Option<bool>,
}

impl ExecutorConfigBuilder {
    /// Set whether exchanges are logged.
    #[must_use]
    pub const fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = Some(verbose);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> ExecutorConfig {
        ExecutorConfig {
            verbose: self.verbose.unwrap_or_default(),
        }
    }
}

/// Configuration for the hyper transport.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Timeout for a whole exchange, body included.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Maximum idle connections per host.
    pub pool_idle_per_host: usize,
    /// Idle connection timeout.
    pub pool_idle_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_idle_per_host: 32,
            pool_idle_timeout: Duration::from_secs(90),
        }
    }
}

impl TransportConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> TransportConfigBuilder {
        TransportConfigBuilder::default()
    }
}

/// Builder for [`TransportConfig`].
#[derive(Debug, Clone, Default)]
pub struct TransportConfigBuilder {
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    pool_idle_per_host: Option<usize>,
    pool_idle_timeout: Option<Duration>,
}

impl TransportConfigBuilder {
    /// Set the exchange timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connection timeout.
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set the maximum idle connections per host.
    #[must_use]
    pub const fn pool_idle_per_host(mut self, count: usize) -> Self {
        self.pool_idle_per_host = Some(count);
        self
    }

    /// Set the idle connection timeout.
    #[must_use]
    pub const fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.pool_idle_timeout = Some(timeout);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> TransportConfig {
        let defaults = TransportConfig::default();
        TransportConfig {
            timeout: self.timeout.unwrap_or(defaults.timeout),
            connect_timeout: self.connect_timeout.unwrap_or(defaults.connect_timeout),
            pool_idle_per_host: self
                .pool_idle_per_host
                .unwrap_or(defaults.pool_idle_per_host),
            pool_idle_timeout: self.pool_idle_timeout.unwrap_or(defaults.pool_idle_timeout),
        }
    }
}
