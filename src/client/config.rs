//! Session configuration.

use std::time::Duration;

use super::backoff::RetryPolicy;
use crate::core::{
    MAX_RETRY_DELAY, MIN_ADDRESS_AGE, MIN_RETRY_DELAY, POLL_INTERVAL, REQUEST_TIMEOUT,
    SPAM_COOLDOWN,
};
use crate::transport::GameIdentity;

/// Timing parameters and identity of a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockConfig {
    /// Minimum address age before registering after a peer (re)start.
    pub min_address_age: Duration,

    /// Minimum address age before registering after being rate limited.
    pub spam_cooldown: Duration,

    /// First failure delay.
    pub min_retry_delay: Duration,

    /// Cap on the failure delay.
    pub max_retry_delay: Duration,

    /// Sleep between polls while waiting for the address to settle.
    pub poll_interval: Duration,

    /// Per-request timeout.
    pub request_timeout: Duration,

    /// Game and event registered with the peer.
    pub identity: GameIdentity,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            min_address_age: MIN_ADDRESS_AGE,
            spam_cooldown: SPAM_COOLDOWN,
            min_retry_delay: MIN_RETRY_DELAY,
            max_retry_delay: MAX_RETRY_DELAY,
            poll_interval: POLL_INTERVAL,
            request_timeout: REQUEST_TIMEOUT,
            identity: GameIdentity::default(),
        }
    }
}

impl ClockConfig {
    /// Failure backoff policy described by this configuration.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.min_retry_delay, self.max_retry_delay)
    }
}

/// Builder for [`ClockConfig`].
#[derive(Debug, Default)]
pub struct ClockConfigBuilder {
    config: ClockConfig,
}

impl ClockConfigBuilder {
    /// Create a builder starting from the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the settle threshold after a peer start.
    pub fn min_address_age(mut self, age: Duration) -> Self {
        self.config.min_address_age = age;
        self
    }

    /// Set the settle threshold after a rate limit.
    pub fn spam_cooldown(mut self, cooldown: Duration) -> Self {
        self.config.spam_cooldown = cooldown;
        self
    }

    /// Set the failure delay bounds.
    pub fn retry_delays(mut self, min: Duration, max: Duration) -> Self {
        self.config.min_retry_delay = min;
        self.config.max_retry_delay = max;
        self
    }

    /// Set the settle poll interval.
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Set the per-request timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Set the registered identity.
    pub fn identity(mut self, identity: GameIdentity) -> Self {
        self.config.identity = identity;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ClockConfig {
        self.config
    }
}
