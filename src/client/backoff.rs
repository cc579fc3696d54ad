//! Failure backoff.
//!
//! The delay doubles on every failure from a one-second floor up to a cap,
//! and drops back to zero once a full cycle succeeds.

use std::time::Duration;

use tokio::time::Instant;

use crate::core::{MAX_RETRY_DELAY, MIN_RETRY_DELAY};

/// Capped exponential delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    min: Duration,
    max: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(MIN_RETRY_DELAY, MAX_RETRY_DELAY)
    }
}

impl RetryPolicy {
    /// Create a policy; `max` is raised to `min` if smaller.
    pub fn new(min: Duration, max: Duration) -> Self {
        Self {
            min,
            max: max.max(min),
        }
    }

    /// Delay floor.
    pub fn min(&self) -> Duration {
        self.min
    }

    /// Delay cap.
    pub fn max(&self) -> Duration {
        self.max
    }

    /// Delay following `current` after one more failure.
    pub fn next(&self, current: Duration) -> Duration {
        current.saturating_mul(2).clamp(self.min, self.max)
    }

    /// Delay after `failures` consecutive failures (zero for none).
    pub fn delay_for(&self, failures: u32) -> Duration {
        if failures == 0 {
            return Duration::ZERO;
        }
        let factor = 1u32.checked_shl(failures - 1).unwrap_or(u32::MAX);
        self.min.saturating_mul(factor).clamp(self.min, self.max)
    }
}

/// Backoff state owned by the session.
///
/// Holds the current delay and the instant before which no new attempt is
/// made. The instant is scheduled once per delay window and only recomputed
/// after it has passed.
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: RetryPolicy,
    delay: Duration,
    /// `None` until the first window is scheduled.
    next_attempt: Option<Instant>,
}

impl Backoff {
    /// Create an idle backoff with no window scheduled.
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            delay: Duration::ZERO,
            next_attempt: None,
        }
    }

    /// Current delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Instant of the next eligible attempt, if scheduled.
    pub fn next_attempt(&self) -> Option<Instant> {
        self.next_attempt
    }

    /// Record a failure and return the grown delay.
    pub fn grow(&mut self) -> Duration {
        self.delay = self.policy.next(self.delay);
        self.delay
    }

    /// Forget all failures.
    ///
    /// The window is moved to `now` as well, so a reset while a window is
    /// still running does not keep the old deadline.
    pub fn reset(&mut self, now: Instant) {
        self.delay = Duration::ZERO;
        self.next_attempt = Some(now);
    }

    /// Open a new window of the current delay unless one is still running.
    ///
    /// Returns the new deadline when a window was opened.
    pub fn schedule(&mut self, now: Instant) -> Option<Instant> {
        if !self.is_due(now) {
            return None;
        }
        let deadline = now + self.delay;
        self.next_attempt = Some(deadline);
        Some(deadline)
    }

    /// Whether the current window has passed.
    ///
    /// With no window scheduled yet, there is nothing to wait for.
    pub fn is_due(&self, now: Instant) -> bool {
        self.next_attempt.is_none_or(|deadline| deadline <= now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: Duration = Duration::from_secs(1);

    #[test]
    fn test_policy_doubles_from_floor() {
        let policy = RetryPolicy::default();
        let mut delay = Duration::ZERO;
        let mut seen = Vec::new();
        for _ in 0..11 {
            delay = policy.next(delay);
            seen.push(delay.as_secs());
        }
        assert_eq!(seen, [1, 2, 4, 8, 16, 32, 64, 128, 256, 300, 300]);
    }

    #[test]
    fn test_policy_failure_count_matches_doubling() {
        let policy = RetryPolicy::default();
        let mut delay = Duration::ZERO;
        for failures in 0..40 {
            assert_eq!(policy.delay_for(failures), delay, "failures = {failures}");
            delay = policy.next(delay);
        }
    }

    #[test]
    fn test_policy_max_below_min() {
        let policy = RetryPolicy::new(Duration::from_secs(10), SECOND);
        assert_eq!(policy.max(), Duration::from_secs(10));
        assert_eq!(policy.next(Duration::ZERO), Duration::from_secs(10));
    }

    #[test]
    fn test_grow_is_monotonic_and_capped() {
        let mut backoff = Backoff::new(RetryPolicy::default());
        let mut previous = Duration::ZERO;
        for _ in 0..64 {
            let delay = backoff.grow();
            assert!(delay >= previous);
            assert!(delay >= SECOND);
            assert!(delay <= MAX_RETRY_DELAY);
            previous = delay;
        }
        assert_eq!(previous, MAX_RETRY_DELAY);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_scheduled_once() {
        let mut backoff = Backoff::new(RetryPolicy::default());
        let start = Instant::now();
        backoff.reset(start);
        backoff.grow();
        backoff.grow();

        assert_eq!(backoff.schedule(start), Some(start + 2 * SECOND));
        assert!(!backoff.is_due(start + SECOND));

        // Still inside the window: nothing is rescheduled.
        assert_eq!(backoff.schedule(start + SECOND), None);
        assert!(backoff.is_due(start + 2 * SECOND));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unscheduled_backoff() {
        let mut backoff = Backoff::new(RetryPolicy::default());
        let now = Instant::now();
        assert!(backoff.is_due(now));
        assert_eq!(backoff.next_attempt(), None);

        // An idle backoff opens an empty window.
        assert_eq!(backoff.schedule(now), Some(now));
        assert!(backoff.is_due(now));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_clears_pending_window() {
        let mut backoff = Backoff::new(RetryPolicy::default());
        let start = Instant::now();
        backoff.reset(start);
        for _ in 0..5 {
            backoff.grow();
        }
        backoff.schedule(start);
        assert!(!backoff.is_due(start + SECOND));

        backoff.reset(start + SECOND);
        assert_eq!(backoff.delay(), Duration::ZERO);
        assert!(backoff.is_due(start + SECOND));
    }
}
