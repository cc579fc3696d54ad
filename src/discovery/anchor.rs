//! Wall-clock to monotonic conversion for file timestamps.

use std::time::{Duration, SystemTime};

use tokio::time::Instant;

use crate::core::ANCIENT_ADDRESS_AGE;

/// Pair of wall-clock and monotonic readings taken once.
///
/// Converting through a fixed pair makes the result of
/// [`ReferenceClock::to_instant`] depend only on its input, so polling an
/// unchanged file always yields the same instant.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceClock {
    wall: SystemTime,
    mono: Instant,
}

impl Default for ReferenceClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ReferenceClock {
    /// Anchor the reference at the current time.
    pub fn new() -> Self {
        Self::with_anchor(SystemTime::now(), Instant::now())
    }

    /// Anchor the reference at explicit readings.
    pub fn with_anchor(wall: SystemTime, mono: Instant) -> Self {
        Self { wall, mono }
    }

    /// Monotonic instant corresponding to the wall-clock time `at`.
    pub fn to_instant(&self, at: SystemTime) -> Instant {
        match at.duration_since(self.wall) {
            Ok(ahead) => self
                .mono
                .checked_add(ahead)
                .unwrap_or_else(|| self.ancient()),
            Err(err) => self
                .mono
                .checked_sub(err.duration())
                .unwrap_or_else(|| self.ancient()),
        }
    }

    /// Instant standing for "long settled", used for untrustworthy timestamps.
    pub fn ancient(&self) -> Instant {
        self.mono
            .checked_sub(ANCIENT_ADDRESS_AGE)
            .unwrap_or(self.mono)
    }

    /// Convert `at`, replacing timestamps later than `now` with [`Self::ancient`].
    ///
    /// Returns the converted instant and, for a future timestamp, how far
    /// ahead of `now` it was.
    pub fn settle(&self, at: SystemTime, now: Instant) -> (Instant, Option<Duration>) {
        let stamp = self.to_instant(at);
        if stamp > now {
            (self.ancient(), Some(stamp - now))
        } else {
            (stamp, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_conversion_is_stable() {
        let reference = ReferenceClock::new();
        let modified = SystemTime::now() - Duration::from_secs(30);

        let first = reference.to_instant(modified);
        tokio::time::advance(Duration::from_secs(5)).await;
        let second = reference.to_instant(modified);

        assert_eq!(first, second);
    }

    #[tokio::test(start_paused = true)]
    async fn test_past_timestamp_keeps_its_age() {
        let wall = SystemTime::now();
        let mono = Instant::now();
        let reference = ReferenceClock::with_anchor(wall, mono);

        tokio::time::advance(Duration::from_secs(120)).await;
        let (stamp, ahead) = reference.settle(wall - Duration::from_secs(10), Instant::now());

        assert!(ahead.is_none());
        assert_eq!(Instant::now() - stamp, Duration::from_secs(130));
    }

    #[tokio::test(start_paused = true)]
    async fn test_far_future_timestamp_does_not_overflow() {
        let wall = SystemTime::UNIX_EPOCH;
        let reference = ReferenceClock::with_anchor(wall, Instant::now());

        let far = wall + Duration::from_secs(u64::MAX / 2);
        assert_eq!(reference.to_instant(far), reference.ancient());

        let (stamp, _) = reference.settle(far, Instant::now());
        assert_eq!(stamp, reference.ancient());
    }

    #[tokio::test(start_paused = true)]
    async fn test_future_timestamp_is_ancient() {
        let wall = SystemTime::now();
        let reference = ReferenceClock::with_anchor(wall, Instant::now());

        let (stamp, ahead) = reference.settle(wall + Duration::from_secs(90), Instant::now());

        assert_eq!(ahead, Some(Duration::from_secs(90)));
        assert_eq!(stamp, reference.ancient());
        assert!(stamp <= Instant::now());
    }
}
