//! Cooperative cancellation.
//!
//! The process shell holds a [`ShutdownTrigger`]; the session loop holds a
//! [`ShutdownToken`] and checks it between steps and while sleeping.

use std::time::Duration;

use tokio::sync::watch;

/// Create a connected trigger/token pair.
pub fn shutdown_channel() -> (ShutdownTrigger, ShutdownToken) {
    let (tx, rx) = watch::channel(false);
    (ShutdownTrigger { tx }, ShutdownToken { rx })
}

/// Requests cancellation.
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: watch::Sender<bool>,
}

impl ShutdownTrigger {
    /// Request cancellation. Idempotent.
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    /// Another token observing this trigger.
    pub fn token(&self) -> ShutdownToken {
        ShutdownToken {
            rx: self.tx.subscribe(),
        }
    }
}

/// Observes cancellation.
#[derive(Debug, Clone)]
pub struct ShutdownToken {
    rx: watch::Receiver<bool>,
}

impl ShutdownToken {
    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once cancellation is requested.
    ///
    /// If the trigger is dropped without stopping, this never resolves.
    pub async fn cancelled(&mut self) {
        if self.rx.wait_for(|stopped| *stopped).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    /// Sleep for `duration` or until cancelled, whichever comes first.
    ///
    /// Returns `true` if the sleep was cut short by cancellation.
    pub async fn sleep(&mut self, duration: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(duration) => false,
            _ = self.cancelled() => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_sleep_runs_to_completion() {
        let (_trigger, mut token) = shutdown_channel();
        let start = tokio::time::Instant::now();

        assert!(!token.sleep(Duration::from_secs(3)).await);
        assert_eq!(start.elapsed(), Duration::from_secs(3));
        assert!(!token.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_interrupts_sleep() {
        let (trigger, mut token) = shutdown_channel();
        let start = tokio::time::Instant::now();

        let sleeper = async { token.sleep(Duration::from_secs(60)).await };
        let stopper = async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            trigger.stop();
        };
        let (interrupted, ()) = tokio::join!(sleeper, stopper);

        assert!(interrupted);
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_trigger_does_not_cancel() {
        let (trigger, mut token) = shutdown_channel();
        drop(trigger);

        assert!(!token.sleep(Duration::from_millis(10)).await);
        assert!(!token.is_cancelled());
    }

    #[test]
    fn test_tokens_share_trigger() {
        let (trigger, token) = shutdown_channel();
        let other = trigger.token();
        trigger.stop();
        trigger.stop();
        assert!(token.is_cancelled());
        assert!(other.is_cancelled());
    }
}
