//! Session state machine.
//!
//! Drives the session with the peer: waits for a freshly (re)started peer to
//! settle, registers, pushes the time once per second and backs off on
//! failure. Peer and local faults are folded into [`RequestOutcome`]s and
//! never end the loop.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::backoff::Backoff;
use super::config::ClockConfig;
use super::shutdown::ShutdownToken;
use super::state::SessionState;
use crate::core::{
    ClockError, ClockFormatter, ClockResult, DiscoverySource, RequestOutcome, Transport,
};

/// Keeps one registration with the peer alive and updated.
///
/// Owns its collaborators and all session state. Not re-entrant: every
/// method takes `&mut self`.
#[derive(Debug)]
pub struct SessionStateMachine<D, T, C> {
    config: ClockConfig,
    discovery: D,
    transport: T,
    clock: C,
    cancel: ShutdownToken,
    state: SessionState,
    endpoint: Option<String>,
    backoff: Backoff,
    /// When the current spam cooldown began.
    spam_since: Option<Instant>,
    /// Address stamp for which the settle wait was last logged.
    logged_stamp: Option<Instant>,
    /// Anchor for whole-second polling ticks.
    started: Instant,
    /// Signalled when the discovery artifact changes.
    wake: Option<Arc<Notify>>,
}

impl<D, T, C> SessionStateMachine<D, T, C>
where
    D: DiscoverySource,
    T: Transport,
    C: ClockFormatter,
{
    /// Create a machine in [`SessionState::Delaying`] with nothing scheduled,
    /// so the first step polls the discovery source.
    pub fn new(
        config: ClockConfig,
        discovery: D,
        transport: T,
        clock: C,
        cancel: ShutdownToken,
    ) -> Self {
        let backoff = Backoff::new(config.retry_policy());
        Self {
            config,
            discovery,
            transport,
            clock,
            cancel,
            state: SessionState::Delaying,
            endpoint: None,
            backoff,
            spam_since: None,
            logged_stamp: None,
            started: Instant::now(),
            wake: None,
        }
    }

    /// Cut gate and delay sleeps short whenever `wake` is notified.
    ///
    /// Without it, a new address is noticed at the next poll tick.
    pub fn with_wake(mut self, wake: Arc<Notify>) -> Self {
        self.wake = Some(wake);
        self
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Failure backoff.
    pub fn backoff(&self) -> &Backoff {
        &self.backoff
    }

    /// Last known peer endpoint.
    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    /// Session configuration.
    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    /// Run until cancelled, then deregister.
    pub async fn run(&mut self) {
        info!(state = %self.state, "session started");
        while !self.cancel.is_cancelled() {
            self.step().await;
        }
        info!(state = %self.state, "session cancelled");
        self.shutdown().await;
    }

    /// Run the handler of the current state once and return the next state.
    ///
    /// # Panics
    ///
    /// Panics in [`SessionState::Stopping`], which no transition leads to.
    pub async fn step(&mut self) -> SessionState {
        let current = self.state;
        let next = match current {
            SessionState::DelayedStart => {
                let threshold = self.config.min_address_age;
                self.settle(threshold, None).await
            }
            SessionState::Spam => {
                let since = *self.spam_since.get_or_insert_with(Instant::now);
                let threshold = self.config.spam_cooldown;
                self.settle(threshold, Some(since)).await
            }
            SessionState::Registering => {
                let result = self.register().await;
                let outcome = guard(current, result);
                self.after_register(outcome)
            }
            SessionState::Updating => {
                let result = self.update().await;
                let outcome = guard(current, result);
                self.after_update(outcome)
            }
            SessionState::Waiting => self.wait().await,
            SessionState::Delaying => self.delay().await,
            SessionState::Stopping => {
                error!("session stepped in the stopping state");
                panic!("session state machine stepped in the stopping state");
            }
        };

        if next != current {
            debug!(from = %current, to = %next, "transition");
        }
        self.state = next;
        next
    }

    /// Deregister from the last known endpoint, if any.
    pub async fn shutdown(&mut self) {
        let Some(endpoint) = self.endpoint.as_deref() else {
            debug!("no endpoint known, skipping deregistration");
            return;
        };
        match self.transport.deregister(endpoint).await {
            Ok(outcome) => info!(%endpoint, ?outcome, "deregistered"),
            Err(err) => warn!(%endpoint, error = %err, "deregistration failed"),
        }
    }

    /// Shared handler of the two gate states.
    ///
    /// The address age is counted from its stamp, or from `floor` if that is
    /// later.
    async fn settle(&mut self, threshold: Duration, floor: Option<Instant>) -> SessionState {
        let Some(stamp) = self.discovery.address_stamp() else {
            let delay = self.backoff.grow();
            warn!(?delay, "peer address age unavailable");
            return SessionState::Delaying;
        };

        let stamp = floor.map_or(stamp, |floor| floor.max(stamp));
        let age = Instant::now().saturating_duration_since(stamp);
        if age >= threshold {
            self.logged_stamp = None;
            self.spam_since = None;
            return SessionState::Registering;
        }

        if self.logged_stamp != Some(stamp) {
            info!(remaining = ?(threshold - age), state = %self.state, "Delaying start");
            self.logged_stamp = Some(stamp);
        }
        self.nap(self.config.poll_interval).await;
        self.state
    }

    async fn register(&self) -> ClockResult<RequestOutcome> {
        let endpoint = self.endpoint.as_deref().ok_or(ClockError::NoEndpoint)?;
        info!(%endpoint, "registering");
        Ok(self.transport.register(endpoint).await?)
    }

    async fn update(&self) -> ClockResult<RequestOutcome> {
        let endpoint = self.endpoint.as_deref().ok_or(ClockError::NoEndpoint)?;
        let (date, time) = self.clock.now();
        Ok(self.transport.push_event(endpoint, &date, &time).await?)
    }

    fn after_register(&mut self, outcome: RequestOutcome) -> SessionState {
        match outcome {
            // Backoff is only reset by a successful update.
            RequestOutcome::Success => SessionState::Updating,
            RequestOutcome::RateLimited => self.enter_spam(),
            RequestOutcome::OtherFailure => {
                let delay = self.backoff.grow();
                debug!(?delay, "registration failed");
                SessionState::Delaying
            }
        }
    }

    fn after_update(&mut self, outcome: RequestOutcome) -> SessionState {
        match outcome {
            RequestOutcome::Success => {
                if self.backoff.delay() > Duration::ZERO {
                    info!("peer updates resumed");
                }
                self.backoff.reset(Instant::now());
                SessionState::Waiting
            }
            RequestOutcome::RateLimited => self.enter_spam(),
            RequestOutcome::OtherFailure => SessionState::Registering,
        }
    }

    fn enter_spam(&mut self) -> SessionState {
        warn!(cooldown = ?self.config.spam_cooldown, "peer is rate limiting registrations");
        self.spam_since = Some(Instant::now());
        self.logged_stamp = None;
        SessionState::Spam
    }

    async fn wait(&mut self) -> SessionState {
        if self.cancel.sleep(until_next_second(SystemTime::now())).await {
            return self.state;
        }
        SessionState::Updating
    }

    async fn delay(&mut self) -> SessionState {
        let now = Instant::now();
        if self.backoff.schedule(now).is_some() && self.backoff.delay() > Duration::ZERO {
            info!(delay = ?self.backoff.delay(), "Delaying next attempt");
        }

        if self.nap(self.until_next_tick(now)).await {
            return self.state;
        }

        let now = Instant::now();
        if self.check_address() {
            self.backoff.reset(now);
            return SessionState::DelayedStart;
        }
        if self.backoff.is_due(now) {
            SessionState::DelayedStart
        } else {
            SessionState::Delaying
        }
    }

    /// Sleep like [`ShutdownToken::sleep`], also waking early on an artifact
    /// change. Returns `true` if cancelled.
    async fn nap(&mut self, duration: Duration) -> bool {
        let Some(wake) = self.wake.as_deref() else {
            return self.cancel.sleep(duration).await;
        };
        tokio::select! {
            cancelled = self.cancel.sleep(duration) => cancelled,
            () = wake.notified() => {
                debug!("address file changed");
                false
            }
        }
    }

    /// Refresh the endpoint. Returns `true` if a new address was found.
    fn check_address(&mut self) -> bool {
        let current = self.discovery.current_address();
        if current == self.endpoint {
            return false;
        }
        match current.as_deref() {
            Some(endpoint) => info!(%endpoint, "peer address changed"),
            None => warn!("peer address lost"),
        }
        let found = current.is_some();
        self.endpoint = current;
        found
    }

    /// Time to the next poll tick, ticks being aligned to `started`.
    fn until_next_tick(&self, now: Instant) -> Duration {
        let interval = self.config.poll_interval;
        let interval_nanos = interval.as_nanos();
        if interval_nanos == 0 {
            return Duration::ZERO;
        }
        let elapsed = now.saturating_duration_since(self.started).as_nanos();
        let into = (elapsed % interval_nanos) as u64;
        interval - Duration::from_nanos(into)
    }
}

/// Fold a handler error into [`RequestOutcome::OtherFailure`].
fn guard(state: SessionState, result: ClockResult<RequestOutcome>) -> RequestOutcome {
    result.unwrap_or_else(|err| {
        warn!(%state, error = %err, "step failed");
        RequestOutcome::OtherFailure
    })
}

/// Time from `now` to the next whole wall-clock second, in `(0, 1s]`.
pub fn until_next_second(now: SystemTime) -> Duration {
    let subsec = now
        .duration_since(UNIX_EPOCH)
        .map(|since| since.subsec_nanos())
        .unwrap_or_default();
    Duration::from_secs(1) - Duration::from_nanos(u64::from(subsec))
}
