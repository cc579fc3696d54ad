//! Core traits for SSE Clock.
//!
//! The session state machine owns one implementation of each trait. The
//! production implementations live in [`crate::clock`], [`crate::discovery`]
//! and [`crate::transport`]; tests substitute scripted ones.

use std::future::Future;

use tokio::time::Instant;

use super::error::TransportError;

/// Classified result of a request to the peer.
///
/// Produced by a [`Transport`] and consumed only by the session state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    /// The peer answered HTTP 200.
    Success,
    /// The peer refused because too many games registered recently.
    RateLimited,
    /// Anything else: connection failure, timeout, other error body.
    OtherFailure,
}

impl RequestOutcome {
    /// Returns `true` for [`RequestOutcome::Success`].
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

/// Produces the text shown on the peer's screen.
pub trait ClockFormatter {
    /// Current local `(date, time)` text, regenerated on every call.
    ///
    /// Formatting problems yield empty or partial strings, never an error.
    fn now(&self) -> (String, String);
}

/// Source of the peer's current address.
///
/// Implementations never fail across this boundary: every fault is reported
/// as `None` (and logged by the implementation if useful).
pub trait DiscoverySource {
    /// Base endpoint of the peer (e.g. `http://127.0.0.1:51234`), or `None`
    /// if the artifact is missing, unreadable, or holds no usable address.
    fn current_address(&mut self) -> Option<String>;

    /// Monotonic instant at which the current address became valid, or `None`
    /// if that cannot be determined.
    ///
    /// Repeated calls for an unchanged artifact return the same instant.
    fn address_stamp(&mut self) -> Option<Instant>;
}

/// Requests understood by the peer.
///
/// Every method targets `endpoint` (as returned by
/// [`DiscoverySource::current_address`]). Peer-side failures are reported as
/// a [`RequestOutcome`]; `Err` is reserved for local faults such as a body
/// that cannot be encoded.
pub trait Transport {
    /// Clear any stale registration, then declare the game and bind the event.
    ///
    /// Converges to the same peer-side state whatever was registered before.
    fn register(
        &self,
        endpoint: &str,
    ) -> impl Future<Output = Result<RequestOutcome, TransportError>>;

    /// Push the formatted date and time under the registered event.
    fn push_event(
        &self,
        endpoint: &str,
        date: &str,
        time: &str,
    ) -> impl Future<Output = Result<RequestOutcome, TransportError>>;

    /// Remove the game. Removing an absent game is a success.
    fn deregister(
        &self,
        endpoint: &str,
    ) -> impl Future<Output = Result<RequestOutcome, TransportError>>;
}
