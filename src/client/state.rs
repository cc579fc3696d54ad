//! Session states.

use std::fmt;

/// State of the session with the peer. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// The address changed recently; wait for the peer to finish starting.
    DelayedStart,
    /// The peer refused registrations as spam; wait out a long cooldown.
    Spam,
    /// Register the game and bind the event.
    Registering,
    /// Push the current date and time.
    Updating,
    /// Sleep until the next whole second.
    Waiting,
    /// Back off after a failure, watching for address changes.
    Delaying,
    /// Terminal. Never the target of a normal transition.
    Stopping,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::DelayedStart => "delayed-start",
            Self::Spam => "spam",
            Self::Registering => "registering",
            Self::Updating => "updating",
            Self::Waiting => "waiting",
            Self::Delaying => "delaying",
            Self::Stopping => "stopping",
        };
        f.write_str(name)
    }
}
