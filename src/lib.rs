//! # SSE Clock
//!
//! Keeps a SteelSeries Engine OLED screen showing the local date and time.
//!
//! The engine (the *peer*) listens on a port it picks at every start and
//! publishes in `coreProps.json`. SSE Clock watches that file, registers a
//! screen event once the engine has settled, and pushes the time once per
//! second. It survives the engine being absent, restarting, erroring, or
//! rate limiting registrations:
//!
//! - **Discovery**: address and address age from `coreProps.json`
//! - **Transport**: JSON requests to the engine, classified into outcomes
//! - **Session**: the state machine deciding when to wait, register, update
//!   or back off
//!
//! ## Feature Flags
//!
//! - `http` (default): [`transport::HttpTransport`] built on `reqwest`
//!
//! ## Modules
//!
//! - [`core`]: Traits, constants, and error types
//! - [`clock`]: Local date and time text
//! - [`discovery`]: `coreProps.json` discovery source
//! - [`transport`]: Request bodies, outcome classification, HTTP transport
//! - [`client`]: Session state machine, backoff, and cancellation
//! - [`logging`]: `tracing` setup with a rotating log file
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use sse_clock::prelude::*;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let (trigger, token) = shutdown_channel();
//! let config = ClockConfig::default();
//! let transport = HttpTransport::new(config.identity.clone(), config.request_timeout)?;
//!
//! let mut session = SessionStateMachine::new(
//!     config,
//!     FileDiscovery::from_default_location()?,
//!     transport,
//!     LocalClock::default(),
//!     token,
//! );
//! session.run().await;
//! # drop(trigger);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Core module (always included)
pub mod core;

pub mod client;
pub mod clock;
pub mod discovery;
pub mod logging;
pub mod transport;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::*;

    pub use crate::client::{
        Backoff, ClockConfig, ClockConfigBuilder, RetryPolicy, SessionState,
        SessionStateMachine, ShutdownToken, ShutdownTrigger, shutdown_channel,
    };
    pub use crate::clock::LocalClock;
    pub use crate::discovery::{AddressWatcher, FileDiscovery};
    pub use crate::transport::GameIdentity;

    #[cfg(feature = "http")]
    pub use crate::transport::HttpTransport;
}

// Re-export commonly used items at crate root
pub use client::{ClockConfig, SessionState, SessionStateMachine};
pub use core::{ClockError, ClockResult, RequestOutcome};
