//! SSE Clock - Session
//!
//! The session state machine and its supporting pieces:
//!
//! - [`SessionStateMachine`]: decides when to wait, register, update or back off
//! - [`RetryPolicy`] / [`Backoff`]: capped exponential failure delay
//! - [`ClockConfig`]: timing parameters and identity
//! - [`ShutdownToken`]: cooperative cancellation from the process shell

mod backoff;
mod config;
mod machine;
mod shutdown;
mod state;

pub use backoff::*;
pub use config::*;
pub use machine::*;
pub use shutdown::*;
pub use state::*;
