//! SSE Clock - Core traits, types, and constants.
//!
//! This module provides the collaborator traits the session state machine is
//! built on, the error taxonomy, and the fixed timing and identity constants.
//! It has minimal dependencies and no I/O of its own.

mod constants;
mod error;
mod traits;

pub use constants::*;
pub use error::*;
pub use traits::*;
