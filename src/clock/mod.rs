//! SSE Clock - Clock text
//!
//! Local date and time rendering for the peer's screen.

mod formatter;

pub use formatter::*;
