//! SSE Clock - Peer transport
//!
//! The peer accepts JSON `POST` requests on a handful of fixed paths. This
//! module provides:
//!
//! - **Request bodies**: [`GameIdentity`] and the serializable payloads it builds
//! - **Outcome classification**: [`classify_error_body`] maps a non-200 body
//!   to a [`RequestOutcome`](crate::core::RequestOutcome)
//! - **HTTP transport**: [`HttpTransport`] (requires the `http` feature)

mod classify;
mod messages;

#[cfg(feature = "http")]
mod http;

pub use classify::*;
pub use messages::*;

#[cfg(feature = "http")]
pub use http::*;
