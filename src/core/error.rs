//! Error types for SSE Clock.
//!
//! None of these reach the operator directly: the session loop converts them
//! into request outcomes and reports them through the log.

use thiserror::Error;

/// Errors reading the peer's discovery artifact.
///
/// The file discovery source collapses all of these to "not available" at its
/// boundary; they exist so the reason can be logged.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// No location for the artifact could be determined on this platform.
    #[error("no location for coreProps.json on this platform")]
    NoLocation,

    /// The artifact could not be read.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The artifact is not valid JSON.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The `address` field is absent.
    #[error("no address field")]
    MissingAddress,

    /// The `address` field is not a string.
    #[error("address is not a string")]
    NonStringAddress,

    /// The `address` field is an empty string.
    #[error("address is empty")]
    EmptyAddress,

    /// The artifact's directory could not be watched.
    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),
}

/// Errors in the transport layer that are not peer responses.
///
/// Connection failures and non-200 responses are request outcomes, not errors.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The HTTP client could not be built.
    #[cfg(feature = "http")]
    #[error("http client error: {0}")]
    Client(#[from] reqwest::Error),

    /// A request body could not be serialized.
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Top-level SSE Clock errors.
#[derive(Debug, Error)]
pub enum ClockError {
    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A request was due but no peer address is known.
    #[error("no peer address known")]
    NoEndpoint,

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used across the crate.
pub type ClockResult<T> = Result<T, ClockError>;
