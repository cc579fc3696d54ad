//! Classification of peer error responses.

use tracing::warn;

use super::messages::PeerErrorBody;
use crate::core::{RequestOutcome, peer_errors};

/// Classify the body of a non-200 response.
///
/// Only the peer's registration rate-limit message is singled out; every other
/// error, including an unparseable body, is [`RequestOutcome::OtherFailure`].
pub fn classify_error_body(body: &str) -> RequestOutcome {
    match serde_json::from_str::<PeerErrorBody>(body) {
        Ok(PeerErrorBody { error: Some(error) })
            if error == peer_errors::TOO_MANY_REGISTRATIONS =>
        {
            RequestOutcome::RateLimited
        }
        Ok(_) => RequestOutcome::OtherFailure,
        Err(err) => {
            warn!(error = %err, %body, "cannot parse peer error body");
            RequestOutcome::OtherFailure
        }
    }
}
