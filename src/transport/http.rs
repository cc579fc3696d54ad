//! HTTP transport to the peer, built on `reqwest`.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{debug, warn};

use super::classify::classify_error_body;
use super::messages::GameIdentity;
use crate::core::{
    PATH_BIND_GAME_EVENT, PATH_GAME_EVENT, PATH_GAME_METADATA, PATH_REMOVE_GAME, REQUEST_TIMEOUT,
    RequestOutcome, Transport, TransportError,
};

/// [`Transport`] issuing JSON `POST` requests with a fixed per-call timeout.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    identity: GameIdentity,
}

impl HttpTransport {
    /// Create a transport registering `identity`, with the given request timeout.
    pub fn new(identity: GameIdentity, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, identity })
    }

    /// Create a transport with the default identity and timeout.
    pub fn with_defaults() -> Result<Self, TransportError> {
        Self::new(GameIdentity::default(), REQUEST_TIMEOUT)
    }

    /// POST `body` to `endpoint` + `path` and classify the response.
    ///
    /// With `silent`, failures are not logged and any HTTP response counts as
    /// success; connection-level failures are still [`RequestOutcome::OtherFailure`].
    async fn send<B>(
        &self,
        endpoint: &str,
        path: &str,
        body: &B,
        silent: bool,
    ) -> Result<RequestOutcome, TransportError>
    where
        B: Serialize + ?Sized,
    {
        let url = format!("{endpoint}{path}");
        let payload = serde_json::to_vec(body)?;
        debug!(%path, body = %String::from_utf8_lossy(&payload), "request");

        let response = match self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                if !silent {
                    warn!(
                        method = "POST",
                        %url,
                        timeout = err.is_timeout(),
                        error = %err,
                        "request failed"
                    );
                }
                return Ok(RequestOutcome::OtherFailure);
            }
        };

        let status = response.status();
        if status == StatusCode::OK {
            debug!(%path, "response ok");
            return Ok(RequestOutcome::Success);
        }
        if silent {
            debug!(%path, status = status.as_u16(), "ignoring peer error");
            return Ok(RequestOutcome::Success);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        let text = match response.text().await {
            Ok(text) => text,
            Err(err) => {
                warn!(%url, error = %err, "cannot read response body");
                String::new()
            }
        };
        warn!(
            method = "POST",
            %url,
            status = status.as_u16(),
            %content_type,
            body = %text,
            "peer rejected request"
        );
        Ok(classify_error_body(&text))
    }
}

impl Transport for HttpTransport {
    async fn register(&self, endpoint: &str) -> Result<RequestOutcome, TransportError> {
        // Drops metadata or bindings left by an older registration.
        let removed = self.deregister(endpoint).await?;
        debug!(?removed, "cleared previous registration");

        let outcome = self
            .send(endpoint, PATH_GAME_METADATA, &self.identity.metadata(), false)
            .await?;
        if !outcome.is_success() {
            return Ok(outcome);
        }
        self.send(endpoint, PATH_BIND_GAME_EVENT, &self.identity.bind_event(), false)
            .await
    }

    async fn push_event(
        &self,
        endpoint: &str,
        date: &str,
        time: &str,
    ) -> Result<RequestOutcome, TransportError> {
        self.send(endpoint, PATH_GAME_EVENT, &self.identity.event(date, time), false)
            .await
    }

    async fn deregister(&self, endpoint: &str) -> Result<RequestOutcome, TransportError> {
        self.send(endpoint, PATH_REMOVE_GAME, &self.identity.remove(), true)
            .await
    }
}
