//! End-to-end sessions against a mock engine.

#![cfg(feature = "http")]

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde_json::json;
use sse_clock::core::{
    PATH_BIND_GAME_EVENT, PATH_GAME_EVENT, PATH_GAME_METADATA, PATH_REMOVE_GAME, peer_errors,
};
use sse_clock::prelude::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn write_core_props(dir: &Path, server: &MockServer) -> FileDiscovery {
    let address = server.address().to_string();
    let file = dir.join("coreProps.json");
    fs::write(&file, json!({ "address": address }).to_string()).unwrap();
    FileDiscovery::new(file)
}

fn fast_config() -> ClockConfig {
    ClockConfigBuilder::new()
        .min_address_age(Duration::ZERO)
        .poll_interval(Duration::from_millis(100))
        .build()
}

async fn run_for<D, T, C>(
    session: &mut SessionStateMachine<D, T, C>,
    trigger: ShutdownTrigger,
    duration: Duration,
) where
    D: DiscoverySource,
    T: Transport,
    C: ClockFormatter,
{
    let stopper = async {
        tokio::time::sleep(duration).await;
        trigger.stop();
    };
    tokio::join!(session.run(), stopper);
}

async fn received_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| request.url.path().to_owned())
        .collect()
}

#[tokio::test]
async fn test_full_session_against_engine() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = fast_config();
    let transport = HttpTransport::new(config.identity.clone(), config.request_timeout).unwrap();
    let (trigger, token) = shutdown_channel();
    let mut session = SessionStateMachine::new(
        config,
        write_core_props(dir.path(), &server),
        transport,
        LocalClock::default(),
        token,
    );

    run_for(&mut session, trigger, Duration::from_millis(2500)).await;

    let paths = received_paths(&server).await;
    assert_eq!(
        &paths[..3],
        [PATH_REMOVE_GAME, PATH_GAME_METADATA, PATH_BIND_GAME_EVENT]
    );
    assert!(paths.iter().filter(|p| *p == PATH_GAME_EVENT).count() >= 1);
    assert_eq!(paths.last().map(String::as_str), Some(PATH_REMOVE_GAME));
    assert_eq!(session.backoff().delay(), Duration::ZERO);
}

#[tokio::test]
async fn test_rate_limited_registration_cools_down() {
    let server = MockServer::start().await;
    Mock::given(path(PATH_REMOVE_GAME))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(path(PATH_GAME_METADATA))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "error": peer_errors::TOO_MANY_REGISTRATIONS })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(path(PATH_GAME_EVENT))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = fast_config();
    let transport = HttpTransport::new(config.identity.clone(), config.request_timeout).unwrap();
    let (trigger, token) = shutdown_channel();
    let mut session = SessionStateMachine::new(
        config,
        write_core_props(dir.path(), &server),
        transport,
        LocalClock::default(),
        token,
    );

    run_for(&mut session, trigger, Duration::from_millis(1500)).await;

    assert_eq!(session.state(), SessionState::Spam);
}

#[tokio::test]
async fn test_missing_core_props_never_contacts_engine() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = fast_config();
    let transport = HttpTransport::new(config.identity.clone(), config.request_timeout).unwrap();
    let (trigger, token) = shutdown_channel();
    let mut session = SessionStateMachine::new(
        config,
        FileDiscovery::new(dir.path().join("coreProps.json")),
        transport,
        LocalClock::default(),
        token,
    );

    run_for(&mut session, trigger, Duration::from_millis(1200)).await;

    assert!(session.endpoint().is_none());
    assert!(session.backoff().delay() >= Duration::from_secs(1));
}
