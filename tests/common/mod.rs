//! Shared test utilities and fixtures
//!
//! Common infrastructure for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use keygate_client::{BaseUrl, HttpVerificationClient};
use keygate_engine::{App, TracingDiagnostics, UiOptions};

/// Countdown used by integration tests; the full window is covered by the
/// paused-clock unit tests in the engine.
pub const TEST_COUNTDOWN_SECS: u32 = 1;

/// Start a mock server that simulates the verification service
pub async fn start_verification_mock() -> MockServer {
    MockServer::start().await
}

/// Accept exactly one POST to `endpoint` carrying `body`.
pub async fn expect_accepted(server: &MockServer, endpoint: &str, body: serde_json::Value) {
    Mock::given(method("POST"))
        .and(path(endpoint))
        .and(body_json(body))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "ok": true })))
        .expect(1)
        .mount(server)
        .await;
}

/// Answer every POST to `endpoint` with `status`.
pub async fn mount_rejecting(server: &MockServer, endpoint: &str, status: u16) {
    Mock::given(method("POST"))
        .and(path(endpoint))
        .respond_with(ResponseTemplate::new(status).set_body_string("denied"))
        .mount(server)
        .await;
}

pub fn client_for(base_url: &str) -> HttpVerificationClient {
    HttpVerificationClient::new(BaseUrl::parse(base_url).unwrap(), 5).unwrap()
}

/// An app wired to `server` with the shortened countdown.
pub fn app_for(server: &MockServer) -> App {
    App::new(
        Arc::new(client_for(&server.uri())),
        Arc::new(TracingDiagnostics),
        UiOptions::default(),
    )
    .with_countdown_secs(TEST_COUNTDOWN_SECS)
}

pub fn type_str(app: &mut App, digits: &str) {
    for c in digits.chars() {
        app.enter_char(c);
    }
}

/// Run the frame loop until `done` holds or `timeout` passes. Returns whether
/// `done` was reached.
pub async fn tick_until(app: &mut App, timeout: Duration, mut done: impl FnMut(&App) -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        app.tick();
        if done(app) {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}

/// Keep ticking for `duration` regardless of state.
pub async fn tick_for(app: &mut App, duration: Duration) {
    tick_until(app, duration, |_| false).await;
}
