//! PIN screen against a mock verification service.

use std::time::Duration;

use keygate_engine::{Route, Screen, SubmissionState, SubmitOutcome, ValidationError};

use crate::common::{
    app_for, expect_accepted, mount_rejecting, start_verification_mock, tick_for, tick_until,
    type_str,
};

#[tokio::test]
async fn accepted_pin_moves_to_otp_screen() {
    let server = start_verification_mock().await;
    expect_accepted(&server, "/pin", serde_json::json!({ "pin": "1234" })).await;
    let mut app = app_for(&server);

    type_str(&mut app, "1234");
    assert_eq!(app.submit(), Ok(SubmitOutcome::Started));
    assert_eq!(app.screen().submit_label(), "Please wait... 1s");

    let reached = tick_until(&mut app, Duration::from_secs(5), |app| {
        app.route() == Route::Otp
    })
    .await;
    assert!(reached, "never navigated to the OTP screen");
    assert_eq!(app.status_message(), Some("PIN accepted"));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].headers.get("content-type").unwrap(),
        "application/json"
    );
}

#[tokio::test]
async fn typed_letters_never_reach_the_wire() {
    let server = start_verification_mock().await;
    expect_accepted(&server, "/pin", serde_json::json!({ "pin": "1234" })).await;
    let mut app = app_for(&server);

    type_str(&mut app, "12");
    app.enter_char('a');
    type_str(&mut app, "34");
    app.submit().unwrap();

    assert!(
        tick_until(&mut app, Duration::from_secs(5), |app| app.route() == Route::Otp).await
    );
}

#[tokio::test]
async fn short_pin_is_rejected_locally() {
    let server = start_verification_mock().await;
    let mut app = app_for(&server);

    type_str(&mut app, "123");
    assert_eq!(app.submit(), Err(ValidationError::PinFormat));

    tick_for(&mut app, Duration::from_millis(1_500)).await;
    assert!(server.received_requests().await.unwrap().is_empty());
    assert_eq!(app.screen().state(), &SubmissionState::Idle);
}

#[tokio::test]
async fn rejected_pin_keeps_digits_for_retry() {
    let server = start_verification_mock().await;
    mount_rejecting(&server, "/pin", 401).await;
    let mut app = app_for(&server);

    type_str(&mut app, "4321");
    app.submit().unwrap();
    assert!(
        tick_until(&mut app, Duration::from_secs(5), |app| {
            app.status_message().is_some()
        })
        .await
    );

    assert_eq!(app.route(), Route::Pin);
    assert_eq!(
        app.status_message(),
        Some("Verification failed: verification service returned HTTP 401")
    );
    let Screen::Pin(flow) = app.screen() else {
        panic!("expected PIN screen");
    };
    assert_eq!(flow.input().joined(), "4321");
    assert!(matches!(flow.state(), SubmissionState::Failed { .. }));

    app.tick();
    assert_eq!(app.screen().state(), &SubmissionState::Idle);
    assert_eq!(app.screen().submit_label(), "Next");
    assert_eq!(
        app.status_message(),
        Some("Verification failed: verification service returned HTTP 401")
    );

    assert_eq!(app.submit(), Ok(SubmitOutcome::Started));
    assert!(
        tick_until(&mut app, Duration::from_secs(5), |app| {
            matches!(app.screen().state(), SubmissionState::Failed { .. })
        })
        .await
    );
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn hammering_submit_sends_one_request() {
    let server = start_verification_mock().await;
    expect_accepted(&server, "/pin", serde_json::json!({ "pin": "5678" })).await;
    let mut app = app_for(&server);

    type_str(&mut app, "5678");
    assert_eq!(app.submit(), Ok(SubmitOutcome::Started));
    for _ in 0..10 {
        assert_eq!(app.submit(), Ok(SubmitOutcome::Busy));
    }

    assert!(
        tick_until(&mut app, Duration::from_secs(5), |app| app.route() == Route::Otp).await
    );
    tick_for(&mut app, Duration::from_millis(1_500)).await;
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}
