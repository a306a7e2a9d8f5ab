//! OTP screen against a mock verification service.

use std::time::Duration;

use keygate_engine::{Route, Screen, SubmissionState, ValidationError};

use crate::common::{
    app_for, expect_accepted, mount_rejecting, start_verification_mock, tick_for, tick_until,
    type_str,
};

#[tokio::test]
async fn accepted_otp_starts_a_fresh_otp_screen() {
    let server = start_verification_mock().await;
    expect_accepted(&server, "/otp", serde_json::json!({ "otp": "123456" })).await;
    let mut app = app_for(&server);
    app.navigate(Route::Otp);

    app.paste("123 456");
    app.submit().unwrap();

    assert!(
        tick_until(&mut app, Duration::from_secs(5), |app| {
            app.status_message() == Some("OTP accepted")
        })
        .await
    );
    assert_eq!(app.route(), Route::Otp);
    let Screen::Otp(flow) = app.screen() else {
        panic!("expected OTP screen");
    };
    assert!(flow.input().is_empty());
    assert_eq!(flow.state(), &SubmissionState::Idle);
}

#[tokio::test]
async fn five_digit_otp_never_dispatches() {
    let server = start_verification_mock().await;
    let mut app = app_for(&server);
    app.navigate(Route::Otp);

    type_str(&mut app, "12345");
    let err = app.submit().unwrap_err();
    assert_eq!(err, ValidationError::OtpTooShort);
    assert_eq!(err.reason(), "OTP must be at least 6 characters");

    tick_for(&mut app, Duration::from_millis(1_500)).await;
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn overlong_otp_is_rejected() {
    let server = start_verification_mock().await;
    let mut app = app_for(&server);
    app.navigate(Route::Otp);

    app.paste(&"9".repeat(31));
    assert_eq!(app.submit(), Err(ValidationError::OtpTooLong));
    assert_eq!(app.screen().field_error(), Some(ValidationError::OtpTooLong));

    app.backspace();
    assert_eq!(app.screen().field_error(), None);
}

#[tokio::test]
async fn server_error_fails_and_retry_restarts_countdown() {
    let server = start_verification_mock().await;
    mount_rejecting(&server, "/otp", 500).await;
    let mut app = app_for(&server);
    app.navigate(Route::Otp);

    type_str(&mut app, "123456");
    app.submit().unwrap();
    assert!(
        tick_until(&mut app, Duration::from_secs(5), |app| {
            matches!(app.screen().state(), SubmissionState::Failed { .. })
        })
        .await
    );

    let Screen::Otp(flow) = app.screen() else {
        panic!("expected OTP screen");
    };
    assert_eq!(flow.input().as_str(), "123456");
    assert_eq!(
        flow.state().failure_reason(),
        Some("verification service returned HTTP 500")
    );

    app.submit().unwrap();
    assert_eq!(
        app.screen().state(),
        &SubmissionState::CountingDown { remaining: 1 }
    );
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn unreachable_service_reports_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut app = keygate_engine::App::new(
        std::sync::Arc::new(crate::common::client_for(&format!("http://{addr}"))),
        std::sync::Arc::new(keygate_engine::TracingDiagnostics),
        keygate_engine::UiOptions::default(),
    )
    .with_countdown_secs(crate::common::TEST_COUNTDOWN_SECS);
    app.navigate(Route::Otp);

    type_str(&mut app, "246810");
    app.submit().unwrap();
    assert!(
        tick_until(&mut app, Duration::from_secs(10), |app| {
            app.status_message().is_some()
        })
        .await
    );
    assert!(
        app.status_message()
            .unwrap()
            .starts_with("Verification failed:")
    );
}
