//! Leaving a screen abandons its countdown and any in-flight request.

use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use keygate_engine::{Route, SubmissionState};

use crate::common::{app_for, start_verification_mock, tick_for, tick_until, type_str};

#[tokio::test]
async fn escape_during_countdown_sends_nothing() {
    let server = start_verification_mock().await;
    let mut app = app_for(&server);
    app.navigate(Route::Otp);

    type_str(&mut app, "112233");
    app.submit().unwrap();
    app.escape();
    assert_eq!(app.route(), Route::Pin);

    tick_for(&mut app, Duration::from_secs(2)).await;
    assert!(server.received_requests().await.unwrap().is_empty());
    assert_eq!(app.route(), Route::Pin);
    assert_eq!(app.status_message(), None);
}

#[tokio::test]
async fn escape_during_dispatch_ignores_the_reply() {
    let server = start_verification_mock().await;
    Mock::given(method("POST"))
        .and(path("/otp"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(800)))
        .mount(&server)
        .await;
    let mut app = app_for(&server);
    app.navigate(Route::Otp);

    type_str(&mut app, "445566");
    app.submit().unwrap();
    assert!(
        tick_until(&mut app, Duration::from_secs(5), |app| {
            app.screen().state() == &SubmissionState::Dispatching
        })
        .await
    );

    app.escape();
    tick_for(&mut app, Duration::from_secs(2)).await;

    assert_eq!(app.route(), Route::Pin);
    assert_eq!(app.status_message(), None);
    assert_eq!(app.screen().state(), &SubmissionState::Idle);
}
