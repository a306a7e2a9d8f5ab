//! Screen-level state machine: which flow is live and what the status line says.

use std::sync::Arc;

use keygate_client::VerificationClient;
use keygate_types::{CredentialKind, Route, SubmissionState, UiOptions, ValidationError};

use crate::diagnostics::DiagnosticsSink;
use crate::dispatcher::SubmitOutcome;
use crate::flow::{FlowResolution, Navigator, OtpSubmissionFlow, PinSubmissionFlow};
use crate::input::{OtpInput, PinInput};

/// The flow behind the current route.
#[derive(Debug)]
pub enum Screen {
    Pin(PinSubmissionFlow),
    Otp(OtpSubmissionFlow),
}

impl Screen {
    #[must_use]
    pub fn route(&self) -> Route {
        match self {
            Screen::Pin(_) => Route::Pin,
            Screen::Otp(_) => Route::Otp,
        }
    }

    #[must_use]
    pub fn kind(&self) -> CredentialKind {
        match self {
            Screen::Pin(_) => CredentialKind::Pin,
            Screen::Otp(_) => CredentialKind::Otp,
        }
    }

    #[must_use]
    pub fn state(&self) -> &SubmissionState {
        match self {
            Screen::Pin(flow) => flow.state(),
            Screen::Otp(flow) => flow.state(),
        }
    }

    #[must_use]
    pub fn submit_label(&self) -> String {
        match self {
            Screen::Pin(flow) => flow.submit_label(),
            Screen::Otp(flow) => flow.submit_label(),
        }
    }

    #[must_use]
    pub fn field_error(&self) -> Option<ValidationError> {
        match self {
            Screen::Pin(flow) => flow.field_error(),
            Screen::Otp(flow) => flow.field_error(),
        }
    }
}

/// Tone of the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Success,
    Error,
}

/// Collects a navigation request raised while a flow is borrowed.
#[derive(Default)]
struct PendingNavigation(Option<Route>);

impl Navigator for PendingNavigation {
    fn navigate(&mut self, route: Route) {
        self.0 = Some(route);
    }
}

/// Application state
pub struct App {
    client: Arc<dyn VerificationClient>,
    diagnostics: Arc<dyn DiagnosticsSink>,
    screen: Screen,
    countdown_secs: Option<u32>,
    ui_options: UiOptions,
    status: Option<(StatusKind, String)>,
    should_quit: bool,
    tick: usize,
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("screen", &self.screen)
            .field("status", &self.status)
            .field("should_quit", &self.should_quit)
            .finish_non_exhaustive()
    }
}

impl App {
    #[must_use]
    pub fn new(
        client: Arc<dyn VerificationClient>,
        diagnostics: Arc<dyn DiagnosticsSink>,
        ui_options: UiOptions,
    ) -> Self {
        let screen = Screen::Pin(PinSubmissionFlow::new(
            Arc::clone(&client),
            Arc::clone(&diagnostics),
        ));
        Self {
            client,
            diagnostics,
            screen,
            countdown_secs: None,
            ui_options,
            status: None,
            should_quit: false,
            tick: 0,
        }
    }

    /// Shorten the countdown window of every flow this app creates.
    #[must_use]
    pub fn with_countdown_secs(mut self, secs: u32) -> Self {
        self.countdown_secs = Some(secs);
        let route = self.screen.route();
        self.screen = self.build_screen(route);
        self
    }

    fn build_screen(&self, route: Route) -> Screen {
        let client = Arc::clone(&self.client);
        let diagnostics = Arc::clone(&self.diagnostics);
        match (route, self.countdown_secs) {
            (Route::Pin, None) => Screen::Pin(PinSubmissionFlow::new(client, diagnostics)),
            (Route::Pin, Some(secs)) => Screen::Pin(
                PinSubmissionFlow::new(client, diagnostics).with_countdown_secs(secs),
            ),
            (Route::Otp, None) => Screen::Otp(OtpSubmissionFlow::new(client, diagnostics)),
            (Route::Otp, Some(secs)) => Screen::Otp(
                OtpSubmissionFlow::new(client, diagnostics).with_countdown_secs(secs),
            ),
        }
    }

    #[must_use]
    pub fn route(&self) -> Route {
        self.screen.route()
    }

    #[must_use]
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// Show `route` with a fresh flow. The previous flow is torn down, even
    /// when the route is unchanged.
    pub fn navigate(&mut self, route: Route) {
        tracing::debug!(from = self.route().path(), to = route.path(), "Navigating");
        self.screen = self.build_screen(route);
    }

    /// Advance the frame counter and apply whatever the live flow has settled.
    pub fn tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);

        let kind = self.screen.kind();
        let mut pending = PendingNavigation::default();
        let resolution = match &mut self.screen {
            Screen::Pin(flow) => flow.poll(&mut pending),
            Screen::Otp(flow) => flow.poll(&mut pending),
        };

        match resolution {
            Some(FlowResolution::Verified { .. }) => {
                self.status = Some((
                    StatusKind::Success,
                    format!("{} accepted", kind.display_name()),
                ));
            }
            Some(FlowResolution::Rejected(err)) => {
                self.status = Some((StatusKind::Error, format!("Verification failed: {err}")));
            }
            None => {}
        }

        if let Some(route) = pending.0 {
            self.navigate(route);
        }
    }

    pub fn enter_char(&mut self, c: char) {
        match &mut self.screen {
            Screen::Pin(flow) => {
                flow.edit(|pin| pin.type_char(c));
            }
            Screen::Otp(flow) => {
                flow.edit(|otp| otp.push(c));
            }
        }
    }

    pub fn paste(&mut self, text: &str) {
        match &mut self.screen {
            Screen::Pin(flow) => flow.edit(|pin| {
                for c in text.chars() {
                    pin.type_char(c);
                }
            }),
            Screen::Otp(flow) => flow.edit(|otp| otp.paste(text)),
        }
    }

    pub fn backspace(&mut self) {
        match &mut self.screen {
            Screen::Pin(flow) => flow.edit(PinInput::backspace),
            Screen::Otp(flow) => flow.edit(OtpInput::backspace),
        }
    }

    pub fn focus_left(&mut self) {
        if let Screen::Pin(flow) = &mut self.screen {
            flow.edit(PinInput::focus_left);
        }
    }

    pub fn focus_right(&mut self) {
        if let Screen::Pin(flow) = &mut self.screen {
            flow.edit(PinInput::focus_right);
        }
    }

    /// Submit the live flow. Validation failures show under the field.
    pub fn submit(&mut self) -> Result<SubmitOutcome, ValidationError> {
        let outcome = match &mut self.screen {
            Screen::Pin(flow) => flow.submit(),
            Screen::Otp(flow) => flow.submit(),
        }?;
        if outcome == SubmitOutcome::Started {
            self.status = None;
        }
        Ok(outcome)
    }

    /// Back out of the OTP screen, or quit from the PIN screen.
    pub fn escape(&mut self) {
        match self.screen {
            Screen::Otp(_) => {
                self.status = None;
                self.navigate(Route::Pin);
            }
            Screen::Pin(_) => self.request_quit(),
        }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn request_quit(&mut self) {
        self.should_quit = true;
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status.as_ref().map(|(_, message)| message.as_str())
    }

    pub fn status_kind(&self) -> Option<StatusKind> {
        self.status.as_ref().map(|(kind, _)| *kind)
    }

    pub fn ui_options(&self) -> UiOptions {
        self.ui_options
    }

    pub fn tick_count(&self) -> usize {
        self.tick
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use keygate_client::TransportError;
    use keygate_types::{Route, SubmissionState, UiOptions, ValidationError};

    use super::{App, Screen, StatusKind};
    use crate::dispatcher::SubmitOutcome;
    use crate::tests::{FakeClient, RecordingDiagnostics, elapse};

    fn app(client: &Arc<FakeClient>, diag: &Arc<RecordingDiagnostics>) -> App {
        App::new(client.clone(), diag.clone(), UiOptions::default())
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            app.enter_char(c);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn pin_then_otp_walkthrough() {
        let client = FakeClient::succeeding();
        let diag = RecordingDiagnostics::new();
        let mut app = app(&client, &diag);
        assert_eq!(app.route(), Route::Pin);

        type_str(&mut app, "1234");
        assert_eq!(app.submit(), Ok(SubmitOutcome::Started));
        elapse(Duration::from_millis(20_500)).await;
        app.tick();

        assert_eq!(app.route(), Route::Otp);
        assert_eq!(app.status_message(), Some("PIN accepted"));
        assert_eq!(app.status_kind(), Some(StatusKind::Success));
        assert_eq!(app.screen().state(), &SubmissionState::Idle);

        type_str(&mut app, "123456");
        app.submit().unwrap();
        assert_eq!(app.status_message(), None);
        elapse(Duration::from_millis(20_500)).await;
        app.tick();

        assert_eq!(app.route(), Route::Otp);
        assert_eq!(app.status_message(), Some("OTP accepted"));
        let Screen::Otp(flow) = app.screen() else {
            panic!("expected OTP screen");
        };
        assert!(flow.input().is_empty());
        assert_eq!(
            client.calls(),
            vec![("/pin", "1234".to_string()), ("/otp", "123456".to_string())]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn failure_sets_status_and_stays() {
        let client = FakeClient::failing(TransportError::Status {
            status: 403,
            body: "denied".to_string(),
        });
        let diag = RecordingDiagnostics::new();
        let mut app = app(&client, &diag);

        type_str(&mut app, "1234");
        app.submit().unwrap();
        elapse(Duration::from_millis(20_500)).await;
        app.tick();

        assert_eq!(app.route(), Route::Pin);
        assert_eq!(
            app.status_message(),
            Some("Verification failed: verification service returned HTTP 403")
        );
        assert_eq!(app.status_kind(), Some(StatusKind::Error));
        assert_eq!(app.screen().submit_label(), "Next");
    }

    #[tokio::test(start_paused = true)]
    async fn pasted_text_keeps_only_digits() {
        let client = FakeClient::succeeding();
        let diag = RecordingDiagnostics::new();
        let mut app = app(&client, &diag);
        app.navigate(Route::Otp);

        app.paste("12 34-56");
        let Screen::Otp(flow) = app.screen() else {
            panic!("expected OTP screen");
        };
        assert_eq!(flow.input().as_str(), "123456");
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_submit_shows_field_error() {
        let client = FakeClient::succeeding();
        let diag = RecordingDiagnostics::new();
        let mut app = app(&client, &diag);

        type_str(&mut app, "12");
        assert_eq!(app.submit(), Err(ValidationError::PinFormat));
        assert_eq!(app.screen().field_error(), Some(ValidationError::PinFormat));
        assert_eq!(app.status_message(), None);

        type_str(&mut app, "34");
        assert_eq!(app.screen().field_error(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn escape_from_otp_tears_down_countdown() {
        let client = FakeClient::succeeding();
        let diag = RecordingDiagnostics::new();
        let mut app = app(&client, &diag);
        app.navigate(Route::Otp);
        type_str(&mut app, "654321");
        app.submit().unwrap();

        elapse(Duration::from_secs(10)).await;
        app.tick();
        app.escape();
        assert_eq!(app.route(), Route::Pin);
        assert!(!app.should_quit());

        elapse(Duration::from_secs(30)).await;
        app.tick();
        assert_eq!(client.call_count(), 0);
        assert!(diag.entries().is_empty());
        assert_eq!(app.route(), Route::Pin);
    }

    #[tokio::test(start_paused = true)]
    async fn escape_from_pin_quits() {
        let client = FakeClient::succeeding();
        let diag = RecordingDiagnostics::new();
        let mut app = app(&client, &diag);
        app.escape();
        assert!(app.should_quit());
    }

    #[tokio::test(start_paused = true)]
    async fn shortened_window_applies_to_every_screen() {
        let client = FakeClient::succeeding();
        let diag = RecordingDiagnostics::new();
        let mut app = app(&client, &diag).with_countdown_secs(2);

        type_str(&mut app, "1234");
        app.submit().unwrap();
        assert_eq!(app.screen().submit_label(), "Please wait... 2s");
        elapse(Duration::from_millis(2_500)).await;
        app.tick();
        assert_eq!(app.route(), Route::Otp);

        type_str(&mut app, "123456");
        app.submit().unwrap();
        assert_eq!(app.screen().submit_label(), "Please wait... 2s");
    }

    #[test]
    fn tick_count_wraps() {
        let client = FakeClient::succeeding();
        let diag = RecordingDiagnostics::new();
        let mut app = app(&client, &diag);
        app.tick = usize::MAX;
        app.tick();
        assert_eq!(app.tick_count(), 0);
    }
}
