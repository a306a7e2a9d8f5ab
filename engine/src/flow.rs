//! One form: input collector + validator gate + delayed dispatcher.

use std::sync::Arc;

use keygate_client::{TransportError, VerificationClient};
use keygate_types::{Route, SubmissionState, ValidationError, ValidationResult, validate};

use crate::diagnostics::DiagnosticsSink;
use crate::dispatcher::{DelayedDispatcher, Resolution, SubmitOutcome};
use crate::input::{CredentialInput, OtpInput, PinInput};

/// Moves the front end to another screen.
pub trait Navigator {
    fn navigate(&mut self, route: Route);
}

/// What a settled cycle meant for the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowResolution {
    /// The service accepted the credential; the navigator was sent to `next`.
    Verified { next: Route },
    /// The request failed; input is kept for another attempt.
    Rejected(TransportError),
}

/// A live form instance.
///
/// Dropping the flow tears it down: its pending countdown and in-flight request
/// are abandoned and nothing is logged, cleared, or navigated afterwards.
pub struct SubmissionFlow<I> {
    input: I,
    dispatcher: DelayedDispatcher,
    field_error: Option<ValidationError>,
    diagnostics: Arc<dyn DiagnosticsSink>,
}

pub type PinSubmissionFlow = SubmissionFlow<PinInput>;
pub type OtpSubmissionFlow = SubmissionFlow<OtpInput>;

impl<I: std::fmt::Debug> std::fmt::Debug for SubmissionFlow<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionFlow")
            .field("input", &self.input)
            .field("dispatcher", &self.dispatcher)
            .field("field_error", &self.field_error)
            .finish_non_exhaustive()
    }
}

impl<I: CredentialInput> SubmissionFlow<I> {
    #[must_use]
    pub fn new(client: Arc<dyn VerificationClient>, diagnostics: Arc<dyn DiagnosticsSink>) -> Self {
        Self {
            input: I::default(),
            dispatcher: DelayedDispatcher::new(client),
            field_error: None,
            diagnostics,
        }
    }

    pub fn with_countdown_secs(mut self, secs: u32) -> Self {
        self.dispatcher = self.dispatcher.with_countdown_secs(secs);
        self
    }

    #[must_use]
    pub fn input(&self) -> &I {
        &self.input
    }

    /// Edit the input. If a field error is showing, it is re-checked against the
    /// edited value.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut I) -> R) -> R {
        let out = f(&mut self.input);
        if self.field_error.is_some() {
            self.field_error = match validate(&self.input.value(), I::KIND) {
                ValidationResult::Valid(_) => None,
                ValidationResult::Invalid(err) => Some(err),
            };
        }
        out
    }

    #[must_use]
    pub fn state(&self) -> &SubmissionState {
        self.dispatcher.state()
    }

    #[must_use]
    pub fn field_error(&self) -> Option<ValidationError> {
        self.field_error
    }

    #[must_use]
    pub fn submit_label(&self) -> String {
        self.state().submit_label(I::SUBMIT_LABEL)
    }

    /// Validate the current input and, if it passes, start the countdown.
    ///
    /// While a cycle is live this is a no-op returning `Busy`; the input is
    /// not even validated.
    pub fn submit(&mut self) -> Result<SubmitOutcome, ValidationError> {
        if self.dispatcher.is_busy() {
            return Ok(SubmitOutcome::Busy);
        }

        match validate(&self.input.value(), I::KIND) {
            ValidationResult::Valid(credential) => {
                self.field_error = None;
                Ok(self.dispatcher.start(credential))
            }
            ValidationResult::Invalid(err) => {
                tracing::debug!(kind = %I::KIND, reason = %err, "Submission rejected by validation");
                self.field_error = Some(err);
                Err(err)
            }
        }
    }

    /// Drain cycle progress and apply the side effects of a settled cycle.
    ///
    /// The settled state is visible until the next poll, which returns the
    /// dispatcher to `Idle`.
    pub fn poll(&mut self, navigator: &mut dyn Navigator) -> Option<FlowResolution> {
        self.dispatcher.reset();
        match self.dispatcher.poll()? {
            Resolution::Succeeded(response) => {
                self.diagnostics.verification_succeeded(I::KIND, &response);
                self.input.clear();
                let next = I::KIND.next_route();
                navigator.navigate(next);
                Some(FlowResolution::Verified { next })
            }
            Resolution::Failed(err) => {
                self.diagnostics.verification_failed(I::KIND, &err);
                Some(FlowResolution::Rejected(err))
            }
        }
    }

    /// Abandon any live cycle and consume the flow.
    pub fn teardown(self) {
        drop(self);
    }
}
