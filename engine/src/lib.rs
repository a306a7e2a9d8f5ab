//! Core engine for Keygate - submission state machines and screen orchestration.
//!
//! This crate contains the App state machine without TUI dependencies.
//!
//! # Layers
//!
//! - [`input`] - digit-only collectors for the PIN slots and the OTP field
//! - [`DelayedDispatcher`] - countdown window + exactly-once dispatch, cancelled on drop
//! - [`SubmissionFlow`] - one form: collector, validator gate, dispatcher, side effects
//! - [`App`] - the live screen, status line, and navigation between flows

mod app;
mod diagnostics;
mod dispatcher;
mod flow;
pub mod input;


pub use app::{App, Screen, StatusKind};
pub use diagnostics::{DiagnosticsSink, TracingDiagnostics};
pub use dispatcher::{DelayedDispatcher, Resolution, SubmitOutcome};
pub use flow::{
    FlowResolution, Navigator, OtpSubmissionFlow, PinSubmissionFlow, SubmissionFlow,
};
pub use input::{CredentialInput, OtpInput, PinInput};

pub use keygate_client::{
    self, TransportError, VerificationClient, VerificationResponse,
};
pub use keygate_types::{
    COUNTDOWN_SECS, CredentialKind, PIN_LENGTH, Route, SubmissionState, UiOptions,
    ValidationError,
};
