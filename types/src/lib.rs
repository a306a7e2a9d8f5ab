//! Core domain types for Keygate.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

mod credential;
mod submission;
mod validation;

pub use credential::{
    Credential, CredentialKind, OTP_MAX_LENGTH, OTP_MIN_LENGTH, OtpCredential, PIN_LENGTH,
    PinCredential, VerificationPayload,
};
pub use submission::{COUNTDOWN_SECS, SubmissionState};
pub use validation::{ValidationError, ValidationResult, validate};

// ============================================================================
// Routes
// ============================================================================

/// Screens the front end can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Route {
    #[default]
    Pin,
    Otp,
}

impl Route {
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Route::Pin => "/pin",
            Route::Otp => "/otp",
        }
    }
}

// ============================================================================
// UI Options
// ============================================================================

/// UI configuration options derived from config/environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiOptions {
    pub ascii_only: bool,
    pub high_contrast: bool,
    pub reduced_motion: bool,
}
