//! Credential validation.
//!
//! [`validate`] is a pure gate: it never touches submission state, it only
//! decides whether a candidate value may start a countdown.

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::credential::{
    Credential, CredentialKind, OTP_MAX_LENGTH, OTP_MIN_LENGTH, OtpCredential, PinCredential,
};

// ASCII digits only; `\d` in `regex` also matches non-ASCII decimal digits.
static PIN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}$").expect("PIN pattern is valid"));
static NUMERIC_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("numeric pattern is valid"));

/// Why a candidate credential was rejected.
///
/// The `Display` text is the message rendered next to the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("PIN must be exactly 4 digits")]
    PinFormat,
    #[error("OTP is required")]
    OtpRequired,
    #[error("OTP must be numeric")]
    OtpNotNumeric,
    #[error("OTP must be at least 6 characters")]
    OtpTooShort,
    #[error("OTP cannot exceed 30 characters")]
    OtpTooLong,
}

impl ValidationError {
    #[must_use]
    pub fn kind(self) -> CredentialKind {
        match self {
            ValidationError::PinFormat => CredentialKind::Pin,
            ValidationError::OtpRequired
            | ValidationError::OtpNotNumeric
            | ValidationError::OtpTooShort
            | ValidationError::OtpTooLong => CredentialKind::Otp,
        }
    }

    #[must_use]
    pub fn reason(self) -> String {
        self.to_string()
    }
}

/// Outcome of validating a candidate value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid(Credential),
    Invalid(ValidationError),
}

impl ValidationResult {
    pub fn into_result(self) -> Result<Credential, ValidationError> {
        match self {
            ValidationResult::Valid(credential) => Ok(credential),
            ValidationResult::Invalid(err) => Err(err),
        }
    }
}

/// Validate `raw` as a credential of the given kind.
#[must_use]
pub fn validate(raw: &str, kind: CredentialKind) -> ValidationResult {
    match kind {
        CredentialKind::Pin => validate_pin(raw),
        CredentialKind::Otp => validate_otp(raw),
    }
}

fn validate_pin(raw: &str) -> ValidationResult {
    if PIN_PATTERN.is_match(raw) {
        ValidationResult::Valid(Credential::Pin(PinCredential::new_unchecked(
            raw.to_string(),
        )))
    } else {
        ValidationResult::Invalid(ValidationError::PinFormat)
    }
}

fn validate_otp(raw: &str) -> ValidationResult {
    if raw.is_empty() {
        return ValidationResult::Invalid(ValidationError::OtpRequired);
    }
    if !NUMERIC_PATTERN.is_match(raw) {
        return ValidationResult::Invalid(ValidationError::OtpNotNumeric);
    }
    // Numeric, so byte length == char count.
    if raw.len() < OTP_MIN_LENGTH {
        return ValidationResult::Invalid(ValidationError::OtpTooShort);
    }
    if raw.len() > OTP_MAX_LENGTH {
        return ValidationResult::Invalid(ValidationError::OtpTooLong);
    }
    ValidationResult::Valid(Credential::Otp(OtpCredential::new_unchecked(
        raw.to_string(),
    )))
}
