//! Digit-only credential values and their wire payloads.

use std::fmt;

use serde::Serialize;

use crate::Route;

/// Number of slots in a PIN.
pub const PIN_LENGTH: usize = 4;
/// Shortest accepted OTP.
pub const OTP_MIN_LENGTH: usize = 6;
/// Longest accepted OTP.
pub const OTP_MAX_LENGTH: usize = 30;

/// Which credential a flow collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialKind {
    Pin,
    Otp,
}

impl CredentialKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            CredentialKind::Pin => "pin",
            CredentialKind::Otp => "otp",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            CredentialKind::Pin => "PIN",
            CredentialKind::Otp => "OTP",
        }
    }

    /// Path suffix appended to the configured base URL.
    #[must_use]
    pub const fn endpoint(self) -> &'static str {
        match self {
            CredentialKind::Pin => "/pin",
            CredentialKind::Otp => "/otp",
        }
    }

    /// Screen to show once this credential has been accepted.
    ///
    /// Both kinds lead to the OTP screen; an accepted OTP re-enters it with a
    /// fresh flow.
    #[must_use]
    pub const fn next_route(self) -> Route {
        match self {
            CredentialKind::Pin | CredentialKind::Otp => Route::Otp,
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A PIN that passed validation: exactly four ASCII digits.
///
/// Only the validator constructs this, so holding one proves the format.
#[derive(Clone, PartialEq, Eq)]
pub struct PinCredential(String);

impl PinCredential {
    pub(crate) fn new_unchecked(value: String) -> Self {
        Self(value)
    }

    /// The raw digits, for putting on the wire.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

// Manual Debug impl to prevent leaking credentials in logs.
impl fmt::Debug for PinCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PinCredential").field(&"[REDACTED]").finish()
    }
}

/// An OTP that passed validation: 6 to 30 ASCII digits.
#[derive(Clone, PartialEq, Eq)]
pub struct OtpCredential(String);

impl OtpCredential {
    pub(crate) fn new_unchecked(value: String) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for OtpCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OtpCredential").field(&"[REDACTED]").finish()
    }
}

/// A validated credential of either kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    Pin(PinCredential),
    Otp(OtpCredential),
}

impl Credential {
    #[must_use]
    pub fn kind(&self) -> CredentialKind {
        match self {
            Credential::Pin(_) => CredentialKind::Pin,
            Credential::Otp(_) => CredentialKind::Otp,
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &'static str {
        self.kind().endpoint()
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        match self {
            Credential::Pin(pin) => pin.expose(),
            Credential::Otp(otp) => otp.expose(),
        }
    }

    /// JSON body for the verification request.
    #[must_use]
    pub fn payload(&self) -> VerificationPayload {
        match self {
            Credential::Pin(pin) => VerificationPayload::Pin {
                pin: pin.expose().to_string(),
            },
            Credential::Otp(otp) => VerificationPayload::Otp {
                otp: otp.expose().to_string(),
            },
        }
    }
}

/// Request body sent to the verification service.
///
/// Serializes as `{"pin": "..."}` or `{"otp": "..."}`.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum VerificationPayload {
    Pin { pin: String },
    Otp { otp: String },
}

impl fmt::Debug for VerificationPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationPayload::Pin { .. } => f
                .debug_struct("Pin")
                .field("pin", &"[REDACTED]")
                .finish(),
            VerificationPayload::Otp { .. } => f
                .debug_struct("Otp")
                .field("otp", &"[REDACTED]")
                .finish(),
        }
    }
}
