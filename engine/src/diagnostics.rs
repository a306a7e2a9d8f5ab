//! Where verification outcomes are reported.

use keygate_client::{TransportError, VerificationResponse};
use keygate_types::CredentialKind;

/// Receives one report per settled verification cycle.
///
/// Flows call this only while alive; a torn-down flow reports nothing.
pub trait DiagnosticsSink: Send + Sync {
    fn verification_succeeded(&self, kind: CredentialKind, response: &VerificationResponse);
    fn verification_failed(&self, kind: CredentialKind, error: &TransportError);
}

/// Reports through `tracing`. Credentials and response bodies are never part
/// of a report; a body is logged by length only.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl DiagnosticsSink for TracingDiagnostics {
    fn verification_succeeded(&self, kind: CredentialKind, response: &VerificationResponse) {
        tracing::info!(
            %kind,
            status = response.status,
            body_len = response.body.len(),
            "Verification accepted"
        );
    }

    fn verification_failed(&self, kind: CredentialKind, error: &TransportError) {
        match error {
            TransportError::Status { status, body } => {
                tracing::error!(%kind, status, body_len = body.len(), "Verification rejected");
            }
            other => {
                tracing::error!(%kind, error = %other, "Verification request failed");
            }
        }
    }
}
