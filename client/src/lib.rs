//! Verification service client.
//!
//! # Architecture
//!
//! - [`VerificationClient`] - the seam the engine submits credentials through
//! - [`HttpVerificationClient`] - reqwest implementation posting JSON to `{base}/pin` or `{base}/otp`
//! - [`BaseUrl`] - validated service root, resolved once at startup and passed in
//!
//! # Error Handling
//!
//! Every failure (connect, timeout, non-2xx status) is a [`TransportError`]. The
//! client never retries; a retry is a new user-initiated submission.

mod http;

use std::fmt;

use futures_util::future::BoxFuture;
use thiserror::Error;
use url::Url;

pub use http::{HttpVerificationClient, http_client_with_timeout};
pub use keygate_types;

use keygate_types::Credential;

/// Default per-request timeout.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const MAX_ERROR_BODY_BYTES: usize = 32 * 1024;

/// Sends one verification attempt to the remote service.
///
/// The returned future completes exactly once. Implementations must not retry.
pub trait VerificationClient: Send + Sync {
    fn submit(
        &self,
        credential: Credential,
    ) -> BoxFuture<'static, Result<VerificationResponse, TransportError>>;
}

/// A 2xx reply. The body is kept verbatim; its shape is not checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationResponse {
    pub status: u16,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,
    #[error("could not reach verification service: {0}")]
    Connect(String),
    #[error("verification service returned HTTP {status}")]
    Status { status: u16, body: String },
    #[error("request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Request(err.to_string())
        }
    }
}

#[derive(Debug, Error)]
pub enum BaseUrlError {
    #[error("invalid base URL '{raw}': {source}")]
    Parse {
        raw: String,
        #[source]
        source: url::ParseError,
    },
    #[error("base URL must use http or https (got {0})")]
    Scheme(String),
    #[error("base URL must not carry a query or fragment: '{0}'")]
    QueryOrFragment(String),
}

/// Root URL of the verification service, without a trailing slash.
#[derive(Clone, PartialEq, Eq)]
pub struct BaseUrl(String);

impl BaseUrl {
    pub fn parse(raw: &str) -> Result<Self, BaseUrlError> {
        let trimmed = raw.trim();
        let url = Url::parse(trimmed).map_err(|source| BaseUrlError::Parse {
            raw: trimmed.to_string(),
            source,
        })?;
        match url.scheme() {
            "http" | "https" => {}
            other => return Err(BaseUrlError::Scheme(other.to_string())),
        }
        // Endpoints are appended to the path; anything after it would swallow them.
        if url.query().is_some() || url.fragment().is_some() {
            return Err(BaseUrlError::QueryOrFragment(trimmed.to_string()));
        }
        Ok(Self(trimmed.trim_end_matches('/').to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `{base}{suffix}`, e.g. `https://host/api` + `/pin`.
    #[must_use]
    pub fn join(&self, suffix: &str) -> String {
        format!("{}{suffix}", self.0)
    }
}

impl fmt::Debug for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BaseUrl").field(&self.0).finish()
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
