//! reqwest-backed verification client.

use std::time::Duration;

use futures_util::{FutureExt, StreamExt, future::BoxFuture};
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};

use keygate_types::{Credential, CredentialKind};

use crate::{BaseUrl, MAX_ERROR_BODY_BYTES, TransportError, VerificationClient, VerificationResponse};

const CONNECT_TIMEOUT_SECS: u64 = 10;
const TCP_KEEPALIVE_SECS: u64 = 60;
const POOL_IDLE_TIMEOUT_SECS: u64 = 90;

fn base_client_builder() -> reqwest::ClientBuilder {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(
        USER_AGENT,
        HeaderValue::from_static(concat!("keygate/", env!("CARGO_PKG_VERSION"))),
    );

    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        // Never forward a credential to a redirect target.
        .redirect(reqwest::redirect::Policy::none())
        .tcp_keepalive(Some(Duration::from_secs(TCP_KEEPALIVE_SECS)))
        .pool_idle_timeout(Some(Duration::from_secs(POOL_IDLE_TIMEOUT_SECS)))
        .default_headers(default_headers)
}

pub fn http_client_with_timeout(timeout_secs: u64) -> Result<reqwest::Client, reqwest::Error> {
    base_client_builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
}

/// Posts credentials as JSON to `{base_url}/pin` and `{base_url}/otp`.
#[derive(Debug, Clone)]
pub struct HttpVerificationClient {
    client: reqwest::Client,
    base_url: BaseUrl,
}

impl HttpVerificationClient {
    pub fn new(base_url: BaseUrl, timeout_secs: u64) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(
            http_client_with_timeout(timeout_secs)?,
            base_url,
        ))
    }

    #[must_use]
    pub fn with_client(client: reqwest::Client, base_url: BaseUrl) -> Self {
        Self { client, base_url }
    }

    #[must_use]
    pub fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }

    #[must_use]
    pub fn endpoint_url(&self, kind: CredentialKind) -> String {
        self.base_url.join(kind.endpoint())
    }
}

impl VerificationClient for HttpVerificationClient {
    fn submit(
        &self,
        credential: Credential,
    ) -> BoxFuture<'static, Result<VerificationResponse, TransportError>> {
        let client = self.client.clone();
        let url = self.endpoint_url(credential.kind());
        let payload = credential.payload();
        let kind = credential.kind();

        async move {
            tracing::debug!(%kind, %url, "Sending verification request");
            let response = client.post(&url).json(&payload).send().await?;
            let status = response.status();
            let body = read_capped_body(response).await;

            if !status.is_success() {
                return Err(TransportError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            Ok(VerificationResponse {
                status: status.as_u16(),
                body,
            })
        }
        .boxed()
    }
}

async fn read_capped_body(response: reqwest::Response) -> String {
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}
