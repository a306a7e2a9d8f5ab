//! Base URL resolution wired through to real requests.

use std::fs;
use std::time::Duration;

use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use keygate_client::{HttpVerificationClient, VerificationClient};
use keygate_config::{KeygateConfig, resolve_service_with};
use keygate_types::{CredentialKind, validate};

use crate::common::start_verification_mock;

#[tokio::test]
async fn config_file_base_path_prefixes_endpoints() {
    let server = start_verification_mock().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/pin"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(
        &config_path,
        format!(
            "[api]\nbase_url = \"{}/api/v1/\"\nrequest_timeout_secs = 3\n",
            server.uri()
        ),
    )
    .unwrap();

    let config = KeygateConfig::load_from(&config_path).unwrap();
    let service = resolve_service_with(config.as_ref(), None).unwrap();
    assert_eq!(service.request_timeout_secs, 3);

    let client = HttpVerificationClient::new(service.base_url, service.request_timeout_secs).unwrap();
    let credential = validate("1234", CredentialKind::Pin).into_result().unwrap();
    let response = tokio::time::timeout(Duration::from_secs(5), client.submit(credential))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(response.status, 204);
}

#[tokio::test]
async fn env_override_beats_config_file() {
    let server = start_verification_mock().await;
    Mock::given(method("POST"))
        .and(path("/otp"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let config: KeygateConfig =
        toml::from_str("[api]\nbase_url = \"http://127.0.0.1:9/unused\"\n").unwrap();
    let service = resolve_service_with(Some(&config), Some(server.uri())).unwrap();

    let client = HttpVerificationClient::new(service.base_url, 5).unwrap();
    let credential = validate("123456", CredentialKind::Otp)
        .into_result()
        .unwrap();
    let response = client.submit(credential).await.unwrap();
    assert_eq!(response.body, "ok");
}
