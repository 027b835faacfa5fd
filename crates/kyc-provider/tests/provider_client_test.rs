//! Contract tests for ProviderClient against a wiremock provider.
//!
//! ## Endpoints Tested
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | POST   | `/national-id/verify/`  | `national_id_*` |
//! | POST   | `/tax-id/verify/`       | `tax_id_*` |
//! | POST   | `/bank-account/verify/` | `bank_account_*` |

use std::time::Duration;

use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use kyc_core::VerificationRequest;
use kyc_provider::{Claims, CredentialIssuer, ProviderClient, ProviderConfig, ProviderError};
use wiremock::matchers::{body_json, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CLIENT_ID: &str = "client-abc";
const SECRET: &str = "provider-shared-secret";

fn config_for(mock_server: &MockServer) -> ProviderConfig {
    ProviderConfig::local_mock(&mock_server.uri(), CLIENT_ID, SECRET).unwrap()
}

fn issuer() -> CredentialIssuer {
    CredentialIssuer::new(CLIENT_ID, SECRET.as_bytes()).unwrap()
}

fn national_id_request() -> VerificationRequest {
    VerificationRequest::national_id(Some("123456789012".into()), Some("req-1".into())).unwrap()
}

// ── POST /national-id/verify/ ────────────────────────────────────────

#[tokio::test]
async fn national_id_posts_body_and_returns_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/national-id/verify/"))
        .and(header_exists("authorization"))
        .and(body_json(serde_json::json!({ "id_number": "123456789012" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "VERIFIED",
            "name": "A. Person"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ProviderClient::new(&config_for(&mock_server)).unwrap();
    let req = national_id_request();
    let credential = issuer().issue(Some(&req.requester_id)).unwrap();

    let resp = client.verify(&req.document, &credential).await.unwrap();
    assert_eq!(resp.status, 200);
    assert_eq!(resp.body["status"], "VERIFIED");
}

#[tokio::test]
async fn national_id_bearer_token_carries_claims() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/national-id/verify/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&mock_server)
        .await;

    let client = ProviderClient::new(&config_for(&mock_server)).unwrap();
    let req = national_id_request();
    let credential = issuer().issue(Some(&req.requester_id)).unwrap();
    client.verify(&req.document, &credential).await.unwrap();

    let received = mock_server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    let auth = received[0]
        .headers
        .get("authorization")
        .unwrap()
        .to_str()
        .unwrap();
    let token = auth.strip_prefix("Bearer ").unwrap();

    let mut validation = Validation::new(Algorithm::HS256);
    validation.required_spec_claims.clear();
    let claims = jsonwebtoken::decode::<Claims>(
        token,
        &DecodingKey::from_secret(SECRET.as_bytes()),
        &validation,
    )
    .unwrap()
    .claims;

    assert_eq!(claims.client_id, CLIENT_ID);
    assert_eq!(claims.user_id, "req-1");
    assert_eq!(claims.exp - claims.iat, 600);
}

// ── POST /tax-id/verify/ ─────────────────────────────────────────────

#[tokio::test]
async fn tax_id_sends_uppercased_value() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tax-id/verify/"))
        .and(body_json(serde_json::json!({ "tax_id": "ABCDE1234F" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "valid": true
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ProviderClient::new(&config_for(&mock_server)).unwrap();
    let req = VerificationRequest::tax_id(Some("abcde1234f".into()), Some("u".into())).unwrap();
    let credential = issuer().issue(None).unwrap();

    let resp = client.verify(&req.document, &credential).await.unwrap();
    assert_eq!(resp.body["valid"], true);
}

#[tokio::test]
async fn tax_id_handles_422_with_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tax-id/verify/"))
        .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
            "message": "Tax ID not found",
            "details": { "tax_id": "ABCDE1234F" }
        })))
        .mount(&mock_server)
        .await;

    let client = ProviderClient::new(&config_for(&mock_server)).unwrap();
    let req = VerificationRequest::tax_id(Some("ABCDE1234F".into()), Some("u".into())).unwrap();
    let credential = issuer().issue(None).unwrap();

    let err = client.verify(&req.document, &credential).await.unwrap_err();
    match err {
        ProviderError::Api {
            status, message, ..
        } => {
            assert_eq!(status, 422);
            assert_eq!(message.as_deref(), Some("Tax ID not found"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

// ── POST /bank-account/verify/ ───────────────────────────────────────

#[tokio::test]
async fn bank_account_sends_both_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bank-account/verify/"))
        .and(body_json(serde_json::json!({
            "account_number": "000123456789",
            "routing_code": "ABCD0123456"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "account_exists": true
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ProviderClient::new(&config_for(&mock_server)).unwrap();
    let req = VerificationRequest::bank_account(
        Some("000123456789".into()),
        Some("abcd0123456".into()),
        Some("u".into()),
    )
    .unwrap();
    let credential = issuer().issue(None).unwrap();

    let resp = client.verify(&req.document, &credential).await.unwrap();
    assert_eq!(resp.body["account_exists"], true);
}

#[tokio::test]
async fn bank_account_503_without_json_has_no_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/bank-account/verify/"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
        .mount(&mock_server)
        .await;

    let client = ProviderClient::new(&config_for(&mock_server)).unwrap();
    let req = VerificationRequest::bank_account(
        Some("000123456789".into()),
        Some("ABCD0123456".into()),
        Some("u".into()),
    )
    .unwrap();
    let credential = issuer().issue(None).unwrap();

    let err = client.verify(&req.document, &credential).await.unwrap_err();
    assert_eq!(err.status(), Some(503));
    assert!(matches!(err, ProviderError::Api { message: None, .. }));
}

// ── Transport failures ───────────────────────────────────────────────

#[tokio::test]
async fn non_json_success_body_is_deserialization_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/national-id/verify/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&mock_server)
        .await;

    let client = ProviderClient::new(&config_for(&mock_server)).unwrap();
    let req = national_id_request();
    let credential = issuer().issue(None).unwrap();

    let err = client.verify(&req.document, &credential).await.unwrap_err();
    assert!(matches!(err, ProviderError::Deserialization { status: 200, .. }));
    assert!(err.is_transport());
}

#[tokio::test]
async fn slow_provider_times_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/national-id/verify/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock_server)
        .await;

    let mut config = config_for(&mock_server);
    config.timeout_secs = 1;
    let client = ProviderClient::new(&config).unwrap();
    let req = national_id_request();
    let credential = issuer().issue(None).unwrap();

    let err = client.verify(&req.document, &credential).await.unwrap_err();
    assert!(
        matches!(err, ProviderError::Timeout { timeout_secs: 1, .. }),
        "got {err:?}"
    );
}

#[tokio::test]
async fn unreachable_provider_is_http_error() {
    let config = ProviderConfig::local_mock("http://127.0.0.1:1", CLIENT_ID, SECRET).unwrap();
    let client = ProviderClient::new(&config).unwrap();
    let req = national_id_request();
    let credential = issuer().issue(None).unwrap();

    let err = client.verify(&req.document, &credential).await.unwrap_err();
    assert!(err.is_transport());
    assert_eq!(err.status(), None);
}
