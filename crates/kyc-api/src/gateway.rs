//! # Verification Gateway
//!
//! Relays a validated [`VerificationRequest`] to the provider and folds the
//! outcome into a [`VerificationResult`] and one audit entry.
//!
//! Presence and format checks have already happened by the time a request
//! exists, so everything here concerns a single outbound attempt:
//!
//! 1. Issue a fresh credential for the requester.
//! 2. One `POST` to the provider. No retries.
//! 3. Normalize: 2xx JSON is success; non-2xx keeps the provider's status
//!    (502 if it is not an error status) and at most a short extracted
//!    message; transport failures become a generic 500.
//! 4. Record one masked audit entry and bump counters.

use axum::http::StatusCode;
use kyc_core::mask::mask_json_with;
use kyc_core::{Document, VerificationRequest};
use kyc_provider::{
    CredentialIssuer, ProviderClient, ProviderConfig, ProviderError, ProviderResponse,
};
use serde_json::Value;

use crate::audit::{AuditEntry, AuditStore};
use crate::error::AppError;

/// Message used when the provider rejects a request without saying why.
pub const GENERIC_UPSTREAM_MESSAGE: &str = "Verification provider returned an error";

/// Why a verification did not succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Provider answered with a non-2xx status.
    Upstream,
    /// Provider unreachable, timed out, or replied with an unusable body.
    Transport,
    /// A credential could not be issued. No outbound call was made.
    Internal,
}

/// Normalized outcome of one verification attempt.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationResult {
    pub success: bool,
    /// Provider body on success.
    pub normalized_data: Option<Value>,
    /// Status returned to the caller.
    pub raw_status: u16,
    pub error_message: Option<String>,
    pub failure: Option<FailureKind>,
}

impl VerificationResult {
    fn succeeded(response: ProviderResponse) -> Self {
        Self {
            success: true,
            normalized_data: Some(response.body),
            raw_status: StatusCode::OK.as_u16(),
            error_message: None,
            failure: None,
        }
    }

    fn failed(kind: FailureKind, status: u16, message: impl Into<String>) -> Self {
        Self {
            success: false,
            normalized_data: None,
            raw_status: status,
            error_message: Some(message.into()),
            failure: Some(kind),
        }
    }

    /// Split into the provider body or the error to send back.
    pub fn into_result(self) -> Result<Value, AppError> {
        let message = self.error_message.unwrap_or_default();
        match self.failure {
            None => Ok(self.normalized_data.unwrap_or(Value::Null)),
            Some(FailureKind::Upstream) => Err(AppError::Upstream {
                status: StatusCode::from_u16(self.raw_status).unwrap_or(StatusCode::BAD_GATEWAY),
                message,
            }),
            Some(FailureKind::Transport) => Err(AppError::Transport(message)),
            Some(FailureKind::Internal) => Err(AppError::Internal(message)),
        }
    }
}

/// Status returned for a provider rejection: the provider's own status if
/// it is a 4xx/5xx, otherwise 502.
pub fn upstream_status(status: u16) -> u16 {
    if (400..600).contains(&status) {
        status
    } else {
        StatusCode::BAD_GATEWAY.as_u16()
    }
}

/// Provider body with sensitive keys masked and every echo of the submitted
/// identifiers scrubbed, whatever key it appears under.
pub fn loggable_body(body: &Value, document: &Document) -> Value {
    mask_json_with(body, &document.raw_values())
}

/// Credential issuer plus provider client.
#[derive(Debug, Clone)]
pub struct VerificationGateway {
    issuer: CredentialIssuer,
    client: ProviderClient,
}

impl VerificationGateway {
    pub fn new(issuer: CredentialIssuer, client: ProviderClient) -> Self {
        Self { issuer, client }
    }

    /// Build the issuer and client from provider configuration.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let issuer = CredentialIssuer::from_config(config)?;
        let client = ProviderClient::new(config)?;
        Ok(Self::new(issuer, client))
    }

    /// Run one verification attempt and record it in `audit`.
    pub async fn verify(
        &self,
        request: &VerificationRequest,
        audit: &AuditStore,
    ) -> VerificationResult {
        let document_type = request.document_type();
        let masked_detail = request.document.masked_detail();

        let credential = match self.issuer.issue(Some(&request.requester_id)) {
            Ok(credential) => credential,
            Err(e) => {
                tracing::error!(
                    document_type = %document_type,
                    error = %e,
                    "credential issuance failed"
                );
                return VerificationResult::failed(
                    FailureKind::Internal,
                    StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                    e.to_string(),
                );
            }
        };

        let result = match self.client.verify(&request.document, &credential).await {
            Ok(response) => {
                tracing::debug!(
                    document_type = %document_type,
                    body = %loggable_body(&response.body, &request.document),
                    "provider verification succeeded"
                );
                VerificationResult::succeeded(response)
            }
            Err(err) => Self::normalize_error(err),
        };

        tracing::info!(
            document_type = %document_type,
            requester_id = %request.requester_id,
            detail = %masked_detail,
            status = result.raw_status,
            success = result.success,
            "verification attempt"
        );

        audit.record(AuditEntry::new(
            document_type,
            request.requester_id.clone(),
            masked_detail,
            result.raw_status,
            result.success,
        ));

        result
    }

    fn normalize_error(err: ProviderError) -> VerificationResult {
        match err {
            ProviderError::Api {
                status, message, ..
            } => VerificationResult::failed(
                FailureKind::Upstream,
                upstream_status(status),
                message.unwrap_or_else(|| GENERIC_UPSTREAM_MESSAGE.to_string()),
            ),
            other => {
                tracing::error!(error = %other, "provider call failed");
                VerificationResult::failed(
                    FailureKind::Transport,
                    StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                    other.to_string(),
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_status_keeps_error_statuses() {
        assert_eq!(upstream_status(400), 400);
        assert_eq!(upstream_status(422), 422);
        assert_eq!(upstream_status(503), 503);
        assert_eq!(upstream_status(599), 599);
    }

    #[test]
    fn upstream_status_maps_ambiguous_to_502() {
        assert_eq!(upstream_status(302), 502);
        assert_eq!(upstream_status(204), 502);
        assert_eq!(upstream_status(100), 502);
    }

    #[test]
    fn provider_message_is_relayed() {
        let result = VerificationGateway::normalize_error(ProviderError::Api {
            endpoint: "POST tax-id/verify/".into(),
            status: 404,
            message: Some("Record not found".into()),
        });
        assert!(!result.success);
        assert_eq!(result.raw_status, 404);
        assert_eq!(result.failure, Some(FailureKind::Upstream));
        match result.into_result() {
            Err(AppError::Upstream { status, message }) => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(message, "Record not found");
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[test]
    fn missing_message_uses_generic_text() {
        let result = VerificationGateway::normalize_error(ProviderError::Api {
            endpoint: "POST tax-id/verify/".into(),
            status: 503,
            message: None,
        });
        assert_eq!(result.error_message.as_deref(), Some(GENERIC_UPSTREAM_MESSAGE));
    }

    #[test]
    fn timeout_becomes_transport_500() {
        let result = VerificationGateway::normalize_error(ProviderError::Timeout {
            endpoint: "POST national-id/verify/".into(),
            timeout_secs: 15,
        });
        assert_eq!(result.raw_status, 500);
        assert!(matches!(result.into_result(), Err(AppError::Transport(_))));
    }

    #[test]
    fn logged_body_hides_echoed_identifiers() {
        let request =
            VerificationRequest::national_id(Some("123456789012".into()), Some("u".into()))
                .unwrap();
        let body = serde_json::json!({
            "status": "VERIFIED",
            "aadhaarNumber": "123456789012",
            "result": { "subjectRef": "123456789012", "matched": true }
        });
        let logged = loggable_body(&body, &request.document);
        assert_eq!(logged["status"], "VERIFIED");
        assert_eq!(logged["aadhaarNumber"], "XXXXXXXX9012");
        assert_eq!(logged["result"]["subjectRef"], "XXXXXXXX9012");
        assert_eq!(logged["result"]["matched"], true);
        assert!(!logged.to_string().contains("123456789012"));
    }

    #[test]
    fn success_wraps_body() {
        let result = VerificationResult::succeeded(ProviderResponse {
            status: 201,
            body: serde_json::json!({ "status": "VERIFIED" }),
        });
        assert!(result.success);
        assert_eq!(result.raw_status, 200);
        assert_eq!(
            result.into_result().unwrap(),
            serde_json::json!({ "status": "VERIFIED" })
        );
    }
}
