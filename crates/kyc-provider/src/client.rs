//! Typed client for the provider's verification endpoints.
//!
//! ## Paths
//!
//! | Method | Path (relative to base URL) | Document |
//! |--------|-----------------------------|----------|
//! | POST   | `national-id/verify/`       | national ID |
//! | POST   | `tax-id/verify/`            | tax ID |
//! | POST   | `bank-account/verify/`      | bank account + routing code |
//!
//! Every call carries `Authorization: Bearer <credential>` and a JSON body
//! whose keys match the inbound API (`id_number`, `tax_id`,
//! `account_number` + `routing_code`).

use std::time::Duration;

use kyc_core::{Document, DocumentType};
use serde_json::Value;
use url::Url;

use crate::config::ProviderConfig;
use crate::credential::Credential;
use crate::error::ProviderError;

/// Upstream error messages are cut to this many characters before relay.
pub const MAX_MESSAGE_CHARS: usize = 200;

/// Path of the verification endpoint for a document type, relative to the
/// base URL.
pub fn endpoint_path(document_type: DocumentType) -> &'static str {
    match document_type {
        DocumentType::NationalId => "national-id/verify/",
        DocumentType::TaxId => "tax-id/verify/",
        DocumentType::BankAccount => "bank-account/verify/",
    }
}

/// A successful (2xx) provider response.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderResponse {
    pub status: u16,
    pub body: Value,
}

/// Client for the provider's verification API.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    http: reqwest::Client,
    base_url: Url,
    timeout_secs: u64,
}

impl ProviderClient {
    /// Create a new provider client from configuration.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers({
                let mut headers = reqwest::header::HeaderMap::new();
                headers.insert(
                    reqwest::header::ACCEPT,
                    reqwest::header::HeaderValue::from_static("application/json"),
                );
                headers
            })
            .build()
            .map_err(|e| ProviderError::Http {
                endpoint: "client_init".into(),
                source: e,
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            timeout_secs: config.timeout_secs,
        })
    }

    /// The base URL endpoint paths are joined onto.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Submit a document for verification.
    ///
    /// Calls `POST {base_url}/{endpoint_path}` with `credential` as the
    /// bearer token. 2xx responses must carry a JSON body; anything else is
    /// reported as [`ProviderError::Api`] with the upstream message, if one
    /// could be extracted.
    pub async fn verify(
        &self,
        document: &Document,
        credential: &Credential,
    ) -> Result<ProviderResponse, ProviderError> {
        let path = endpoint_path(document.document_type());
        let endpoint = format!("POST {path}");
        let url = self.base_url.join(path).map_err(|e| {
            ProviderError::Config(crate::config::ConfigError::InvalidUrl(
                "PROVIDER_BASE_URL".into(),
                e.to_string(),
            ))
        })?;

        let resp = self
            .http
            .post(url)
            .bearer_auth(credential.token())
            .json(&document.provider_body())
            .send()
            .await
            .map_err(|e| self.transport_error(&endpoint, e))?;

        let status = resp.status();
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| self.transport_error(&endpoint, e))?;

        if !status.is_success() {
            let message = extract_message(&bytes);
            tracing::warn!(
                endpoint = %endpoint,
                status = status.as_u16(),
                "provider rejected verification request"
            );
            return Err(ProviderError::Api {
                endpoint,
                status: status.as_u16(),
                message,
            });
        }

        let body = serde_json::from_slice(&bytes).map_err(|e| ProviderError::Deserialization {
            endpoint: endpoint.clone(),
            status: status.as_u16(),
            source: e,
        })?;

        tracing::debug!(endpoint = %endpoint, status = status.as_u16(), "provider responded");

        Ok(ProviderResponse {
            status: status.as_u16(),
            body,
        })
    }

    fn transport_error(&self, endpoint: &str, e: reqwest::Error) -> ProviderError {
        if e.is_timeout() {
            ProviderError::Timeout {
                endpoint: endpoint.to_string(),
                timeout_secs: self.timeout_secs,
            }
        } else {
            ProviderError::Http {
                endpoint: endpoint.to_string(),
                source: e,
            }
        }
    }
}

/// Pull a human-readable message out of an upstream error body.
///
/// Only a top-level string `message` or `error` field is used. Non-JSON
/// bodies yield `None`; nothing else from the body is ever relayed.
pub fn extract_message(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let obj = value.as_object()?;
    ["message", "error"]
        .iter()
        .filter_map(|key| obj.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .find(|msg| !msg.is_empty())
        .map(|msg| msg.chars().take(MAX_MESSAGE_CHARS).collect())
}
