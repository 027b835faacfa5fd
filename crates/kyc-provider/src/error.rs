//! Provider client error types.
//!
//! Display strings name the endpoint and status only. Upstream bodies are
//! never rendered here; the extracted `message` is carried as data for the
//! caller to relay.

/// Errors from provider calls.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP transport error (connect, TLS, body read).
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// No response within the configured timeout.
    #[error("request to {endpoint} timed out after {timeout_secs}s")]
    Timeout { endpoint: String, timeout_secs: u64 },
    /// Provider returned a non-2xx status.
    #[error("provider {endpoint} returned {status}")]
    Api {
        endpoint: String,
        status: u16,
        message: Option<String>,
    },
    /// A 2xx response whose body was not JSON.
    #[error("failed to deserialize response from {endpoint} (status {status}): {source}")]
    Deserialization {
        endpoint: String,
        status: u16,
        source: serde_json::Error,
    },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl ProviderError {
    /// Upstream HTTP status, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::Deserialization { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when no usable response came back from the provider.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Http { .. } | Self::Timeout { .. } | Self::Deserialization { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_omits_message() {
        let err = ProviderError::Api {
            endpoint: "POST tax-id/verify/".into(),
            status: 422,
            message: Some("Tax ID ABCDE1234F not found".into()),
        };
        let text = err.to_string();
        assert_eq!(text, "provider POST tax-id/verify/ returned 422");
        assert_eq!(err.status(), Some(422));
        assert!(!err.is_transport());
    }

    #[test]
    fn timeout_is_transport() {
        let err = ProviderError::Timeout {
            endpoint: "POST national-id/verify/".into(),
            timeout_secs: 15,
        };
        assert!(err.is_transport());
        assert_eq!(err.status(), None);
        assert!(err.to_string().contains("15s"));
    }
}
