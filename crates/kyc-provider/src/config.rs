//! Provider client configuration.
//!
//! Base URL, signing material, and timeout for the upstream KYC provider.
//! Loaded from the environment at startup; missing signing material is a
//! startup-fatal [`ConfigError`].

use url::Url;
use zeroize::Zeroizing;

/// Default upstream base URL. Endpoint paths are joined onto it.
pub const DEFAULT_BASE_URL: &str = "https://node.tartanhq.com/api/kyc/";

/// Default outbound request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Configuration for connecting to the KYC provider.
///
/// Custom `Debug` implementation redacts the `client_secret` field
/// to prevent credential leakage in log output.
#[derive(Clone)]
pub struct ProviderConfig {
    /// Base URL; always ends with `/` once normalized.
    pub base_url: Url,
    /// Client identity embedded in every issued credential.
    pub client_id: String,
    /// Shared HMAC secret used to sign credentials.
    pub client_secret: Zeroizing<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url.as_str())
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ProviderConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PROVIDER_CLIENT_ID` (required)
    /// - `PROVIDER_CLIENT_SECRET` (required)
    /// - `PROVIDER_BASE_URL` (default: [`DEFAULT_BASE_URL`])
    /// - `PROVIDER_TIMEOUT_SECS` (default: 15)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let client_id = non_blank(lookup("PROVIDER_CLIENT_ID")).ok_or(ConfigError::MissingClientId)?;
        let client_secret =
            non_blank(lookup("PROVIDER_CLIENT_SECRET")).ok_or(ConfigError::MissingClientSecret)?;

        let raw_url = lookup("PROVIDER_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = parse_base_url(&raw_url)
            .map_err(|e| ConfigError::InvalidUrl("PROVIDER_BASE_URL".to_string(), e))?;

        let timeout_secs = match lookup("PROVIDER_TIMEOUT_SECS") {
            None => DEFAULT_TIMEOUT_SECS,
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        var: "PROVIDER_TIMEOUT_SECS".to_string(),
                        value: raw,
                    })
                }
            },
        };

        Ok(Self {
            base_url,
            client_id,
            client_secret: Zeroizing::new(client_secret),
            timeout_secs,
        })
    }

    /// Create a configuration pointing at a local mock server (for testing).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidUrl` if `base` cannot be parsed.
    pub fn local_mock(base: &str, client_id: &str, secret: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base)
                .map_err(|e| ConfigError::InvalidUrl("local_mock".to_string(), e))?,
            client_id: client_id.to_string(),
            client_secret: Zeroizing::new(secret.to_string()),
            timeout_secs: 5,
        })
    }
}

/// Parse a base URL and guarantee a trailing slash so that `Url::join`
/// appends endpoint paths instead of replacing the last segment.
pub fn parse_base_url(raw: &str) -> Result<Url, String> {
    let mut url = Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    if url.cannot_be_a_base() {
        return Err(format!("{raw} cannot be used as a base URL"));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("PROVIDER_CLIENT_ID environment variable is required")]
    MissingClientId,
    #[error("PROVIDER_CLIENT_SECRET environment variable is required")]
    MissingClientSecret,
    #[error("invalid URL in {0}: {1}")]
    InvalidUrl(String, String),
    #[error("invalid value for {var}: {value:?}")]
    InvalidNumber { var: String, value: String },
}
