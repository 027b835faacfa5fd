//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! Holds the process-local pieces only: configuration, the audit store,
//! the gateway (credential issuer + provider client), and the rate limiter.
//! Each is a cheap clone over shared internals.

use std::sync::Arc;

use kyc_provider::{ProviderConfig, ProviderError};

use crate::audit::{AuditStore, DEFAULT_AUDIT_CAPACITY};
use crate::gateway::VerificationGateway;
use crate::middleware::rate_limit::{RateLimitConfig, RateLimiter};

/// Default listen port.
pub const DEFAULT_PORT: u16 = 3000;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    /// CORS allow-list. `None` means permissive, as does a `*` entry.
    pub allowed_origins: Option<Vec<String>>,
    pub rate_limit: RateLimitConfig,
    pub audit_capacity: usize,
    pub provider: ProviderConfig,
}

impl AppConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `PORT` (default: 3000)
    /// - `ALLOWED_ORIGINS` (comma-separated, or `*`; default: permissive)
    /// - `RATE_LIMIT_MAX_REQUESTS` (default: 100)
    /// - `RATE_LIMIT_WINDOW_SECS` (default: 900)
    /// - `TRUST_PROXY` (default: false)
    /// - `AUDIT_CAPACITY` (default: 10)
    /// - `PROVIDER_*` (see [`ProviderConfig::from_env`])
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let provider = ProviderConfig::from_lookup(&lookup)?;

        let port = parse_or(&lookup, "PORT", DEFAULT_PORT)?;
        let defaults = RateLimitConfig::default();
        let rate_limit = RateLimitConfig {
            max_requests: parse_positive(&lookup, "RATE_LIMIT_MAX_REQUESTS", defaults.max_requests)?,
            window_secs: parse_positive(&lookup, "RATE_LIMIT_WINDOW_SECS", defaults.window_secs)?,
            trust_proxy: parse_bool(&lookup, "TRUST_PROXY")?,
        };
        let audit_capacity = parse_or(&lookup, "AUDIT_CAPACITY", DEFAULT_AUDIT_CAPACITY)?;

        let allowed_origins = lookup("ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty())
            .filter(|origins| !origins.iter().any(|o| o == "*"));

        Ok(Self {
            port,
            allowed_origins,
            rate_limit,
            audit_capacity,
            provider,
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { var, value: raw }),
    }
}

fn parse_positive(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    let value = parse_or(lookup, var, default)?;
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            var,
            value: "0".to_string(),
        });
    }
    Ok(value)
}

fn parse_bool(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<bool, ConfigError> {
    match lookup(var).as_deref().map(str::trim) {
        None | Some("") => Ok(false),
        Some(v) if v.eq_ignore_ascii_case("true") || v == "1" => Ok(true),
        Some(v) if v.eq_ignore_ascii_case("false") || v == "0" => Ok(false),
        Some(v) => Err(ConfigError::InvalidValue {
            var,
            value: v.to_string(),
        }),
    }
}

/// Startup configuration errors. All are fatal.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(transparent)]
    Provider(#[from] kyc_provider::ConfigError),
    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub audit: AuditStore,
    pub gateway: Arc<VerificationGateway>,
    pub limiter: RateLimiter,
}

impl AppState {
    /// Build state from configuration, constructing the credential issuer
    /// and provider client.
    pub fn new(config: AppConfig) -> Result<Self, ProviderError> {
        let gateway = VerificationGateway::from_config(&config.provider)?;
        Ok(Self::with_gateway(config, gateway))
    }

    /// Build state around an existing gateway.
    pub fn with_gateway(config: AppConfig, gateway: VerificationGateway) -> Self {
        Self {
            audit: AuditStore::new(config.audit_capacity),
            limiter: RateLimiter::new(config.rate_limit.clone()),
            gateway: Arc::new(gateway),
            config: Arc::new(config),
        }
    }
}
