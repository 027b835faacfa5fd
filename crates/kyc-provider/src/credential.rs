//! # Credential Issuance
//!
//! Short-lived signed assertions that authenticate this service to the
//! provider. One credential per outbound call: never cached, never reused,
//! no revocation path. Expiry ten minutes after issuance is the only way a
//! credential stops being valid.
//!
//! ## Token Format
//!
//! Compact JWS, algorithm pinned to HS256 (the provider's contract):
//!
//! ```text
//! { "client_id": <issuer client id>, "user_id": <subject>, "iat": now, "exp": now + 600 }
//! ```

use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::config::{ConfigError, ProviderConfig};

/// Credential lifetime in seconds.
pub const CREDENTIAL_TTL_SECS: i64 = 600;

/// The signing algorithm. Fixed; never taken from input.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Claims carried by every credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub client_id: String,
    pub user_id: String,
    pub iat: i64,
    pub exp: i64,
}

/// A freshly issued credential.
///
/// Custom `Debug` redacts the token.
pub struct Credential {
    pub subject_id: String,
    pub issued_at: i64,
    pub expires_at: i64,
    token: Zeroizing<String>,
}

impl Credential {
    /// The compact JWS, for use as a bearer token.
    pub fn token(&self) -> &str {
        self.token.as_str()
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("subject_id", &self.subject_id)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

/// Errors while signing a credential.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("failed to sign credential: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Issues HS256 credentials bound to this service's client identity.
#[derive(Clone)]
pub struct CredentialIssuer {
    client_id: String,
    key: EncodingKey,
}

impl std::fmt::Debug for CredentialIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialIssuer")
            .field("client_id", &self.client_id)
            .field("key", &"[REDACTED]")
            .finish()
    }
}

impl CredentialIssuer {
    /// Create an issuer from explicit signing material.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingClientId`] or
    /// [`ConfigError::MissingClientSecret`] if either value is blank.
    pub fn new(client_id: impl Into<String>, client_secret: &[u8]) -> Result<Self, ConfigError> {
        let client_id = client_id.into();
        if client_id.trim().is_empty() {
            return Err(ConfigError::MissingClientId);
        }
        if client_secret.iter().all(u8::is_ascii_whitespace) {
            return Err(ConfigError::MissingClientSecret);
        }
        Ok(Self {
            client_id,
            key: EncodingKey::from_secret(client_secret),
        })
    }

    /// Create an issuer from provider configuration.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, ConfigError> {
        Self::new(config.client_id.clone(), config.client_secret.as_bytes())
    }

    /// The client identity embedded in issued credentials.
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Issue a credential for `subject`, valid from now for
    /// [`CREDENTIAL_TTL_SECS`].
    pub fn issue(&self, subject: Option<&str>) -> Result<Credential, CredentialError> {
        self.issue_at(subject, Utc::now())
    }

    /// Issue a credential as of `now`.
    ///
    /// A missing or blank subject becomes `user-<epoch millis>`.
    pub fn issue_at(
        &self,
        subject: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Credential, CredentialError> {
        let subject_id = match subject.map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => format!("user-{}", now.timestamp_millis()),
        };
        let issued_at = now.timestamp();
        let claims = Claims {
            client_id: self.client_id.clone(),
            user_id: subject_id.clone(),
            iat: issued_at,
            exp: issued_at + CREDENTIAL_TTL_SECS,
        };

        let token = jsonwebtoken::encode(&Header::new(SIGNING_ALGORITHM), &claims, &self.key)?;

        Ok(Credential {
            subject_id,
            issued_at: claims.iat,
            expires_at: claims.exp,
            token: Zeroizing::new(token),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use jsonwebtoken::{DecodingKey, Validation};

    const SECRET: &[u8] = b"test-shared-secret";

    fn issuer() -> CredentialIssuer {
        CredentialIssuer::new("client-123", SECRET).unwrap()
    }

    fn decode(token: &str, secret: &[u8]) -> jsonwebtoken::errors::Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        jsonwebtoken::decode::<Claims>(token, &DecodingKey::from_secret(secret), &validation)
            .map(|data| data.claims)
    }

    #[test]
    fn claims_bind_client_subject_and_window() {
        let now = Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap();
        let cred = issuer().issue_at(Some("requester-9"), now).unwrap();

        assert_eq!(cred.subject_id, "requester-9");
        assert_eq!(cred.issued_at, now.timestamp());
        assert_eq!(cred.expires_at, now.timestamp() + 600);

        let claims = decode(cred.token(), SECRET).unwrap();
        assert_eq!(
            claims,
            Claims {
                client_id: "client-123".into(),
                user_id: "requester-9".into(),
                iat: now.timestamp(),
                exp: now.timestamp() + 600,
            }
        );
    }

    #[test]
    fn header_pins_hs256() {
        let cred = issuer().issue(Some("u")).unwrap();
        let header = jsonwebtoken::decode_header(cred.token()).unwrap();
        assert_eq!(header.alg, Algorithm::HS256);
    }

    #[test]
    fn wrong_secret_fails_verification() {
        let cred = issuer().issue(Some("u")).unwrap();
        assert!(decode(cred.token(), b"other-secret").is_err());
    }

    #[test]
    fn default_subject_uses_epoch_millis() {
        let now = Utc.timestamp_millis_opt(1_700_000_000_123).unwrap();
        let cred = issuer().issue_at(None, now).unwrap();
        assert_eq!(cred.subject_id, "user-1700000000123");

        let blank = issuer().issue_at(Some("  "), now).unwrap();
        assert_eq!(blank.subject_id, "user-1700000000123");
    }

    #[test]
    fn every_call_produces_a_new_token() {
        let issuer = issuer();
        let a = issuer
            .issue_at(Some("u"), Utc.timestamp_opt(1_000, 0).unwrap())
            .unwrap();
        let b = issuer
            .issue_at(Some("u"), Utc.timestamp_opt(1_001, 0).unwrap())
            .unwrap();
        assert_ne!(a.token(), b.token());
    }

    #[test]
    fn blank_material_rejected() {
        assert!(matches!(
            CredentialIssuer::new("", SECRET),
            Err(ConfigError::MissingClientId)
        ));
        assert!(matches!(
            CredentialIssuer::new("client", b""),
            Err(ConfigError::MissingClientSecret)
        ));
    }

    #[test]
    fn debug_redacts_token() {
        let cred = issuer().issue(Some("u")).unwrap();
        let dbg = format!("{cred:?}");
        assert!(!dbg.contains(cred.token()));
        assert!(dbg.contains("[REDACTED]"));
    }
}
