//! # kyc-provider -- Typed Rust client for the upstream KYC provider
//!
//! Two concerns, kept apart:
//! - **Credentials** ([`credential`]): a fresh HS256-signed assertion per
//!   outbound call, bound to this service's client identity.
//! - **Transport** ([`client`]): one `POST` per verification to
//!   `{base_url}/{document}/verify/` with the credential as bearer token.
//!
//! ## Architecture
//!
//! This crate is the only path from the gateway to the provider. It knows
//! nothing about audit, rate limiting, or HTTP response envelopes; callers
//! map [`ProviderError`] onto their own surface.

pub mod client;
pub mod config;
pub mod credential;
pub mod error;

pub use client::{endpoint_path, ProviderClient, ProviderResponse};
pub use config::{ConfigError, ProviderConfig};
pub use credential::{Claims, Credential, CredentialError, CredentialIssuer};
pub use error::ProviderError;
