//! # kyc-core — Foundational Types for the KYC Gateway
//!
//! Leaf crate with no I/O. Everything here is pure and synchronous.
//!
//! - [`identity`]: format validators and validated document newtypes
//! - [`mask`]: partial redaction for audit and log output
//! - [`document`]: the validated [`VerificationRequest`] model
//! - [`error`]: [`ValidationError`]
//!
//! ## Crate Policy
//!
//! - Sits at the bottom of the dependency DAG.
//! - A value of a document newtype has already passed its validator.
//! - Raw identifiers never appear in `Debug`/`Display` output.

pub mod document;
pub mod error;
pub mod identity;
pub mod mask;

pub use document::{Document, DocumentType, VerificationRequest};
pub use error::ValidationError;
pub use identity::{
    is_valid_bank_account, is_valid_national_id, is_valid_routing_code, is_valid_tax_id,
    BankAccountNumber, NationalId, RoutingCode, TaxId,
};
