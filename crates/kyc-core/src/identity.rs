//! # Identity Document Newtypes
//!
//! Format validators and validated newtypes for the three document
//! families the gateway forwards upstream.
//!
//! ## Validation
//!
//! The `is_valid_*` functions are pure and total: any `&str` in, a `bool`
//! out, no allocation beyond case-normalization. Each newtype's `new()`
//! trims surrounding whitespace, normalizes case where the format is
//! alphabetic, and then calls the matching validator. A value that exists
//! as a newtype has passed its validator.
//!
//! | Type | Format |
//! |------|--------|
//! | [`NationalId`] | 12 digits |
//! | [`TaxId`] | 5 letters + 4 digits + 1 letter (uppercased) |
//! | [`BankAccountNumber`] | 9 to 18 digits |
//! | [`RoutingCode`] | 4 letters + `0` + 6 alphanumerics (uppercased) |
//!
//! ## Redaction
//!
//! `Debug` and `Display` render the masked form. Use `as_str()` only where
//! the raw value is genuinely needed (the upstream request body).

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::mask::{mask_grouped, mask_tail};

/// Helper macro to implement `Deserialize` for string newtypes that must
/// validate their contents. Deserializes as a plain `String`, then routes
/// through the type's `new()` constructor.
macro_rules! impl_validating_deserialize {
    ($ty:ident) => {
        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let raw = String::deserialize(deserializer)?;
                Self::new(raw).map_err(serde::de::Error::custom)
            }
        }
    };
}

/// Masked `Debug` + `Display` for sensitive newtypes.
macro_rules! impl_masked_fmt {
    ($ty:ident) => {
        impl std::fmt::Debug for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_tuple(stringify!($ty)).field(&self.masked()).finish()
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.masked())
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Validators
// ---------------------------------------------------------------------------

/// Exactly 12 ASCII digits.
pub fn is_valid_national_id(value: &str) -> bool {
    value.len() == 12 && value.bytes().all(|b| b.is_ascii_digit())
}

/// 5 letters, 4 digits, 1 letter after uppercasing (10 characters).
pub fn is_valid_tax_id(value: &str) -> bool {
    let upper = value.to_ascii_uppercase();
    let bytes = upper.as_bytes();
    bytes.len() == 10
        && bytes[..5].iter().all(u8::is_ascii_uppercase)
        && bytes[5..9].iter().all(u8::is_ascii_digit)
        && bytes[9].is_ascii_uppercase()
}

/// 9 to 18 ASCII digits inclusive.
pub fn is_valid_bank_account(value: &str) -> bool {
    (9..=18).contains(&value.len()) && value.bytes().all(|b| b.is_ascii_digit())
}

/// 4 letters, the literal `0`, then 6 uppercase letters or digits, after
/// uppercasing (11 characters).
pub fn is_valid_routing_code(value: &str) -> bool {
    let upper = value.to_ascii_uppercase();
    let bytes = upper.as_bytes();
    bytes.len() == 11
        && bytes[..4].iter().all(u8::is_ascii_uppercase)
        && bytes[4] == b'0'
        && bytes[5..]
            .iter()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
}

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// National identity number (12 digits).
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NationalId(String);

impl_validating_deserialize!(NationalId);
impl_masked_fmt!(NationalId);

impl NationalId {
    /// Create a national ID, validating the 12-digit format.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidNationalId`] otherwise.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        let trimmed = s.trim();
        if !is_valid_national_id(trimmed) {
            return Err(ValidationError::InvalidNationalId);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Access the raw 12-digit value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Masked form in groups of four: `XXXX-XXXX-9012`.
    pub fn masked(&self) -> String {
        mask_grouped(&self.0, 4)
    }
}

/// Tax identification number (`AAAAA9999A`), stored uppercase.
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TaxId(String);

impl_validating_deserialize!(TaxId);
impl_masked_fmt!(TaxId);

impl TaxId {
    /// Create a tax ID, uppercasing before validation.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidTaxId`] if the layout is wrong.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let upper = value.into().trim().to_ascii_uppercase();
        if !is_valid_tax_id(&upper) {
            return Err(ValidationError::InvalidTaxId);
        }
        Ok(Self(upper))
    }

    /// Access the canonical (uppercase) value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Masked form: `XXXXXX234F`.
    pub fn masked(&self) -> String {
        mask_tail(&self.0)
    }
}

/// Bank account number (9 to 18 digits).
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct BankAccountNumber(String);

impl_validating_deserialize!(BankAccountNumber);
impl_masked_fmt!(BankAccountNumber);

impl BankAccountNumber {
    /// Create a bank account number, validating length and digits.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidBankAccount`] otherwise.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let s = value.into();
        let trimmed = s.trim();
        if !is_valid_bank_account(trimmed) {
            return Err(ValidationError::InvalidBankAccount);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Access the raw digits.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn masked(&self) -> String {
        mask_tail(&self.0)
    }
}

/// Bank branch routing code (`AAAA0XXXXXX`), stored uppercase.
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RoutingCode(String);

impl_validating_deserialize!(RoutingCode);
impl_masked_fmt!(RoutingCode);

impl RoutingCode {
    /// Create a routing code, uppercasing before validation.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidRoutingCode`] otherwise.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let upper = value.into().trim().to_ascii_uppercase();
        if !is_valid_routing_code(&upper) {
            return Err(ValidationError::InvalidRoutingCode);
        }
        Ok(Self(upper))
    }

    /// Access the canonical (uppercase) value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn masked(&self) -> String {
        mask_tail(&self.0)
    }
}
