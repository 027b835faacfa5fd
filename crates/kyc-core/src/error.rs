//! # Error Hierarchy
//!
//! Validation errors for identity document input, built with `thiserror`.
//!
//! Messages name the field and the expected format. They never echo the
//! rejected value: a malformed national ID is still somebody's national ID.

use thiserror::Error;

/// Validation errors raised before any credential is issued or any
/// outbound call is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A mandatory field was absent or blank.
    #[error("missing required field(s): {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// National ID is not exactly 12 digits.
    #[error("invalid national ID format (expected exactly 12 digits)")]
    InvalidNationalId,

    /// Tax ID does not match 5 letters, 4 digits, 1 letter.
    #[error("invalid tax ID format (expected 5 letters, 4 digits, 1 letter, e.g. ABCDE1234F)")]
    InvalidTaxId,

    /// Bank account number is not 9 to 18 digits.
    #[error("invalid bank account number (expected 9 to 18 digits)")]
    InvalidBankAccount,

    /// Routing code does not match 4 letters, `0`, 6 alphanumerics.
    #[error("invalid routing code format (expected 4 letters, the digit 0, then 6 letters or digits, e.g. ABCD0123456)")]
    InvalidRoutingCode,
}

impl ValidationError {
    /// Machine-readable code for API error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingFields(_) => "MISSING_FIELDS",
            Self::InvalidNationalId
            | Self::InvalidTaxId
            | Self::InvalidBankAccount
            | Self::InvalidRoutingCode => "INVALID_FORMAT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_lists_every_field() {
        let err = ValidationError::MissingFields(vec!["id_number", "requester_id"]);
        assert_eq!(
            err.to_string(),
            "missing required field(s): id_number, requester_id"
        );
        assert_eq!(err.code(), "MISSING_FIELDS");
    }

    #[test]
    fn format_errors_name_expected_format() {
        assert!(ValidationError::InvalidNationalId.to_string().contains("12 digits"));
        assert!(ValidationError::InvalidTaxId.to_string().contains("ABCDE1234F"));
        assert!(ValidationError::InvalidBankAccount.to_string().contains("9 to 18"));
        assert!(ValidationError::InvalidRoutingCode.to_string().contains("ABCD0123456"));
        assert_eq!(ValidationError::InvalidTaxId.code(), "INVALID_FORMAT");
    }
}
