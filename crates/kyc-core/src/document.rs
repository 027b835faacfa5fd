//! # Verification Requests
//!
//! The validated request model. Route handlers receive raw optional
//! strings; the constructors here check presence first and format second,
//! so a [`VerificationRequest`] only exists once both have passed.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ValidationError;
use crate::identity::{BankAccountNumber, NationalId, RoutingCode, TaxId};

/// The three document families the gateway verifies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    NationalId,
    TaxId,
    BankAccount,
}

impl DocumentType {
    /// Every document type, in display order.
    pub const ALL: [DocumentType; 3] = [Self::NationalId, Self::TaxId, Self::BankAccount];

    /// Stable snake_case name (matches the serde representation).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NationalId => "national_id",
            Self::TaxId => "tax_id",
            Self::BankAccount => "bank_account",
        }
    }

    /// Human-readable label for dashboards.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NationalId => "National ID",
            Self::TaxId => "Tax ID",
            Self::BankAccount => "Bank Account",
        }
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated identity document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Document {
    NationalId(NationalId),
    TaxId(TaxId),
    BankAccount {
        account_number: BankAccountNumber,
        routing_code: RoutingCode,
    },
}

impl Document {
    pub fn document_type(&self) -> DocumentType {
        match self {
            Self::NationalId(_) => DocumentType::NationalId,
            Self::TaxId(_) => DocumentType::TaxId,
            Self::BankAccount { .. } => DocumentType::BankAccount,
        }
    }

    /// JSON body forwarded to the provider. Keys mirror the inbound API.
    pub fn provider_body(&self) -> Value {
        match self {
            Self::NationalId(id) => json!({ "id_number": id.as_str() }),
            Self::TaxId(id) => json!({ "tax_id": id.as_str() }),
            Self::BankAccount {
                account_number,
                routing_code,
            } => json!({
                "account_number": account_number.as_str(),
                "routing_code": routing_code.as_str(),
            }),
        }
    }

    /// The unmasked identifier values sent to the provider. Used to scrub
    /// provider echoes before logging.
    pub fn raw_values(&self) -> Vec<&str> {
        match self {
            Self::NationalId(id) => vec![id.as_str()],
            Self::TaxId(id) => vec![id.as_str()],
            Self::BankAccount {
                account_number,
                routing_code,
            } => vec![account_number.as_str(), routing_code.as_str()],
        }
    }

    /// Masked one-line description for audit entries and logs.
    pub fn masked_detail(&self) -> String {
        match self {
            Self::NationalId(id) => format!("National ID {}", id.masked()),
            Self::TaxId(id) => format!("Tax ID {}", id.masked()),
            Self::BankAccount {
                account_number,
                routing_code,
            } => format!(
                "Account {} / Routing {}",
                account_number.masked(),
                routing_code.masked()
            ),
        }
    }
}

/// A fully validated verification request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationRequest {
    pub document: Document,
    pub requester_id: String,
}

impl VerificationRequest {
    /// Build a national-ID request from raw fields.
    ///
    /// # Errors
    ///
    /// [`ValidationError::MissingFields`] if any field is absent or blank,
    /// otherwise the format error of the first invalid field.
    pub fn national_id(
        id_number: Option<String>,
        requester_id: Option<String>,
    ) -> Result<Self, ValidationError> {
        let [id_number, requester_id] =
            require([("id_number", id_number), ("requester_id", requester_id)])?;
        Ok(Self {
            document: Document::NationalId(NationalId::new(id_number)?),
            requester_id,
        })
    }

    /// Build a tax-ID request from raw fields.
    ///
    /// # Errors
    ///
    /// As for [`VerificationRequest::national_id`].
    pub fn tax_id(
        tax_id: Option<String>,
        requester_id: Option<String>,
    ) -> Result<Self, ValidationError> {
        let [tax_id, requester_id] =
            require([("tax_id", tax_id), ("requester_id", requester_id)])?;
        Ok(Self {
            document: Document::TaxId(TaxId::new(tax_id)?),
            requester_id,
        })
    }

    /// Build a bank-account request from raw fields. The account number is
    /// checked before the routing code.
    ///
    /// # Errors
    ///
    /// As for [`VerificationRequest::national_id`].
    pub fn bank_account(
        account_number: Option<String>,
        routing_code: Option<String>,
        requester_id: Option<String>,
    ) -> Result<Self, ValidationError> {
        let [account_number, routing_code, requester_id] = require([
            ("account_number", account_number),
            ("routing_code", routing_code),
            ("requester_id", requester_id),
        ])?;
        Ok(Self {
            document: Document::BankAccount {
                account_number: BankAccountNumber::new(account_number)?,
                routing_code: RoutingCode::new(routing_code)?,
            },
            requester_id,
        })
    }

    pub fn document_type(&self) -> DocumentType {
        self.document.document_type()
    }
}

/// Check that every field is present and non-blank, collecting all missing
/// names into one error. Requester IDs are trimmed; document values are
/// passed through untouched for their own validators.
fn require<const N: usize>(
    fields: [(&'static str, Option<String>); N],
) -> Result<[String; N], ValidationError> {
    let missing: Vec<&'static str> = fields
        .iter()
        .filter(|(_, v)| v.as_deref().map_or(true, |s| s.trim().is_empty()))
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }
    Ok(fields.map(|(name, v)| {
        let v = v.unwrap_or_default();
        if name == "requester_id" {
            v.trim().to_string()
        } else {
            v
        }
    }))
}
