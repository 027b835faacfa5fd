//! # Masking
//!
//! Partial redaction of sensitive values. Everything except the trailing
//! four characters becomes `X`; values of four characters or fewer are
//! masked entirely. Audit entries and log fields only ever carry masked
//! forms.

use serde_json::Value;

/// Number of trailing characters left visible.
pub const VISIBLE_TAIL: usize = 4;

/// JSON object keys whose values are masked by [`mask_json`].
///
/// Matching ignores case, `_` and `-`, so `aadhaar_number`,
/// `aadhaarNumber` and `AADHAAR-NUMBER` are the same key.
pub const SENSITIVE_KEYS: &[&str] = &[
    "id_number",
    "national_id",
    "uid",
    "aadhaar",
    "aadhaar_number",
    "document_number",
    "tax_id",
    "pan",
    "pan_number",
    "account_number",
    "account_no",
    "bank_account",
    "routing_code",
    "ifsc",
    "ifsc_code",
];

/// Mask all but the last [`VISIBLE_TAIL`] characters.
///
/// ```
/// assert_eq!(kyc_core::mask::mask_tail("ABCDE1234F"), "XXXXXX234F");
/// assert_eq!(kyc_core::mask::mask_tail("123"), "XXX");
/// ```
pub fn mask_tail(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    let len = chars.len();
    if len <= VISIBLE_TAIL {
        return "X".repeat(len);
    }
    let hidden = len - VISIBLE_TAIL;
    std::iter::repeat('X')
        .take(hidden)
        .chain(chars[hidden..].iter().copied())
        .collect()
}

/// Mask like [`mask_tail`], then split into dash-separated groups of
/// `group` characters counted from the left.
///
/// ```
/// assert_eq!(kyc_core::mask::mask_grouped("123456789012", 4), "XXXX-XXXX-9012");
/// ```
pub fn mask_grouped(value: &str, group: usize) -> String {
    let masked: Vec<char> = mask_tail(value).chars().collect();
    if group == 0 {
        return masked.into_iter().collect();
    }
    masked
        .chunks(group)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("-")
}

/// Return a copy of `value` with every string under a [`SENSITIVE_KEYS`]
/// key masked, at any depth. Non-string values under sensitive keys are
/// replaced by a masked rendering of their JSON text.
pub fn mask_json(value: &Value) -> Value {
    mask_json_with(value, &[])
}

/// As [`mask_json`], and additionally mask every occurrence of each of
/// `secrets` wherever it appears, whatever key it sits under.
///
/// ```
/// use serde_json::json;
/// let masked = kyc_core::mask::mask_json_with(
///     &json!({ "echo": "uid 123456789012 ok" }),
///     &["123456789012"],
/// );
/// assert_eq!(masked["echo"], "uid XXXXXXXX9012 ok");
/// ```
pub fn mask_json_with(value: &Value, secrets: &[&str]) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let masked = if is_sensitive_key(k) {
                        match v {
                            Value::String(s) => Value::String(mask_tail(s)),
                            Value::Null => Value::Null,
                            Value::Object(_) | Value::Array(_) => mask_json_with(v, secrets),
                            other => Value::String(mask_tail(&other.to_string())),
                        }
                    } else {
                        mask_json_with(v, secrets)
                    };
                    (k.clone(), masked)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| mask_json_with(item, secrets))
                .collect(),
        ),
        Value::String(s) => Value::String(redact_secrets(s, secrets)),
        Value::Number(n) => {
            let text = n.to_string();
            if secrets.iter().any(|secret| !secret.is_empty() && text.contains(*secret)) {
                Value::String(redact_secrets(&text, secrets))
            } else {
                value.clone()
            }
        }
        other => other.clone(),
    }
}

fn redact_secrets(text: &str, secrets: &[&str]) -> String {
    secrets
        .iter()
        .filter(|secret| !secret.is_empty())
        .fold(text.to_string(), |acc, secret| {
            acc.replace(*secret, &mask_tail(secret))
        })
}

/// Lowercase with `_` and `-` removed.
fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

fn is_sensitive_key(key: &str) -> bool {
    let key = normalize_key(key);
    SENSITIVE_KEYS
        .iter()
        .any(|candidate| normalize_key(candidate) == key)
}
