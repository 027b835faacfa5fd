//! # Verification Routes
//!
//! | Method | Path | Body |
//! |--------|------|------|
//! | POST | `/validate-national-id` | `{id_number, requester_id}` |
//! | POST | `/validate-tax-id` | `{tax_id, requester_id}` |
//! | POST | `/validate-bank` | `{account_number, routing_code, requester_id}` |
//!
//! Input fields are all optional at the serde level so that an absent field
//! yields the domain's missing-field error rather than a deserializer
//! message. A [`VerificationRequest`] is only built once every field is
//! present and well-formed.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use kyc_core::VerificationRequest;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;
use crate::extractors::extract_json;
use crate::state::AppState;

// -- Request DTOs -------------------------------------------------------------

/// National ID verification input.
#[derive(Deserialize, ToSchema)]
pub struct NationalIdInput {
    #[schema(example = "123456789012")]
    pub id_number: Option<String>,
    #[schema(example = "user-42")]
    pub requester_id: Option<String>,
}

/// Tax ID verification input.
#[derive(Deserialize, ToSchema)]
pub struct TaxIdInput {
    #[schema(example = "ABCDE1234F")]
    pub tax_id: Option<String>,
    #[schema(example = "user-42")]
    pub requester_id: Option<String>,
}

/// Bank account verification input.
#[derive(Deserialize, ToSchema)]
pub struct BankAccountInput {
    #[schema(example = "000123456789")]
    pub account_number: Option<String>,
    #[schema(example = "ABCD0123456")]
    pub routing_code: Option<String>,
    #[schema(example = "user-42")]
    pub requester_id: Option<String>,
}

// -- Response DTOs ------------------------------------------------------------

/// Successful verification: the provider's body, unmodified.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerificationResponse {
    pub success: bool,
    #[schema(value_type = Object)]
    pub data: serde_json::Value,
}

// -- Router -------------------------------------------------------------------

/// Build the verification router. Rate limiting is layered on by the caller.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/validate-national-id", post(validate_national_id))
        .route("/validate-tax-id", post(validate_tax_id))
        .route("/validate-bank", post(validate_bank))
}

// -- Handlers -----------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/validate-national-id",
    request_body = NationalIdInput,
    responses(
        (status = 200, description = "Provider verified the document", body = VerificationResponse),
        (status = 400, description = "Missing or malformed fields", body = crate::error::ErrorBody),
        (status = 429, description = "Rate limit exceeded", body = crate::error::ErrorBody),
        (status = 500, description = "Provider unreachable", body = crate::error::ErrorBody),
    ),
    tag = "verification"
)]
pub(crate) async fn validate_national_id(
    State(state): State<AppState>,
    body: Result<Json<NationalIdInput>, JsonRejection>,
) -> Result<Json<VerificationResponse>, AppError> {
    let input = extract_json(body)?;
    let request = VerificationRequest::national_id(input.id_number, input.requester_id)?;
    run(&state, request).await
}

#[utoipa::path(
    post,
    path = "/validate-tax-id",
    request_body = TaxIdInput,
    responses(
        (status = 200, description = "Provider verified the document", body = VerificationResponse),
        (status = 400, description = "Missing or malformed fields", body = crate::error::ErrorBody),
        (status = 429, description = "Rate limit exceeded", body = crate::error::ErrorBody),
        (status = 500, description = "Provider unreachable", body = crate::error::ErrorBody),
    ),
    tag = "verification"
)]
pub(crate) async fn validate_tax_id(
    State(state): State<AppState>,
    body: Result<Json<TaxIdInput>, JsonRejection>,
) -> Result<Json<VerificationResponse>, AppError> {
    let input = extract_json(body)?;
    let request = VerificationRequest::tax_id(input.tax_id, input.requester_id)?;
    run(&state, request).await
}

#[utoipa::path(
    post,
    path = "/validate-bank",
    request_body = BankAccountInput,
    responses(
        (status = 200, description = "Provider verified the account", body = VerificationResponse),
        (status = 400, description = "Missing or malformed fields", body = crate::error::ErrorBody),
        (status = 429, description = "Rate limit exceeded", body = crate::error::ErrorBody),
        (status = 500, description = "Provider unreachable", body = crate::error::ErrorBody),
    ),
    tag = "verification"
)]
pub(crate) async fn validate_bank(
    State(state): State<AppState>,
    body: Result<Json<BankAccountInput>, JsonRejection>,
) -> Result<Json<VerificationResponse>, AppError> {
    let input = extract_json(body)?;
    let request = VerificationRequest::bank_account(
        input.account_number,
        input.routing_code,
        input.requester_id,
    )?;
    run(&state, request).await
}

async fn run(
    state: &AppState,
    request: VerificationRequest,
) -> Result<Json<VerificationResponse>, AppError> {
    let data = state
        .gateway
        .verify(&request, &state.audit)
        .await
        .into_result()?;
    Ok(Json(VerificationResponse {
        success: true,
        data,
    }))
}
