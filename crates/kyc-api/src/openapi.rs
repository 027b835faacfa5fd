//! # OpenAPI Specification Assembly
//!
//! Assembles all utoipa-documented routes into a single OpenAPI spec,
//! served at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;

use crate::state::AppState;

/// Assembled OpenAPI spec for the entire API surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "KYC Gateway API",
        version = "0.1.0",
        description = "Validates identity documents and relays them to the KYC verification provider.",
        license(name = "BUSL-1.1")
    ),
    paths(
        crate::routes::verify::validate_national_id,
        crate::routes::verify::validate_tax_id,
        crate::routes::verify::validate_bank,
        crate::routes::health::health,
        crate::routes::dashboard::stats,
    ),
    components(schemas(
        crate::routes::verify::NationalIdInput,
        crate::routes::verify::TaxIdInput,
        crate::routes::verify::BankAccountInput,
        crate::routes::verify::VerificationResponse,
        crate::routes::health::HealthResponse,
        crate::audit::StatsSnapshot,
        crate::audit::Counters,
        crate::audit::AuditEntry,
        crate::error::ErrorBody,
    )),
    tags(
        (name = "verification", description = "Document verification"),
        (name = "health", description = "Liveness"),
        (name = "dashboard", description = "Audit snapshot"),
    )
)]
pub struct ApiDoc;

/// Router serving the OpenAPI document.
pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_lists_every_route() {
        let spec = ApiDoc::openapi();
        let paths: Vec<&String> = spec.paths.paths.keys().collect();
        for expected in [
            "/validate-national-id",
            "/validate-tax-id",
            "/validate-bank",
            "/health",
            "/api/stats",
        ] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {expected} in {paths:?}"
            );
        }
    }
}
