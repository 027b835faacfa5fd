//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Every failure, from a malformed body to a provider outage, leaves the
//! service as the same JSON envelope:
//!
//! ```json
//! { "success": false, "error": "<message>", "code": "<MACHINE_CODE>" }
//! ```
//!
//! Transport and internal failures carry a generic message; their detail
//! goes to the log only.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use kyc_core::ValidationError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Client-visible message for transport failures.
pub const SERVER_ERROR_MESSAGE: &str = "server error";

/// Client-visible message for internal failures.
pub const INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred";

/// Client-visible message for rate-limit rejections.
pub const RATE_LIMIT_MESSAGE: &str = "Too many requests, please try again later";

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Always `false`.
    pub success: bool,
    /// Human-readable error message.
    pub error: String,
    /// Machine-readable error code (e.g., "MISSING_FIELDS", "RATE_LIMITED").
    pub code: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Request body could not be parsed (400).
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Missing or malformed document fields (400).
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Per-address request budget exhausted (429).
    #[error("rate limit exceeded")]
    RateLimited { retry_after_secs: u64 },

    /// Provider answered with a non-2xx status. `status` is already the
    /// status to return.
    #[error("upstream error ({status}): {message}")]
    Upstream { status: StatusCode, message: String },

    /// The provider could not be reached or its reply was unusable (500).
    /// The payload is logged, never returned.
    #[error("transport error: {0}")]
    Transport(String),

    /// No such route (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Internal server error (500). Message is logged but not returned to client.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Return the HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Validation(err) => (StatusCode::BAD_REQUEST, err.code()),
            Self::RateLimited { .. } => (StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED"),
            Self::Upstream { status, .. } => (*status, "UPSTREAM_ERROR"),
            Self::Transport(_) => (StatusCode::INTERNAL_SERVER_ERROR, "SERVER_ERROR"),
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }

    /// Message safe to show the caller.
    fn client_message(&self) -> String {
        match self {
            Self::BadRequest(msg) => msg.clone(),
            Self::Validation(err) => err.to_string(),
            Self::RateLimited { .. } => RATE_LIMIT_MESSAGE.to_string(),
            Self::Upstream { message, .. } => message.clone(),
            Self::Transport(_) => SERVER_ERROR_MESSAGE.to_string(),
            Self::NotFound(what) => format!("{what} not found"),
            Self::Internal(_) => INTERNAL_ERROR_MESSAGE.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::Transport(_) => tracing::error!(error = %self, "provider transport failure"),
            _ => {}
        }

        let body = ErrorBody {
            success: false,
            error: self.client_message(),
            code: code.to_string(),
        };

        let mut response = (status, Json(body)).into_response();
        if let Self::RateLimited { retry_after_secs } = self {
            if let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string()) {
                response.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }
        response
    }
}
