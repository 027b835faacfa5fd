//! # kyc-api — Axum API Service for the KYC Gateway
//!
//! Accepts identity documents, checks their format, relays them to the
//! verification provider under a fresh signed credential, and keeps a
//! masked audit trail of every attempt.
//!
//! ## API Surface
//!
//! | Path                     | Module                   | Rate limited |
//! |--------------------------|--------------------------|--------------|
//! | `POST /validate-*`       | [`routes::verify`]       | yes          |
//! | `GET /health`            | [`routes::health`]       | no           |
//! | `GET /`, `GET /api/stats`| [`routes::dashboard`]    | no           |
//! | `GET /openapi.json`      | [`openapi`]              | no           |
//!
//! ## Middleware Stack (execution order)
//!
//! ```text
//! CatchPanic → CORS → TraceLayer → [RateLimit → verification handlers]
//! ```

pub mod audit;
pub mod error;
pub mod extractors;
pub mod gateway;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use std::any::Any;

use axum::http::{HeaderValue, Method, Uri};
use axum::middleware::from_fn;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Router};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::error::AppError;
use crate::state::{AppConfig, AppState};

/// Assemble the full application router with all routes and middleware.
///
/// Only the verification routes sit behind the rate limiter. Serve with
/// `into_make_service_with_connect_info::<SocketAddr>()` so the limiter
/// can see client addresses.
pub fn app(state: AppState) -> Router {
    let verification = routes::verify::router()
        .layer(from_fn(middleware::rate_limit::rate_limit_middleware))
        .layer(Extension(state.limiter.clone()));

    Router::new()
        .merge(verification)
        .merge(routes::health::router())
        .merge(routes::dashboard::router())
        .merge(openapi::router())
        .fallback(not_found)
        .layer(middleware::tracing_layer::layer())
        .layer(cors_layer(&state.config))
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound(format!("route {}", uri.path()))
}

fn handle_panic(_err: Box<dyn Any + Send + 'static>) -> Response {
    tracing::error!("request handler panicked");
    AppError::Internal("handler panicked".to_string()).into_response()
}

/// CORS from `ALLOWED_ORIGINS`; permissive when unset or `*`.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins = match &config.allowed_origins {
        Some(origins) if !origins.iter().any(|o| o.trim() == "*") => origins,
        _ => return CorsLayer::permissive(),
    };

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE])
}
