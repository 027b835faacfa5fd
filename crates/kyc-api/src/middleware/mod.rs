//! # Middleware
//!
//! - [`rate_limit`]: per-address fixed-window admission control
//! - [`tracing_layer`]: request spans via `tower_http::trace`

pub mod rate_limit;
pub mod tracing_layer;
