//! # API Route Modules
//!
//! - `verify`: the three document verification endpoints (rate limited).
//! - `health`: liveness probe.
//! - `dashboard`: HTML dashboard and the JSON stats snapshot.

pub mod dashboard;
pub mod health;
pub mod verify;
