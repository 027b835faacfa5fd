//! # Per-Address Rate Limiting
//!
//! Fixed-window limiter keyed by client address, applied to the
//! verification routes only. A key's window opens with its first request
//! and the count resets once the window has elapsed.
//!
//! The client address is the socket peer from `ConnectInfo`. Behind a
//! trusted reverse proxy (`TRUST_PROXY=true`) the first `X-Forwarded-For`
//! hop is used instead.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use parking_lot::Mutex;

use crate::error::AppError;

/// Key used when no client address can be determined.
const UNKNOWN_CLIENT: &str = "unknown";

/// Rate limiter configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u64,
    /// Window duration in seconds.
    pub window_secs: u64,
    /// Honour `X-Forwarded-For`.
    pub trust_proxy: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window_secs: 15 * 60,
            trust_proxy: false,
        }
    }
}

impl RateLimitConfig {
    fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed { remaining: u64 },
    Rejected { retry_after: Duration },
}

/// Per-key rate limit state.
#[derive(Debug, Clone)]
struct BucketState {
    count: u64,
    window_start: Instant,
}

#[derive(Debug)]
struct Buckets {
    map: HashMap<String, BucketState>,
    last_prune: Instant,
}

/// Shared rate limiter state.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    buckets: Arc<Mutex<Buckets>>,
    missing_peer_warned: Arc<AtomicBool>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given config.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            buckets: Arc::new(Mutex::new(Buckets {
                map: HashMap::new(),
                last_prune: Instant::now(),
            })),
            missing_peer_warned: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Check and count a request from `key` at the current instant.
    pub fn check(&self, key: &str) -> Admission {
        self.check_at(key, Instant::now())
    }

    /// Check and count a request from `key` as of `now`.
    pub fn check_at(&self, key: &str, now: Instant) -> Admission {
        let window = self.config.window();
        let mut buckets = self.buckets.lock();

        // Drop expired buckets at most once per window.
        if now.saturating_duration_since(buckets.last_prune) >= window {
            buckets
                .map
                .retain(|_, b| now.saturating_duration_since(b.window_start) < window);
            buckets.last_prune = now;
        }

        let bucket = buckets
            .map
            .entry(key.to_string())
            .or_insert(BucketState {
                count: 0,
                window_start: now,
            });

        if now.saturating_duration_since(bucket.window_start) >= window {
            bucket.count = 0;
            bucket.window_start = now;
        }

        if bucket.count >= self.config.max_requests {
            let elapsed = now.saturating_duration_since(bucket.window_start);
            Admission::Rejected {
                retry_after: window.saturating_sub(elapsed),
            }
        } else {
            bucket.count += 1;
            Admission::Allowed {
                remaining: self.config.max_requests - bucket.count,
            }
        }
    }

    /// Number of tracked client keys.
    pub fn tracked_keys(&self) -> usize {
        self.buckets.lock().map.len()
    }

    /// Rate-limit key for a request.
    ///
    /// Without `ConnectInfo` all clients share one bucket; the first such
    /// request logs a warning.
    pub fn client_key(&self, request: &Request) -> String {
        if self.config.trust_proxy {
            if let Some(ip) = forwarded_for(request) {
                return ip;
            }
        }
        match request.extensions().get::<ConnectInfo<SocketAddr>>() {
            Some(ConnectInfo(addr)) => addr.ip().to_string(),
            None => {
                if !self.missing_peer_warned.swap(true, Ordering::Relaxed) {
                    tracing::warn!(
                        "no client address on request; all clients share one rate-limit \
                         bucket (serve with into_make_service_with_connect_info)"
                    );
                }
                UNKNOWN_CLIENT.to_string()
            }
        }
    }
}

/// First hop of `X-Forwarded-For`, if present and non-empty.
fn forwarded_for(request: &Request) -> Option<String> {
    request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
        .map(str::to_string)
}

/// Middleware that enforces per-address rate limits.
///
/// Expects a [`RateLimiter`] in the request extensions; without one every
/// request passes.
pub async fn rate_limit_middleware(request: Request, next: Next) -> Response {
    let limiter = request.extensions().get::<RateLimiter>().cloned();

    if let Some(limiter) = limiter {
        let key = limiter.client_key(&request);
        if let Admission::Rejected { retry_after } = limiter.check(&key) {
            let retry_after_secs = retry_after.as_secs().max(1);
            tracing::warn!(client = %key, retry_after_secs, "rate limit exceeded");
            return AppError::RateLimited { retry_after_secs }.into_response();
        }
    }

    next.run(request).await
}
