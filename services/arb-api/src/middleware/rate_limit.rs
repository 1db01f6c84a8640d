//! Rate limiting middleware
//!
//! Fixed-window counters per client address and path.

use axum::{
    body::Body,
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::errors::ApiError;
use crate::observability::metrics;
use crate::AppState;

#[derive(Debug, Clone)]
struct RateLimitBucket {
    requests: u32,
    window_start: Instant,
}

const CLEANUP_INTERVAL_SECS: u64 = 60;

/// In-memory rate limiter (per-process, not distributed)
#[derive(Clone)]
pub struct RateLimiter {
    buckets: Arc<RwLock<HashMap<String, RateLimitBucket>>>,
    window: Duration,
    max_requests: u32,
    last_cleanup: Arc<RwLock<Instant>>,
}

impl RateLimiter {
    pub fn new(window_secs: u64, max_requests: u32) -> Self {
        Self {
            buckets: Arc::new(RwLock::new(HashMap::new())),
            window: Duration::from_secs(window_secs),
            max_requests,
            last_cleanup: Arc::new(RwLock::new(Instant::now())),
        }
    }

    /// Count one request against `key`; false once the window is exhausted
    pub async fn check(&self, key: &str) -> bool {
        let mut buckets = self.buckets.write().await;
        let now = Instant::now();

        let should_cleanup = {
            let last = self.last_cleanup.read().await;
            now.duration_since(*last) >= Duration::from_secs(CLEANUP_INTERVAL_SECS)
        };
        if should_cleanup {
            let before = buckets.len();
            buckets.retain(|_, bucket| now.duration_since(bucket.window_start) < self.window);
            let evicted = before.saturating_sub(buckets.len());
            if evicted > 0 {
                tracing::debug!("Rate limiter: evicted {} expired buckets", evicted);
            }
            *self.last_cleanup.write().await = now;
        }

        let bucket = buckets.entry(key.to_string()).or_insert(RateLimitBucket {
            requests: 0,
            window_start: now,
        });
        if now.duration_since(bucket.window_start) >= self.window {
            bucket.requests = 0;
            bucket.window_start = now;
        }
        if bucket.requests < self.max_requests {
            bucket.requests += 1;
            true
        } else {
            false
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(60, 60)
    }
}

pub async fn rate_limit_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let client = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    let key = format!("{}:{}", client, request.uri().path());

    if !state.rate_limiter.check(&key).await {
        state.metrics.increment(metrics::RATE_LIMITED, 1).await;
        return Err(ApiError::RateLimited);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_limit_per_key() {
        let limiter = RateLimiter::new(60, 2);
        assert!(limiter.check("1.2.3.4:/me").await);
        assert!(limiter.check("1.2.3.4:/me").await);
        assert!(!limiter.check("1.2.3.4:/me").await);
        assert!(limiter.check("1.2.3.4:/ops").await);
        assert!(limiter.check("5.6.7.8:/me").await);
    }

    #[tokio::test]
    async fn test_window_resets() {
        let limiter = RateLimiter::new(0, 1);
        assert!(limiter.check("k").await);
        assert!(limiter.check("k").await);
    }
}
