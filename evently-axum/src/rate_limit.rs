//! Per-client token bucket rate limiting

use std::{
    collections::HashMap,
    net::SocketAddr,
    time::{Duration, Instant},
};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use parking_lot::RwLock;

use crate::{error::ApiError, AppState};

/// Rate limit config
#[derive(Debug, Clone, Copy)]
pub struct RateLimitConfig {
    /// Tokens added to a bucket per second
    pub requests_per_second: u32,
    /// Bucket capacity, the largest burst a client can send
    pub burst: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 100,
            burst: 200,
        }
    }
}

/// Token buckets keyed by client. Built once at startup and shared through
/// [`AppState`].
#[derive(Debug)]
pub struct RateLimiter {
    buckets: RwLock<HashMap<String, TokenBucket>>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            buckets: RwLock::new(HashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> RateLimitConfig {
        self.config
    }

    /// Takes one token from `key`'s bucket.
    pub fn check(&self, key: &str) -> RateLimitResult {
        let mut buckets = self.buckets.write();

        let bucket = buckets
            .entry(key.to_owned())
            .or_insert_with(|| TokenBucket::new(self.config));

        bucket.try_acquire(self.config)
    }

    /// Drops buckets untouched for `max_idle`. A dropped bucket comes back full.
    pub fn purge_idle(&self, max_idle: Duration) {
        let now = Instant::now();

        self.buckets
            .write()
            .retain(|_, bucket| now.duration_since(bucket.last_refill) < max_idle);
    }

    pub fn len(&self) -> usize {
        self.buckets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.read().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RateLimitResult {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

#[derive(Debug)]
struct TokenBucket {
    available: f64,
    last_refill: Instant,
}

impl TokenBucket {
    fn new(config: RateLimitConfig) -> Self {
        Self {
            available: f64::from(config.burst),
            last_refill: Instant::now(),
        }
    }

    fn try_acquire(&mut self, config: RateLimitConfig) -> RateLimitResult {
        self.refill(config);

        if self.available >= 1.0 {
            self.available -= 1.0;
            return RateLimitResult::Allowed {
                remaining: self.available as u32,
            };
        }

        let rate = f64::from(config.requests_per_second.max(1));

        RateLimitResult::Limited {
            retry_after: Duration::from_secs_f64((1.0 - self.available) / rate),
        }
    }

    fn refill(&mut self, config: RateLimitConfig) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();

        self.available = (self.available + elapsed * f64::from(config.requests_per_second))
            .min(f64::from(config.burst));
        self.last_refill = now;
    }
}

/// Client identity: first `X-Forwarded-For` hop, else the peer address.
pub fn client_key(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
        .or_else(|| peer.map(|addr| addr.ip().to_string()))
        .unwrap_or_else(|| "unknown".to_owned())
}

pub async fn rate_limit(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let key = client_key(req.headers(), peer);

    match state.limiter.check(&key) {
        RateLimitResult::Allowed { .. } => next.run(req).await,
        RateLimitResult::Limited { retry_after } => {
            tracing::debug!(client = %key, "rate limited");
            ApiError::RateLimited { retry_after }.into_response()
        }
    }
}
