use std::{net::SocketAddr, time::Duration};

use clap::Parser;
use evently::{ConfigBuilder, ServiceConfig};

use crate::rate_limit::RateLimitConfig;

/// Default request body limit, 10 MiB
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Parser)]
#[command(name = "evently-server")]
#[command(about = "Event ingestion and property-filtered search over HTTP")]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "EVENTLY_ADDR", default_value = "0.0.0.0:8081")]
    pub addr: SocketAddr,

    /// Postgres connection string. Events are kept in memory when unset.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Upper bound on a single request, in milliseconds
    #[arg(long, env = "EVENTLY_REQUEST_TIMEOUT_MS")]
    pub request_timeout_ms: Option<u64>,

    #[arg(long, env = "EVENTLY_RATE_LIMIT_RPS", default_value_t = 100)]
    pub rate_limit_rps: u32,

    #[arg(long, env = "EVENTLY_RATE_LIMIT_BURST", default_value_t = 200)]
    pub rate_limit_burst: u32,

    #[arg(long, env = "EVENTLY_MAX_BODY_BYTES", default_value_t = DEFAULT_MAX_BODY_BYTES)]
    pub max_body_bytes: usize,

    /// Campaign cache TTL, in seconds. The cache clamps it to ten years.
    #[arg(long, env = "EVENTLY_CACHE_TTL_SECS", default_value_t = 86_400)]
    pub cache_ttl_secs: u64,
}

impl ServerConfig {
    pub fn service_config(&self) -> ServiceConfig {
        let builder =
            ConfigBuilder::new().campaign_cache_ttl(Duration::from_secs(self.cache_ttl_secs));

        match self.request_timeout_ms {
            Some(ms) => builder.request_timeout(Duration::from_millis(ms)).build(),
            None => builder.build(),
        }
    }

    pub fn rate_limit(&self) -> RateLimitConfig {
        RateLimitConfig {
            requests_per_second: self.rate_limit_rps,
            burst: self.rate_limit_burst,
        }
    }
}
