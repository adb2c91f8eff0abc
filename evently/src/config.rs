//! Tunables for [`crate::EventQueryService`].

use std::time::Duration;

/// Runtime configuration of the event query service
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// How long a campaign read from the store stays in the cache
    pub campaign_cache_ttl: Duration,

    /// Upper bound on a single operation, store round-trips included.
    /// `None` lets operations run until the caller drops them.
    pub request_timeout: Option<Duration>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            campaign_cache_ttl: DEFAULT_CAMPAIGN_CACHE_TTL,
            request_timeout: None,
        }
    }
}

/// Default lifetime of a cached campaign
///
/// Campaigns never change once created, so the only cost of a long TTL is
/// memory held by campaigns nobody links events to anymore.
pub const DEFAULT_CAMPAIGN_CACHE_TTL: Duration = evently_store::DEFAULT_CAMPAIGN_TTL;

/// Configuration builder for [`ServiceConfig`]
#[derive(Debug)]
pub struct ConfigBuilder {
    config: ServiceConfig,
}

impl ConfigBuilder {
    /// Create a new configuration builder with default values
    pub fn new() -> Self {
        Self {
            config: ServiceConfig::default(),
        }
    }

    /// Set the campaign cache TTL
    pub fn campaign_cache_ttl(mut self, ttl: Duration) -> Self {
        self.config.campaign_cache_ttl = ttl;
        self
    }

    /// Bound every operation by `timeout`
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> ServiceConfig {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
