use std::time::Duration;
use tracing::{debug, warn};

use crate::{
    cache::{campaign_cache_key, Cache},
    error::Result,
    model::{Campaign, NewCampaign},
    store::Store,
};

/// How long a campaign stays cached after a read miss or a create.
pub const DEFAULT_CAMPAIGN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Cache-aside reader and write-through creator for campaigns, keyed by
/// campaign name.
///
/// Cache failures never surface: reads fall back to the store and writes to
/// the cache are best effort. Campaigns are immutable once created, so
/// concurrent misses that both repopulate the same key are harmless.
#[derive(Clone)]
pub struct CachedCampaigns {
    store: Store,
    cache: Box<dyn Cache>,
    ttl: Duration,
}

impl CachedCampaigns {
    pub fn new<C: Cache + 'static>(store: Store, cache: C) -> Self {
        Self {
            store,
            cache: Box::new(cache),
            ttl: DEFAULT_CAMPAIGN_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<Campaign>> {
        let key = campaign_cache_key("name", name);

        match self.cache.get(&key).await {
            Ok(Some(value)) => match serde_json::from_str::<Campaign>(&value) {
                Ok(campaign) => {
                    debug!(key = %key, "campaign cache hit");
                    return Ok(Some(campaign));
                }
                Err(err) => warn!(key = %key, error = %err, "undecodable cached campaign"),
            },
            Ok(None) => debug!(key = %key, "campaign cache miss"),
            Err(err) => warn!(key = %key, error = %err, "campaign cache read failed"),
        }

        let Some(campaign) = self.store.find_campaign_by_name(name).await? else {
            return Ok(None);
        };

        self.populate(&key, &campaign).await;

        Ok(Some(campaign))
    }

    /// Writes to the store first; only a stored campaign is cached.
    pub async fn create(&self, campaign: NewCampaign) -> Result<Campaign> {
        let campaign = self.store.create_campaign(campaign).await?;

        self.populate(&campaign_cache_key("name", &campaign.name), &campaign)
            .await;

        Ok(campaign)
    }

    /// Always answered by the store.
    pub async fn exists_by_name(&self, name: &str) -> Result<bool> {
        self.store.campaign_exists_by_name(name).await
    }

    async fn populate(&self, key: &str, campaign: &Campaign) {
        let value = match serde_json::to_string(campaign) {
            Ok(value) => value,
            Err(err) => {
                warn!(key = %key, error = %err, "failed to encode campaign for cache");
                return;
            }
        };

        if let Err(err) = self.cache.set(key, value, self.ttl).await {
            warn!(key = %key, error = %err, "campaign cache write failed");
        }
    }
}
