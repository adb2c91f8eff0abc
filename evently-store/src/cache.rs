use async_trait::async_trait;
use dyn_clone::DynClone;
use moka::{future::Cache as MokaCache, Expiry};
use std::time::{Duration, Instant};

use crate::error::CacheError;

/// String-keyed cache holding serialized values. Implementations synchronize
/// internally; every operation is atomic per key.
#[async_trait]
pub trait Cache: DynClone + Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

dyn_clone::clone_trait_object!(Cache);

/// `campaign:{field}:{value}`
pub fn campaign_cache_key(field: &str, value: &str) -> String {
    format!("campaign:{field}:{value}")
}

/// Entries beyond this capacity are evicted least recently used first.
pub const DEFAULT_CACHE_CAPACITY: u64 = 65_536;

/// Longest lifetime an entry can get; longer ttls are clamped to it.
pub const MAX_ENTRY_TTL: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    ttl: Duration,
}

/// Expires each entry after the ttl it was last written with.
struct EntryTtl;

impl Expiry<String, Entry> for EntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// Process-local cache with per-entry expiry, bounded in size.
#[derive(Clone)]
pub struct MemoryCache(MokaCache<String, Entry>);

impl MemoryCache {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    pub fn with_capacity(capacity: u64) -> Self {
        Self(
            MokaCache::builder()
                .max_capacity(capacity)
                .expire_after(EntryTtl)
                .build(),
        )
    }

    /// Live entries, once pending evictions have been applied.
    pub async fn len(&self) -> u64 {
        self.0.run_pending_tasks().await;
        self.0.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryCache")
            .field("entries", &self.0.entry_count())
            .finish()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.0.get(key).await.map(|entry| entry.value))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let ttl = ttl.min(MAX_ENTRY_TTL);
        self.0.insert(key.to_owned(), Entry { value, ttl }).await;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        self.0.invalidate(key).await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_format() {
        assert_eq!(
            campaign_cache_key("name", "summer-sale"),
            "campaign:name:summer-sale"
        );
        assert_eq!(campaign_cache_key("id", "42"), "campaign:id:42");
    }

    #[tokio::test]
    async fn set_get_delete() {
        let cache = MemoryCache::new();

        assert_eq!(cache.get("k").await.unwrap(), None);

        cache
            .set("k", "v".to_owned(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some("v".to_owned()));

        cache
            .set("k", "w".to_owned(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get("k").await.unwrap(), Some("w".to_owned()));

        cache.delete("k").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn entries_expire_after_their_own_ttl() {
        let cache = MemoryCache::new();

        cache
            .set("short", "v".to_owned(), Duration::from_millis(20))
            .await
            .unwrap();
        cache
            .set("long", "v".to_owned(), Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(cache.get("short").await.unwrap(), None);
        assert_eq!(cache.get("long").await.unwrap(), Some("v".to_owned()));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn rewrite_takes_the_new_ttl() {
        let cache = MemoryCache::new();

        cache
            .set("k", "v".to_owned(), Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .set("k", "w".to_owned(), Duration::from_millis(20))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(80)).await;

        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn huge_ttl_is_clamped() {
        let cache = MemoryCache::new();

        cache
            .set("k", "v".to_owned(), Duration::from_secs(u64::MAX))
            .await
            .unwrap();
        cache
            .set("m", "v".to_owned(), Duration::MAX)
            .await
            .unwrap();

        assert_eq!(cache.get("k").await.unwrap(), Some("v".to_owned()));
        assert_eq!(cache.get("m").await.unwrap(), Some("v".to_owned()));
    }
}
