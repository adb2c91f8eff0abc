use std::future::Future;

use evently_store::{Cache, CachedCampaigns, Store, StoreError};
use tracing::error;

use crate::{
    config::ServiceConfig,
    error::{Result, ServiceError},
};

/// Entry point of the core: ingests events, links them to campaigns and
/// answers property-filtered searches.
///
/// Cheap to clone; clones share the store and the campaign cache.
#[derive(Clone)]
pub struct EventQueryService {
    pub(crate) store: Store,
    pub(crate) campaigns: CachedCampaigns,
    pub(crate) config: ServiceConfig,
}

impl EventQueryService {
    pub fn new<C: Cache + 'static>(store: Store, cache: C) -> Self {
        Self::with_config(store, cache, ServiceConfig::default())
    }

    pub fn with_config<C: Cache + 'static>(store: Store, cache: C, config: ServiceConfig) -> Self {
        let campaigns =
            CachedCampaigns::new(store.clone(), cache).with_ttl(config.campaign_cache_ttl);

        Self {
            store,
            campaigns,
            config,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Runs `fut` under the configured request timeout, if any.
    pub(crate) async fn with_deadline<T>(&self, fut: impl Future<Output = Result<T>>) -> Result<T> {
        let Some(timeout) = self.config.request_timeout else {
            return fut.await;
        };

        tokio::time::timeout(timeout, fut)
            .await
            .map_err(|_| ServiceError::DeadlineExceeded)?
    }
}

/// What a failing store call was about, logged next to the error.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Subject<'a> {
    ExternalId(&'a str),
    EventName(&'a str),
    CampaignName(&'a str),
}

/// Logs a store failure on the critical path and classifies it.
pub(crate) fn store_failure<'a>(
    operation: &'static str,
    subject: Subject<'a>,
) -> impl FnOnce(StoreError) -> ServiceError + 'a {
    move |err| {
        let err = ServiceError::from(err);

        if let ServiceError::Internal(source) = &err {
            match subject {
                Subject::ExternalId(external_id) => {
                    error!(operation, external_id, error = %source, "store failure")
                }
                Subject::EventName(event_name) => {
                    error!(operation, event_name, error = %source, "store failure")
                }
                Subject::CampaignName(campaign_name) => {
                    error!(operation, campaign_name, error = %source, "store failure")
                }
            }
        }

        err
    }
}
