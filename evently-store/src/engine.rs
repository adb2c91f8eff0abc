use async_trait::async_trait;
use dyn_clone::DynClone;
use evently_query::{Predicate, PropertyBag};

use crate::{
    error::{Result, StoreError},
    model::{Campaign, CampaignEvent, Event, NewCampaign, NewEvent, User},
};

#[cfg(feature = "memory")]
mod memory;
#[cfg(feature = "pg")]
mod pg;

#[cfg(feature = "memory")]
pub use memory::*;
#[cfg(feature = "pg")]
pub use pg::*;

/// Durable storage for events, campaigns, campaign links and users.
///
/// Ids are assigned by the engine and increase monotonically per table.
/// Every list result is ordered by id. Property bags with a repeated key are
/// refused with [`StoreError::DuplicatePropertyKey`], so stored bags are
/// unique-keyed.
#[async_trait]
pub trait Engine: DynClone + Send + Sync {
    async fn create_event(&self, event: NewEvent) -> Result<Event>;

    async fn find_events_by_name(&self, name: &str) -> Result<Vec<Event>>;

    async fn find_events_by_ids(&self, ids: &[i64]) -> Result<Vec<Event>>;

    async fn search_events(&self, predicate: &Predicate) -> Result<Vec<Event>>;

    /// Fails with [`crate::StoreError::CampaignExists`] when the name is taken.
    async fn create_campaign(&self, campaign: NewCampaign) -> Result<Campaign>;

    async fn find_campaign_by_name(&self, name: &str) -> Result<Option<Campaign>>;

    async fn campaign_exists_by_name(&self, name: &str) -> Result<bool>;

    async fn create_campaign_event(&self, campaign_id: i64, event_id: i64)
        -> Result<CampaignEvent>;

    async fn find_campaign_events(&self, campaign_id: i64) -> Result<Vec<CampaignEvent>>;

    async fn create_user(&self, external_id: &str) -> Result<User>;

    async fn find_user_by_external_id(&self, external_id: &str) -> Result<Option<User>>;

    async fn find_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>>;
}

dyn_clone::clone_trait_object!(Engine);

pub(crate) fn unique_keys(properties: &PropertyBag) -> Result<()> {
    match properties.duplicate_key() {
        Some(key) => Err(StoreError::DuplicatePropertyKey(key.to_owned())),
        None => Ok(()),
    }
}
