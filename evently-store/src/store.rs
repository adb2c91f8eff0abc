use evently_query::Predicate;

use crate::{
    engine::Engine,
    error::Result,
    model::{Campaign, CampaignEvent, Event, NewCampaign, NewEvent, User},
};

/// Cloneable handle over an [`Engine`].
#[derive(Clone)]
pub struct Store {
    pub(crate) engine: Box<dyn Engine>,
}

impl Store {
    pub fn new<E: Engine + 'static>(engine: E) -> Self {
        Self {
            engine: Box::new(engine),
        }
    }

    pub async fn create_event(&self, event: NewEvent) -> Result<Event> {
        self.engine.create_event(event).await
    }

    pub async fn find_events_by_name(&self, name: impl AsRef<str>) -> Result<Vec<Event>> {
        self.engine.find_events_by_name(name.as_ref()).await
    }

    pub async fn find_events_by_ids(&self, ids: &[i64]) -> Result<Vec<Event>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        self.engine.find_events_by_ids(ids).await
    }

    pub async fn search_events(&self, predicate: &Predicate) -> Result<Vec<Event>> {
        self.engine.search_events(predicate).await
    }

    pub async fn create_campaign(&self, campaign: NewCampaign) -> Result<Campaign> {
        self.engine.create_campaign(campaign).await
    }

    pub async fn find_campaign_by_name(&self, name: impl AsRef<str>) -> Result<Option<Campaign>> {
        self.engine.find_campaign_by_name(name.as_ref()).await
    }

    pub async fn campaign_exists_by_name(&self, name: impl AsRef<str>) -> Result<bool> {
        self.engine.campaign_exists_by_name(name.as_ref()).await
    }

    pub async fn create_campaign_event(
        &self,
        campaign_id: i64,
        event_id: i64,
    ) -> Result<CampaignEvent> {
        self.engine
            .create_campaign_event(campaign_id, event_id)
            .await
    }

    pub async fn find_campaign_events(&self, campaign_id: i64) -> Result<Vec<CampaignEvent>> {
        self.engine.find_campaign_events(campaign_id).await
    }

    pub async fn create_user(&self, external_id: impl AsRef<str>) -> Result<User> {
        self.engine.create_user(external_id.as_ref()).await
    }

    pub async fn find_user_by_external_id(
        &self,
        external_id: impl AsRef<str>,
    ) -> Result<Option<User>> {
        self.engine
            .find_user_by_external_id(external_id.as_ref())
            .await
    }

    pub async fn find_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        self.engine.find_users_by_ids(ids).await
    }
}
