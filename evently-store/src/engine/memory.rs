use async_trait::async_trait;
use evently_query::Predicate;
use parking_lot::RwLock;
use std::{collections::HashSet, sync::Arc};

use crate::{
    engine::{unique_keys, Engine},
    error::{Result, StoreError},
    model::{Campaign, CampaignEvent, Event, NewCampaign, NewEvent, User},
    store::Store,
};

#[derive(Debug, Default)]
struct Tables {
    events: Vec<Event>,
    campaigns: Vec<Campaign>,
    campaign_events: Vec<CampaignEvent>,
    users: Vec<User>,
}

/// Engine keeping every table in process memory. Rows are appended, so each
/// table stays ordered by id.
#[derive(Debug, Clone, Default)]
pub struct Memory(Arc<RwLock<Tables>>);

pub struct MemoryStore;

impl MemoryStore {
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> Store {
        Store::new(Memory::default())
    }
}

fn next_id(len: usize) -> i64 {
    len as i64 + 1
}

#[async_trait]
impl Engine for Memory {
    async fn create_event(&self, event: NewEvent) -> Result<Event> {
        unique_keys(&event.properties)?;

        let mut tables = self.0.write();

        if !tables.users.iter().any(|u| u.id == event.user_id) {
            return Err(StoreError::MissingReference("user", event.user_id));
        }

        let event = event.into_event(next_id(tables.events.len()));
        tables.events.push(event.clone());

        Ok(event)
    }

    async fn find_events_by_name(&self, name: &str) -> Result<Vec<Event>> {
        Ok(self
            .0
            .read()
            .events
            .iter()
            .filter(|e| e.name == name)
            .cloned()
            .collect())
    }

    async fn find_events_by_ids(&self, ids: &[i64]) -> Result<Vec<Event>> {
        let ids: HashSet<&i64> = ids.iter().collect();

        Ok(self
            .0
            .read()
            .events
            .iter()
            .filter(|e| ids.contains(&e.id))
            .cloned()
            .collect())
    }

    async fn search_events(&self, predicate: &Predicate) -> Result<Vec<Event>> {
        Ok(self
            .0
            .read()
            .events
            .iter()
            .filter(|e| predicate.matches(&e.name, &e.properties))
            .cloned()
            .collect())
    }

    async fn create_campaign(&self, campaign: NewCampaign) -> Result<Campaign> {
        unique_keys(&campaign.properties)?;

        let mut tables = self.0.write();

        if tables.campaigns.iter().any(|c| c.name == campaign.name) {
            return Err(StoreError::CampaignExists(campaign.name));
        }

        let campaign = campaign.into_campaign(next_id(tables.campaigns.len()));
        tables.campaigns.push(campaign.clone());

        Ok(campaign)
    }

    async fn find_campaign_by_name(&self, name: &str) -> Result<Option<Campaign>> {
        Ok(self
            .0
            .read()
            .campaigns
            .iter()
            .find(|c| c.name == name)
            .cloned())
    }

    async fn campaign_exists_by_name(&self, name: &str) -> Result<bool> {
        Ok(self.0.read().campaigns.iter().any(|c| c.name == name))
    }

    async fn create_campaign_event(
        &self,
        campaign_id: i64,
        event_id: i64,
    ) -> Result<CampaignEvent> {
        let mut tables = self.0.write();

        if !tables.campaigns.iter().any(|c| c.id == campaign_id) {
            return Err(StoreError::MissingReference("campaign", campaign_id));
        }

        if !tables.events.iter().any(|e| e.id == event_id) {
            return Err(StoreError::MissingReference("event", event_id));
        }

        let link = CampaignEvent {
            id: next_id(tables.campaign_events.len()),
            campaign_id,
            event_id,
            created_at: chrono::Utc::now(),
        };
        tables.campaign_events.push(link.clone());

        Ok(link)
    }

    async fn find_campaign_events(&self, campaign_id: i64) -> Result<Vec<CampaignEvent>> {
        Ok(self
            .0
            .read()
            .campaign_events
            .iter()
            .filter(|l| l.campaign_id == campaign_id)
            .cloned()
            .collect())
    }

    async fn create_user(&self, external_id: &str) -> Result<User> {
        let mut tables = self.0.write();

        if tables.users.iter().any(|u| u.external_id == external_id) {
            return Err(StoreError::UserExists(external_id.to_owned()));
        }

        let user = User {
            id: next_id(tables.users.len()),
            external_id: external_id.to_owned(),
        };
        tables.users.push(user.clone());

        Ok(user)
    }

    async fn find_user_by_external_id(&self, external_id: &str) -> Result<Option<User>> {
        Ok(self
            .0
            .read()
            .users
            .iter()
            .find(|u| u.external_id == external_id)
            .cloned())
    }

    async fn find_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>> {
        let ids: HashSet<&i64> = ids.iter().collect();

        Ok(self
            .0
            .read()
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }
}
