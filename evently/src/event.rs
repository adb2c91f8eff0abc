use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use evently_query::{compile, parse, Predicate};
use evently_store::{Event, NewEvent};
use tracing::{debug, warn};
use validator::Validate;

use crate::{
    dto::{
        CreateEventRequest, CreateEventResponse, EventDto, SearchEventsRequest,
        SearchEventsResponse,
    },
    error::{Result, ServiceError},
    service::{store_failure, EventQueryService, Subject},
};

/// How far event creation got. Every outcome means the event was stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// No campaign was requested.
    Saved,
    LinkedToCampaign,
    CampaignNotFound,
    PropertyMismatch,
    /// The campaign lookup or the link insert failed.
    LinkFailed,
}

impl SaveOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            SaveOutcome::Saved => "Event saved successfully",
            SaveOutcome::LinkedToCampaign => "Event saved with campaign",
            SaveOutcome::CampaignNotFound => "Event saved but not in campaign",
            SaveOutcome::PropertyMismatch => "Campaign properties and Event properties mismatch",
            SaveOutcome::LinkFailed => "Event saved but failed to link with campaign",
        }
    }
}

impl fmt::Display for SaveOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl EventQueryService {
    /// Stores an event for the user known as `external_id`, then tries to
    /// link it to the requested campaign. Linking never fails the call: its
    /// outcome is reported through the response message.
    pub async fn create_event(&self, req: CreateEventRequest) -> Result<CreateEventResponse> {
        req.validate()?;

        self.with_deadline(self.save_event(req)).await
    }

    /// Events named `event_name` whose properties satisfy the `where`
    /// filter, in id order, each paired with its owner's external id.
    pub async fn search_events(&self, req: SearchEventsRequest) -> Result<SearchEventsResponse> {
        req.validate()?;

        let predicate = if req.where_clause.is_empty() {
            None
        } else {
            let conjunction = parse(&req.where_clause)?;
            Some(compile(req.event_name.as_str(), &conjunction)?)
        };

        self.with_deadline(self.find_events(&req.event_name, predicate.as_ref()))
            .await
    }

    async fn save_event(&self, req: CreateEventRequest) -> Result<CreateEventResponse> {
        let user = self
            .store
            .find_user_by_external_id(&req.external_id)
            .await
            .map_err(store_failure("find user", Subject::ExternalId(&req.external_id)))?
            .ok_or_else(|| ServiceError::UserNotFound(req.external_id.clone()))?;

        let campaign_name = req.campaign_name().map(str::to_owned);

        let event = self
            .store
            .create_event(NewEvent::new(req.name, user.id).properties(req.properties))
            .await
            .map_err(store_failure(
                "create event",
                Subject::ExternalId(&req.external_id),
            ))?;

        let outcome = match campaign_name {
            Some(campaign_name) => self.link_campaign(&event, &campaign_name).await,
            None => SaveOutcome::Saved,
        };

        debug!(event_id = event.id, event_name = %event.name, outcome = ?outcome, "event saved");

        Ok(CreateEventResponse {
            id: event.id,
            message: outcome.to_string(),
        })
    }

    async fn link_campaign(&self, event: &Event, campaign_name: &str) -> SaveOutcome {
        let campaign = match self.campaigns.find_by_name(campaign_name).await {
            Ok(Some(campaign)) => campaign,
            Ok(None) => {
                warn!(campaign_name, event_id = event.id, "campaign not found");
                return SaveOutcome::CampaignNotFound;
            }
            Err(err) => {
                warn!(campaign_name, event_id = event.id, error = %err, "failed to find campaign");
                return SaveOutcome::LinkFailed;
            }
        };

        if !campaign.accepts(&event.properties) {
            warn!(campaign_name, event_id = event.id, "campaign properties mismatch");
            return SaveOutcome::PropertyMismatch;
        }

        match self.store.create_campaign_event(campaign.id, event.id).await {
            Ok(_) => SaveOutcome::LinkedToCampaign,
            Err(err) => {
                warn!(campaign_name, event_id = event.id, error = %err, "failed to link event with campaign");
                SaveOutcome::LinkFailed
            }
        }
    }

    async fn find_events(
        &self,
        event_name: &str,
        predicate: Option<&Predicate>,
    ) -> Result<SearchEventsResponse> {
        let events = match predicate {
            Some(predicate) => self.store.search_events(predicate).await,
            None => self.store.find_events_by_name(event_name).await,
        }
        .map_err(store_failure("search events", Subject::EventName(event_name)))?;

        let mut seen = HashSet::new();
        let user_ids: Vec<i64> = events
            .iter()
            .map(|e| e.user_id)
            .filter(|id| seen.insert(*id))
            .collect();

        let owners: HashMap<i64, String> = self
            .store
            .find_users_by_ids(&user_ids)
            .await
            .map_err(store_failure("find users", Subject::EventName(event_name)))?
            .into_iter()
            .map(|user| (user.id, user.external_id))
            .collect();

        let events = events
            .into_iter()
            .map(|event| {
                let external_id = owners.get(&event.user_id).cloned();
                EventDto::new(event, external_id)
            })
            .collect();

        Ok(SearchEventsResponse { events })
    }
}
