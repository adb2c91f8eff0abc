use chrono::{DateTime, Utc};
use evently_query::PropertyBag;
use evently_store::{Campaign, Event};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use validator::{Validate, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    #[validate(length(min = 1))]
    pub name: String,

    /// Empty is the same as absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub campaign_name: Option<String>,

    #[validate(length(min = 1))]
    pub external_id: String,

    #[validate(custom = "validate_properties")]
    pub properties: PropertyBag,
}

impl CreateEventRequest {
    pub(crate) fn campaign_name(&self) -> Option<&str> {
        self.campaign_name.as_deref().filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEventResponse {
    pub id: i64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SearchEventsRequest {
    #[validate(length(min = 1))]
    pub event_name: String,

    /// Filter expression, `key&value&op&join[&...]`. Empty returns every
    /// event named `event_name`.
    #[serde(default, rename = "where")]
    pub where_clause: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDto {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    pub properties: PropertyBag,
    pub created_at: DateTime<Utc>,
}

impl EventDto {
    pub(crate) fn new(event: Event, external_id: Option<String>) -> Self {
        Self {
            id: event.id,
            name: event.name,
            external_id,
            properties: event.properties,
            created_at: event.created_at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchEventsResponse {
    pub events: Vec<EventDto>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct CreateCampaignRequest {
    #[validate(length(min = 1))]
    pub name: String,

    #[validate(custom = "validate_properties")]
    pub properties: PropertyBag,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCampaignResponse {
    pub id: i64,
    pub name: String,
    pub properties: PropertyBag,
    pub created_at: DateTime<Utc>,
}

impl From<Campaign> for CreateCampaignResponse {
    fn from(campaign: Campaign) -> Self {
        Self {
            id: campaign.id,
            name: campaign.name,
            properties: campaign.properties,
            created_at: campaign.created_at,
        }
    }
}

/// Keys must be non-empty and unique within the bag.
fn validate_properties(properties: &PropertyBag) -> Result<(), ValidationError> {
    if properties.keys().any(str::is_empty) {
        let mut err = ValidationError::new("empty_property_key");
        err.message = Some(Cow::Borrowed("property key must not be empty"));
        return Err(err);
    }

    if let Some(key) = properties.duplicate_key() {
        let mut err = ValidationError::new("duplicate_property_key");
        err.message = Some(Cow::Borrowed("duplicate property key"));
        err.add_param(Cow::Borrowed("key"), &key);
        return Err(err);
    }

    Ok(())
}
