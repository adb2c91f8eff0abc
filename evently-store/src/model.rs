use chrono::{DateTime, Utc};
use evently_query::PropertyBag;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "pg", derive(sqlx::FromRow))]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub user_id: i64,
    #[cfg_attr(feature = "pg", sqlx(json))]
    pub properties: PropertyBag,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct NewEvent {
    pub name: String,
    pub user_id: i64,
    pub properties: PropertyBag,
    pub created_at: Option<DateTime<Utc>>,
}

impl NewEvent {
    pub fn new(name: impl Into<String>, user_id: i64) -> Self {
        Self {
            name: name.into(),
            user_id,
            ..Self::default()
        }
    }

    pub fn properties(mut self, properties: PropertyBag) -> Self {
        self.properties = properties;
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub(crate) fn into_event(self, id: i64) -> Event {
        Event {
            id,
            name: self.name,
            user_id: self.user_id,
            properties: self.properties,
            created_at: self.created_at.unwrap_or_else(Utc::now),
        }
    }
}

/// A campaign declares a property schema: only the keys of `properties`
/// are meaningful, values are placeholders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "pg", derive(sqlx::FromRow))]
pub struct Campaign {
    pub id: i64,
    pub name: String,
    #[cfg_attr(feature = "pg", sqlx(json))]
    pub properties: PropertyBag,
    pub created_at: DateTime<Utc>,
}

impl Campaign {
    /// Whether an event carrying `properties` may be linked to this campaign.
    pub fn accepts(&self, properties: &PropertyBag) -> bool {
        self.properties.key_set_matches(properties)
    }
}

#[derive(Debug, Clone, Default)]
pub struct NewCampaign {
    pub name: String,
    pub properties: PropertyBag,
    pub created_at: Option<DateTime<Utc>>,
}

impl NewCampaign {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn properties(mut self, properties: PropertyBag) -> Self {
        self.properties = properties;
        self
    }

    pub(crate) fn into_campaign(self, id: i64) -> Campaign {
        Campaign {
            id,
            name: self.name,
            properties: self.properties,
            created_at: self.created_at.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "pg", derive(sqlx::FromRow))]
pub struct CampaignEvent {
    pub id: i64,
    pub campaign_id: i64,
    pub event_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "pg", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub external_id: String,
}
