use async_trait::async_trait;
use chrono::Utc;
use evently_query::Predicate;
use sqlx::{migrate::Migrator, types::Json, PgPool, Postgres, QueryBuilder};

use crate::{
    engine::{unique_keys, Engine},
    error::{Result, StoreError},
    model::{Campaign, CampaignEvent, Event, NewCampaign, NewEvent, User},
    store::Store,
};

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[allow(clippy::new_ret_no_self)]
    pub fn new(pool: &PgPool) -> Store {
        Store::new(Self { pool: pool.clone() })
    }

    pub async fn migrate(pool: &PgPool) -> Result<()> {
        MIGRATOR.run(pool).await?;

        Ok(())
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(e) if e.is_unique_violation())
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(e) if e.is_foreign_key_violation())
}

#[async_trait]
impl Engine for PgStore {
    async fn create_event(&self, event: NewEvent) -> Result<Event> {
        unique_keys(&event.properties)?;

        let user_id = event.user_id;

        sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO events (name, user_id, properties, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, user_id, properties, created_at
            "#,
        )
        .bind(event.name)
        .bind(event.user_id)
        .bind(Json(event.properties))
        .bind(event.created_at.unwrap_or_else(Utc::now))
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_foreign_key_violation(&err) {
                StoreError::MissingReference("user", user_id)
            } else {
                err.into()
            }
        })
    }

    async fn find_events_by_name(&self, name: &str) -> Result<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT id, name, user_id, properties, created_at FROM events WHERE name = $1 ORDER BY id",
        )
        .bind(name)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    async fn find_events_by_ids(&self, ids: &[i64]) -> Result<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(
            "SELECT id, name, user_id, properties, created_at FROM events WHERE id = ANY($1) ORDER BY id",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(events)
    }

    async fn search_events(&self, predicate: &Predicate) -> Result<Vec<Event>> {
        let mut query_builder: QueryBuilder<Postgres> = QueryBuilder::new(
            "SELECT id, name, user_id, properties, created_at FROM events WHERE ",
        );

        predicate.push_sql(&mut query_builder);
        query_builder.push(" ORDER BY id");

        let events = query_builder
            .build_query_as::<Event>()
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }

    async fn create_campaign(&self, campaign: NewCampaign) -> Result<Campaign> {
        unique_keys(&campaign.properties)?;

        let name = campaign.name.clone();

        sqlx::query_as::<_, Campaign>(
            r#"
            INSERT INTO campaigns (name, properties, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, name, properties, created_at
            "#,
        )
        .bind(campaign.name)
        .bind(Json(campaign.properties))
        .bind(campaign.created_at.unwrap_or_else(Utc::now))
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                StoreError::CampaignExists(name)
            } else {
                err.into()
            }
        })
    }

    async fn find_campaign_by_name(&self, name: &str) -> Result<Option<Campaign>> {
        let campaign = sqlx::query_as::<_, Campaign>(
            "SELECT id, name, properties, created_at FROM campaigns WHERE name = $1 LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        Ok(campaign)
    }

    async fn campaign_exists_by_name(&self, name: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM campaigns WHERE name = $1)")
                .bind(name)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn create_campaign_event(
        &self,
        campaign_id: i64,
        event_id: i64,
    ) -> Result<CampaignEvent> {
        sqlx::query_as::<_, CampaignEvent>(
            r#"
            INSERT INTO campaign_events (campaign_id, event_id, created_at)
            VALUES ($1, $2, $3)
            RETURNING id, campaign_id, event_id, created_at
            "#,
        )
        .bind(campaign_id)
        .bind(event_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_foreign_key_violation(&err) {
                StoreError::MissingReference("campaign or event", campaign_id)
            } else {
                err.into()
            }
        })
    }

    async fn find_campaign_events(&self, campaign_id: i64) -> Result<Vec<CampaignEvent>> {
        let links = sqlx::query_as::<_, CampaignEvent>(
            "SELECT id, campaign_id, event_id, created_at FROM campaign_events WHERE campaign_id = $1 ORDER BY id",
        )
        .bind(campaign_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(links)
    }

    async fn create_user(&self, external_id: &str) -> Result<User> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (external_id) VALUES ($1) RETURNING id, external_id",
        )
        .bind(external_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                StoreError::UserExists(external_id.to_owned())
            } else {
                err.into()
            }
        })
    }

    async fn find_user_by_external_id(&self, external_id: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, external_id FROM users WHERE external_id = $1 LIMIT 1",
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_users_by_ids(&self, ids: &[i64]) -> Result<Vec<User>> {
        let users = sqlx::query_as::<_, User>(
            "SELECT id, external_id FROM users WHERE id = ANY($1) ORDER BY id",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }
}
