#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("campaign `{0}` already exists")]
    CampaignExists(String),

    #[error("user `{0}` already exists")]
    UserExists(String),

    #[error("property key `{0}` appears more than once")]
    DuplicatePropertyKey(String),

    #[error("{0} `{1}` does not exist")]
    MissingReference(&'static str, i64),

    #[cfg(feature = "pg")]
    #[error("sqlx `{0}`")]
    Sqlx(#[from] sqlx::Error),

    #[cfg(feature = "pg")]
    #[error("sqlx migrate `{0}`")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("serde_json `{0}`")]
    SerdeJson(#[from] serde_json::Error),

    #[error("evently_query `{0}`")]
    Query(#[from] evently_query::QueryError),
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("serde_json `{0}`")]
    SerdeJson(#[from] serde_json::Error),

    #[error("cache unavailable: {0}")]
    Unavailable(String),
}
