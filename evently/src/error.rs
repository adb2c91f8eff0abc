use evently_query::QueryError;
use evently_store::StoreError;
use validator::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(#[from] ValidationErrors),

    #[error("invalid where clause: {0}")]
    InvalidFilter(#[from] QueryError),

    #[error("User not found with externalId: {0}")]
    UserNotFound(String),

    #[error("Campaign not found with name: {0}")]
    CampaignNotFound(String),

    #[error("Campaign already exists with name: {0}")]
    CampaignExists(String),

    #[error("Campaign properties and Event properties mismatch")]
    PropertyMismatch,

    #[error("deadline exceeded")]
    DeadlineExceeded,

    #[error("internal server error")]
    Internal(#[source] StoreError),
}

impl ServiceError {
    /// Stable machine-readable code of the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "VALIDATION_ERROR",
            ServiceError::InvalidFilter(_) => "BAD_REQUEST",
            ServiceError::UserNotFound(_) => "USER_NOT_FOUND",
            ServiceError::CampaignNotFound(_) => "CAMPAIGN_NOT_FOUND",
            ServiceError::CampaignExists(_) => "CAMPAIGN_ALREADY_EXISTS",
            ServiceError::PropertyMismatch => "PROPERTY_MISMATCH",
            ServiceError::DeadlineExceeded => "DEADLINE_EXCEEDED",
            ServiceError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, ServiceError::Internal(_))
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::CampaignExists(name) => ServiceError::CampaignExists(name),
            e => ServiceError::Internal(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
