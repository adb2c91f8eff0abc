use std::time::Duration;

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use evently::ServiceError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("{0}")]
    Json(#[from] JsonRejection),

    #[error("{0}")]
    Query(#[from] QueryRejection),

    #[error("rate limit exceeded")]
    RateLimited { retry_after: Duration },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Service(err) => match err {
                ServiceError::Validation(_)
                | ServiceError::InvalidFilter(_)
                | ServiceError::PropertyMismatch => StatusCode::BAD_REQUEST,
                ServiceError::UserNotFound(_) | ServiceError::CampaignNotFound(_) => {
                    StatusCode::NOT_FOUND
                }
                ServiceError::CampaignExists(_) => StatusCode::CONFLICT,
                ServiceError::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
                ServiceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ApiError::Json(rejection) => rejection.status(),
            ApiError::Query(rejection) => rejection.status(),
            ApiError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Service(err) => err.code(),
            ApiError::Json(_) | ApiError::Query(_) => "BAD_REQUEST",
            ApiError::RateLimited { .. } => "RATE_LIMITED",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let ApiError::Service(ServiceError::Internal(err)) = &self {
            tracing::error!(error = %err, "internal server error");
        }

        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
            "code": self.code(),
        }));

        let mut res = (self.status_code(), body).into_response();

        if let ApiError::RateLimited { retry_after } = self {
            let secs = retry_after.as_secs_f64().ceil().max(1.0) as u64;
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                res.headers_mut().insert(header::RETRY_AFTER, value);
            }
        }

        res
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
