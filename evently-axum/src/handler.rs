use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Json,
};
use evently::{
    CreateCampaignRequest, CreateCampaignResponse, CreateEventRequest, CreateEventResponse,
    SearchEventsRequest, SearchEventsResponse,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::{error::ApiResult, AppState};

/// Success envelope, `{"success": true, "data": ..}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

pub async fn create_event(
    State(state): State<AppState>,
    payload: Result<Json<CreateEventRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<CreateEventResponse>>)> {
    let Json(req) = payload?;
    let res = state.service.create_event(req).await?;

    Ok((StatusCode::CREATED, ApiResponse::new(res)))
}

pub async fn search_events(
    State(state): State<AppState>,
    query: Result<Query<SearchEventsRequest>, QueryRejection>,
) -> ApiResult<Json<ApiResponse<SearchEventsResponse>>> {
    let Query(req) = query?;
    let res = state.service.search_events(req).await?;

    Ok(ApiResponse::new(res))
}

pub async fn create_campaign(
    State(state): State<AppState>,
    payload: Result<Json<CreateCampaignRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<CreateCampaignResponse>>)> {
    let Json(req) = payload?;
    let res = state.service.create_campaign(req).await?;

    Ok((StatusCode::CREATED, ApiResponse::new(res)))
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
