#![forbid(unsafe_code)]

mod config;
mod error;
mod handler;
mod rate_limit;

pub use config::*;
pub use error::*;
pub use handler::ApiResponse;
pub use rate_limit::*;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use evently::EventQueryService;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

/// Shared by every handler. The limiter is built once and lives as long as
/// the router.
#[derive(Clone)]
pub struct AppState {
    pub service: EventQueryService,
    pub limiter: Arc<RateLimiter>,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(service: EventQueryService, limiter: RateLimiter) -> Self {
        Self {
            service,
            limiter: Arc::new(limiter),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn max_body_bytes(mut self, max: usize) -> Self {
        self.max_body_bytes = max;
        self
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/events",
            post(handler::create_event).get(handler::search_events),
        )
        .route("/events/campaign", post(handler::create_campaign))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit::rate_limit,
        ))
        .layer(DefaultBodyLimit::max(state.max_body_bytes));

    Router::new()
        .route("/health", get(handler::health))
        .nest("/api/v2", api)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CatchPanicLayer::new())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
