use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use evently::EventQueryService;
use evently_axum::{router, AppState, RateLimitConfig, RateLimiter};
use evently_store::{MemoryCache, MemoryStore, Store};
use serde_json::{json, Value};
use tower::ServiceExt;

fn app_with(store: Store, limits: RateLimitConfig) -> Router {
    let service = EventQueryService::new(store, MemoryCache::new());

    router(AppState::new(service, RateLimiter::new(limits)))
}

fn app(store: Store) -> Router {
    app_with(store, RateLimitConfig::default())
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, body)
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health() {
    let (status, body) = send(&app(MemoryStore::new()), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn create_link_and_search() {
    let store = MemoryStore::new();
    store.create_user("user123").await.unwrap();
    let app = app(store);

    let (status, body) = send(
        &app,
        post(
            "/api/v2/events/campaign",
            json!({"name": "summer-sale", "properties": [{"key": "product", "value": ""}]}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "summer-sale");

    let (status, body) = send(
        &app,
        post(
            "/api/v2/events",
            json!({
                "name": "purchase",
                "campaignName": "summer-sale",
                "externalId": "user123",
                "properties": [{"key": "product", "value": "laptop"}]
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["message"], "Event saved with campaign");
    let id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        get("/api/v2/events?eventName=purchase&where=product%26laptop%26%3D%26end"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(
        body["data"]["events"],
        json!([{
            "id": id,
            "name": "purchase",
            "externalId": "user123",
            "properties": [{"key": "product", "value": "laptop"}],
            "createdAt": body["data"]["events"][0]["createdAt"],
        }])
    );
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let (status, body) = send(
        &app(MemoryStore::new()),
        post(
            "/api/v2/events",
            json!({
                "name": "purchase",
                "externalId": "nobody",
                "properties": []
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({
            "success": false,
            "error": "User not found with externalId: nobody",
            "code": "USER_NOT_FOUND"
        })
    );
}

#[tokio::test]
async fn invalid_filter_is_bad_request() {
    let (status, body) = send(
        &app(MemoryStore::new()),
        get("/api/v2/events?eventName=purchase&where=product%26laptop%26%3D"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn missing_event_name_is_rejected() {
    let (status, body) = send(&app(MemoryStore::new()), get("/api/v2/events")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn malformed_body_is_rejected() {
    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/v2/events")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\":"))
        .unwrap();

    let (status, body) = send(&app(MemoryStore::new()), req).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn duplicate_campaign_is_conflict() {
    let app = app(MemoryStore::new());
    let campaign = json!({"name": "summer-sale", "properties": [{"key": "product", "value": ""}]});

    let (status, _) = send(&app, post("/api/v2/events/campaign", campaign.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, post("/api/v2/events/campaign", campaign)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "CAMPAIGN_ALREADY_EXISTS");
}

#[tokio::test]
async fn duplicate_keys_are_a_validation_error() {
    let (status, body) = send(
        &app(MemoryStore::new()),
        post(
            "/api/v2/events/campaign",
            json!({
                "name": "summer-sale",
                "properties": [{"key": "product", "value": ""}, {"key": "product", "value": ""}]
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn clients_are_rate_limited_separately() {
    let app = app_with(
        MemoryStore::new(),
        RateLimitConfig {
            requests_per_second: 1,
            burst: 2,
        },
    );

    let from = |ip: &str| {
        Request::builder()
            .uri("/api/v2/events?eventName=purchase")
            .header("x-forwarded-for", ip)
            .body(Body::empty())
            .unwrap()
    };

    assert_eq!(send(&app, from("203.0.113.7")).await.0, StatusCode::OK);
    assert_eq!(send(&app, from("203.0.113.7")).await.0, StatusCode::OK);

    let res = app.clone().oneshot(from("203.0.113.7")).await.unwrap();
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(res.headers().contains_key(header::RETRY_AFTER));

    let (status, _) = send(&app, from("198.51.100.1")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, from("203.0.113.7")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], "RATE_LIMITED");

    let (status, _) = send(&app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn request_id_is_propagated() {
    let res = app(MemoryStore::new())
        .oneshot(get("/health"))
        .await
        .unwrap();

    assert!(res.headers().contains_key("x-request-id"));
}
