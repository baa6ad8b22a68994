#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use jsonwebtoken::{encode, EncodingKey, Header};
use tailor_api::auth::jwt::{Claims, JwtConfig};
use tailor_api::config::ServerConfig;
use tailor_api::router::build_app_router;
use tailor_api::state::AppState;
use tailor_core::catalog::{default_slot_times, DEFAULT_SLOT_CAPACITY};
use tailor_core::roles::{ROLE_ADMIN, ROLE_CUSTOMER};
use tailor_core::types::DbId;
use tailor_db::repositories::TimeSlotRepo;
use tailor_events::EventBus;
use tower::ServiceExt;

/// Monday, open under the default schedule.
pub const OPEN_DATE: &str = "2026-03-16";
/// Sunday, closed under the default schedule.
pub const CLOSED_DATE: &str = "2026-03-15";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        booking_lock_timeout_ms: 5000,
        seed_catalog: true,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

pub fn test_state(pool: PgPool) -> AppState {
    AppState {
        pool,
        config: Arc::new(test_config()),
        event_bus: Arc::new(EventBus::default()),
    }
}

/// Seed the default catalog and build the full application router with the
/// production middleware stack.
pub async fn build_test_app(pool: PgPool) -> Router {
    TimeSlotRepo::seed_defaults(&pool, &default_slot_times(), DEFAULT_SLOT_CAPACITY)
        .await
        .expect("catalog seed should succeed");
    build_app_router(test_state(pool), &test_config())
}

// ---------------------------------------------------------------------------
// Tokens
// ---------------------------------------------------------------------------

/// Sign an access token the way the identity provider does.
pub fn access_token(user_id: DbId, role: &str) -> String {
    let config = test_config().jwt;
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        exp: now + config.access_token_expiry_mins * 60,
        iat: now,
        jti: uuid::Uuid::new_v4().to_string(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .expect("token generation should succeed")
}

pub fn customer_token(user_id: DbId) -> String {
    access_token(user_id, ROLE_CUSTOMER)
}

pub fn admin_token(user_id: DbId) -> String {
    access_token(user_id, ROLE_ADMIN)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, "GET", uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, "GET", uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, "POST", uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, "POST", uri, Some(token), Some(body)).await
}

/// POST a raw, possibly malformed, JSON body.
pub async fn post_raw_json_auth(app: Router, uri: &str, body: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, "POST", uri, Some(token), None).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, "PUT", uri, Some(token), Some(body)).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, "DELETE", uri, Some(token), None).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the status and error code of a failed response.
pub async fn assert_error(response: Response<Body>, status: StatusCode, code: &str) {
    assert_eq!(response.status(), status);
    let json = body_json(response).await;
    assert_eq!(json["code"], code, "unexpected error body: {json}");
}

/// Book `time` on `date` for `user_id` via the API and return the response.
pub async fn book(
    app: Router,
    user_id: DbId,
    service_type: &str,
    date: &str,
    time: &str,
) -> Response<Body> {
    post_json_auth(
        app,
        "/api/v1/appointments/book",
        serde_json::json!({ "serviceType": service_type, "date": date, "time": time }),
        &customer_token(user_id),
    )
    .await
}
