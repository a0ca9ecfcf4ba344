#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use pms_core::storage::{BlobStore, LocalBlobStore};
use pms_db::models::user::{CreateUser, User};
use pms_db::repositories::UserRepo;
use sqlx::SqlitePool;
use tower::ServiceExt;

use pms_api::auth::jwt::{generate_access_token, JwtConfig};
use pms_api::auth::password::hash_password;
use pms_api::config::ServerConfig;
use pms_api::router::build_app_router;
use pms_api::state::AppState;

pub const TEST_PASSWORD: &str = "test_password_123!";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        database_url: "sqlite::memory:".to_string(),
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        blob_storage_path: String::new(),
        max_upload_bytes: 64 * 1024,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
    }
}

/// Build the full application router over `pool`, storing blobs under
/// `blob_root`.
pub fn build_test_app_with_blobs(pool: SqlitePool, blob_root: &Path) -> Router {
    build_test_app_with_store(pool, Arc::new(LocalBlobStore::new(blob_root)))
}

/// Build the full application router over `pool` with a caller-supplied
/// blob store.
pub fn build_test_app_with_store(pool: SqlitePool, blob_store: Arc<dyn BlobStore>) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: Arc::new(pms_events::EventBus::default()),
        blob_store,
    };
    build_app_router(state, &config).expect("test router should build")
}

/// Build the full application router, the same stack `main.rs` serves.
pub fn build_test_app(pool: SqlitePool) -> Router {
    let root = std::env::temp_dir().join(format!("pms-test-{}", uuid::Uuid::new_v4()));
    build_test_app_with_blobs(pool, &root)
}

/// Like [`build_test_app`], with a notification dispatcher draining the bus.
///
/// The returned router is cheap to clone; every clone shares the bus.
pub fn build_test_app_with_notifications(pool: SqlitePool) -> Router {
    let config = test_config();
    let bus = Arc::new(pms_events::EventBus::default());
    tokio::spawn(pms_events::NotificationDispatcher::run(
        pool.clone(),
        bus.subscribe(),
    ));

    let root = std::env::temp_dir().join(format!("pms-test-{}", uuid::Uuid::new_v4()));
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        event_bus: bus,
        blob_store: Arc::new(LocalBlobStore::new(root)),
    };
    build_app_router(state, &config).expect("test router should build")
}

/// Poll `/notifications/unread-count` until it reaches `expected`.
pub async fn wait_for_unread(app: &Router, token: &str, expected: i64) -> i64 {
    let mut unread = 0;
    for _ in 0..50 {
        let response = get_auth(app.clone(), "/api/v1/notifications/unread-count", token).await;
        unread = body_json(response).await["unread"].as_i64().unwrap_or(0);
        if unread >= expected {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
    }
    unread
}

// ---------------------------------------------------------------------------
// Users and tokens
// ---------------------------------------------------------------------------

/// Insert a verified user with [`TEST_PASSWORD`].
pub async fn create_user(
    pool: &SqlitePool,
    email: &str,
    role: &str,
    customer_id: Option<i64>,
) -> User {
    let input = CreateUser {
        email: email.to_string(),
        full_name: email.split('@').next().unwrap_or(email).to_string(),
        password_hash: hash_password(TEST_PASSWORD).expect("hashing should succeed"),
        role: role.to_string(),
        is_verified: true,
        customer_id,
    };
    UserRepo::create(pool, &input)
        .await
        .expect("user creation should succeed")
}

/// A valid access token for `user`.
pub fn token_for(user: &User) -> String {
    generate_access_token(user.id, &user.role, user.customer_id, &test_config().jwt)
        .expect("token generation should succeed")
}

/// Create a user and return it with an access token.
pub async fn user_with_token(pool: &SqlitePool, email: &str, role: &str) -> (User, String) {
    let user = create_user(pool, email, role, None).await;
    let token = token_for(&user);
    (user, token)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(app: Router, request: Request<Body>) -> Response<Body> {
    app.oneshot(request).await.expect("request should be handled")
}

fn request(
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, request(Method::GET, uri, None, None)).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, request(Method::GET, uri, Some(token), None)).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, request(Method::POST, uri, None, Some(body))).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, request(Method::POST, uri, Some(token), Some(body))).await
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, request(Method::POST, uri, Some(token), None)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, request(Method::PUT, uri, Some(token), Some(body))).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, request(Method::DELETE, uri, Some(token), None)).await
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

/// Collect a response body as raw bytes.
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("body should be readable")
        .to_bytes()
        .to_vec()
}
