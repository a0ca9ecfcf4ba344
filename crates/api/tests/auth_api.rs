//! Integration tests for signup, login, token refresh and role guards.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, get_auth, post_json, post_json_auth, user_with_token, TEST_PASSWORD,
};
use serde_json::json;
use sqlx::SqlitePool;

async fn signup(pool: &SqlitePool, email: &str) -> serde_json::Value {
    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/signup",
        json!({ "email": email, "full_name": "Test User", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

async fn login(pool: &SqlitePool, email: &str, password: &str) -> axum::response::Response {
    let app = common::build_test_app(pool.clone());
    post_json(
        app,
        "/api/v1/auth/login",
        json!({ "email": email, "password": password }),
    )
    .await
}

// ---------------------------------------------------------------------------
// Signup
// ---------------------------------------------------------------------------

/// The first account becomes a verified admin; later ones wait as members.
#[sqlx::test(migrations = "../../db/migrations")]
async fn first_signup_is_admin_later_signups_are_unverified_members(pool: SqlitePool) {
    let first = signup(&pool, "owner@example.com").await;
    assert_eq!(first["role"], "admin");
    assert_eq!(first["is_verified"], true);

    let second = signup(&pool, "dev@example.com").await;
    assert_eq!(second["role"], "member");
    assert_eq!(second["is_verified"], false);
}

/// Signing up twice with the same email is a conflict.
#[sqlx::test(migrations = "../../db/migrations")]
async fn duplicate_signup_is_conflict(pool: SqlitePool) {
    signup(&pool, "owner@example.com").await;

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/signup",
        json!({ "email": "owner@example.com", "full_name": "Again", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

/// Short passwords are rejected before anything is stored.
#[sqlx::test(migrations = "../../db/migrations")]
async fn signup_rejects_short_password(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/signup",
        json!({ "email": "a@example.com", "full_name": "A", "password": "short" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_returns_tokens_and_user(pool: SqlitePool) {
    signup(&pool, "owner@example.com").await;

    let response = login(&pool, "owner@example.com", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["access_token"].is_string());
    assert!(json["refresh_token"].is_string());
    assert_eq!(json["expires_in"], 15 * 60);
    assert_eq!(json["user"]["email"], "owner@example.com");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn login_with_wrong_password_is_401(pool: SqlitePool) {
    signup(&pool, "owner@example.com").await;

    let response = login(&pool, "owner@example.com", "not-the-password").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// Unverified members cannot sign in until an admin verifies them.
#[sqlx::test(migrations = "../../db/migrations")]
async fn unverified_member_is_blocked_until_verified(pool: SqlitePool) {
    signup(&pool, "owner@example.com").await;
    let member = signup(&pool, "dev@example.com").await;

    let response = login(&pool, "dev@example.com", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin_login = body_json(login(&pool, "owner@example.com", TEST_PASSWORD).await).await;
    let admin_token = admin_login["access_token"].as_str().unwrap();
    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/admin/users/{}/verify", member["id"]),
        json!({}),
        admin_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = login(&pool, "dev@example.com", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::OK);
}

/// Five bad passwords lock the account even for the right password.
#[sqlx::test(migrations = "../../db/migrations")]
async fn repeated_failures_lock_the_account(pool: SqlitePool) {
    signup(&pool, "owner@example.com").await;
    for _ in 0..5 {
        let response = login(&pool, "owner@example.com", "wrong-password").await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    let response = login(&pool, "owner@example.com", TEST_PASSWORD).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Refresh and me
// ---------------------------------------------------------------------------

/// A refresh token works once; the rotated token replaces it.
#[sqlx::test(migrations = "../../db/migrations")]
async fn refresh_rotates_the_token(pool: SqlitePool) {
    signup(&pool, "owner@example.com").await;
    let tokens = body_json(login(&pool, "owner@example.com", TEST_PASSWORD).await).await;
    let refresh_token = tokens["refresh_token"].as_str().unwrap().to_string();

    let app = common::build_test_app(pool.clone());
    let response = post_json(
        app,
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh_token }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let rotated = body_json(response).await;
    assert_ne!(rotated["refresh_token"], tokens["refresh_token"]);

    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/auth/refresh",
        json!({ "refresh_token": refresh_token }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn me_returns_the_caller(pool: SqlitePool) {
    let (user, token) = user_with_token(&pool, "dev@example.com", "member").await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/auth/me", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["id"], user.id);
    assert_eq!(json["role"], "member");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn garbage_token_is_401(pool: SqlitePool) {
    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/auth/me", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ---------------------------------------------------------------------------
// Role guards
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn member_cannot_create_projects(pool: SqlitePool) {
    let (_, token) = user_with_token(&pool, "dev@example.com", "member").await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/projects",
        json!({ "project_number": "100", "name": "Tower" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn member_cannot_use_admin_routes(pool: SqlitePool) {
    let (_, token) = user_with_token(&pool, "dev@example.com", "member").await;

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/admin/users", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// Customer logins only see their own customer's projects.
#[sqlx::test(migrations = "../../db/migrations")]
async fn customer_login_is_scoped_to_its_customer(pool: SqlitePool) {
    let (_, admin) = user_with_token(&pool, "owner@example.com", "admin").await;

    let mut customer_ids = Vec::new();
    for name in ["Acme", "Globex"] {
        let app = common::build_test_app(pool.clone());
        let response =
            post_json_auth(app, "/api/v1/customers", json!({ "name": name }), &admin).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        customer_ids.push(body_json(response).await["id"].as_i64().unwrap());
    }

    let mut project_ids = Vec::new();
    for (number, customer_id) in [("1", customer_ids[0]), ("2", customer_ids[1])] {
        let app = common::build_test_app(pool.clone());
        let response = post_json_auth(
            app,
            "/api/v1/projects",
            json!({ "project_number": number, "name": "Job", "customer_id": customer_id }),
            &admin,
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        project_ids.push(body_json(response).await["id"].as_i64().unwrap());
    }

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(
        app,
        &format!("/api/v1/customers/{}/logins", customer_ids[0]),
        json!({ "email": "buyer@acme.test", "full_name": "Buyer", "password": TEST_PASSWORD }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["is_verified"], true);

    let tokens = body_json(login(&pool, "buyer@acme.test", TEST_PASSWORD).await).await;
    let customer = tokens["access_token"].as_str().unwrap().to_string();

    let app = common::build_test_app(pool.clone());
    let listed = body_json(get_auth(app, "/api/v1/projects", &customer).await).await;
    let listed = listed["data"].as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["id"], project_ids[0]);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, &format!("/api/v1/projects/{}", project_ids[1]), &customer).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/enquiries", &customer).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
