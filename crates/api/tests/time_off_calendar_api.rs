//! Integration tests for attendance, time off, holidays and the calendar.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, delete_auth, get_auth, post_json_auth, put_json_auth, user_with_token,
    wait_for_unread,
};
use serde_json::{json, Value};
use sqlx::SqlitePool;

async fn request_time_off(pool: &SqlitePool, token: &str, body: Value) -> axum::response::Response {
    let app = common::build_test_app(pool.clone());
    post_json_auth(app, "/api/v1/time-off", body, token).await
}

async fn decide(pool: &SqlitePool, admin: &str, id: &Value, body: Value) -> axum::response::Response {
    let app = common::build_test_app(pool.clone());
    put_json_auth(app, &format!("/api/v1/time-off/{id}/decision"), body, admin).await
}

// ---------------------------------------------------------------------------
// Attendance
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn marking_twice_updates_the_same_day(pool: SqlitePool) {
    let (member, token) = user_with_token(&pool, "dev@example.com", "member").await;

    for (kind, expected) in [("full", StatusCode::CREATED), ("half", StatusCode::OK)] {
        let app = common::build_test_app(pool.clone());
        let response = post_json_auth(
            app,
            "/api/v1/attendance",
            json!({ "date": "2024-03-01", "kind": kind }),
            &token,
        )
        .await;
        assert_eq!(response.status(), expected);
    }

    let app = common::build_test_app(pool);
    let response = get_auth(
        app,
        "/api/v1/attendance?start=2024-03-01&end=2024-03-31",
        &token,
    )
    .await;
    let marks = body_json(response).await;
    let marks = marks["data"].as_array().unwrap();
    assert_eq!(marks.len(), 1);
    assert_eq!(marks[0]["kind"], "half");
    assert_eq!(marks[0]["user_id"], member.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn members_cannot_mark_for_others(pool: SqlitePool) {
    let (other, _) = user_with_token(&pool, "other@example.com", "member").await;
    let (_, token) = user_with_token(&pool, "dev@example.com", "member").await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/attendance",
        json!({ "user_id": other.id, "date": "2024-03-01" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn unknown_attendance_kind_is_rejected(pool: SqlitePool) {
    let (_, token) = user_with_token(&pool, "dev@example.com", "member").await;

    let app = common::build_test_app(pool);
    let response = post_json_auth(
        app,
        "/api/v1/attendance",
        json!({ "date": "2024-03-01", "kind": "quarter" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// ---------------------------------------------------------------------------
// Time off
// ---------------------------------------------------------------------------

/// Half-day leave must cover one day and name a session.
#[sqlx::test(migrations = "../../db/migrations")]
async fn half_day_leave_shape_is_enforced(pool: SqlitePool) {
    let (_, token) = user_with_token(&pool, "dev@example.com", "member").await;

    let response = request_time_off(
        &pool,
        &token,
        json!({
            "kind": "leave", "start_date": "2024-03-04", "end_date": "2024-03-05",
            "leave_type": "half", "session": "forenoon"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = request_time_off(
        &pool,
        &token,
        json!({
            "kind": "leave", "start_date": "2024-03-04", "end_date": "2024-03-04",
            "leave_type": "half"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = request_time_off(
        &pool,
        &token,
        json!({
            "kind": "leave", "start_date": "2024-03-04", "end_date": "2024-03-04",
            "leave_type": "half", "session": "afternoon", "reason": "Dentist"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["status"], "pending");
    assert_eq!(created["session"], "afternoon");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn end_before_start_is_rejected(pool: SqlitePool) {
    let (_, token) = user_with_token(&pool, "dev@example.com", "member").await;

    let response = request_time_off(
        &pool,
        &token,
        json!({ "kind": "wfh", "start_date": "2024-03-05", "end_date": "2024-03-04" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Requests notify admins; decisions notify the requester.
#[sqlx::test(migrations = "../../db/migrations")]
async fn request_and_decision_notify_the_other_side(pool: SqlitePool) {
    let (_, admin) = user_with_token(&pool, "owner@example.com", "admin").await;
    let (_, member) = user_with_token(&pool, "dev@example.com", "member").await;
    let app = common::build_test_app_with_notifications(pool.clone());

    let response = post_json_auth(
        app.clone(),
        "/api/v1/time-off",
        json!({ "kind": "ooo", "start_date": "2024-03-11", "end_date": "2024-03-12" }),
        &member,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let request = body_json(response).await;
    assert_eq!(wait_for_unread(&app, &admin, 1).await, 1);

    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/time-off/{}/decision", request["id"]),
        json!({ "status": "approved" }),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "approved");
    assert_eq!(wait_for_unread(&app, &member, 1).await, 1);

    let response = get_auth(app.clone(), "/api/v1/notifications", &member).await;
    let notifications = body_json(response).await;
    assert_eq!(notifications["data"][0]["event_type"], "time_off.decided");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn decision_must_approve_or_reject(pool: SqlitePool) {
    let (_, admin) = user_with_token(&pool, "owner@example.com", "admin").await;
    let (_, member) = user_with_token(&pool, "dev@example.com", "member").await;
    let response = request_time_off(
        &pool,
        &member,
        json!({ "kind": "wfh", "start_date": "2024-03-11", "end_date": "2024-03-11" }),
    )
    .await;
    let request = body_json(response).await;

    let response = decide(&pool, &admin, &request["id"], json!({ "status": "pending" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = decide(
        &pool,
        &admin,
        &request["id"],
        json!({ "status": "approved", "start_date": "2024-03-12" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = decide(
        &pool,
        &admin,
        &request["id"],
        json!({ "status": "approved", "start_date": "2024-03-12", "end_date": "2024-03-13" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let decided = body_json(response).await;
    assert_eq!(decided["start_date"], "2024-03-12");
    assert_eq!(decided["end_date"], "2024-03-13");

    let response = decide(&pool, &member, &request["id"], json!({ "status": "rejected" })).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

/// Only pending requests can be cancelled or moved by their owner.
#[sqlx::test(migrations = "../../db/migrations")]
async fn decided_requests_are_frozen_for_members(pool: SqlitePool) {
    let (_, admin) = user_with_token(&pool, "owner@example.com", "admin").await;
    let (_, member) = user_with_token(&pool, "dev@example.com", "member").await;
    let response = request_time_off(
        &pool,
        &member,
        json!({ "kind": "leave", "start_date": "2024-03-18", "end_date": "2024-03-19" }),
    )
    .await;
    let request = body_json(response).await;
    decide(&pool, &admin, &request["id"], json!({ "status": "rejected" })).await;

    let app = common::build_test_app(pool.clone());
    let response = put_json_auth(
        app,
        &format!("/api/v1/time-off/{}/dates", request["id"]),
        json!({ "start_date": "2024-03-20", "end_date": "2024-03-20" }),
        &member,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let app = common::build_test_app(pool);
    let response = delete_auth(app, &format!("/api/v1/time-off/{}", request["id"]), &member).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn pending_request_can_be_cancelled(pool: SqlitePool) {
    let (_, member) = user_with_token(&pool, "dev@example.com", "member").await;
    let response = request_time_off(
        &pool,
        &member,
        json!({ "kind": "wfh", "start_date": "2024-03-18", "end_date": "2024-03-18" }),
    )
    .await;
    let request = body_json(response).await;

    let app = common::build_test_app(pool.clone());
    let response = delete_auth(app, &format!("/api/v1/time-off/{}", request["id"]), &member).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/time-off", &member).await;
    assert!(body_json(response).await["data"].as_array().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Holidays and calendar
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_admins_manage_holidays(pool: SqlitePool) {
    let (_, admin) = user_with_token(&pool, "owner@example.com", "admin").await;
    let (_, member) = user_with_token(&pool, "dev@example.com", "member").await;
    let body = json!({ "name": "Founders Day", "start_date": "2024-03-08", "end_date": "2024-03-08" });

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/holidays", body.clone(), &member).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app(pool.clone());
    let response = post_json_auth(app, "/api/v1/holidays", body, &admin).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let app = common::build_test_app(pool);
    let response = get_auth(app, "/api/v1/holidays", &member).await;
    let holidays = body_json(response).await;
    assert_eq!(holidays["data"][0]["name"], "Founders Day");
}

/// The month grid carries attendance, leave and holiday badges per day.
#[sqlx::test(migrations = "../../db/migrations")]
async fn calendar_and_metrics_combine_every_source(pool: SqlitePool) {
    let (_, admin) = user_with_token(&pool, "owner@example.com", "admin").await;
    let (member, token) = user_with_token(&pool, "dev@example.com", "member").await;

    let app = common::build_test_app(pool.clone());
    post_json_auth(
        app,
        "/api/v1/attendance",
        json!({ "date": "2024-03-01" }),
        &token,
    )
    .await;
    let app = common::build_test_app(pool.clone());
    post_json_auth(
        app,
        "/api/v1/holidays",
        json!({ "name": "Founders Day", "start_date": "2024-03-08", "end_date": "2024-03-08" }),
        &admin,
    )
    .await;
    let leave = body_json(
        request_time_off(
            &pool,
            &token,
            json!({ "kind": "leave", "start_date": "2024-03-04", "end_date": "2024-03-06" }),
        )
        .await,
    )
    .await;
    decide(&pool, &admin, &leave["id"], json!({ "status": "approved" })).await;
    let wfh = body_json(
        request_time_off(
            &pool,
            &token,
            json!({ "kind": "wfh", "start_date": "2024-03-12", "end_date": "2024-03-13" }),
        )
        .await,
    )
    .await;
    decide(&pool, &admin, &wfh["id"], json!({ "status": "rejected" })).await;

    let app = common::build_test_app(pool.clone());
    let response = get_auth(app, "/api/v1/calendar?year=2024&month=3", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let calendar = body_json(response).await;
    let days = calendar["days"].as_array().unwrap();
    assert_eq!(days.len(), 42);
    assert_eq!(days[0]["date"], "2024-02-25");
    assert_eq!(days[0]["in_month"], false);

    let day = |date: &str| days.iter().find(|d| d["date"] == date).unwrap().clone();
    assert_eq!(day("2024-03-01")["statuses"][0]["type"], "attendance");
    assert_eq!(day("2024-03-05")["statuses"][0]["type"], "leave");
    assert_eq!(day("2024-03-05")["statuses"][0]["status"], "approved");
    assert_eq!(day("2024-03-08")["statuses"][0]["type"], "holiday");

    let app = common::build_test_app(pool.clone());
    let response = get_auth(
        app,
        "/api/v1/calendar/metrics?start=2024-03-01&end=2024-03-31",
        &token,
    )
    .await;
    let metrics = body_json(response).await;
    assert_eq!(metrics["total_days"], 31);
    assert_eq!(metrics["attendance_days"], 1);
    assert_eq!(metrics["leave_days"], 3);
    assert_eq!(metrics["wfh_days"], 0);

    let app = common::build_test_app(pool.clone());
    let response = get_auth(
        app,
        &format!("/api/v1/calendar?year=2024&month=3&user_id={}", member.id),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let (_, other) = user_with_token(&pool, "other@example.com", "member").await;
    let app = common::build_test_app(pool);
    let response = get_auth(
        app,
        &format!("/api/v1/calendar?year=2024&month=3&user_id={}", member.id),
        &other,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
