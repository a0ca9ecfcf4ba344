//! Handlers for daily attendance marks.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use pms_core::status::AttendanceKind;
use pms_core::types::{Day, DbId};
use pms_db::models::attendance::{Attendance, MarkAttendance, UpdateAttendance};
use pms_db::repositories::AttendanceRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{ensure_self_or_admin, RequireStaff};
use crate::query::DateRangeParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TodayAttendance {
    pub date: Day,
    pub marked: bool,
    pub attendance: Option<Attendance>,
}

fn not_found(user_id: DbId, date: Day) -> AppError {
    AppError::NotFound(format!(
        "No attendance recorded for user {user_id} on {date}"
    ))
}

/// POST /api/v1/attendance
///
/// Marks the caller (or, for admins, any user) present. Date defaults to
/// today and kind to `full`. Marking an already-marked day replaces its kind
/// and answers 200 instead of 201.
pub async fn mark(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Json(input): Json<MarkAttendance>,
) -> AppResult<(StatusCode, Json<Attendance>)> {
    let target = input.user_id.unwrap_or(user.user_id);
    ensure_self_or_admin(&user, target)?;

    let date = input.date.unwrap_or_else(|| Utc::now().date_naive());
    let kind = match input.kind.as_deref() {
        Some(kind) => kind.parse::<AttendanceKind>()?,
        None => AttendanceKind::Full,
    };

    let already_marked = AttendanceRepo::has_attendance(&state.pool, target, date).await?;
    let attendance = AttendanceRepo::mark(&state.pool, target, date, kind, user.user_id).await?;
    tracing::info!(user_id = target, %date, kind = %kind, already_marked, "Attendance marked");

    let status = if already_marked {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(attendance)))
}

/// GET /api/v1/attendance?start=&end=&user_id=
///
/// Defaults to the current month. Non-admins only ever see their own marks.
pub async fn list(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Query(params): Query<DateRangeParams>,
) -> AppResult<Json<DataResponse<Vec<Attendance>>>> {
    let range = params.range_or_current_month()?;
    let user_filter = if user.is_admin() {
        params.user_id
    } else {
        Some(user.user_id)
    };

    let marks = AttendanceRepo::list_range(&state.pool, user_filter, &range).await?;
    Ok(Json(DataResponse { data: marks }))
}

/// GET /api/v1/attendance/today
pub async fn today(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
) -> AppResult<Json<TodayAttendance>> {
    let date = Utc::now().date_naive();
    let attendance = AttendanceRepo::find(&state.pool, user.user_id, date).await?;
    Ok(Json(TodayAttendance {
        date,
        marked: attendance.is_some(),
        attendance,
    }))
}

/// PUT /api/v1/attendance/{user_id}/{date}
pub async fn update(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path((user_id, date)): Path<(DbId, Day)>,
    Json(input): Json<UpdateAttendance>,
) -> AppResult<Json<Attendance>> {
    ensure_self_or_admin(&user, user_id)?;
    let kind = input.kind.parse::<AttendanceKind>()?;

    let attendance = AttendanceRepo::update_kind(&state.pool, user_id, date, kind)
        .await?
        .ok_or_else(|| not_found(user_id, date))?;
    Ok(Json(attendance))
}

/// DELETE /api/v1/attendance/{user_id}/{date}
pub async fn remove(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path((user_id, date)): Path<(DbId, Day)>,
) -> AppResult<StatusCode> {
    ensure_self_or_admin(&user, user_id)?;
    if !AttendanceRepo::remove(&state.pool, user_id, date).await? {
        return Err(not_found(user_id, date));
    }
    tracing::info!(user_id, %date, "Attendance removed");
    Ok(StatusCode::NO_CONTENT)
}
