//! Handlers for self-reported time sheets.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use pms_core::error::CoreError;
use pms_core::types::DbId;
use pms_db::models::time_sheet::{CreateTimeSheet, TimeSheet, UpdateTimeSheet};
use pms_db::repositories::TimeSheetRepo;
use serde::Serialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireStaff;
use crate::query::DateRangeParams;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TimeSheetList {
    pub data: Vec<TimeSheet>,
    pub total_minutes: i64,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "TimeSheet",
        id,
    })
}

/// GET /api/v1/time-sheets?start=&end=
///
/// The caller's entries, optionally within a date range, with their total.
pub async fn list(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Query(params): Query<DateRangeParams>,
) -> AppResult<Json<TimeSheetList>> {
    let range = params.range()?;
    let sheets = TimeSheetRepo::list(&state.pool, user.user_id, range.as_ref()).await?;
    Ok(Json(TimeSheetList {
        total_minutes: sheets.iter().map(TimeSheet::total_minutes).sum(),
        data: sheets,
    }))
}

/// POST /api/v1/time-sheets
pub async fn create(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Json(input): Json<CreateTimeSheet>,
) -> AppResult<(StatusCode, Json<TimeSheet>)> {
    input.validate()?;
    let work_date = input.work_date.unwrap_or_else(|| Utc::now().date_naive());
    let sheet = TimeSheetRepo::create(&state.pool, user.user_id, work_date, &input).await?;
    Ok((StatusCode::CREATED, Json(sheet)))
}

/// GET /api/v1/time-sheets/{id}
pub async fn get_by_id(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<TimeSheet>> {
    let sheet = TimeSheetRepo::find(&state.pool, user.user_id, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(sheet))
}

/// PUT /api/v1/time-sheets/{id}
pub async fn update(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTimeSheet>,
) -> AppResult<Json<TimeSheet>> {
    input.validate()?;
    let sheet = TimeSheetRepo::update(&state.pool, user.user_id, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(sheet))
}

/// DELETE /api/v1/time-sheets/{id}
pub async fn delete(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !TimeSheetRepo::delete(&state.pool, user.user_id, id).await? {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}
