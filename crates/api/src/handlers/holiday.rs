//! Handlers for company holidays. Everyone can read; admins write.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use pms_core::calendar::DateRange;
use pms_core::error::CoreError;
use pms_core::types::DbId;
use pms_db::models::holiday::{CreateHoliday, Holiday, UpdateHoliday};
use pms_db::repositories::HolidayRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::DateRangeParams;
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Holiday",
        id,
    })
}

/// GET /api/v1/holidays?start=&end=
///
/// Without bounds every holiday is returned.
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<DateRangeParams>,
) -> AppResult<Json<DataResponse<Vec<Holiday>>>> {
    let holidays = match params.range()? {
        Some(range) => HolidayRepo::list_range(&state.pool, &range).await?,
        None => HolidayRepo::list(&state.pool).await?,
    };
    Ok(Json(DataResponse { data: holidays }))
}

/// GET /api/v1/holidays/{id}
pub async fn get_by_id(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Holiday>> {
    let holiday = HolidayRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(holiday))
}

/// POST /api/v1/holidays
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateHoliday>,
) -> AppResult<(StatusCode, Json<Holiday>)> {
    input.validate()?;
    DateRange::new(input.start_date, input.end_date)?;

    let holiday = HolidayRepo::create(&state.pool, &input).await?;
    tracing::info!(holiday_id = holiday.id, name = %holiday.name, "Holiday created");
    Ok((StatusCode::CREATED, Json(holiday)))
}

/// PUT /api/v1/holidays/{id}
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateHoliday>,
) -> AppResult<Json<Holiday>> {
    if input.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::Core(CoreError::Validation(
            "Holiday name must not be empty".into(),
        )));
    }
    let existing = HolidayRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    DateRange::new(
        input.start_date.unwrap_or(existing.start_date),
        input.end_date.unwrap_or(existing.end_date),
    )?;

    let holiday = HolidayRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(holiday))
}

/// DELETE /api/v1/holidays/{id}
pub async fn delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !HolidayRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}
