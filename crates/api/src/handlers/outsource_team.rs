//! Handlers for the `/outsource-teams` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use pms_core::error::CoreError;
use pms_core::types::DbId;
use pms_db::models::outsource_team::{CreateOutsourceTeam, OutsourceTeam, UpdateOutsourceTeam};
use pms_db::models::settlement::Settlement;
use pms_db::models::task::Task;
use pms_db::repositories::{OutsourceTeamRepo, SettlementRepo, TaskRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireStaff};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "OutsourceTeam",
        id,
    })
}

async fn load(state: &AppState, id: DbId) -> AppResult<OutsourceTeam> {
    OutsourceTeamRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// GET /api/v1/outsource-teams
pub async fn list(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<OutsourceTeam>>>> {
    let teams = OutsourceTeamRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: teams }))
}

/// POST /api/v1/outsource-teams
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateOutsourceTeam>,
) -> AppResult<(StatusCode, Json<OutsourceTeam>)> {
    input.validate()?;
    let team = OutsourceTeamRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(team)))
}

/// GET /api/v1/outsource-teams/{id}
pub async fn get_by_id(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<OutsourceTeam>> {
    Ok(Json(load(&state, id).await?))
}

/// PUT /api/v1/outsource-teams/{id}
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateOutsourceTeam>,
) -> AppResult<Json<OutsourceTeam>> {
    input.validate()?;
    let team = OutsourceTeamRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(team))
}

/// DELETE /api/v1/outsource-teams/{id}
pub async fn delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if OutsourceTeamRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// GET /api/v1/outsource-teams/{id}/tasks
pub async fn list_tasks(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Task>>>> {
    load(&state, id).await?;
    let tasks = TaskRepo::list_by_outsource_team(&state.pool, id).await?;
    Ok(Json(DataResponse { data: tasks }))
}

/// GET /api/v1/outsource-teams/{id}/settlements
pub async fn list_settlements(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Settlement>>>> {
    load(&state, id).await?;
    let settlements = SettlementRepo::list_by_team(&state.pool, id).await?;
    Ok(Json(DataResponse { data: settlements }))
}
