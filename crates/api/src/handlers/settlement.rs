//! Handlers for outsource-team settlements and their payment ledger.
//!
//! Every payment mutation re-derives the settlement status in the same
//! transaction; handlers return the resulting detail view.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use pms_core::error::CoreError;
use pms_core::settlement::{balance, validate_payment};
use pms_core::types::DbId;
use pms_db::models::settlement::{
    CreatePayment, CreateSettlement, Settlement, SettlementDetail, UpdatePayment,
    UpdateSettlement,
};
use pms_db::repositories::{OutsourceTeamRepo, SettlementRepo, TaskRepo};
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Settlement",
        id,
    })
}

fn payment_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "SettlementPayment",
        id,
    })
}

async fn detail(state: &AppState, settlement: Settlement) -> AppResult<SettlementDetail> {
    let payments = SettlementRepo::list_payments(&state.pool, settlement.id).await?;
    let paid_amount = SettlementRepo::paid_amount(&state.pool, settlement.id).await?;
    Ok(SettlementDetail {
        balance: balance(paid_amount, settlement.total_amount),
        paid_amount,
        payments,
        settlement,
    })
}

/// POST /api/v1/settlements
///
/// Open a settlement between a task and an outsource team. When the task is
/// already outsourced, the team must match.
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateSettlement>,
) -> AppResult<(StatusCode, Json<SettlementDetail>)> {
    input.validate()?;
    let task = TaskRepo::find_by_id(&state.pool, input.task_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Task",
            id: input.task_id,
        })?;
    OutsourceTeamRepo::find_by_id(&state.pool, input.outsource_team_id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "OutsourceTeam",
            id: input.outsource_team_id,
        })?;
    if let Some(team_id) = task.outsource_team_id {
        if team_id != input.outsource_team_id {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Task {} is outsourced to team {team_id}, not {}",
                task.id, input.outsource_team_id
            ))));
        }
    }

    let settlement = SettlementRepo::create(&state.pool, &input).await?;
    tracing::info!(
        settlement_id = settlement.id,
        task_id = settlement.task_id,
        team_id = settlement.outsource_team_id,
        created_by = admin.user_id,
        "Settlement opened",
    );
    Ok((StatusCode::CREATED, Json(detail(&state, settlement).await?)))
}

/// GET /api/v1/settlements/{id}
pub async fn get_by_id(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<SettlementDetail>> {
    let settlement = SettlementRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(detail(&state, settlement).await?))
}

/// PUT /api/v1/settlements/{id}
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateSettlement>,
) -> AppResult<Json<SettlementDetail>> {
    input.validate()?;
    let settlement = SettlementRepo::update_total(&state.pool, id, input.total_amount)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(detail(&state, settlement).await?))
}

/// DELETE /api/v1/settlements/{id}
pub async fn delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !SettlementRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/settlements/{id}/payments
pub async fn add_payment(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreatePayment>,
) -> AppResult<(StatusCode, Json<SettlementDetail>)> {
    input.validate()?;
    validate_payment(input.amount)?;
    SettlementRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let settlement = SettlementRepo::add_payment(&state.pool, id, &input).await?;
    tracing::info!(settlement_id = id, amount = input.amount, status = %settlement.status, "Payment recorded");
    Ok((StatusCode::CREATED, Json(detail(&state, settlement).await?)))
}

/// PUT /api/v1/settlements/{id}/payments/{payment_id}
pub async fn update_payment(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((id, payment_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdatePayment>,
) -> AppResult<Json<SettlementDetail>> {
    input.validate()?;
    if let Some(amount) = input.amount {
        validate_payment(amount)?;
    }
    let settlement = SettlementRepo::update_payment(&state.pool, id, payment_id, &input)
        .await?
        .ok_or_else(|| payment_not_found(payment_id))?;
    Ok(Json(detail(&state, settlement).await?))
}

/// DELETE /api/v1/settlements/{id}/payments/{payment_id}
pub async fn delete_payment(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((id, payment_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<SettlementDetail>> {
    let settlement = SettlementRepo::delete_payment(&state.pool, id, payment_id)
        .await?
        .ok_or_else(|| payment_not_found(payment_id))?;
    Ok(Json(detail(&state, settlement).await?))
}
