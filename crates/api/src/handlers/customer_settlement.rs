//! Handlers for the per-project customer settlement.
//!
//! The amount owed tracks the project's `total_amount`. Customers can read
//! the settlement of their own projects; only admins record payments.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use pms_core::error::CoreError;
use pms_core::settlement::{balance, validate_payment};
use pms_core::types::DbId;
use pms_db::models::settlement::{
    CreateCustomerPayment, CustomerSettlement, CustomerSettlementDetail, UpdateCustomerPayment,
};
use pms_db::repositories::CustomerSettlementRepo;
use validator::Validate;

use super::project;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "CustomerSettlement",
        id,
    })
}

fn payment_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "CustomerPayment",
        id,
    })
}

async fn detail(
    state: &AppState,
    settlement: CustomerSettlement,
) -> AppResult<CustomerSettlementDetail> {
    let payments = CustomerSettlementRepo::list_payments(&state.pool, settlement.id).await?;
    let paid_amount = CustomerSettlementRepo::paid_amount(&state.pool, settlement.id).await?;
    Ok(CustomerSettlementDetail {
        balance: balance(paid_amount, settlement.total_amount),
        paid_amount,
        payments,
        settlement,
    })
}

async fn find_for_project(state: &AppState, project_id: DbId) -> AppResult<CustomerSettlement> {
    CustomerSettlementRepo::find_by_project(&state.pool, project_id)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!("Project {project_id} has no customer settlement"))
        })
}

/// GET /api/v1/projects/{project_id}/customer-settlement
pub async fn get_for_project(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<CustomerSettlementDetail>> {
    project::load_for(&state, &user, project_id).await?;
    let settlement = find_for_project(&state, project_id).await?;
    Ok(Json(detail(&state, settlement).await?))
}

/// POST /api/v1/projects/{project_id}/customer-settlement
///
/// Opens the settlement against the project's customer. A project has at
/// most one; a second attempt is a conflict.
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<(StatusCode, Json<CustomerSettlementDetail>)> {
    let project = project::load_for(&state, &admin, project_id).await?;
    let customer_id = project.customer_id.ok_or_else(|| {
        AppError::Core(CoreError::Validation(format!(
            "Project {project_id} has no customer to settle with"
        )))
    })?;
    if CustomerSettlementRepo::find_by_project(&state.pool, project_id)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Project {project_id} already has a customer settlement"
        ))));
    }

    let settlement = CustomerSettlementRepo::create(&state.pool, project_id, customer_id).await?;
    tracing::info!(settlement_id = settlement.id, project_id, customer_id, "Customer settlement opened");
    Ok((StatusCode::CREATED, Json(detail(&state, settlement).await?)))
}

/// DELETE /api/v1/projects/{project_id}/customer-settlement
pub async fn delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<StatusCode> {
    let settlement = find_for_project(&state, project_id).await?;
    if !CustomerSettlementRepo::delete(&state.pool, settlement.id).await? {
        return Err(not_found(settlement.id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/customer-settlements/{id}/payments
pub async fn add_payment(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateCustomerPayment>,
) -> AppResult<(StatusCode, Json<CustomerSettlementDetail>)> {
    input.validate()?;
    validate_payment(input.amount)?;
    CustomerSettlementRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let settlement = CustomerSettlementRepo::add_payment(&state.pool, id, &input).await?;
    tracing::info!(settlement_id = id, amount = input.amount, status = %settlement.status, "Customer payment recorded");
    Ok((StatusCode::CREATED, Json(detail(&state, settlement).await?)))
}

/// PUT /api/v1/customer-settlements/{id}/payments/{payment_id}
pub async fn update_payment(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((id, payment_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateCustomerPayment>,
) -> AppResult<Json<CustomerSettlementDetail>> {
    input.validate()?;
    if let Some(amount) = input.amount {
        validate_payment(amount)?;
    }
    let settlement = CustomerSettlementRepo::update_payment(&state.pool, id, payment_id, &input)
        .await?
        .ok_or_else(|| payment_not_found(payment_id))?;
    Ok(Json(detail(&state, settlement).await?))
}

/// DELETE /api/v1/customer-settlements/{id}/payments/{payment_id}
pub async fn delete_payment(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path((id, payment_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<CustomerSettlementDetail>> {
    let settlement = CustomerSettlementRepo::delete_payment(&state.pool, id, payment_id)
        .await?
        .ok_or_else(|| payment_not_found(payment_id))?;
    Ok(Json(detail(&state, settlement).await?))
}
