//! Handlers for the `/customers` resource, including customer logins.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use pms_core::error::CoreError;
use pms_core::roles::ROLE_CUSTOMER;
use pms_core::types::DbId;
use pms_db::models::customer::{CreateCustomer, Customer, UpdateCustomer};
use pms_db::models::project::Project;
use pms_db::models::settlement::CustomerSettlement;
use pms_db::models::user::{CreateUser, UserResponse};
use pms_db::repositories::{CustomerRepo, CustomerSettlementRepo, ProjectRepo, UserRepo};
use serde::Deserialize;
use validator::Validate;

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{ensure_customer_scope, RequireAdmin, RequireAuth, RequireStaff};
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `POST /customers/{id}/logins`.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerLogin {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1, max = 200))]
    pub full_name: String,
    pub password: String,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Customer",
        id,
    })
}

async fn load(state: &AppState, id: DbId) -> AppResult<Customer> {
    CustomerRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

/// GET /api/v1/customers
pub async fn list(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Customer>>>> {
    let customers = CustomerRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: customers }))
}

/// POST /api/v1/customers
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateCustomer>,
) -> AppResult<(StatusCode, Json<Customer>)> {
    input.validate()?;
    let customer = CustomerRepo::create(&state.pool, &input).await?;
    tracing::info!(customer_id = customer.id, "Customer created");
    Ok((StatusCode::CREATED, Json(customer)))
}

/// GET /api/v1/customers/{id}
pub async fn get_by_id(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Customer>> {
    ensure_customer_scope(&user, Some(id))?;
    Ok(Json(load(&state, id).await?))
}

/// PUT /api/v1/customers/{id}
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCustomer>,
) -> AppResult<Json<Customer>> {
    input.validate()?;
    let customer = CustomerRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(customer))
}

/// DELETE /api/v1/customers/{id}
pub async fn delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if CustomerRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// GET /api/v1/customers/{id}/projects
pub async fn list_projects(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    ensure_customer_scope(&user, Some(id))?;
    load(&state, id).await?;
    let projects = ProjectRepo::list_for_customer(&state.pool, id).await?;
    Ok(Json(DataResponse { data: projects }))
}

/// GET /api/v1/customers/{id}/settlements
pub async fn list_settlements(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<CustomerSettlement>>>> {
    ensure_customer_scope(&user, Some(id))?;
    load(&state, id).await?;
    let settlements = CustomerSettlementRepo::list_for_customer(&state.pool, id).await?;
    Ok(Json(DataResponse { data: settlements }))
}

/// GET /api/v1/customers/{id}/logins
pub async fn list_logins(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    load(&state, id).await?;
    let users = UserRepo::list_for_customer(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: users.iter().map(UserResponse::from).collect(),
    }))
}

/// POST /api/v1/customers/{id}/logins
///
/// Issue login credentials to a customer contact. The account is verified
/// immediately and scoped to this customer's projects.
pub async fn create_login(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateCustomerLogin>,
) -> AppResult<(StatusCode, Json<UserResponse>)> {
    input.validate()?;
    validate_password_strength(&input.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;
    load(&state, id).await?;

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            email: input.email.trim().to_string(),
            full_name: input.full_name.trim().to_string(),
            password_hash,
            role: ROLE_CUSTOMER.to_string(),
            is_verified: true,
            customer_id: Some(id),
        },
    )
    .await?;

    tracing::info!(
        customer_id = id,
        user_id = user.id,
        admin_id = admin.user_id,
        "Customer login created"
    );
    Ok((StatusCode::CREATED, Json(UserResponse::from(&user))))
}
