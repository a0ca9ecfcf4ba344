//! Handlers for the `/currencies` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use pms_core::error::CoreError;
use pms_core::types::DbId;
use pms_db::models::currency::{CreateCurrency, Currency, UpdateCurrency};
use pms_db::repositories::CurrencyRepo;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Currency",
        id,
    })
}

/// GET /api/v1/currencies
pub async fn list(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Currency>>>> {
    let currencies = CurrencyRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: currencies }))
}

/// POST /api/v1/currencies
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateCurrency>,
) -> AppResult<(StatusCode, Json<Currency>)> {
    input.validate()?;
    let currency = CurrencyRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(currency)))
}

/// PUT /api/v1/currencies/{id}
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCurrency>,
) -> AppResult<Json<Currency>> {
    let currency = CurrencyRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(currency))
}

/// DELETE /api/v1/currencies/{id}
///
/// Mandatory currencies are refused with 409.
pub async fn delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let currency = CurrencyRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    if currency.is_mandatory {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Currency '{}' is mandatory and cannot be deleted",
            currency.name
        ))));
    }
    CurrencyRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
