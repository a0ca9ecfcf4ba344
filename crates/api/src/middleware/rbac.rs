//! Role-based access control extractors and ownership checks.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the requirement with 403.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use pms_core::error::CoreError;
use pms_core::types::DbId;
use pms_db::models::project::Project;

use super::auth::{AuthUser, Scope};
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `admin` role.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Admin role required".into(),
            )));
        }
        Ok(RequireAdmin(user))
    }
}

/// Requires an internal user: `admin` or `member`.
pub struct RequireStaff(pub AuthUser);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_staff() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Member or Admin role required".into(),
            )));
        }
        Ok(RequireStaff(user))
    }
}

/// Requires any authenticated user.
///
/// Same as [`AuthUser`], named for routes where "signed in" is the whole rule.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        Ok(RequireAuth(user))
    }
}

/// Customers may only see projects that belong to their customer record.
pub fn ensure_project_access(user: &AuthUser, project: &Project) -> Result<(), AppError> {
    ensure_customer_scope(user, project.customer_id)
}

/// Reject a customer login whose customer differs from `owner`.
pub fn ensure_customer_scope(user: &AuthUser, owner: Option<DbId>) -> Result<(), AppError> {
    match user.scope {
        Scope::Customer(customer_id) if owner != Some(customer_id) => Err(AppError::Core(
            CoreError::Forbidden("This record belongs to another customer".into()),
        )),
        _ => Ok(()),
    }
}

/// Only admins may act on another user's records.
pub fn ensure_self_or_admin(user: &AuthUser, target_user_id: DbId) -> Result<(), AppError> {
    if user.user_id != target_user_id && !user.is_admin() {
        return Err(AppError::Core(CoreError::Forbidden(
            "Admin role required to act for another user".into(),
        )));
    }
    Ok(())
}
