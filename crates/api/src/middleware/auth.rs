//! Bearer-token authentication.
//!
//! [`AuthUser`] decodes the access token and resolves it to a [`Scope`]
//! up front, so handlers branch on a closed set of cases instead of comparing
//! role strings.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use pms_core::error::CoreError;
use pms_core::roles::{ROLE_ADMIN, ROLE_CUSTOMER, ROLE_MEMBER};
use pms_core::types::DbId;

use crate::auth::jwt::{validate_token, Claims};
use crate::error::AppError;
use crate::state::AppState;

/// What a signed-in user is allowed to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Admin,
    Member,
    /// A customer login, confined to records of this customer.
    Customer(DbId),
}

impl Scope {
    fn from_claims(claims: &Claims) -> Result<Self, AppError> {
        match (claims.role.as_str(), claims.customer_id) {
            (ROLE_ADMIN, _) => Ok(Scope::Admin),
            (ROLE_MEMBER, _) => Ok(Scope::Member),
            (ROLE_CUSTOMER, Some(customer_id)) => Ok(Scope::Customer(customer_id)),
            (ROLE_CUSTOMER, None) => Err(unauthorized("Customer token carries no customer")),
            (other, _) => Err(unauthorized(&format!("Unknown role '{other}' in token"))),
        }
    }
}

/// Authenticated user extracted from the `Authorization: Bearer` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub role: String,
    pub customer_id: Option<DbId>,
    pub scope: Scope,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.scope == Scope::Admin
    }

    pub fn is_customer(&self) -> bool {
        matches!(self.scope, Scope::Customer(_))
    }

    /// Admins and members.
    pub fn is_staff(&self) -> bool {
        !self.is_customer()
    }
}

fn unauthorized(message: &str) -> AppError {
    AppError::Core(CoreError::Unauthorized(message.to_string()))
}

fn bearer_token(parts: &Parts) -> Result<&str, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;

    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| unauthorized("Invalid Authorization format. Expected: Bearer <token>"))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = validate_token(token, &state.config.jwt)
            .map_err(|_| unauthorized("Invalid or expired token"))?;
        let scope = Scope::from_claims(&claims)?;

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
            customer_id: claims.customer_id,
            scope,
        })
    }
}
