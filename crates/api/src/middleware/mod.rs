//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`]: the caller, decoded from a JWT Bearer token.
//! - [`rbac::RequireAdmin`]: requires the `admin` role.
//! - [`rbac::RequireStaff`]: requires `admin` or `member` (no customer logins).
//! - [`rbac::RequireAuth`]: any authenticated user.

pub mod auth;
pub mod rbac;
