//! Route definitions for the `/customers` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::customer;
use crate::state::AppState;

/// Routes mounted at `/customers`.
///
/// ```text
/// GET    /                  -> list
/// POST   /                  -> create
/// GET    /{id}              -> get_by_id
/// PUT    /{id}              -> update
/// DELETE /{id}              -> delete
/// GET    /{id}/projects     -> list_projects
/// GET    /{id}/settlements  -> list_settlements
/// GET    /{id}/logins       -> list_logins
/// POST   /{id}/logins       -> create_login
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(customer::list).post(customer::create))
        .route(
            "/{id}",
            get(customer::get_by_id)
                .put(customer::update)
                .delete(customer::delete),
        )
        .route("/{id}/projects", get(customer::list_projects))
        .route("/{id}/settlements", get(customer::list_settlements))
        .route(
            "/{id}/logins",
            get(customer::list_logins).post(customer::create_login),
        )
}
