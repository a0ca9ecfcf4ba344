//! Route definitions for the `/outsource-teams` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::outsource_team;
use crate::state::AppState;

/// Routes mounted at `/outsource-teams`.
///
/// ```text
/// GET    /                  -> list
/// POST   /                  -> create
/// GET    /{id}              -> get_by_id
/// PUT    /{id}              -> update
/// DELETE /{id}              -> delete
/// GET    /{id}/tasks        -> list_tasks
/// GET    /{id}/settlements  -> list_settlements
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(outsource_team::list).post(outsource_team::create))
        .route(
            "/{id}",
            get(outsource_team::get_by_id)
                .put(outsource_team::update)
                .delete(outsource_team::delete),
        )
        .route("/{id}/tasks", get(outsource_team::list_tasks))
        .route("/{id}/settlements", get(outsource_team::list_settlements))
}
