//! Route definitions for the `/tasks` resource.
//!
//! Tasks are created under `/projects/{project_id}/tasks`; everything that
//! addresses an existing task lives here.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::task;
use crate::state::AppState;

/// Routes mounted at `/tasks`.
///
/// ```text
/// GET    /{id}                -> get_by_id
/// PUT    /{id}                -> update
/// DELETE /{id}                -> delete (whole subtree)
/// PUT    /{id}/parent         -> move_task
/// GET    /{id}/path           -> path
/// GET    /{id}/children       -> children
/// PUT    /{id}/percentages    -> set_percentages
/// GET    /{id}/assignees      -> list_assignees
/// PUT    /{id}/assignees      -> set_assignees
/// POST   /{id}/timer/start    -> start_timer
/// POST   /{id}/timer/stop     -> stop_timer
/// GET    /{id}/time-entries   -> list_time_entries
/// GET    /{id}/settlements    -> list_settlements (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(task::get_by_id).put(task::update).delete(task::delete),
        )
        .route("/{id}/parent", put(task::move_task))
        .route("/{id}/path", get(task::path))
        .route("/{id}/children", get(task::children))
        .route("/{id}/percentages", put(task::set_percentages))
        .route(
            "/{id}/assignees",
            get(task::list_assignees).put(task::set_assignees),
        )
        .route("/{id}/timer/start", post(task::start_timer))
        .route("/{id}/timer/stop", post(task::stop_timer))
        .route("/{id}/time-entries", get(task::list_time_entries))
        .route("/{id}/settlements", get(task::list_settlements))
}

/// Routes mounted at `/me`.
///
/// ```text
/// GET    /tasks               -> list_mine
/// ```
pub fn me_router() -> Router<AppState> {
    Router::new().route("/tasks", get(task::list_mine))
}
