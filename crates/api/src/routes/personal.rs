//! Route definitions for self-service resources: todos, time sheets,
//! notifications and comment deletion.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{comment, notification, time_sheet, todo};
use crate::state::AppState;

/// Routes mounted at `/todos`.
///
/// ```text
/// GET    /              -> list
/// POST   /              -> create
/// GET    /{id}          -> get_by_id
/// PUT    /{id}          -> update
/// DELETE /{id}          -> delete
/// POST   /{id}/toggle   -> toggle
/// ```
pub fn todo_router() -> Router<AppState> {
    Router::new()
        .route("/", get(todo::list).post(todo::create))
        .route(
            "/{id}",
            get(todo::get_by_id).put(todo::update).delete(todo::delete),
        )
        .route("/{id}/toggle", post(todo::toggle))
}

/// Routes mounted at `/time-sheets`.
///
/// ```text
/// GET    /        -> list (?start=&end=)
/// POST   /        -> create
/// GET    /{id}    -> get_by_id
/// PUT    /{id}    -> update
/// DELETE /{id}    -> delete
/// ```
pub fn time_sheet_router() -> Router<AppState> {
    Router::new()
        .route("/", get(time_sheet::list).post(time_sheet::create))
        .route(
            "/{id}",
            get(time_sheet::get_by_id)
                .put(time_sheet::update)
                .delete(time_sheet::delete),
        )
}

/// Routes mounted at `/notifications`.
///
/// ```text
/// GET    /               -> list (?unread_only=&limit=&offset=)
/// GET    /unread-count   -> unread_count
/// POST   /read-all       -> mark_all_read
/// POST   /{id}/read      -> mark_read
/// ```
pub fn notification_router() -> Router<AppState> {
    Router::new()
        .route("/", get(notification::list))
        .route("/unread-count", get(notification::unread_count))
        .route("/read-all", post(notification::mark_all_read))
        .route("/{id}/read", post(notification::mark_read))
}

/// Routes mounted at `/comments`.
///
/// ```text
/// DELETE /{id}    -> delete (author or admin)
/// ```
pub fn comment_router() -> Router<AppState> {
    Router::new().route("/{id}", delete(comment::delete))
}
