//! Route definitions for the `/time-off` resource (leave, WFH, OOO).

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::time_off;
use crate::state::AppState;

/// Routes mounted at `/time-off`.
///
/// ```text
/// GET    /                  -> list_mine (?kind=)
/// POST   /                  -> create
/// GET    /all               -> list_all (admin, ?kind=&status=)
/// GET    /{id}              -> get_by_id
/// DELETE /{id}              -> cancel (pending only)
/// PUT    /{id}/dates        -> update_dates
/// PUT    /{id}/decision     -> decide (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(time_off::list_mine).post(time_off::create))
        .route("/all", get(time_off::list_all))
        .route("/{id}", get(time_off::get_by_id).delete(time_off::cancel))
        .route("/{id}/dates", put(time_off::update_dates))
        .route("/{id}/decision", put(time_off::decide))
}
