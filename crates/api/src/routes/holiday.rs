//! Route definitions for the `/holidays` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::holiday;
use crate::state::AppState;

/// Routes mounted at `/holidays`.
///
/// ```text
/// GET    /        -> list (?start=&end=)
/// POST   /        -> create (admin)
/// GET    /{id}    -> get_by_id
/// PUT    /{id}    -> update (admin)
/// DELETE /{id}    -> delete (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(holiday::list).post(holiday::create))
        .route(
            "/{id}",
            get(holiday::get_by_id)
                .put(holiday::update)
                .delete(holiday::delete),
        )
}
