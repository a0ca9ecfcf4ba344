//! Route definitions for the `/attendance` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::attendance;
use crate::state::AppState;

/// Routes mounted at `/attendance`.
///
/// ```text
/// GET    /                     -> list (?start=&end=&user_id=)
/// POST   /                     -> mark
/// GET    /today                -> today
/// PUT    /{user_id}/{date}     -> update
/// DELETE /{user_id}/{date}     -> remove
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(attendance::list).post(attendance::mark))
        .route("/today", get(attendance::today))
        .route(
            "/{user_id}/{date}",
            put(attendance::update).delete(attendance::remove),
        )
}
