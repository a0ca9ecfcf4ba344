//! Route definitions for the `/calendar` views.

use axum::routing::get;
use axum::Router;

use crate::handlers::calendar;
use crate::state::AppState;

/// Routes mounted at `/calendar`.
///
/// ```text
/// GET    /           -> month (?year=&month=&user_id=)
/// GET    /metrics    -> metrics (?start=&end=&user_id=)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(calendar::month))
        .route("/metrics", get(calendar::metrics))
}
