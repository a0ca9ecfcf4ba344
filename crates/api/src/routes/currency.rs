//! Route definitions for the `/currencies` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::currency;
use crate::state::AppState;

/// Routes mounted at `/currencies`.
///
/// ```text
/// GET    /        -> list
/// POST   /        -> create (admin)
/// PUT    /{id}    -> update (admin)
/// DELETE /{id}    -> delete (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(currency::list).post(currency::create))
        .route("/{id}", put(currency::update).delete(currency::delete))
}
