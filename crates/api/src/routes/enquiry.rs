//! Route definitions for the `/enquiries` resource.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::enquiry;
use crate::state::AppState;

/// Routes mounted at `/enquiries`.
///
/// ```text
/// GET    /                                   -> list (?customer_id=)
/// POST   /                                   -> create
/// GET    /{id}                               -> get_by_id
/// PUT    /{id}                               -> update
/// DELETE /{id}                               -> delete
/// PUT    /{id}/status                        -> set_status
/// POST   /{id}/deliverables                  -> add_deliverable
/// DELETE /{id}/deliverables/{deliverable_id} -> delete_deliverable
/// POST   /{id}/convert                       -> convert
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(enquiry::list).post(enquiry::create))
        .route(
            "/{id}",
            get(enquiry::get_by_id)
                .put(enquiry::update)
                .delete(enquiry::delete),
        )
        .route("/{id}/status", put(enquiry::set_status))
        .route("/{id}/deliverables", post(enquiry::add_deliverable))
        .route(
            "/{id}/deliverables/{deliverable_id}",
            delete(enquiry::delete_deliverable),
        )
        .route("/{id}/convert", post(enquiry::convert))
}
