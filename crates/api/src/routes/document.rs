//! Route definitions for the `/documents` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;

use crate::handlers::document;
use crate::state::AppState;

/// Routes mounted at `/documents`.
///
/// ```text
/// GET    /{id}         -> get_by_id
/// PUT    /{id}         -> update
/// DELETE /{id}         -> delete
/// GET    /{id}/file    -> download
/// POST   /{id}/file    -> upload (multipart, field `file`)
/// ```
///
/// `max_upload_bytes` lifts axum's default body limit for the upload route;
/// the handler re-checks the file size itself.
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/{id}",
            get(document::get_by_id)
                .put(document::update)
                .delete(document::delete),
        )
        .route(
            "/{id}/file",
            get(document::download)
                .post(document::upload)
                .layer(DefaultBodyLimit::max(max_upload_bytes.saturating_add(64 * 1024))),
        )
}
