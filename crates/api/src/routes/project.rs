//! Route definitions for the `/projects` resource.
//!
//! Also nests the project-scoped task, document, comment and customer
//! settlement routes under `/projects/{project_id}/...`.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::{comment, customer_settlement, document, project, task};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                                      -> list
/// POST   /                                      -> create (admin)
/// GET    /{id}                                  -> get_by_id
/// PUT    /{id}                                  -> update (admin)
/// DELETE /{id}                                  -> delete (admin)
/// PUT    /{id}/status                           -> set_status (admin)
/// PUT    /{id}/dates                            -> set_dates (admin)
/// GET    /{id}/progress                         -> progress
///
/// GET    /{project_id}/tasks                    -> project::list_tasks
/// POST   /{project_id}/tasks                    -> task::create
/// GET    /{project_id}/tasks/tree               -> project::task_tree
///
/// GET    /{project_id}/documents                -> document::list_by_project
/// POST   /{project_id}/documents                -> document::create
///
/// GET    /{project_id}/comments                 -> comment::list
/// POST   /{project_id}/comments                 -> comment::create
///
/// GET    /{project_id}/customer-settlement      -> customer_settlement::get_for_project
/// POST   /{project_id}/customer-settlement      -> customer_settlement::create (admin)
/// DELETE /{project_id}/customer-settlement      -> customer_settlement::delete (admin)
/// ```
pub fn router() -> Router<AppState> {
    let task_routes = Router::new()
        .route("/", get(project::list_tasks).post(task::create))
        .route("/tree", get(project::task_tree));

    let document_routes =
        Router::new().route("/", get(document::list_by_project).post(document::create));

    let comment_routes = Router::new().route("/", get(comment::list).post(comment::create));

    Router::new()
        .route("/", get(project::list).post(project::create))
        .route(
            "/{id}",
            get(project::get_by_id)
                .put(project::update)
                .delete(project::delete),
        )
        .route("/{id}/status", put(project::set_status))
        .route("/{id}/dates", put(project::set_dates))
        .route("/{id}/progress", get(project::progress))
        .route(
            "/{project_id}/customer-settlement",
            get(customer_settlement::get_for_project)
                .post(customer_settlement::create)
                .delete(customer_settlement::delete),
        )
        .nest("/{project_id}/tasks", task_routes)
        .nest("/{project_id}/documents", document_routes)
        .nest("/{project_id}/comments", comment_routes)
}
