pub mod admin;
pub mod attendance;
pub mod auth;
pub mod calendar;
pub mod currency;
pub mod customer;
pub mod document;
pub mod enquiry;
pub mod health;
pub mod holiday;
pub mod outsource_team;
pub mod personal;
pub mod project;
pub mod settlement;
pub mod task;
pub mod time_off;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup|login|refresh|logout|me|password     authentication
///
/// /admin/users                                      user management (admin)
/// /admin/users/{id}/verify|reset-password
///
/// /currencies                                       currency list, CRUD (admin)
/// /customers                                        customers, their projects,
/// /customers/{id}/projects|settlements|logins       settlements and logins
/// /outsource-teams                                  teams, their tasks and settlements
///
/// /enquiries                                        enquiries + deliverables
/// /enquiries/{id}/status|convert
///
/// /projects                                         projects
/// /projects/{id}/status|dates|progress
/// /projects/{id}/tasks, /tasks/tree                 flat list, create, tree
/// /projects/{id}/documents|comments
/// /projects/{id}/customer-settlement
///
/// /tasks/{id}                                       detail, update, cascade delete
/// /tasks/{id}/parent|path|children|percentages
/// /tasks/{id}/assignees|timer/start|timer/stop|time-entries|settlements
/// /me/tasks                                         tasks assigned to the caller
///
/// /attendance, /attendance/today                    daily marks
/// /time-off, /time-off/all                          leave / WFH / OOO requests
/// /holidays                                         company holidays
/// /calendar, /calendar/metrics                      month grid, day counts
///
/// /settlements                                      outsource-team ledger (admin)
/// /customer-settlements/{id}/payments               customer ledger (admin)
/// /documents/{id}, /documents/{id}/file             metadata, upload, download
/// /comments/{id}                                    delete
///
/// /todos, /time-sheets, /notifications              self-service
/// ```
pub fn api_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/admin", admin::router())
        .nest("/currencies", currency::router())
        .nest("/customers", customer::router())
        .nest("/outsource-teams", outsource_team::router())
        .nest("/enquiries", enquiry::router())
        .nest("/projects", project::router())
        .nest("/tasks", task::router())
        .nest("/me", task::me_router())
        .nest("/attendance", attendance::router())
        .nest("/time-off", time_off::router())
        .nest("/holidays", holiday::router())
        .nest("/calendar", calendar::router())
        .nest("/settlements", settlement::router())
        .nest("/customer-settlements", settlement::customer_router())
        .nest("/documents", document::router(max_upload_bytes))
        .nest("/comments", personal::comment_router())
        .nest("/todos", personal::todo_router())
        .nest("/time-sheets", personal::time_sheet_router())
        .nest("/notifications", personal::notification_router())
}
