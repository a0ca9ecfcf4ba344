//! Handlers for the `/projects` resource: CRUD, status, dates, task tree
//! and progress.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use pms_core::calendar::DateRange;
use pms_core::error::CoreError;
use pms_core::progress::{summarize, ProgressSummary};
use pms_core::status::ProjectStatus;
use pms_core::task_tree::{build_forest, TaskForest};
use pms_core::types::DbId;
use pms_db::models::project::{
    CreateProject, Project, UpdateProject, UpdateProjectDates, UpdateProjectStatus,
};
use pms_db::models::task::Task;
use pms_db::repositories::{DocumentRepo, ProjectRepo, TaskRepo};
use serde::Serialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{AuthUser, Scope};
use crate::middleware::rbac::{ensure_project_access, RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

/// Response for `GET /projects/{id}/progress`.
#[derive(Debug, Serialize)]
pub struct ProjectProgress {
    pub project_id: DbId,
    pub code: String,
    pub total_amount: f64,
    #[serde(flatten)]
    pub summary: ProgressSummary,
    /// Tasks that could not be placed in the tree (missing parent or cycle).
    pub detached_tasks: usize,
}

pub(crate) fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Project",
        id,
    })
}

/// Load a project the caller is allowed to see.
pub(crate) async fn load_for(state: &AppState, user: &AuthUser, id: DbId) -> AppResult<Project> {
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    ensure_project_access(user, &project)?;
    Ok(project)
}

/// GET /api/v1/projects
///
/// Admins see every project, members the projects they have tasks on,
/// customers their own.
pub async fn list(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let projects = match user.scope {
        Scope::Admin => ProjectRepo::list(&state.pool).await?,
        Scope::Member => ProjectRepo::list_for_assignee(&state.pool, user.user_id).await?,
        Scope::Customer(customer_id) => {
            ProjectRepo::list_for_customer(&state.pool, customer_id).await?
        }
    };
    Ok(Json(DataResponse { data: projects }))
}

/// POST /api/v1/projects
pub async fn create(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateProject>,
) -> AppResult<(StatusCode, Json<Project>)> {
    input.validate()?;
    if let Some(status) = input.status.as_deref() {
        status.parse::<ProjectStatus>()?;
    }
    if let (Some(start), Some(due)) = (input.start_date, input.due_date) {
        DateRange::new(start, due)?;
    }

    let project = ProjectRepo::create(&state.pool, &input).await?;
    tracing::info!(project_id = project.id, code = %project.code(), "Project created");
    Ok((StatusCode::CREATED, Json(project)))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Project>> {
    Ok(Json(load_for(&state, &user, id).await?))
}

/// PUT /api/v1/projects/{id}
pub async fn update(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProject>,
) -> AppResult<Json<Project>> {
    input.validate()?;
    let project = ProjectRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(project))
}

/// PUT /api/v1/projects/{id}/status
pub async fn set_status(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProjectStatus>,
) -> AppResult<Json<Project>> {
    let status: ProjectStatus = input.status.parse()?;
    let project = ProjectRepo::set_status(&state.pool, id, status)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(project_id = id, status = %status, "Project status changed");
    Ok(Json(project))
}

/// PUT /api/v1/projects/{id}/dates
pub async fn set_dates(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProjectDates>,
) -> AppResult<Json<Project>> {
    if let (Some(start), Some(due)) = (input.start_date, input.due_date) {
        DateRange::new(start, due)?;
    }
    let project = ProjectRepo::set_dates(&state.pool, id, input.start_date, input.due_date)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(project))
}

/// DELETE /api/v1/projects/{id}
///
/// Removes the project with its tasks, settlements, documents and comments.
/// Uploaded document files are removed from the blob store first.
pub async fn delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let documents = DocumentRepo::list_by_project(&state.pool, id).await?;
    if !ProjectRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    for key in documents.iter().filter_map(|d| d.storage_key.as_deref()) {
        if let Err(e) = state.blob_store.delete(key).await {
            tracing::warn!(project_id = id, key, error = %e, "Failed to remove document blob");
        }
    }
    tracing::info!(project_id = id, "Project deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/projects/{id}/tasks
///
/// Flat task list in creation order.
pub async fn list_tasks(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Task>>>> {
    load_for(&state, &user, id).await?;
    let tasks = TaskRepo::list_by_project(&state.pool, id).await?;
    Ok(Json(DataResponse { data: tasks }))
}

/// GET /api/v1/projects/{id}/tasks/tree
pub async fn task_tree(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<TaskForest<Task>>> {
    load_for(&state, &user, id).await?;
    let tasks = TaskRepo::list_by_project(&state.pool, id).await?;
    let forest = build_forest(tasks);
    if !forest.detached.is_empty() {
        tracing::warn!(
            project_id = id,
            detached = forest.detached.len(),
            "Project has tasks outside the tree"
        );
    }
    Ok(Json(forest))
}

/// GET /api/v1/projects/{id}/progress
pub async fn progress(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ProjectProgress>> {
    let project = load_for(&state, &user, id).await?;
    let forest = build_forest(TaskRepo::list_by_project(&state.pool, id).await?);
    let summary = summarize(&forest.roots, Utc::now().date_naive());

    Ok(Json(ProjectProgress {
        project_id: project.id,
        code: project.code(),
        total_amount: project.total_amount,
        summary,
        detached_tasks: forest.detached.len(),
    }))
}
