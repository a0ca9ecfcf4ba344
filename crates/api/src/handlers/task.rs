//! Handlers for tasks: creation under a project, detail, edits, moves,
//! cascading deletes, percentage allocation, assignees and timers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use pms_core::error::CoreError;
use pms_core::progress::{children_progress, remaining_allocation, validate_allocation};
use pms_core::task_tree::{path_to, render_path, siblings, validate_reparent};
use pms_core::time_tracking::{self, total_minutes};
use pms_core::types::DbId;
use pms_db::models::settlement::Settlement;
use pms_db::models::task::{
    CreateTask, MoveTask, PercentageEntry, Task, TaskAssignee, TaskDetail, TimeEntry, UpdateTask,
};
use pms_db::repositories::{SettlementRepo, TaskRepo};
use pms_events::{event_types, DomainEvent};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::project;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireAuth, RequireStaff};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetAssignees {
    pub user_ids: Vec<DbId>,
}

#[derive(Debug, Serialize)]
pub struct TaskPath {
    pub task_id: DbId,
    pub ids: Vec<DbId>,
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct TaskChildren {
    pub data: Vec<Task>,
    /// Sum of completed children's percentages.
    pub progress: f64,
    /// Share not yet allocated to any child.
    pub remaining: f64,
}

#[derive(Debug, Serialize)]
pub struct TimeEntries {
    pub data: Vec<TimeEntry>,
    pub total_minutes: i64,
}

#[derive(Debug, Serialize)]
pub struct DeletedTasks {
    pub deleted: Vec<DbId>,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Task", id })
}

/// Load a task and check the caller may see its project.
async fn load_for(state: &AppState, user: &AuthUser, id: DbId) -> AppResult<Task> {
    let task = TaskRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    project::load_for(state, user, task.project_id).await?;
    Ok(task)
}

/// Percentages of `parent`'s children with `replace` overriding one sibling.
fn sibling_percentages(
    tasks: &[Task],
    parent: Option<DbId>,
    replace: Option<(DbId, f64)>,
) -> Vec<f64> {
    let mut percentages: Vec<f64> = siblings(tasks, parent)
        .into_iter()
        .filter(|t| Some(t.id) != replace.map(|r| r.0))
        .filter_map(|t| t.percentage)
        .collect();
    if let Some((_, p)) = replace {
        percentages.push(p);
    }
    percentages
}

fn publish_assignment(state: &AppState, actor: DbId, task: &Task, recipients: Vec<DbId>) {
    if recipients.is_empty() {
        return;
    }
    state.event_bus.publish(
        DomainEvent::new(
            event_types::TASK_ASSIGNED,
            format!("You were assigned to task \"{}\"", task.name),
        )
        .with_source("task", task.id)
        .with_actor(actor)
        .with_recipients(recipients)
        .with_url(format!("/projects/{}/tasks/{}", task.project_id, task.id)),
    );
}

/// POST /api/v1/projects/{project_id}/tasks
///
/// A subtask's parent must belong to the same project, and a percentage must
/// fit in what its siblings leave free.
pub async fn create(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateTask>,
) -> AppResult<(StatusCode, Json<Task>)> {
    input.validate()?;
    project::load_for(&state, &user, project_id).await?;

    let tasks = TaskRepo::list_by_project(&state.pool, project_id).await?;
    if let Some(parent_id) = input.parent_id {
        if !tasks.iter().any(|t| t.id == parent_id) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Parent task {parent_id} does not belong to project {project_id}"
            ))));
        }
    }
    if let Some(p) = input.percentage {
        validate_allocation(&sibling_percentages(&tasks, input.parent_id, Some((0, p))))?;
    }

    let task = TaskRepo::create(&state.pool, project_id, &input).await?;
    tracing::info!(task_id = task.id, project_id, parent_id = ?task.parent_id, "Task created");

    publish_assignment(&state, user.user_id, &task, input.assignee_ids.clone());
    Ok((StatusCode::CREATED, Json(task)))
}

/// GET /api/v1/tasks/{id}
pub async fn get_by_id(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<TaskDetail>> {
    let task = load_for(&state, &user, id).await?;
    let tasks = TaskRepo::list_by_project(&state.pool, task.project_id).await?;
    let path = path_to(&tasks, id).map(|p| render_path(&p)).unwrap_or_default();
    let assignees = TaskRepo::list_assignees(&state.pool, id).await?;
    let time_entries = TaskRepo::list_time_entries(&state.pool, id).await?;
    let total_minutes = total_minutes(time_entries.iter().map(|e| e.duration_minutes));

    Ok(Json(TaskDetail {
        task,
        path,
        assignees,
        time_entries,
        total_minutes,
    }))
}

/// PUT /api/v1/tasks/{id}
pub async fn update(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTask>,
) -> AppResult<Json<Task>> {
    input.validate()?;
    let task = load_for(&state, &user, id).await?;
    if let Some(Some(p)) = input.percentage {
        let tasks = TaskRepo::list_by_project(&state.pool, task.project_id).await?;
        validate_allocation(&sibling_percentages(&tasks, task.parent_id, Some((id, p))))?;
    }

    let task = TaskRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(task))
}

/// PUT /api/v1/tasks/{id}/parent
///
/// Re-parent within the same project; `null` makes the task a root. A task
/// carrying a percentage must fit in what its new siblings leave free.
pub async fn move_task(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<MoveTask>,
) -> AppResult<Json<Task>> {
    let task = load_for(&state, &user, id).await?;
    let tasks = TaskRepo::list_by_project(&state.pool, task.project_id).await?;
    validate_reparent(&tasks, id, input.parent_id)?;
    if let Some(p) = task.percentage {
        validate_allocation(&sibling_percentages(&tasks, input.parent_id, Some((id, p))))?;
    }

    let task = TaskRepo::move_to(&state.pool, id, input.parent_id)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(task_id = id, parent_id = ?input.parent_id, "Task moved");
    Ok(Json(task))
}

/// DELETE /api/v1/tasks/{id}
///
/// Removes the task, its whole subtree and their settlements in one
/// transaction and returns the removed ids.
pub async fn delete(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DeletedTasks>> {
    load_for(&state, &user, id).await?;
    let deleted = TaskRepo::delete_cascade(&state.pool, id).await?;
    if deleted.is_empty() {
        return Err(not_found(id));
    }
    Ok(Json(DeletedTasks { deleted }))
}

/// GET /api/v1/tasks/{id}/path
pub async fn path(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<TaskPath>> {
    let task = load_for(&state, &user, id).await?;
    let tasks = TaskRepo::list_by_project(&state.pool, task.project_id).await?;
    let ids = path_to(&tasks, id).ok_or_else(|| {
        AppError::Core(CoreError::Conflict(format!(
            "Task {id} is not reachable from a root task"
        )))
    })?;
    Ok(Json(TaskPath {
        task_id: id,
        path: render_path(&ids),
        ids,
    }))
}

/// GET /api/v1/tasks/{id}/children
pub async fn children(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<TaskChildren>> {
    load_for(&state, &user, id).await?;
    let children = TaskRepo::list_children(&state.pool, id).await?;
    let allocated: Vec<f64> = children.iter().filter_map(|c| c.percentage).collect();

    Ok(Json(TaskChildren {
        progress: children_progress(&children),
        remaining: remaining_allocation(&allocated),
        data: children,
    }))
}

/// PUT /api/v1/tasks/{id}/percentages
///
/// Allocate the parent's work across its direct children. Entries must all
/// be children of `id`; children left out keep their current share.
pub async fn set_percentages(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(entries): Json<Vec<PercentageEntry>>,
) -> AppResult<Json<TaskChildren>> {
    load_for(&state, &user, id).await?;
    let children = TaskRepo::list_children(&state.pool, id).await?;

    if let Some(stray) = entries
        .iter()
        .find(|e| !children.iter().any(|c| c.id == e.task_id))
    {
        return Err(AppError::Core(CoreError::Validation(format!(
            "Task {} is not a subtask of task {id}",
            stray.task_id
        ))));
    }

    let allocation: Vec<f64> = children
        .iter()
        .map(|c| {
            entries
                .iter()
                .rev()
                .find(|e| e.task_id == c.id)
                .map(|e| e.percentage)
                .or(c.percentage)
                .unwrap_or(0.0)
        })
        .collect();
    validate_allocation(&allocation)?;

    TaskRepo::set_percentages(&state.pool, &entries).await?;

    let children = TaskRepo::list_children(&state.pool, id).await?;
    Ok(Json(TaskChildren {
        progress: children_progress(&children),
        remaining: remaining_allocation(&allocation),
        data: children,
    }))
}

/// GET /api/v1/tasks/{id}/assignees
pub async fn list_assignees(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<TaskAssignee>>>> {
    load_for(&state, &user, id).await?;
    let assignees = TaskRepo::list_assignees(&state.pool, id).await?;
    Ok(Json(DataResponse { data: assignees }))
}

/// PUT /api/v1/tasks/{id}/assignees
///
/// Replace the assignee set. Newly added users are notified.
pub async fn set_assignees(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SetAssignees>,
) -> AppResult<Json<DataResponse<Vec<TaskAssignee>>>> {
    let task = load_for(&state, &user, id).await?;
    let added = TaskRepo::set_assignees(&state.pool, id, &input.user_ids).await?;
    publish_assignment(&state, user.user_id, &task, added);

    let assignees = TaskRepo::list_assignees(&state.pool, id).await?;
    Ok(Json(DataResponse { data: assignees }))
}

/// POST /api/v1/tasks/{id}/timer/start
///
/// Start the caller's clock on this task. Restarting a running clock keeps
/// the minutes already elapsed.
pub async fn start_timer(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<TimeEntry>> {
    load_for(&state, &user, id).await?;
    let existing = TaskRepo::find_time_entry(&state.pool, id, user.user_id).await?;
    let next = time_tracking::start(existing.map(|e| e.timer_state()), Utc::now());

    let entry = TaskRepo::upsert_time_entry(&state.pool, id, user.user_id, &next).await?;
    Ok(Json(entry))
}

/// POST /api/v1/tasks/{id}/timer/stop
pub async fn stop_timer(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<TimeEntry>> {
    load_for(&state, &user, id).await?;
    let existing = TaskRepo::find_time_entry(&state.pool, id, user.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict("Timer has not been started".into()))
        })?;
    let next = time_tracking::stop(existing.timer_state(), Utc::now())?;

    let entry = TaskRepo::upsert_time_entry(&state.pool, id, user.user_id, &next).await?;
    tracing::debug!(task_id = id, user_id = user.user_id, minutes = entry.duration_minutes, "Timer stopped");
    Ok(Json(entry))
}

/// GET /api/v1/tasks/{id}/time-entries
pub async fn list_time_entries(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<TimeEntries>> {
    load_for(&state, &user, id).await?;
    let entries = TaskRepo::list_time_entries(&state.pool, id).await?;
    Ok(Json(TimeEntries {
        total_minutes: total_minutes(entries.iter().map(|e| e.duration_minutes)),
        data: entries,
    }))
}

/// GET /api/v1/tasks/{id}/settlements
pub async fn list_settlements(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Settlement>>>> {
    load_for(&state, &admin, id).await?;
    let settlements = SettlementRepo::list_by_task(&state.pool, id).await?;
    Ok(Json(DataResponse { data: settlements }))
}

/// GET /api/v1/me/tasks
///
/// Tasks assigned to the caller, nearest deadline first.
pub async fn list_mine(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Task>>>> {
    let tasks = TaskRepo::list_for_user(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: tasks }))
}
