//! Repository for `tasks`, `task_assignees` and `task_time_entries`.
//!
//! Every mutation that can change a root task's cost recomputes the owning
//! project's `total_amount` inside the same transaction.

use pms_core::task_tree::descendant_ids;
use pms_core::time_tracking::TimerState;
use pms_core::types::DbId;
use sqlx::types::Json;
use sqlx::{SqliteConnection, SqlitePool};

use crate::models::task::{
    CreateTask, PercentageEntry, Task, TaskAssignee, TimeEntry, UpdateTask,
};
use crate::repositories::{ProjectRepo, NOW};

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, project_id, parent_id, name, description, hours, \
                                  cost_per_hour, percentage, completed, deadline, \
                                  outsource_team_id, created_at, updated_at";

/// Same columns qualified with the `t` alias for joins.
const T_COLUMNS: &str = "t.id, t.project_id, t.parent_id, t.name, t.description, t.hours, \
                         t.cost_per_hour, t.percentage, t.completed, t.deadline, \
                         t.outsource_team_id, t.created_at, t.updated_at";

const TIME_ENTRY_COLUMNS: &str =
    "id, task_id, user_id, started_at, duration_minutes, is_running, created_at, updated_at";

/// Provides CRUD, hierarchy and timer operations for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a task with its initial assignees and refresh the project total.
    pub async fn create(
        pool: &SqlitePool,
        project_id: DbId,
        input: &CreateTask,
    ) -> Result<Task, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO tasks (project_id, parent_id, name, description, hours, cost_per_hour,
                                percentage, deadline, outsource_team_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             RETURNING {COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&query)
            .bind(project_id)
            .bind(input.parent_id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.hours)
            .bind(input.cost_per_hour)
            .bind(input.percentage)
            .bind(input.deadline)
            .bind(input.outsource_team_id)
            .fetch_one(&mut *tx)
            .await?;

        for user_id in &input.assignee_ids {
            insert_assignee(&mut tx, task.id, *user_id).await?;
        }
        ProjectRepo::recompute_total(&mut tx, project_id).await?;

        tx.commit().await?;
        Ok(task)
    }

    /// Find a task by internal ID.
    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE id = ?1");
        sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All tasks of a project as a flat list, in creation order.
    pub async fn list_by_project(
        pool: &SqlitePool,
        project_id: DbId,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE project_id = ?1 ORDER BY id");
        sqlx::query_as::<_, Task>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    /// Direct children of a task.
    pub async fn list_children(
        pool: &SqlitePool,
        parent_id: DbId,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tasks WHERE parent_id = ?1 ORDER BY id");
        sqlx::query_as::<_, Task>(&query)
            .bind(parent_id)
            .fetch_all(pool)
            .await
    }

    /// Tasks assigned to a user across all projects.
    pub async fn list_for_user(pool: &SqlitePool, user_id: DbId) -> Result<Vec<Task>, sqlx::Error> {
        let query = format!(
            "SELECT {T_COLUMNS} FROM tasks t
             JOIN task_assignees a ON a.task_id = t.id
             WHERE a.user_id = ?1
             ORDER BY t.deadline IS NULL, t.deadline, t.id"
        );
        sqlx::query_as::<_, Task>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Tasks handed to an outsource team.
    pub async fn list_by_outsource_team(
        pool: &SqlitePool,
        team_id: DbId,
    ) -> Result<Vec<Task>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM tasks WHERE outsource_team_id = ?1 ORDER BY id");
        sqlx::query_as::<_, Task>(&query)
            .bind(team_id)
            .fetch_all(pool)
            .await
    }

    /// Update a task and refresh the project total.
    ///
    /// Plain fields use `COALESCE`; the clearable ones bind a "provided" flag
    /// so an explicit `null` resets the column.
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateTask,
    ) -> Result<Option<Task>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE tasks SET
                name = COALESCE(?2, name),
                description = COALESCE(?3, description),
                hours = COALESCE(?4, hours),
                cost_per_hour = COALESCE(?5, cost_per_hour),
                percentage = CASE WHEN ?6 THEN ?7 ELSE percentage END,
                completed = COALESCE(?8, completed),
                deadline = CASE WHEN ?9 THEN ?10 ELSE deadline END,
                outsource_team_id = CASE WHEN ?11 THEN ?12 ELSE outsource_team_id END,
                updated_at = {NOW}
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.hours)
            .bind(input.cost_per_hour)
            .bind(input.percentage.is_some())
            .bind(input.percentage.flatten())
            .bind(input.completed)
            .bind(input.deadline.is_some())
            .bind(input.deadline.flatten())
            .bind(input.outsource_team_id.is_some())
            .bind(input.outsource_team_id.flatten())
            .fetch_optional(&mut *tx)
            .await?;

        if let Some(task) = &task {
            ProjectRepo::recompute_total(&mut tx, task.project_id).await?;
        }

        tx.commit().await?;
        Ok(task)
    }

    /// Move a task under a new parent (or to the root) and refresh the project total.
    ///
    /// The caller validates the move against the project's hierarchy first.
    pub async fn move_to(
        pool: &SqlitePool,
        id: DbId,
        parent_id: Option<DbId>,
    ) -> Result<Option<Task>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE tasks SET parent_id = ?2, updated_at = {NOW} WHERE id = ?1 RETURNING {COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&query)
            .bind(id)
            .bind(parent_id)
            .fetch_optional(&mut *tx)
            .await?;

        if let Some(task) = &task {
            ProjectRepo::recompute_total(&mut tx, task.project_id).await?;
        }

        tx.commit().await?;
        Ok(task)
    }

    /// Delete a task, all of its descendants and their settlements, then
    /// refresh the project total, all in one transaction.
    ///
    /// Returns the removed task ids; empty when `id` does not exist.
    pub async fn delete_cascade(pool: &SqlitePool, id: DbId) -> Result<Vec<DbId>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let project_id: Option<DbId> =
            sqlx::query_scalar("SELECT project_id FROM tasks WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(project_id) = project_id else {
            return Ok(Vec::new());
        };

        let query = format!("SELECT {COLUMNS} FROM tasks WHERE project_id = ?1");
        let tasks = sqlx::query_as::<_, Task>(&query)
            .bind(project_id)
            .fetch_all(&mut *tx)
            .await?;
        let doomed = descendant_ids(&tasks, id);

        sqlx::query("DELETE FROM settlements WHERE task_id IN (SELECT value FROM json_each(?1))")
            .bind(Json(&doomed))
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM tasks WHERE id IN (SELECT value FROM json_each(?1))")
            .bind(Json(&doomed))
            .execute(&mut *tx)
            .await?;
        ProjectRepo::recompute_total(&mut tx, project_id).await?;

        tx.commit().await?;
        tracing::info!(task_id = id, removed = doomed.len(), "Task subtree deleted");
        Ok(doomed)
    }

    /// Apply a sibling percentage allocation atomically.
    pub async fn set_percentages(
        pool: &SqlitePool,
        entries: &[PercentageEntry],
    ) -> Result<(), sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!("UPDATE tasks SET percentage = ?2, updated_at = {NOW} WHERE id = ?1");
        for entry in entries {
            sqlx::query(&query)
                .bind(entry.task_id)
                .bind(entry.percentage)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Assignees
    // -----------------------------------------------------------------------

    /// Users assigned to a task.
    pub async fn list_assignees(
        pool: &SqlitePool,
        task_id: DbId,
    ) -> Result<Vec<TaskAssignee>, sqlx::Error> {
        sqlx::query_as::<_, TaskAssignee>(
            "SELECT a.task_id, a.user_id, u.full_name, u.email, a.assigned_at
             FROM task_assignees a
             JOIN users u ON u.id = a.user_id
             WHERE a.task_id = ?1
             ORDER BY u.full_name",
        )
        .bind(task_id)
        .fetch_all(pool)
        .await
    }

    /// Replace a task's assignees. Returns the user ids that were newly added.
    pub async fn set_assignees(
        pool: &SqlitePool,
        task_id: DbId,
        user_ids: &[DbId],
    ) -> Result<Vec<DbId>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let existing: Vec<DbId> =
            sqlx::query_scalar("SELECT user_id FROM task_assignees WHERE task_id = ?1")
                .bind(task_id)
                .fetch_all(&mut *tx)
                .await?;

        sqlx::query(
            "DELETE FROM task_assignees
             WHERE task_id = ?1 AND user_id NOT IN (SELECT value FROM json_each(?2))",
        )
        .bind(task_id)
        .bind(Json(user_ids))
        .execute(&mut *tx)
        .await?;

        let mut added = Vec::new();
        for user_id in user_ids {
            if !existing.contains(user_id) && !added.contains(user_id) {
                insert_assignee(&mut tx, task_id, *user_id).await?;
                added.push(*user_id);
            }
        }

        tx.commit().await?;
        Ok(added)
    }

    // -----------------------------------------------------------------------
    // Time entries
    // -----------------------------------------------------------------------

    pub async fn find_time_entry(
        pool: &SqlitePool,
        task_id: DbId,
        user_id: DbId,
    ) -> Result<Option<TimeEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {TIME_ENTRY_COLUMNS} FROM task_time_entries WHERE task_id = ?1 AND user_id = ?2"
        );
        sqlx::query_as::<_, TimeEntry>(&query)
            .bind(task_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_time_entries(
        pool: &SqlitePool,
        task_id: DbId,
    ) -> Result<Vec<TimeEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {TIME_ENTRY_COLUMNS} FROM task_time_entries WHERE task_id = ?1 ORDER BY id"
        );
        sqlx::query_as::<_, TimeEntry>(&query)
            .bind(task_id)
            .fetch_all(pool)
            .await
    }

    /// Write the timer for (task, user), creating the entry on first use.
    pub async fn upsert_time_entry(
        pool: &SqlitePool,
        task_id: DbId,
        user_id: DbId,
        state: &TimerState,
    ) -> Result<TimeEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO task_time_entries (task_id, user_id, started_at, duration_minutes, is_running)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (task_id, user_id) DO UPDATE SET
                started_at = excluded.started_at,
                duration_minutes = excluded.duration_minutes,
                is_running = excluded.is_running,
                updated_at = {NOW}
             RETURNING {TIME_ENTRY_COLUMNS}"
        );
        sqlx::query_as::<_, TimeEntry>(&query)
            .bind(task_id)
            .bind(user_id)
            .bind(state.started_at)
            .bind(state.duration_minutes)
            .bind(state.is_running)
            .fetch_one(pool)
            .await
    }
}

async fn insert_assignee(
    conn: &mut SqliteConnection,
    task_id: DbId,
    user_id: DbId,
) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT OR IGNORE INTO task_assignees (task_id, user_id) VALUES (?1, ?2)")
        .bind(task_id)
        .bind(user_id)
        .execute(conn)
        .await?;
    Ok(())
}
