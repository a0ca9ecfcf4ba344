//! Repository for the `projects` table.

use pms_core::billing::project_total;
use pms_core::status::ProjectStatus;
use pms_core::types::{Day, DbId};
use sqlx::{SqliteConnection, SqlitePool};

use crate::models::project::{CreateProject, Project, UpdateProject};
use crate::models::task::Task;
use crate::repositories::{customer_settlement_repo, NOW};

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, project_number, name, description, customer_id, enquiry_id, \
                                  currency_id, status, end_client, start_date, due_date, \
                                  total_amount, created_at, updated_at";

/// Provides CRUD operations for projects.
pub struct ProjectRepo;

impl ProjectRepo {
    /// Insert a new project, returning the created row.
    ///
    /// If `status` is `None` in the input, defaults to `not-started`.
    pub async fn create(pool: &SqlitePool, input: &CreateProject) -> Result<Project, sqlx::Error> {
        let query = format!(
            "INSERT INTO projects (project_number, name, description, customer_id, currency_id,
                                   end_client, start_date, due_date, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, COALESCE(?9, ?10))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(&input.project_number)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.customer_id)
            .bind(input.currency_id)
            .bind(&input.end_client)
            .bind(input.start_date)
            .bind(input.due_date)
            .bind(&input.status)
            .bind(ProjectStatus::NotStarted.as_str())
            .fetch_one(pool)
            .await
    }

    /// Find a project by its internal ID.
    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects WHERE id = ?1");
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all projects ordered by most recently created first.
    pub async fn list(pool: &SqlitePool) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM projects ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Project>(&query).fetch_all(pool).await
    }

    /// List one customer's projects, newest first.
    pub async fn list_for_customer(
        pool: &SqlitePool,
        customer_id: DbId,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects WHERE customer_id = ?1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(customer_id)
            .fetch_all(pool)
            .await
    }

    /// Projects with at least one task assigned to `user_id`.
    pub async fn list_for_assignee(
        pool: &SqlitePool,
        user_id: DbId,
    ) -> Result<Vec<Project>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM projects WHERE id IN (
                SELECT t.project_id FROM tasks t
                JOIN task_assignees a ON a.task_id = t.id
                WHERE a.user_id = ?1
             )
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Update a project. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateProject,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET
                name = COALESCE(?2, name),
                description = COALESCE(?3, description),
                customer_id = COALESCE(?4, customer_id),
                currency_id = COALESCE(?5, currency_id),
                end_client = COALESCE(?6, end_client),
                updated_at = {NOW}
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.customer_id)
            .bind(input.currency_id)
            .bind(&input.end_client)
            .fetch_optional(pool)
            .await
    }

    /// Set the lifecycle status.
    pub async fn set_status(
        pool: &SqlitePool,
        id: DbId,
        status: ProjectStatus,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET status = ?2, updated_at = {NOW} WHERE id = ?1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Replace both schedule dates; `None` clears a date.
    pub async fn set_dates(
        pool: &SqlitePool,
        id: DbId,
        start_date: Option<Day>,
        due_date: Option<Day>,
    ) -> Result<Option<Project>, sqlx::Error> {
        let query = format!(
            "UPDATE projects SET start_date = ?2, due_date = ?3, updated_at = {NOW}
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(start_date)
            .bind(due_date)
            .fetch_optional(pool)
            .await
    }

    /// Delete a project and, through foreign keys, its tasks, documents and
    /// settlements. Returns `true` if a row was removed.
    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM projects WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Recompute `total_amount` from the project's root tasks and re-derive
    /// the customer settlement status against the new total.
    ///
    /// Called inside the transaction of every task mutation so the stored
    /// total always matches the task rows.
    pub async fn recompute_total(
        conn: &mut SqliteConnection,
        project_id: DbId,
    ) -> Result<f64, sqlx::Error> {
        let query = format!(
            "SELECT {} FROM tasks WHERE project_id = ?1 AND parent_id IS NULL",
            crate::repositories::task_repo::COLUMNS
        );
        let roots = sqlx::query_as::<_, Task>(&query)
            .bind(project_id)
            .fetch_all(&mut *conn)
            .await?;
        let total = project_total(&roots);

        let update =
            format!("UPDATE projects SET total_amount = ?2, updated_at = {NOW} WHERE id = ?1");
        sqlx::query(&update)
            .bind(project_id)
            .bind(total)
            .execute(&mut *conn)
            .await?;
        customer_settlement_repo::refresh_for_project(conn, project_id).await?;
        Ok(total)
    }
}
