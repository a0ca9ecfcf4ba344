//! Repository for per-user `todos`. Every query is scoped by owner.

use pms_core::types::DbId;
use sqlx::SqlitePool;

use crate::models::todo::{CreateTodo, Todo, UpdateTodo};
use crate::repositories::NOW;

const COLUMNS: &str = "id, user_id, title, description, end_date, completed, created_at, updated_at";

pub struct TodoRepo;

impl TodoRepo {
    pub async fn create(
        pool: &SqlitePool,
        user_id: DbId,
        input: &CreateTodo,
    ) -> Result<Todo, sqlx::Error> {
        let query = format!(
            "INSERT INTO todos (user_id, title, description, end_date)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Todo>(&query)
            .bind(user_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.end_date)
            .fetch_one(pool)
            .await
    }

    pub async fn find(
        pool: &SqlitePool,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<Todo>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM todos WHERE id = ?1 AND user_id = ?2");
        sqlx::query_as::<_, Todo>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Open todos first, then by due date.
    pub async fn list(pool: &SqlitePool, user_id: DbId) -> Result<Vec<Todo>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM todos WHERE user_id = ?1
             ORDER BY completed, end_date IS NULL, end_date, id"
        );
        sqlx::query_as::<_, Todo>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &SqlitePool,
        user_id: DbId,
        id: DbId,
        input: &UpdateTodo,
    ) -> Result<Option<Todo>, sqlx::Error> {
        let query = format!(
            "UPDATE todos SET
                title = COALESCE(?3, title),
                description = COALESCE(?4, description),
                end_date = COALESCE(?5, end_date),
                completed = COALESCE(?6, completed),
                updated_at = {NOW}
             WHERE id = ?1 AND user_id = ?2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Todo>(&query)
            .bind(id)
            .bind(user_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.end_date)
            .bind(input.completed)
            .fetch_optional(pool)
            .await
    }

    /// Flip the completed flag.
    pub async fn toggle(
        pool: &SqlitePool,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<Todo>, sqlx::Error> {
        let query = format!(
            "UPDATE todos SET completed = NOT completed, updated_at = {NOW}
             WHERE id = ?1 AND user_id = ?2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Todo>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &SqlitePool, user_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
