//! Repository for project `comments`.

use pms_core::types::DbId;
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::models::comment::{Comment, CreateComment};

const SELECT: &str = "SELECT c.id, c.project_id, c.user_id, u.full_name AS author_name, c.body, \
                      c.attachments, c.created_at \
                      FROM comments c \
                      LEFT JOIN users u ON u.id = c.user_id";

pub struct CommentRepo;

impl CommentRepo {
    pub async fn create(
        pool: &SqlitePool,
        project_id: DbId,
        user_id: DbId,
        input: &CreateComment,
    ) -> Result<Comment, sqlx::Error> {
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO comments (project_id, user_id, body, attachments)
             VALUES (?1, ?2, ?3, ?4)
             RETURNING id",
        )
        .bind(project_id)
        .bind(user_id)
        .bind(&input.body)
        .bind(Json(&input.attachments))
        .fetch_one(pool)
        .await?;

        let query = format!("{SELECT} WHERE c.id = ?1");
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Comment>, sqlx::Error> {
        let query = format!("{SELECT} WHERE c.id = ?1");
        sqlx::query_as::<_, Comment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A page of a project's comments, newest first.
    pub async fn list_by_project(
        pool: &SqlitePool,
        project_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Comment>, sqlx::Error> {
        let query = format!(
            "{SELECT} WHERE c.project_id = ?1
             ORDER BY c.created_at DESC, c.id DESC
             LIMIT ?2 OFFSET ?3"
        );
        sqlx::query_as::<_, Comment>(&query)
            .bind(project_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_by_project(pool: &SqlitePool, project_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE project_id = ?1")
            .bind(project_id)
            .fetch_one(pool)
            .await
    }

    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
