//! Repository for project `documents`.

use pms_core::status::DocumentMedium;
use pms_core::types::DbId;
use sqlx::SqlitePool;

use crate::models::document::{AttachFile, CreateDocument, Document, UpdateDocument};
use crate::repositories::NOW;

const COLUMNS: &str = "id, project_id, document_number, enquiry_number, project_number, sent_by, \
                       sent_on, medium, file_name, storage_key, content_type, size_bytes, \
                       created_by, created_at, updated_at";

pub struct DocumentRepo;

impl DocumentRepo {
    /// Register a document. `medium` falls back to email.
    pub async fn create(
        pool: &SqlitePool,
        project_id: DbId,
        created_by: DbId,
        input: &CreateDocument,
    ) -> Result<Document, sqlx::Error> {
        let query = format!(
            "INSERT INTO documents
                (project_id, document_number, enquiry_number, project_number, sent_by, sent_on,
                 medium, created_by)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, COALESCE(?7, ?8), ?9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(project_id)
            .bind(&input.document_number)
            .bind(&input.enquiry_number)
            .bind(&input.project_number)
            .bind(&input.sent_by)
            .bind(input.sent_on)
            .bind(&input.medium)
            .bind(DocumentMedium::Email.as_str())
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Document>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM documents WHERE id = ?1");
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_project(
        pool: &SqlitePool,
        project_id: DbId,
    ) -> Result<Vec<Document>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM documents WHERE project_id = ?1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(project_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateDocument,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!(
            "UPDATE documents SET
                document_number = COALESCE(?2, document_number),
                enquiry_number = COALESCE(?3, enquiry_number),
                project_number = COALESCE(?4, project_number),
                sent_by = COALESCE(?5, sent_by),
                sent_on = COALESCE(?6, sent_on),
                medium = COALESCE(?7, medium),
                updated_at = {NOW}
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(&input.document_number)
            .bind(&input.enquiry_number)
            .bind(&input.project_number)
            .bind(&input.sent_by)
            .bind(input.sent_on)
            .bind(&input.medium)
            .fetch_optional(pool)
            .await
    }

    /// Record the uploaded file for a document, replacing any previous one.
    pub async fn attach_file(
        pool: &SqlitePool,
        id: DbId,
        file: &AttachFile,
    ) -> Result<Option<Document>, sqlx::Error> {
        let query = format!(
            "UPDATE documents SET
                file_name = ?2,
                storage_key = ?3,
                content_type = ?4,
                size_bytes = ?5,
                updated_at = {NOW}
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Document>(&query)
            .bind(id)
            .bind(&file.file_name)
            .bind(&file.storage_key)
            .bind(&file.content_type)
            .bind(file.size_bytes)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM documents WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
