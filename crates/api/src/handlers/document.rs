//! Handlers for project documents and their uploaded files.
//!
//! Metadata lives in the `documents` table; file bytes live in the blob store
//! under a key derived from the project id and a fresh uuid.

use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use pms_core::error::CoreError;
use pms_core::status::{parse_optional, DocumentMedium};
use pms_core::storage::project_document_key;
use pms_core::types::DbId;
use pms_db::models::document::{AttachFile, CreateDocument, Document, UpdateDocument};
use pms_db::repositories::DocumentRepo;
use validator::Validate;

use super::project;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAuth, RequireStaff};
use crate::response::DataResponse;
use crate::state::AppState;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Document",
        id,
    })
}

/// Best-effort blob removal; failures are logged, not returned.
async fn discard_blob(state: &AppState, document_id: DbId, key: &str) {
    if let Err(e) = state.blob_store.delete(key).await {
        tracing::warn!(document_id, key, error = %e, "Failed to delete document blob");
    }
}

/// Load a document whose project the caller may see.
async fn load_for(state: &AppState, user: &AuthUser, id: DbId) -> AppResult<Document> {
    let document = DocumentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    project::load_for(state, user, document.project_id).await?;
    Ok(document)
}

/// File name safe to echo back in a `Content-Disposition` header.
fn header_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// GET /api/v1/projects/{project_id}/documents
pub async fn list_by_project(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<Document>>>> {
    project::load_for(&state, &user, project_id).await?;
    let documents = DocumentRepo::list_by_project(&state.pool, project_id).await?;
    Ok(Json(DataResponse { data: documents }))
}

/// POST /api/v1/projects/{project_id}/documents
pub async fn create(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateDocument>,
) -> AppResult<(StatusCode, Json<Document>)> {
    input.validate()?;
    parse_optional::<DocumentMedium>(input.medium.as_deref())?;
    project::load_for(&state, &user, project_id).await?;

    let document = DocumentRepo::create(&state.pool, project_id, user.user_id, &input).await?;
    tracing::info!(document_id = document.id, project_id, "Document created");
    Ok((StatusCode::CREATED, Json(document)))
}

/// GET /api/v1/documents/{id}
pub async fn get_by_id(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<Document>> {
    Ok(Json(load_for(&state, &user, id).await?))
}

/// PUT /api/v1/documents/{id}
pub async fn update(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateDocument>,
) -> AppResult<Json<Document>> {
    input.validate()?;
    parse_optional::<DocumentMedium>(input.medium.as_deref())?;
    load_for(&state, &user, id).await?;

    let document = DocumentRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(document))
}

/// DELETE /api/v1/documents/{id}
///
/// Removes the row, then its blob. A blob that fails to delete is logged and
/// left behind.
pub async fn delete(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let document = load_for(&state, &user, id).await?;
    if !DocumentRepo::delete(&state.pool, id).await? {
        return Err(not_found(id));
    }
    if let Some(key) = &document.storage_key {
        discard_blob(&state, id, key).await;
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/documents/{id}/file
///
/// Multipart form with a required `file` field. Replaces any previously
/// attached file.
pub async fn upload(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<Json<Document>> {
    let document = load_for(&state, &user, id).await?;

    let mut file: Option<(String, Option<String>, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("document").to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        file = Some((file_name, content_type, data.to_vec()));
    }

    let (file_name, content_type, data) =
        file.ok_or_else(|| AppError::BadRequest("Missing required 'file' field".into()))?;
    if data.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".into()));
    }
    if data.len() > state.config.max_upload_bytes {
        return Err(AppError::BadRequest(format!(
            "File is {} bytes; the limit is {} bytes",
            data.len(),
            state.config.max_upload_bytes
        )));
    }

    let unique = uuid::Uuid::new_v4().simple().to_string();
    let key = project_document_key(document.project_id, &unique, &file_name)?;
    state.blob_store.put(&key, &data).await?;

    let attach = AttachFile {
        file_name,
        storage_key: key.clone(),
        content_type,
        size_bytes: data.len() as i64,
    };
    let updated = match DocumentRepo::attach_file(&state.pool, id, &attach).await {
        Ok(Some(updated)) => updated,
        outcome => {
            discard_blob(&state, id, &key).await;
            return Err(match outcome {
                Err(e) => e.into(),
                _ => not_found(id),
            });
        }
    };

    if let Some(previous) = document.storage_key.filter(|k| *k != key) {
        discard_blob(&state, id, &previous).await;
    }

    tracing::info!(document_id = id, key = %key, size = attach.size_bytes, "Document file uploaded");
    Ok(Json(updated))
}

/// GET /api/v1/documents/{id}/file
pub async fn download(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let document = load_for(&state, &user, id).await?;
    let key = document
        .storage_key
        .as_deref()
        .ok_or_else(|| AppError::NotFound(format!("Document {id} has no file attached")))?;

    let bytes = state.blob_store.get(key).await?.ok_or_else(|| {
        tracing::error!(document_id = id, key, "Document blob is missing from storage");
        AppError::NotFound(format!("File for document {id} is missing"))
    })?;

    let content_type = document
        .content_type
        .clone()
        .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
    let file_name = header_file_name(document.file_name.as_deref().unwrap_or("document"));

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    ))
}
