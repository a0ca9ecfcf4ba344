//! Handlers for project comments.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use pms_core::error::CoreError;
use pms_core::types::DbId;
use pms_db::models::comment::{Comment, CreateComment};
use pms_db::repositories::CommentRepo;
use validator::Validate;

use super::project;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAuth;
use crate::query::PaginationParams;
use crate::response::PageResponse;
use crate::state::AppState;

/// GET /api/v1/projects/{project_id}/comments?limit=&offset=
///
/// Newest first.
pub async fn list(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<PageResponse<Comment>>> {
    project::load_for(&state, &user, project_id).await?;
    let (limit, offset) = params.resolve();

    let comments = CommentRepo::list_by_project(&state.pool, project_id, limit, offset).await?;
    let total = CommentRepo::count_by_project(&state.pool, project_id).await?;
    Ok(Json(PageResponse {
        data: comments,
        total,
        limit,
        offset,
    }))
}

/// POST /api/v1/projects/{project_id}/comments
pub async fn create(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(project_id): Path<DbId>,
    Json(input): Json<CreateComment>,
) -> AppResult<(StatusCode, Json<Comment>)> {
    input.validate()?;
    project::load_for(&state, &user, project_id).await?;

    let comment = CommentRepo::create(&state.pool, project_id, user.user_id, &input).await?;
    tracing::debug!(comment_id = comment.id, project_id, user_id = user.user_id, "Comment posted");
    Ok((StatusCode::CREATED, Json(comment)))
}

/// DELETE /api/v1/comments/{id}
///
/// Authors can delete their own comments; admins can delete any.
pub async fn delete(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let comment = CommentRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Comment",
            id,
        })?;
    if !user.is_admin() && comment.user_id != Some(user.user_id) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Only the author or an admin can delete this comment".into(),
        )));
    }

    CommentRepo::delete(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
