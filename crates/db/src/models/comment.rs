use pms_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

/// A row from the `comments` table joined with the author's name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Comment {
    pub id: DbId,
    pub project_id: DbId,
    pub user_id: Option<DbId>,
    pub author_name: Option<String>,
    pub body: String,
    /// Attachment URLs.
    pub attachments: Json<Vec<String>>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateComment {
    #[validate(length(min = 1, max = 5000))]
    pub body: String,
    #[serde(default)]
    pub attachments: Vec<String>,
}
