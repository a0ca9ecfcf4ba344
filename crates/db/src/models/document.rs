use pms_core::types::{Day, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `documents` table.
///
/// The file itself lives in the blob store under `storage_key`; the row only
/// holds metadata about how and when it was sent.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Document {
    pub id: DbId,
    pub project_id: DbId,
    pub document_number: String,
    pub enquiry_number: Option<String>,
    pub project_number: Option<String>,
    pub sent_by: Option<String>,
    pub sent_on: Option<Day>,
    pub medium: String,
    pub file_name: Option<String>,
    #[serde(skip_serializing)]
    pub storage_key: Option<String>,
    pub content_type: Option<String>,
    pub size_bytes: Option<i64>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDocument {
    #[validate(length(min = 1, max = 100))]
    pub document_number: String,
    pub enquiry_number: Option<String>,
    pub project_number: Option<String>,
    pub sent_by: Option<String>,
    pub sent_on: Option<Day>,
    /// Defaults to `email`.
    pub medium: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateDocument {
    #[validate(length(min = 1, max = 100))]
    pub document_number: Option<String>,
    pub enquiry_number: Option<String>,
    pub project_number: Option<String>,
    pub sent_by: Option<String>,
    pub sent_on: Option<Day>,
    pub medium: Option<String>,
}

/// File metadata recorded after an upload.
#[derive(Debug, Clone)]
pub struct AttachFile {
    pub file_name: String,
    pub storage_key: String,
    pub content_type: Option<String>,
    pub size_bytes: i64,
}
