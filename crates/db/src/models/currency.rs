use pms_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `currencies` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Currency {
    pub id: DbId,
    pub name: String,
    pub symbol: String,
    /// Mandatory currencies cannot be deleted.
    pub is_mandatory: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCurrency {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(length(min = 1, max = 10))]
    pub symbol: String,
    pub is_mandatory: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCurrency {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub is_mandatory: Option<bool>,
}
