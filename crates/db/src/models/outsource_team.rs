use pms_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

use crate::models::customer::ContactPerson;

/// A row from the `outsource_teams` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OutsourceTeam {
    pub id: DbId,
    pub name: String,
    pub address: Option<String>,
    pub gst_number: Option<String>,
    pub billing_address: Option<String>,
    pub is_billing_address_same: bool,
    pub contact_persons: Json<Vec<ContactPerson>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateOutsourceTeam {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub address: Option<String>,
    pub gst_number: Option<String>,
    /// Ignored when `is_billing_address_same` is set; the address is copied instead.
    pub billing_address: Option<String>,
    #[serde(default)]
    pub is_billing_address_same: bool,
    #[serde(default)]
    #[validate(nested)]
    pub contact_persons: Vec<ContactPerson>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateOutsourceTeam {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub address: Option<String>,
    pub gst_number: Option<String>,
    pub billing_address: Option<String>,
    pub is_billing_address_same: Option<bool>,
    #[validate(nested)]
    pub contact_persons: Option<Vec<ContactPerson>>,
}
