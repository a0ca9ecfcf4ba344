//! Customer entity model and DTOs.

use pms_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

/// A named contact at a customer or outsource team. Stored as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ContactPerson {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub country_code: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
}

/// A row from the `customers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Customer {
    pub id: DbId,
    pub name: String,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub billing_address: Option<String>,
    pub shipping_address: Option<String>,
    pub gst_number: Option<String>,
    pub logo_url: Option<String>,
    pub contact_persons: Json<Vec<ContactPerson>>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new customer.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateCustomer {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub nickname: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub billing_address: Option<String>,
    pub shipping_address: Option<String>,
    pub gst_number: Option<String>,
    pub logo_url: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    pub contact_persons: Vec<ContactPerson>,
}

/// DTO for updating an existing customer. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateCustomer {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub nickname: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub billing_address: Option<String>,
    pub shipping_address: Option<String>,
    pub gst_number: Option<String>,
    pub logo_url: Option<String>,
    #[validate(nested)]
    pub contact_persons: Option<Vec<ContactPerson>>,
}
