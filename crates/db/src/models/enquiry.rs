//! Enquiry entity model, deliverables and DTOs.

use pms_core::enquiry::{enquiry_code, DeliverableLine};
use pms_core::types::{Day, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use validator::Validate;

/// A row from the `enquiries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Enquiry {
    pub id: DbId,
    pub enquiry_number: String,
    pub name: String,
    pub description: Option<String>,
    pub customer_id: Option<DbId>,
    pub currency_id: Option<DbId>,
    pub scope_of_work: Option<String>,
    pub end_client: Option<String>,
    pub deadline: Option<Day>,
    pub inputs_required: Json<Vec<String>>,
    pub exclusions: Json<Vec<String>>,
    pub charges: Json<Vec<String>>,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Enquiry {
    /// Display id, e.g. `E-1042`.
    pub fn code(&self) -> String {
        enquiry_code(&self.enquiry_number)
    }
}

/// A row from the `enquiry_deliverables` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Deliverable {
    pub id: DbId,
    pub enquiry_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub hours: Option<f64>,
    pub cost_per_hour: Option<f64>,
    pub total: f64,
    pub created_at: Timestamp,
}

impl From<Deliverable> for DeliverableLine {
    fn from(d: Deliverable) -> Self {
        Self {
            name: d.name,
            description: d.description,
            hours: d.hours,
            cost_per_hour: d.cost_per_hour,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDeliverable {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub hours: Option<f64>,
    #[validate(range(min = 0.0))]
    pub cost_per_hour: Option<f64>,
}

/// DTO for creating a new enquiry. New enquiries always start `on hold`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateEnquiry {
    #[validate(length(min = 1, max = 50))]
    pub enquiry_number: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    pub customer_id: Option<DbId>,
    pub currency_id: Option<DbId>,
    pub scope_of_work: Option<String>,
    pub end_client: Option<String>,
    pub deadline: Option<Day>,
    #[serde(default)]
    pub inputs_required: Vec<String>,
    #[serde(default)]
    pub exclusions: Vec<String>,
    #[serde(default)]
    pub charges: Vec<String>,
    #[serde(default)]
    #[validate(nested)]
    pub deliverables: Vec<CreateDeliverable>,
}

/// DTO for updating an enquiry. `deliverables`, when present, replaces the full list.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateEnquiry {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub customer_id: Option<DbId>,
    pub currency_id: Option<DbId>,
    pub scope_of_work: Option<String>,
    pub end_client: Option<String>,
    pub deadline: Option<Day>,
    pub inputs_required: Option<Vec<String>>,
    pub exclusions: Option<Vec<String>>,
    pub charges: Option<Vec<String>>,
    #[validate(nested)]
    pub deliverables: Option<Vec<CreateDeliverable>>,
}

/// An enquiry with its deliverables and quoted total.
#[derive(Debug, Clone, Serialize)]
pub struct EnquiryDetail {
    #[serde(flatten)]
    pub enquiry: Enquiry,
    pub code: String,
    pub deliverables: Vec<Deliverable>,
    pub total_amount: f64,
}
