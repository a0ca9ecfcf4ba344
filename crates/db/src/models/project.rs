//! Project entity model and DTOs.

use pms_core::enquiry::project_code;
use pms_core::types::{Day, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A project row from the `projects` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Project {
    pub id: DbId,
    pub project_number: String,
    pub name: String,
    pub description: Option<String>,
    pub customer_id: Option<DbId>,
    /// The enquiry this project was converted from, if any.
    pub enquiry_id: Option<DbId>,
    pub currency_id: Option<DbId>,
    pub status: String,
    pub end_client: Option<String>,
    pub start_date: Option<Day>,
    pub due_date: Option<Day>,
    /// Sum of root task costs, kept in step with every task mutation.
    pub total_amount: f64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Project {
    /// Display id, e.g. `P-1042`.
    pub fn code(&self) -> String {
        project_code(&self.project_number)
    }
}

/// DTO for creating a new project.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateProject {
    #[validate(length(min = 1, max = 50))]
    pub project_number: String,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    pub customer_id: Option<DbId>,
    pub currency_id: Option<DbId>,
    pub end_client: Option<String>,
    pub start_date: Option<Day>,
    pub due_date: Option<Day>,
    /// Defaults to `not-started` if omitted.
    pub status: Option<String>,
}

/// DTO for updating an existing project. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateProject {
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    pub description: Option<String>,
    pub customer_id: Option<DbId>,
    pub currency_id: Option<DbId>,
    pub end_client: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProjectStatus {
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProjectDates {
    pub start_date: Option<Day>,
    pub due_date: Option<Day>,
}
