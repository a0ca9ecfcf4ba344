use pms_core::types::{Day, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `time_sheets` table: self-reported work for one day.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TimeSheet {
    pub id: DbId,
    pub user_id: DbId,
    pub title: String,
    pub description: Option<String>,
    pub work_date: Day,
    pub hours: i64,
    pub minutes: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TimeSheet {
    pub fn total_minutes(&self) -> i64 {
        self.hours * 60 + self.minutes
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTimeSheet {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    /// Defaults to today.
    pub work_date: Option<Day>,
    #[validate(range(min = 0, max = 24))]
    pub hours: i64,
    #[validate(range(min = 0, max = 59))]
    pub minutes: i64,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTimeSheet {
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub work_date: Option<Day>,
    #[validate(range(min = 0, max = 24))]
    pub hours: Option<i64>,
    #[validate(range(min = 0, max = 59))]
    pub minutes: Option<i64>,
}
