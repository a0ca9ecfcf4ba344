use pms_core::calendar::{DateRange, HolidaySpan};
use pms_core::error::CoreError;
use pms_core::types::{Day, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `holidays` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Holiday {
    pub id: DbId,
    pub name: String,
    pub start_date: Day,
    pub end_date: Day,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Holiday {
    pub fn to_span(&self) -> Result<HolidaySpan, CoreError> {
        Ok(HolidaySpan {
            id: self.id,
            name: self.name.clone(),
            range: DateRange::new(self.start_date, self.end_date)?,
        })
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateHoliday {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub start_date: Day,
    pub end_date: Day,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateHoliday {
    pub name: Option<String>,
    pub start_date: Option<Day>,
    pub end_date: Option<Day>,
}
