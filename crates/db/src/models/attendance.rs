use pms_core::calendar::AttendanceMark;
use pms_core::error::CoreError;
use pms_core::types::{Day, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `attendance` table; one per (date, user).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Attendance {
    pub date: Day,
    pub user_id: DbId,
    pub kind: String,
    pub marked_at: Timestamp,
    pub marked_by: Option<DbId>,
}

impl Attendance {
    pub fn to_mark(&self) -> Result<AttendanceMark, CoreError> {
        Ok(AttendanceMark {
            user_id: self.user_id,
            date: self.date,
            kind: self.kind.parse()?,
        })
    }
}

/// Body for marking attendance. Missing fields default to the caller and today.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MarkAttendance {
    pub user_id: Option<DbId>,
    pub date: Option<Day>,
    pub kind: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAttendance {
    pub kind: String,
}
