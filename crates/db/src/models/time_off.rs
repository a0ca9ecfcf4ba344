//! Leave, work-from-home and out-of-office requests.

use pms_core::calendar::{DateRange, TimeOffSpan};
use pms_core::error::CoreError;
use pms_core::status::parse_optional;
use pms_core::types::{Day, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `time_off_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TimeOffRequest {
    pub id: DbId,
    pub user_id: DbId,
    /// `leave`, `wfh` or `ooo`.
    pub kind: String,
    pub start_date: Day,
    pub end_date: Day,
    pub reason: String,
    /// Leave only: `full` or `half`.
    pub leave_type: Option<String>,
    /// Half-day leave only: `forenoon` or `afternoon`.
    pub session: Option<String>,
    pub status: String,
    pub decided_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TimeOffRequest {
    pub fn to_span(&self) -> Result<TimeOffSpan, CoreError> {
        Ok(TimeOffSpan {
            id: self.id,
            user_id: self.user_id,
            kind: self.kind.parse()?,
            range: DateRange::new(self.start_date, self.end_date)?,
            status: self.status.parse()?,
            reason: self.reason.clone(),
            leave_type: parse_optional(self.leave_type.as_deref())?,
            session: parse_optional(self.session.as_deref())?,
        })
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTimeOff {
    pub start_date: Day,
    pub end_date: Day,
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub reason: String,
    pub leave_type: Option<String>,
    pub session: Option<String>,
}

/// Move a request to new dates.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateTimeOffDates {
    pub start_date: Day,
    pub end_date: Day,
}

/// Approve or reject a request, optionally adjusting its dates.
#[derive(Debug, Clone, Deserialize)]
pub struct DecideTimeOff {
    pub status: String,
    pub start_date: Option<Day>,
    pub end_date: Option<Day>,
}
