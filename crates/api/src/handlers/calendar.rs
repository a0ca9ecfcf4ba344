//! Calendar views that combine attendance, time off and holidays.

use axum::extract::{Query, State};
use axum::Json;
use pms_core::calendar::{
    attendance_metrics, month_calendar, month_grid_range, AttendanceMetrics, AttendanceMark,
    CalendarDay, CalendarInputs, DateRange, HolidaySpan, TimeOffSpan,
};
use pms_core::types::DbId;
use pms_db::repositories::{AttendanceRepo, HolidayRepo, TimeOffRepo};
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{ensure_self_or_admin, RequireStaff};
use crate::query::{DateRangeParams, MonthParams};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MonthCalendar {
    pub user_id: DbId,
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDay>,
}

/// Rows feeding a calendar view for one user, converted to core spans.
struct CalendarData {
    attendance: Vec<AttendanceMark>,
    time_off: Vec<TimeOffSpan>,
    holidays: Vec<HolidaySpan>,
}

impl CalendarData {
    async fn load(state: &AppState, user_id: DbId, range: &DateRange) -> AppResult<Self> {
        let attendance = AttendanceRepo::list_range(&state.pool, Some(user_id), range).await?;
        let time_off = TimeOffRepo::list_overlapping(&state.pool, Some(user_id), range).await?;
        let holidays = HolidayRepo::list_range(&state.pool, range).await?;

        Ok(Self {
            attendance: attendance
                .iter()
                .map(|a| a.to_mark())
                .collect::<Result<_, _>>()?,
            time_off: time_off
                .iter()
                .map(|t| t.to_span())
                .collect::<Result<_, _>>()?,
            holidays: holidays
                .iter()
                .map(|h| h.to_span())
                .collect::<Result<_, _>>()?,
        })
    }

    fn inputs(&self) -> CalendarInputs<'_> {
        CalendarInputs {
            attendance: &self.attendance,
            time_off: &self.time_off,
            holidays: &self.holidays,
        }
    }
}

fn target_user(user: &AuthUser, requested: Option<DbId>) -> AppResult<DbId> {
    let target = requested.unwrap_or(user.user_id);
    ensure_self_or_admin(user, target)?;
    Ok(target)
}

/// GET /api/v1/calendar?year=&month=&user_id=
///
/// Six-week grid for the month with each day's attendance, leave, WFH, OOO
/// and holiday badges.
pub async fn month(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Query(params): Query<MonthParams>,
) -> AppResult<Json<MonthCalendar>> {
    let user_id = target_user(&user, params.user_id)?;
    let (year, month) = params.year_month();
    let grid = month_grid_range(year, month)?;

    let data = CalendarData::load(&state, user_id, &grid).await?;
    let days = month_calendar(user_id, year, month, &data.inputs())?;

    Ok(Json(MonthCalendar {
        user_id,
        year,
        month,
        days,
    }))
}

/// GET /api/v1/calendar/metrics?start=&end=&user_id=
///
/// Day counts over the range (default: current month).
pub async fn metrics(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Query(params): Query<DateRangeParams>,
) -> AppResult<Json<AttendanceMetrics>> {
    let user_id = target_user(&user, params.user_id)?;
    let range = params.range_or_current_month()?;

    let data = CalendarData::load(&state, user_id, &range).await?;
    Ok(Json(attendance_metrics(user_id, &range, &data.inputs())))
}
