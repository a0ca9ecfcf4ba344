//! Calendar day math for attendance, time off and holidays.
//!
//! All ranges are inclusive on both ends and measured in whole calendar days.

use chrono::{Datelike, Days, Weekday};
use serde::Serialize;

use crate::error::CoreError;
use crate::status::{AttendanceKind, LeaveSession, RequestStatus, TimeOffKind};
use crate::types::{Day, DbId};

/// Cells in a month grid: six weeks of seven days.
pub const MONTH_GRID_DAYS: usize = 42;

/// An inclusive span of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: Day,
    pub end: Day,
}

impl DateRange {
    /// Build a range, rejecting `end` before `start`.
    pub fn new(start: Day, end: Day) -> Result<Self, CoreError> {
        if end < start {
            return Err(CoreError::Validation(format!(
                "End date {end} is before start date {start}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn single(day: Day) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    pub fn contains(&self, day: Day) -> bool {
        self.start <= day && day <= self.end
    }

    pub fn overlaps(&self, other: &DateRange) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// The shared sub-range, if any.
    pub fn intersection(&self, other: &DateRange) -> Option<DateRange> {
        self.overlaps(other).then(|| DateRange {
            start: self.start.max(other.start),
            end: self.end.min(other.end),
        })
    }

    /// Number of days shared with `other`; zero when disjoint.
    pub fn overlap_days(&self, other: &DateRange) -> u32 {
        self.intersection(other).map_or(0, |r| r.len_days())
    }

    /// Number of days in the range (at least one).
    pub fn len_days(&self) -> u32 {
        u32::try_from((self.end - self.start).num_days() + 1).unwrap_or(0)
    }

    /// Every day in the range, in order.
    pub fn days(&self) -> impl Iterator<Item = Day> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

fn is_weekend(day: Day) -> bool {
    matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Days in `range` that fall Monday to Friday.
pub fn working_days(range: &DateRange) -> u32 {
    range.days().filter(|d| !is_weekend(*d)).count() as u32
}

/// First to last day of a calendar month.
pub fn month_range(year: i32, month: u32) -> Result<DateRange, CoreError> {
    let invalid = || CoreError::Validation(format!("Invalid month {year}-{month}"));
    let start = Day::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let end = Day::from_ymd_opt(next_year, next_month, 1)
        .and_then(|d| d.pred_opt())
        .ok_or_else(invalid)?;
    Ok(DateRange { start, end })
}

/// A user's attendance mark for one day.
#[derive(Debug, Clone)]
pub struct AttendanceMark {
    pub user_id: DbId,
    pub date: Day,
    pub kind: AttendanceKind,
}

/// A leave, work-from-home or out-of-office request.
#[derive(Debug, Clone)]
pub struct TimeOffSpan {
    pub id: DbId,
    pub user_id: DbId,
    pub kind: TimeOffKind,
    pub range: DateRange,
    pub status: RequestStatus,
    pub reason: String,
    pub leave_type: Option<AttendanceKind>,
    pub session: Option<LeaveSession>,
}

/// A company holiday; applies to every user.
#[derive(Debug, Clone)]
pub struct HolidaySpan {
    pub id: DbId,
    pub name: String,
    pub range: DateRange,
}

/// Everything the calendar views read.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalendarInputs<'a> {
    pub attendance: &'a [AttendanceMark],
    pub time_off: &'a [TimeOffSpan],
    pub holidays: &'a [HolidaySpan],
}

/// One badge on a calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DayStatus {
    Attendance {
        kind: AttendanceKind,
    },
    Leave {
        request_id: DbId,
        status: RequestStatus,
        reason: String,
        leave_type: Option<AttendanceKind>,
        session: Option<LeaveSession>,
        start_date: Day,
        end_date: Day,
    },
    WorkFromHome {
        request_id: DbId,
        status: RequestStatus,
        reason: String,
    },
    OutOfOffice {
        request_id: DbId,
        status: RequestStatus,
        reason: String,
    },
    Holiday {
        holiday_id: DbId,
        name: String,
    },
}

fn time_off_status(span: &TimeOffSpan) -> DayStatus {
    match span.kind {
        TimeOffKind::Leave => DayStatus::Leave {
            request_id: span.id,
            status: span.status,
            reason: span.reason.clone(),
            leave_type: span.leave_type,
            session: span.session,
            start_date: span.range.start,
            end_date: span.range.end,
        },
        TimeOffKind::WorkFromHome => DayStatus::WorkFromHome {
            request_id: span.id,
            status: span.status,
            reason: span.reason.clone(),
        },
        TimeOffKind::OutOfOffice => DayStatus::OutOfOffice {
            request_id: span.id,
            status: span.status,
            reason: span.reason.clone(),
        },
    }
}

/// Statuses for `user_id` on `day`, always ordered attendance, leave,
/// work-from-home, out-of-office, holiday. At most one of each.
pub fn day_statuses(day: Day, user_id: DbId, inputs: &CalendarInputs<'_>) -> Vec<DayStatus> {
    let mut statuses = Vec::new();

    if let Some(mark) = inputs
        .attendance
        .iter()
        .find(|a| a.user_id == user_id && a.date == day)
    {
        statuses.push(DayStatus::Attendance { kind: mark.kind });
    }

    for kind in TimeOffKind::ALL {
        if let Some(span) = inputs
            .time_off
            .iter()
            .find(|t| t.kind == *kind && t.user_id == user_id && t.range.contains(day))
        {
            statuses.push(time_off_status(span));
        }
    }

    if let Some(holiday) = inputs.holidays.iter().find(|h| h.range.contains(day)) {
        statuses.push(DayStatus::Holiday {
            holiday_id: holiday.id,
            name: holiday.name.clone(),
        });
    }

    statuses
}

/// Day counts for one user over a range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AttendanceMetrics {
    pub range: Option<DateRange>,
    pub total_days: u32,
    pub attendance_days: u32,
    pub leave_days: u32,
    pub wfh_days: u32,
    pub ooo_days: u32,
    pub working_days: u32,
}

/// Count attendance and time off for `user_id` within `range`.
///
/// Request spans are clipped to the range. Rejected requests are not counted.
pub fn attendance_metrics(
    user_id: DbId,
    range: &DateRange,
    inputs: &CalendarInputs<'_>,
) -> AttendanceMetrics {
    let attendance_days = inputs
        .attendance
        .iter()
        .filter(|a| a.user_id == user_id && range.contains(a.date))
        .count() as u32;

    let days_of = |kind: TimeOffKind| -> u32 {
        inputs
            .time_off
            .iter()
            .filter(|t| t.user_id == user_id && t.kind == kind)
            .filter(|t| t.status != RequestStatus::Rejected)
            .map(|t| t.range.overlap_days(range))
            .sum()
    };

    AttendanceMetrics {
        range: Some(*range),
        total_days: range.len_days(),
        attendance_days,
        leave_days: days_of(TimeOffKind::Leave),
        wfh_days: days_of(TimeOffKind::WorkFromHome),
        ooo_days: days_of(TimeOffKind::OutOfOffice),
        working_days: working_days(range),
    }
}

/// One cell of a month grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarDay {
    pub date: Day,
    pub in_month: bool,
    pub weekend: bool,
    pub statuses: Vec<DayStatus>,
}

/// Days covered by the Sunday-first six-week grid of `year`-`month`.
pub fn month_grid_range(year: i32, month: u32) -> Result<DateRange, CoreError> {
    let month = month_range(year, month)?;
    let lead = u64::from(month.start.weekday().num_days_from_sunday());
    let out_of_range = || CoreError::Validation("Month is out of range".into());
    let start = month
        .start
        .checked_sub_days(Days::new(lead))
        .ok_or_else(out_of_range)?;
    let end = start
        .checked_add_days(Days::new(MONTH_GRID_DAYS as u64 - 1))
        .ok_or_else(out_of_range)?;
    DateRange::new(start, end)
}

/// A Sunday-first six-week grid around `year`-`month` with each day's statuses.
pub fn month_calendar(
    user_id: DbId,
    year: i32,
    month_number: u32,
    inputs: &CalendarInputs<'_>,
) -> Result<Vec<CalendarDay>, CoreError> {
    let month = month_range(year, month_number)?;
    let grid = month_grid_range(year, month_number)?;

    Ok(grid
        .days()
        .map(|date| CalendarDay {
            date,
            in_month: month.contains(date),
            weekend: is_weekend(date),
            statuses: day_statuses(date, user_id, inputs),
        })
        .collect())
}

/// Check the shape of a time-off request.
///
/// `leave_type` is only meaningful for leave. Half-day leave covers a single
/// day and names its session; a session without half-day leave is rejected.
pub fn validate_time_off(
    kind: TimeOffKind,
    range: &DateRange,
    leave_type: Option<AttendanceKind>,
    session: Option<LeaveSession>,
) -> Result<(), CoreError> {
    if kind != TimeOffKind::Leave && (leave_type.is_some() || session.is_some()) {
        return Err(CoreError::Validation(format!(
            "Leave type and session only apply to leave, not {kind}"
        )));
    }
    match (leave_type, session) {
        (Some(AttendanceKind::Half), None) => Err(CoreError::Validation(
            "Half-day leave needs a session".into(),
        )),
        (Some(AttendanceKind::Half), Some(_)) if range.len_days() != 1 => Err(
            CoreError::Validation("Half-day leave must start and end on the same day".into()),
        ),
        (Some(AttendanceKind::Full) | None, Some(_)) => Err(CoreError::Validation(
            "A session is only allowed for half-day leave".into(),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    fn d(y: i32, m: u32, day: u32) -> Day {
        Day::from_ymd_opt(y, m, day).unwrap()
    }

    fn range(a: Day, b: Day) -> DateRange {
        DateRange::new(a, b).unwrap()
    }

    fn span(id: DbId, user_id: DbId, kind: TimeOffKind, r: DateRange) -> TimeOffSpan {
        TimeOffSpan {
            id,
            user_id,
            kind,
            range: r,
            status: RequestStatus::Approved,
            reason: "family".into(),
            leave_type: None,
            session: None,
        }
    }

    #[test]
    fn new_rejects_inverted_range() {
        assert_matches!(
            DateRange::new(d(2024, 3, 2), d(2024, 3, 1)),
            Err(CoreError::Validation(_))
        );
        assert!(DateRange::new(d(2024, 3, 1), d(2024, 3, 1)).is_ok());
    }

    #[test]
    fn boundaries_are_inclusive() {
        let r = range(d(2024, 3, 1), d(2024, 3, 5));
        assert!(r.contains(d(2024, 3, 1)));
        assert!(r.contains(d(2024, 3, 5)));
        assert!(!r.contains(d(2024, 2, 29)));
        assert!(!r.contains(d(2024, 3, 6)));
        assert_eq!(r.len_days(), 5);
        assert_eq!(r.days().count(), 5);
    }

    #[test]
    fn overlap_counts_shared_days() {
        let a = range(d(2024, 3, 1), d(2024, 3, 10));
        let b = range(d(2024, 3, 10), d(2024, 3, 20));
        let c = range(d(2024, 3, 11), d(2024, 3, 12));
        assert!(a.overlaps(&b));
        assert_eq!(a.overlap_days(&b), 1);
        assert!(!a.overlaps(&c));
        assert_eq!(a.overlap_days(&c), 0);
        assert_eq!(b.overlap_days(&c), 2);
    }

    #[test]
    fn working_days_skip_weekends() {
        // 2024-03-04 is a Monday.
        let week = range(d(2024, 3, 4), d(2024, 3, 10));
        assert_eq!(working_days(&week), 5);
        let weekend = range(d(2024, 3, 9), d(2024, 3, 10));
        assert_eq!(working_days(&weekend), 0);
    }

    #[test]
    fn month_range_handles_leap_years_and_december() {
        let feb = month_range(2024, 2).unwrap();
        assert_eq!(feb.end, d(2024, 2, 29));
        let dec = month_range(2023, 12).unwrap();
        assert_eq!(dec.start, d(2023, 12, 1));
        assert_eq!(dec.end, d(2023, 12, 31));
        assert!(month_range(2024, 13).is_err());
    }

    #[test]
    fn statuses_come_in_fixed_order() {
        let day = d(2024, 3, 5);
        let attendance = [AttendanceMark {
            user_id: 1,
            date: day,
            kind: AttendanceKind::Half,
        }];
        let time_off = [
            span(10, 1, TimeOffKind::OutOfOffice, DateRange::single(day)),
            span(11, 1, TimeOffKind::WorkFromHome, range(d(2024, 3, 4), day)),
            span(12, 1, TimeOffKind::Leave, range(day, d(2024, 3, 8))),
        ];
        let holidays = [HolidaySpan {
            id: 7,
            name: "Founders day".into(),
            range: DateRange::single(day),
        }];
        let inputs = CalendarInputs {
            attendance: &attendance,
            time_off: &time_off,
            holidays: &holidays,
        };

        let statuses = day_statuses(day, 1, &inputs);
        assert_eq!(statuses.len(), 5);
        assert_matches!(statuses[0], DayStatus::Attendance { kind: AttendanceKind::Half });
        assert_matches!(statuses[1], DayStatus::Leave { request_id: 12, .. });
        assert_matches!(statuses[2], DayStatus::WorkFromHome { request_id: 11, .. });
        assert_matches!(statuses[3], DayStatus::OutOfOffice { request_id: 10, .. });
        assert_matches!(statuses[4], DayStatus::Holiday { holiday_id: 7, .. });
    }

    #[test]
    fn holidays_apply_to_everyone_but_requests_do_not() {
        let day = d(2024, 3, 5);
        let time_off = [span(1, 1, TimeOffKind::Leave, DateRange::single(day))];
        let holidays = [HolidaySpan {
            id: 2,
            name: "Festival".into(),
            range: DateRange::single(day),
        }];
        let inputs = CalendarInputs {
            attendance: &[],
            time_off: &time_off,
            holidays: &holidays,
        };

        let other_user = day_statuses(day, 2, &inputs);
        assert_eq!(other_user.len(), 1);
        assert_matches!(other_user[0], DayStatus::Holiday { .. });
    }

    #[test]
    fn metrics_clip_requests_to_range() {
        let march = month_range(2024, 3).unwrap();
        let time_off = [
            span(1, 1, TimeOffKind::Leave, range(d(2024, 2, 27), d(2024, 3, 2))),
            span(2, 1, TimeOffKind::WorkFromHome, range(d(2024, 3, 11), d(2024, 3, 12))),
            span(3, 2, TimeOffKind::OutOfOffice, range(d(2024, 3, 11), d(2024, 3, 12))),
            TimeOffSpan {
                status: RequestStatus::Rejected,
                ..span(4, 1, TimeOffKind::OutOfOffice, range(d(2024, 3, 20), d(2024, 3, 22)))
            },
        ];
        let attendance = [
            AttendanceMark {
                user_id: 1,
                date: d(2024, 3, 4),
                kind: AttendanceKind::Full,
            },
            AttendanceMark {
                user_id: 1,
                date: d(2024, 4, 1),
                kind: AttendanceKind::Full,
            },
        ];
        let inputs = CalendarInputs {
            attendance: &attendance,
            time_off: &time_off,
            holidays: &[],
        };

        let m = attendance_metrics(1, &march, &inputs);
        assert_eq!(m.total_days, 31);
        assert_eq!(m.attendance_days, 1);
        assert_eq!(m.leave_days, 2);
        assert_eq!(m.wfh_days, 2);
        assert_eq!(m.ooo_days, 0);
        assert_eq!(m.working_days, 21);
    }

    #[test]
    fn month_grid_starts_on_sunday() {
        let grid = month_calendar(1, 2024, 3, &CalendarInputs::default()).unwrap();
        assert_eq!(grid.len(), MONTH_GRID_DAYS);
        // March 1st 2024 is a Friday, so the grid opens on Sunday Feb 25th.
        assert_eq!(grid[0].date, d(2024, 2, 25));
        assert!(!grid[0].in_month);
        assert!(grid[0].weekend);
        assert_eq!(grid.iter().filter(|c| c.in_month).count(), 31);
    }

    #[test]
    fn grid_range_spans_six_weeks() {
        let grid = month_grid_range(2024, 3).unwrap();
        assert_eq!(grid.start, d(2024, 2, 25));
        assert_eq!(grid.len_days(), MONTH_GRID_DAYS as u32);
    }

    #[test]
    fn half_day_leave_needs_one_day_and_a_session() {
        let one = DateRange::single(d(2024, 5, 6));
        let two = range(d(2024, 5, 6), d(2024, 5, 7));
        let half = Some(AttendanceKind::Half);
        let morning = Some(LeaveSession::Forenoon);

        assert!(validate_time_off(TimeOffKind::Leave, &one, half, morning).is_ok());
        assert!(validate_time_off(TimeOffKind::Leave, &two, None, None).is_ok());
        assert_matches!(
            validate_time_off(TimeOffKind::Leave, &one, half, None),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            validate_time_off(TimeOffKind::Leave, &two, half, morning),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            validate_time_off(TimeOffKind::Leave, &one, Some(AttendanceKind::Full), morning),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn leave_fields_are_rejected_on_wfh() {
        let one = DateRange::single(d(2024, 5, 6));
        assert!(validate_time_off(TimeOffKind::WorkFromHome, &one, None, None).is_ok());
        assert_matches!(
            validate_time_off(TimeOffKind::OutOfOffice, &one, Some(AttendanceKind::Full), None),
            Err(CoreError::Validation(_))
        );
    }
}
