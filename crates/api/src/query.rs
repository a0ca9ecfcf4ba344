//! Shared query parameter types for API handlers.

use chrono::{Datelike, Utc};
use pms_core::calendar::{month_range, DateRange};
use pms_core::error::CoreError;
use pms_core::types::{Day, DbId};
use serde::Deserialize;

pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Generic pagination parameters (`?limit=&offset=`).
#[derive(Debug, Default, Deserialize)]
pub struct PaginationParams {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl PaginationParams {
    /// `(limit, offset)` after clamping.
    pub fn resolve(&self) -> (i64, i64) {
        (
            clamp_limit(self.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT),
            clamp_offset(self.offset),
        )
    }
}

pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, max)
}

pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

/// `?start=&end=` inclusive day range; both or neither.
#[derive(Debug, Default, Deserialize)]
pub struct DateRangeParams {
    pub start: Option<Day>,
    pub end: Option<Day>,
    pub user_id: Option<DbId>,
}

impl DateRangeParams {
    /// The requested range, or `None` when no bounds were given.
    pub fn range(&self) -> Result<Option<DateRange>, CoreError> {
        match (self.start, self.end) {
            (None, None) => Ok(None),
            (Some(start), Some(end)) => DateRange::new(start, end).map(Some),
            (Some(day), None) | (None, Some(day)) => Ok(Some(DateRange::single(day))),
        }
    }

    /// The requested range, defaulting to the current month.
    pub fn range_or_current_month(&self) -> Result<DateRange, CoreError> {
        match self.range()? {
            Some(range) => Ok(range),
            None => {
                let today = Utc::now().date_naive();
                month_range(today.year(), today.month())
            }
        }
    }
}

/// `?year=&month=&user_id=` for month calendars; defaults to the current month.
#[derive(Debug, Default, Deserialize)]
pub struct MonthParams {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub user_id: Option<DbId>,
}

impl MonthParams {
    pub fn year_month(&self) -> (i32, u32) {
        let today = Utc::now().date_naive();
        (
            self.year.unwrap_or(today.year()),
            self.month.unwrap_or(today.month()),
        )
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    use super::*;

    fn day(d: u32) -> Day {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn limits_are_clamped() {
        assert_eq!(clamp_limit(None, 20, 100), 20);
        assert_eq!(clamp_limit(Some(0), 20, 100), 1);
        assert_eq!(clamp_limit(Some(500), 20, 100), 100);
        assert_eq!(clamp_offset(Some(-4)), 0);
    }

    #[test]
    fn range_params_accept_partial_bounds() {
        let params = DateRangeParams {
            start: Some(day(4)),
            ..Default::default()
        };
        assert_eq!(params.range().unwrap(), Some(DateRange::single(day(4))));
        assert_eq!(DateRangeParams::default().range().unwrap(), None);
    }

    #[test]
    fn inverted_range_is_rejected() {
        let params = DateRangeParams {
            start: Some(day(9)),
            end: Some(day(2)),
            user_id: None,
        };
        assert_matches!(params.range(), Err(CoreError::Validation(_)));
    }
}
