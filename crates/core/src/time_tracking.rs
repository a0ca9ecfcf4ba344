//! Per-user task timers.
//!
//! Each (task, user) pair owns a single entry that accumulates whole minutes
//! across start/stop cycles.

use serde::Serialize;

use crate::error::CoreError;
use crate::types::Timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimerState {
    pub started_at: Timestamp,
    pub duration_minutes: i64,
    pub is_running: bool,
}

/// Whole minutes between two instants; clock skew never counts negative.
pub fn elapsed_minutes(from: Timestamp, to: Timestamp) -> i64 {
    (to - from).num_minutes().max(0)
}

/// Start (or restart) the clock.
///
/// A fresh entry starts at zero. Restarting a running entry banks the
/// minutes elapsed so far before resetting the start time.
pub fn start(entry: Option<TimerState>, now: Timestamp) -> TimerState {
    let duration_minutes = match entry {
        None => 0,
        Some(e) if e.is_running => e.duration_minutes + elapsed_minutes(e.started_at, now),
        Some(e) => e.duration_minutes,
    };
    TimerState {
        started_at: now,
        duration_minutes,
        is_running: true,
    }
}

/// Stop a running clock, adding the elapsed whole minutes.
pub fn stop(entry: TimerState, now: Timestamp) -> Result<TimerState, CoreError> {
    if !entry.is_running {
        return Err(CoreError::Conflict("Timer is not running".into()));
    }
    Ok(TimerState {
        started_at: now,
        duration_minutes: entry.duration_minutes + elapsed_minutes(entry.started_at, now),
        is_running: false,
    })
}

/// Total tracked minutes across entries.
pub fn total_minutes<I>(durations: I) -> i64
where
    I: IntoIterator<Item = i64>,
{
    durations.into_iter().sum()
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone, Utc};

    use super::*;

    fn at(minute: i64) -> Timestamp {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap() + Duration::minutes(minute)
    }

    #[test]
    fn fresh_timer_starts_at_zero() {
        let t = start(None, at(0));
        assert!(t.is_running);
        assert_eq!(t.duration_minutes, 0);
    }

    #[test]
    fn stop_adds_whole_minutes() {
        let t = start(None, at(0));
        let stopped = stop(t, at(0) + Duration::seconds(150)).unwrap();
        assert_eq!(stopped.duration_minutes, 2);
        assert!(!stopped.is_running);
    }

    #[test]
    fn cycles_accumulate() {
        let t = stop(start(None, at(0)), at(30)).unwrap();
        let t = start(Some(t), at(60));
        let t = stop(t, at(75)).unwrap();
        assert_eq!(t.duration_minutes, 45);
    }

    #[test]
    fn restarting_a_running_timer_keeps_elapsed_time() {
        let t = start(None, at(0));
        let t = start(Some(t), at(20));
        assert_eq!(t.duration_minutes, 20);
        assert_eq!(t.started_at, at(20));
    }

    #[test]
    fn stopping_an_idle_timer_is_a_conflict() {
        let t = stop(start(None, at(0)), at(5)).unwrap();
        assert_matches!(stop(t, at(10)), Err(CoreError::Conflict(_)));
    }

    #[test]
    fn skewed_clock_counts_zero() {
        assert_eq!(elapsed_minutes(at(10), at(5)), 0);
    }

    #[test]
    fn totals_sum_durations() {
        assert_eq!(total_minutes([10, 20, 5]), 35);
        assert_eq!(total_minutes(Vec::<i64>::new()), 0);
    }
}
