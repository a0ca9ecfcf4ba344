//! Repository for `time_off_requests`: leave, WFH and OOO share one table
//! and are told apart by `kind`.

use pms_core::calendar::DateRange;
use pms_core::status::{RequestStatus, TimeOffKind};
use pms_core::types::DbId;
use sqlx::SqlitePool;

use crate::models::time_off::{CreateTimeOff, TimeOffRequest};
use crate::repositories::NOW;

const COLUMNS: &str = "id, user_id, kind, start_date, end_date, reason, leave_type, session, \
                       status, decided_by, created_at, updated_at";

pub struct TimeOffRepo;

impl TimeOffRepo {
    /// File a new pending request.
    pub async fn create(
        pool: &SqlitePool,
        user_id: DbId,
        kind: TimeOffKind,
        input: &CreateTimeOff,
    ) -> Result<TimeOffRequest, sqlx::Error> {
        let query = format!(
            "INSERT INTO time_off_requests
                (user_id, kind, start_date, end_date, reason, leave_type, session)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimeOffRequest>(&query)
            .bind(user_id)
            .bind(kind.as_str())
            .bind(input.start_date)
            .bind(input.end_date)
            .bind(&input.reason)
            .bind(&input.leave_type)
            .bind(&input.session)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &SqlitePool,
        id: DbId,
    ) -> Result<Option<TimeOffRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM time_off_requests WHERE id = ?1");
        sqlx::query_as::<_, TimeOffRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A user's requests, newest first, optionally of one kind.
    pub async fn list_for_user(
        pool: &SqlitePool,
        user_id: DbId,
        kind: Option<TimeOffKind>,
    ) -> Result<Vec<TimeOffRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM time_off_requests
             WHERE user_id = ?1 AND (?2 IS NULL OR kind = ?2)
             ORDER BY start_date DESC, id DESC"
        );
        sqlx::query_as::<_, TimeOffRequest>(&query)
            .bind(user_id)
            .bind(kind.map(|k| k.as_str()))
            .fetch_all(pool)
            .await
    }

    /// Everyone's requests, for the approval queue.
    pub async fn list_all(
        pool: &SqlitePool,
        kind: Option<TimeOffKind>,
        status: Option<RequestStatus>,
    ) -> Result<Vec<TimeOffRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM time_off_requests
             WHERE (?1 IS NULL OR kind = ?1) AND (?2 IS NULL OR status = ?2)
             ORDER BY start_date DESC, id DESC"
        );
        sqlx::query_as::<_, TimeOffRequest>(&query)
            .bind(kind.map(|k| k.as_str()))
            .bind(status.map(|s| s.as_str()))
            .fetch_all(pool)
            .await
    }

    /// Requests of any kind that touch `range`, for one user or everyone.
    pub async fn list_overlapping(
        pool: &SqlitePool,
        user_id: Option<DbId>,
        range: &DateRange,
    ) -> Result<Vec<TimeOffRequest>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM time_off_requests
             WHERE (?1 IS NULL OR user_id = ?1) AND start_date <= ?3 AND end_date >= ?2
             ORDER BY start_date, id"
        );
        sqlx::query_as::<_, TimeOffRequest>(&query)
            .bind(user_id)
            .bind(range.start)
            .bind(range.end)
            .fetch_all(pool)
            .await
    }

    /// Record an approval decision, optionally moving the dates at the same time.
    pub async fn decide(
        pool: &SqlitePool,
        id: DbId,
        status: RequestStatus,
        decided_by: DbId,
        range: Option<&DateRange>,
    ) -> Result<Option<TimeOffRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE time_off_requests SET
                status = ?2,
                decided_by = ?3,
                start_date = COALESCE(?4, start_date),
                end_date = COALESCE(?5, end_date),
                updated_at = {NOW}
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimeOffRequest>(&query)
            .bind(id)
            .bind(status.as_str())
            .bind(decided_by)
            .bind(range.map(|r| r.start))
            .bind(range.map(|r| r.end))
            .fetch_optional(pool)
            .await
    }

    /// Move a request to new dates without changing its status.
    pub async fn update_dates(
        pool: &SqlitePool,
        id: DbId,
        range: &DateRange,
    ) -> Result<Option<TimeOffRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE time_off_requests SET start_date = ?2, end_date = ?3, updated_at = {NOW}
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimeOffRequest>(&query)
            .bind(id)
            .bind(range.start)
            .bind(range.end)
            .fetch_optional(pool)
            .await
    }

    /// Withdraw a request that has not been decided yet.
    ///
    /// Returns `true` if a pending row was removed.
    pub async fn cancel_pending(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM time_off_requests WHERE id = ?1 AND status = 'pending'")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}
