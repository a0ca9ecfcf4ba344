//! Repository for the `attendance` table.

use pms_core::calendar::DateRange;
use pms_core::status::AttendanceKind;
use pms_core::types::{Day, DbId};
use sqlx::SqlitePool;

use crate::models::attendance::Attendance;
use crate::repositories::NOW;

const COLUMNS: &str = "date, user_id, kind, marked_at, marked_by";

/// Provides daily attendance marks keyed by (date, user).
pub struct AttendanceRepo;

impl AttendanceRepo {
    /// Mark a user present on a day. Marking the same day again overwrites
    /// the kind and the marker.
    pub async fn mark(
        pool: &SqlitePool,
        user_id: DbId,
        date: Day,
        kind: AttendanceKind,
        marked_by: DbId,
    ) -> Result<Attendance, sqlx::Error> {
        let query = format!(
            "INSERT INTO attendance (date, user_id, kind, marked_by)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (date, user_id) DO UPDATE SET
                kind = excluded.kind,
                marked_by = excluded.marked_by,
                marked_at = {NOW}
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Attendance>(&query)
            .bind(date)
            .bind(user_id)
            .bind(kind.as_str())
            .bind(marked_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find(
        pool: &SqlitePool,
        user_id: DbId,
        date: Day,
    ) -> Result<Option<Attendance>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM attendance WHERE date = ?1 AND user_id = ?2");
        sqlx::query_as::<_, Attendance>(&query)
            .bind(date)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Change the kind of an existing mark. Returns `None` if the day is unmarked.
    pub async fn update_kind(
        pool: &SqlitePool,
        user_id: DbId,
        date: Day,
        kind: AttendanceKind,
    ) -> Result<Option<Attendance>, sqlx::Error> {
        let query = format!(
            "UPDATE attendance SET kind = ?3, marked_at = {NOW}
             WHERE date = ?1 AND user_id = ?2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Attendance>(&query)
            .bind(date)
            .bind(user_id)
            .bind(kind.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Remove a mark. Returns `true` if a row was removed.
    pub async fn remove(pool: &SqlitePool, user_id: DbId, date: Day) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM attendance WHERE date = ?1 AND user_id = ?2")
            .bind(date)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Marks inside `range`, for one user or everyone.
    pub async fn list_range(
        pool: &SqlitePool,
        user_id: Option<DbId>,
        range: &DateRange,
    ) -> Result<Vec<Attendance>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM attendance
             WHERE (?1 IS NULL OR user_id = ?1) AND date BETWEEN ?2 AND ?3
             ORDER BY date, user_id"
        );
        sqlx::query_as::<_, Attendance>(&query)
            .bind(user_id)
            .bind(range.start)
            .bind(range.end)
            .fetch_all(pool)
            .await
    }

    pub async fn has_attendance(
        pool: &SqlitePool,
        user_id: DbId,
        date: Day,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM attendance WHERE date = ?1 AND user_id = ?2)",
        )
        .bind(date)
        .bind(user_id)
        .fetch_one(pool)
        .await
    }
}
