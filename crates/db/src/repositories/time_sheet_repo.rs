//! Repository for self-reported `time_sheets`.

use pms_core::calendar::DateRange;
use pms_core::types::{Day, DbId};
use sqlx::SqlitePool;

use crate::models::time_sheet::{CreateTimeSheet, TimeSheet, UpdateTimeSheet};
use crate::repositories::NOW;

const COLUMNS: &str =
    "id, user_id, title, description, work_date, hours, minutes, created_at, updated_at";

pub struct TimeSheetRepo;

impl TimeSheetRepo {
    pub async fn create(
        pool: &SqlitePool,
        user_id: DbId,
        work_date: Day,
        input: &CreateTimeSheet,
    ) -> Result<TimeSheet, sqlx::Error> {
        let query = format!(
            "INSERT INTO time_sheets (user_id, title, description, work_date, hours, minutes)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimeSheet>(&query)
            .bind(user_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(work_date)
            .bind(input.hours)
            .bind(input.minutes)
            .fetch_one(pool)
            .await
    }

    pub async fn find(
        pool: &SqlitePool,
        user_id: DbId,
        id: DbId,
    ) -> Result<Option<TimeSheet>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM time_sheets WHERE id = ?1 AND user_id = ?2");
        sqlx::query_as::<_, TimeSheet>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// A user's sheets, newest day first, optionally limited to a range.
    pub async fn list(
        pool: &SqlitePool,
        user_id: DbId,
        range: Option<&DateRange>,
    ) -> Result<Vec<TimeSheet>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM time_sheets
             WHERE user_id = ?1
               AND (?2 IS NULL OR work_date >= ?2)
               AND (?3 IS NULL OR work_date <= ?3)
             ORDER BY work_date DESC, id DESC"
        );
        sqlx::query_as::<_, TimeSheet>(&query)
            .bind(user_id)
            .bind(range.map(|r| r.start))
            .bind(range.map(|r| r.end))
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &SqlitePool,
        user_id: DbId,
        id: DbId,
        input: &UpdateTimeSheet,
    ) -> Result<Option<TimeSheet>, sqlx::Error> {
        let query = format!(
            "UPDATE time_sheets SET
                title = COALESCE(?3, title),
                description = COALESCE(?4, description),
                work_date = COALESCE(?5, work_date),
                hours = COALESCE(?6, hours),
                minutes = COALESCE(?7, minutes),
                updated_at = {NOW}
             WHERE id = ?1 AND user_id = ?2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TimeSheet>(&query)
            .bind(id)
            .bind(user_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.work_date)
            .bind(input.hours)
            .bind(input.minutes)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &SqlitePool, user_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM time_sheets WHERE id = ?1 AND user_id = ?2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
