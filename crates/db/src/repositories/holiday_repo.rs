//! Repository for the `holidays` table.

use pms_core::calendar::DateRange;
use pms_core::types::DbId;
use sqlx::SqlitePool;

use crate::models::holiday::{CreateHoliday, Holiday, UpdateHoliday};
use crate::repositories::NOW;

const COLUMNS: &str = "id, name, start_date, end_date, created_at, updated_at";

pub struct HolidayRepo;

impl HolidayRepo {
    pub async fn create(pool: &SqlitePool, input: &CreateHoliday) -> Result<Holiday, sqlx::Error> {
        let query = format!(
            "INSERT INTO holidays (name, start_date, end_date)
             VALUES (?1, ?2, ?3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Holiday>(&query)
            .bind(&input.name)
            .bind(input.start_date)
            .bind(input.end_date)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Holiday>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM holidays WHERE id = ?1");
        sqlx::query_as::<_, Holiday>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &SqlitePool) -> Result<Vec<Holiday>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM holidays ORDER BY start_date, id");
        sqlx::query_as::<_, Holiday>(&query).fetch_all(pool).await
    }

    /// Holidays that touch `range`.
    pub async fn list_range(
        pool: &SqlitePool,
        range: &DateRange,
    ) -> Result<Vec<Holiday>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM holidays
             WHERE start_date <= ?2 AND end_date >= ?1
             ORDER BY start_date, id"
        );
        sqlx::query_as::<_, Holiday>(&query)
            .bind(range.start)
            .bind(range.end)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateHoliday,
    ) -> Result<Option<Holiday>, sqlx::Error> {
        let query = format!(
            "UPDATE holidays SET
                name = COALESCE(?2, name),
                start_date = COALESCE(?3, start_date),
                end_date = COALESCE(?4, end_date),
                updated_at = {NOW}
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Holiday>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(input.start_date)
            .bind(input.end_date)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM holidays WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
