//! Repository for the `currencies` table.

use pms_core::types::DbId;
use sqlx::SqlitePool;

use crate::models::currency::{CreateCurrency, Currency, UpdateCurrency};
use crate::repositories::NOW;

const COLUMNS: &str = "id, name, symbol, is_mandatory, created_at, updated_at";

/// Provides CRUD operations for currencies.
pub struct CurrencyRepo;

impl CurrencyRepo {
    pub async fn create(pool: &SqlitePool, input: &CreateCurrency) -> Result<Currency, sqlx::Error> {
        let query = format!(
            "INSERT INTO currencies (name, symbol, is_mandatory)
             VALUES (?1, ?2, COALESCE(?3, 0))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Currency>(&query)
            .bind(&input.name)
            .bind(&input.symbol)
            .bind(input.is_mandatory)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Currency>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM currencies WHERE id = ?1");
        sqlx::query_as::<_, Currency>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List currencies alphabetically.
    pub async fn list(pool: &SqlitePool) -> Result<Vec<Currency>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM currencies ORDER BY name");
        sqlx::query_as::<_, Currency>(&query).fetch_all(pool).await
    }

    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateCurrency,
    ) -> Result<Option<Currency>, sqlx::Error> {
        let query = format!(
            "UPDATE currencies SET
                name = COALESCE(?2, name),
                symbol = COALESCE(?3, symbol),
                is_mandatory = COALESCE(?4, is_mandatory),
                updated_at = {NOW}
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Currency>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.symbol)
            .bind(input.is_mandatory)
            .fetch_optional(pool)
            .await
    }

    /// Delete a non-mandatory currency. Returns `true` if a row was removed.
    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM currencies WHERE id = ?1 AND is_mandatory = 0")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
