//! Repository for the `outsource_teams` table.

use pms_core::types::DbId;
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::models::outsource_team::{CreateOutsourceTeam, OutsourceTeam, UpdateOutsourceTeam};
use crate::repositories::NOW;

const COLUMNS: &str = "id, name, address, gst_number, billing_address, is_billing_address_same, \
                        contact_persons, created_at, updated_at";

/// Provides CRUD operations for outsource teams.
pub struct OutsourceTeamRepo;

impl OutsourceTeamRepo {
    /// Insert a new team. When `is_billing_address_same` is set the billing
    /// address mirrors `address`.
    pub async fn create(
        pool: &SqlitePool,
        input: &CreateOutsourceTeam,
    ) -> Result<OutsourceTeam, sqlx::Error> {
        let billing = if input.is_billing_address_same {
            &input.address
        } else {
            &input.billing_address
        };
        let query = format!(
            "INSERT INTO outsource_teams (name, address, gst_number, billing_address,
                                          is_billing_address_same, contact_persons)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OutsourceTeam>(&query)
            .bind(&input.name)
            .bind(&input.address)
            .bind(&input.gst_number)
            .bind(billing)
            .bind(input.is_billing_address_same)
            .bind(Json(&input.contact_persons))
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &SqlitePool,
        id: DbId,
    ) -> Result<Option<OutsourceTeam>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM outsource_teams WHERE id = ?1");
        sqlx::query_as::<_, OutsourceTeam>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &SqlitePool) -> Result<Vec<OutsourceTeam>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM outsource_teams ORDER BY name, id");
        sqlx::query_as::<_, OutsourceTeam>(&query)
            .fetch_all(pool)
            .await
    }

    /// Update a team. Only non-`None` fields in `input` are applied; a team
    /// flagged `is_billing_address_same` keeps its billing address in step.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateOutsourceTeam,
    ) -> Result<Option<OutsourceTeam>, sqlx::Error> {
        let query = format!(
            "UPDATE outsource_teams SET
                name = COALESCE(?2, name),
                address = COALESCE(?3, address),
                gst_number = COALESCE(?4, gst_number),
                is_billing_address_same = COALESCE(?6, is_billing_address_same),
                billing_address = CASE
                    WHEN COALESCE(?6, is_billing_address_same) = 1 THEN COALESCE(?3, address)
                    ELSE COALESCE(?5, billing_address)
                END,
                contact_persons = COALESCE(?7, contact_persons),
                updated_at = {NOW}
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OutsourceTeam>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.address)
            .bind(&input.gst_number)
            .bind(&input.billing_address)
            .bind(input.is_billing_address_same)
            .bind(input.contact_persons.as_ref().map(Json))
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM outsource_teams WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
