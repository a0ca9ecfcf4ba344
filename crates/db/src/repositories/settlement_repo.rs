//! Repository for outsource team `settlements` and their payment ledger.
//!
//! `status` is never written directly: every change to the total or to the
//! payments re-derives it from the ledger inside the same transaction.

use pms_core::settlement::derive_status;
use pms_core::types::DbId;
use sqlx::{SqliteConnection, SqlitePool};

use crate::models::settlement::{
    CreatePayment, CreateSettlement, Settlement, SettlementPayment, UpdatePayment,
};
use crate::repositories::NOW;

const COLUMNS: &str = "id, task_id, outsource_team_id, total_amount, status, created_at, updated_at";

const PAYMENT_COLUMNS: &str = "id, settlement_id, amount, paid_on, notes, created_at";

pub struct SettlementRepo;

impl SettlementRepo {
    pub async fn create(
        pool: &SqlitePool,
        input: &CreateSettlement,
    ) -> Result<Settlement, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "INSERT INTO settlements (task_id, outsource_team_id, total_amount)
             VALUES (?1, ?2, ?3)
             RETURNING {COLUMNS}"
        );
        let created = sqlx::query_as::<_, Settlement>(&query)
            .bind(input.task_id)
            .bind(input.outsource_team_id)
            .bind(input.total_amount)
            .fetch_one(&mut *tx)
            .await?;
        let settlement = refresh_status(&mut tx, created.id).await?;
        tx.commit().await?;
        Ok(settlement)
    }

    pub async fn find_by_id(
        pool: &SqlitePool,
        id: DbId,
    ) -> Result<Option<Settlement>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM settlements WHERE id = ?1");
        sqlx::query_as::<_, Settlement>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_by_task(
        pool: &SqlitePool,
        task_id: DbId,
    ) -> Result<Vec<Settlement>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM settlements WHERE task_id = ?1 ORDER BY id");
        sqlx::query_as::<_, Settlement>(&query)
            .bind(task_id)
            .fetch_all(pool)
            .await
    }

    pub async fn list_by_team(
        pool: &SqlitePool,
        team_id: DbId,
    ) -> Result<Vec<Settlement>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM settlements WHERE outsource_team_id = ?1
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Settlement>(&query)
            .bind(team_id)
            .fetch_all(pool)
            .await
    }

    /// Change the amount owed; the status follows.
    pub async fn update_total(
        pool: &SqlitePool,
        id: DbId,
        total_amount: f64,
    ) -> Result<Option<Settlement>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let updated = sqlx::query(&format!(
            "UPDATE settlements SET total_amount = ?2, updated_at = {NOW} WHERE id = ?1"
        ))
        .bind(id)
        .bind(total_amount)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        let settlement = refresh_status(&mut tx, id).await?;
        tx.commit().await?;
        Ok(Some(settlement))
    }

    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM settlements WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Payments
    // -----------------------------------------------------------------------

    pub async fn list_payments(
        pool: &SqlitePool,
        settlement_id: DbId,
    ) -> Result<Vec<SettlementPayment>, sqlx::Error> {
        let query = format!(
            "SELECT {PAYMENT_COLUMNS} FROM settlement_payments
             WHERE settlement_id = ?1
             ORDER BY paid_on, id"
        );
        sqlx::query_as::<_, SettlementPayment>(&query)
            .bind(settlement_id)
            .fetch_all(pool)
            .await
    }

    /// Record a payment and return the settlement with its new status.
    pub async fn add_payment(
        pool: &SqlitePool,
        settlement_id: DbId,
        input: &CreatePayment,
    ) -> Result<Settlement, sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query(
            "INSERT INTO settlement_payments (settlement_id, amount, paid_on, notes)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(settlement_id)
        .bind(input.amount)
        .bind(input.paid_on)
        .bind(&input.notes)
        .execute(&mut *tx)
        .await?;
        let settlement = refresh_status(&mut tx, settlement_id).await?;
        tx.commit().await?;
        Ok(settlement)
    }

    /// Edit a payment of this settlement. Returns `None` if the payment does
    /// not belong to it.
    pub async fn update_payment(
        pool: &SqlitePool,
        settlement_id: DbId,
        payment_id: DbId,
        input: &UpdatePayment,
    ) -> Result<Option<Settlement>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let updated = sqlx::query(
            "UPDATE settlement_payments SET
                amount = COALESCE(?3, amount),
                paid_on = COALESCE(?4, paid_on),
                notes = COALESCE(?5, notes)
             WHERE id = ?2 AND settlement_id = ?1",
        )
        .bind(settlement_id)
        .bind(payment_id)
        .bind(input.amount)
        .bind(input.paid_on)
        .bind(&input.notes)
        .execute(&mut *tx)
        .await?;
        if updated.rows_affected() == 0 {
            return Ok(None);
        }
        let settlement = refresh_status(&mut tx, settlement_id).await?;
        tx.commit().await?;
        Ok(Some(settlement))
    }

    pub async fn delete_payment(
        pool: &SqlitePool,
        settlement_id: DbId,
        payment_id: DbId,
    ) -> Result<Option<Settlement>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let deleted =
            sqlx::query("DELETE FROM settlement_payments WHERE id = ?2 AND settlement_id = ?1")
                .bind(settlement_id)
                .bind(payment_id)
                .execute(&mut *tx)
                .await?;
        if deleted.rows_affected() == 0 {
            return Ok(None);
        }
        let settlement = refresh_status(&mut tx, settlement_id).await?;
        tx.commit().await?;
        Ok(Some(settlement))
    }

    /// Sum of recorded payments.
    pub async fn paid_amount(pool: &SqlitePool, settlement_id: DbId) -> Result<f64, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        paid_amount(&mut conn, settlement_id).await
    }
}

async fn paid_amount(conn: &mut SqliteConnection, settlement_id: DbId) -> Result<f64, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount), 0.0) FROM settlement_payments WHERE settlement_id = ?1",
    )
    .bind(settlement_id)
    .fetch_one(conn)
    .await
}

/// Re-derive `status` from the ledger and return the updated row.
async fn refresh_status(
    conn: &mut SqliteConnection,
    settlement_id: DbId,
) -> Result<Settlement, sqlx::Error> {
    let total: f64 = sqlx::query_scalar("SELECT total_amount FROM settlements WHERE id = ?1")
        .bind(settlement_id)
        .fetch_one(&mut *conn)
        .await?;
    let paid = paid_amount(conn, settlement_id).await?;
    let status = derive_status(paid, total);

    let query = format!(
        "UPDATE settlements SET status = ?2, updated_at = {NOW} WHERE id = ?1 RETURNING {COLUMNS}"
    );
    sqlx::query_as::<_, Settlement>(&query)
        .bind(settlement_id)
        .bind(status.as_str())
        .fetch_one(conn)
        .await
}
