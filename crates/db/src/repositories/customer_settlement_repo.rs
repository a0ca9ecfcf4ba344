//! Repository for `customer_settlements` and `customer_payments`.
//!
//! The amount owed is always the project's current `total_amount`, joined in
//! at read time. The stored status is re-derived whenever payments change and,
//! through [`refresh_for_project`], whenever the project total changes.

use pms_core::settlement::derive_status;
use pms_core::types::DbId;
use sqlx::{SqliteConnection, SqlitePool};

use crate::models::settlement::{
    CreateCustomerPayment, CustomerPayment, CustomerSettlement, UpdateCustomerPayment,
};
use crate::repositories::NOW;

const SELECT: &str = "SELECT cs.id, cs.project_id, cs.customer_id, cs.status, \
                      p.total_amount AS total_amount, cs.created_at, cs.updated_at \
                      FROM customer_settlements cs \
                      JOIN projects p ON p.id = cs.project_id";

const PAYMENT_COLUMNS: &str = "id, customer_settlement_id, amount, paid_on, payment_ref, created_at";

pub struct CustomerSettlementRepo;

impl CustomerSettlementRepo {
    /// Open the settlement for a project. A project has at most one; a second
    /// insert fails on the unique constraint.
    pub async fn create(
        pool: &SqlitePool,
        project_id: DbId,
        customer_id: DbId,
    ) -> Result<CustomerSettlement, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let id: DbId = sqlx::query_scalar(
            "INSERT INTO customer_settlements (project_id, customer_id)
             VALUES (?1, ?2)
             RETURNING id",
        )
        .bind(project_id)
        .bind(customer_id)
        .fetch_one(&mut *tx)
        .await?;
        let settlement = refresh_status(&mut tx, id).await?;
        tx.commit().await?;
        Ok(settlement)
    }

    pub async fn find_by_id(
        pool: &SqlitePool,
        id: DbId,
    ) -> Result<Option<CustomerSettlement>, sqlx::Error> {
        let query = format!("{SELECT} WHERE cs.id = ?1");
        sqlx::query_as::<_, CustomerSettlement>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_project(
        pool: &SqlitePool,
        project_id: DbId,
    ) -> Result<Option<CustomerSettlement>, sqlx::Error> {
        let query = format!("{SELECT} WHERE cs.project_id = ?1");
        sqlx::query_as::<_, CustomerSettlement>(&query)
            .bind(project_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_customer(
        pool: &SqlitePool,
        customer_id: DbId,
    ) -> Result<Vec<CustomerSettlement>, sqlx::Error> {
        let query =
            format!("{SELECT} WHERE cs.customer_id = ?1 ORDER BY cs.created_at DESC, cs.id DESC");
        sqlx::query_as::<_, CustomerSettlement>(&query)
            .bind(customer_id)
            .fetch_all(pool)
            .await
    }

    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM customer_settlements WHERE id = ?1")
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
    ) -> Result<Vec<CustomerPayment>, sqlx::Error> {
        let query = format!(
            "SELECT {PAYMENT_COLUMNS} FROM customer_payments
             WHERE customer_settlement_id = ?1
             ORDER BY paid_on, id"
        );
        sqlx::query_as::<_, CustomerPayment>(&query)
            .bind(settlement_id)
            .fetch_all(pool)
            .await
    }

    pub async fn add_payment(
        pool: &SqlitePool,
        settlement_id: DbId,
        input: &CreateCustomerPayment,
    ) -> Result<CustomerSettlement, sqlx::Error> {
        let mut tx = pool.begin().await?;
        sqlx::query(
            "INSERT INTO customer_payments (customer_settlement_id, amount, paid_on, payment_ref)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(settlement_id)
        .bind(input.amount)
        .bind(input.paid_on)
        .bind(&input.payment_ref)
        .execute(&mut *tx)
        .await?;
        let settlement = refresh_status(&mut tx, settlement_id).await?;
        tx.commit().await?;
        Ok(settlement)
    }

    pub async fn update_payment(
        pool: &SqlitePool,
        settlement_id: DbId,
        payment_id: DbId,
        input: &UpdateCustomerPayment,
    ) -> Result<Option<CustomerSettlement>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let updated = sqlx::query(
            "UPDATE customer_payments SET
                amount = COALESCE(?3, amount),
                paid_on = COALESCE(?4, paid_on),
                payment_ref = COALESCE(?5, payment_ref)
             WHERE id = ?2 AND customer_settlement_id = ?1",
        )
        .bind(settlement_id)
        .bind(payment_id)
        .bind(input.amount)
        .bind(input.paid_on)
        .bind(&input.payment_ref)
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
    ) -> Result<Option<CustomerSettlement>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let deleted = sqlx::query(
            "DELETE FROM customer_payments WHERE id = ?2 AND customer_settlement_id = ?1",
        )
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

    pub async fn paid_amount(pool: &SqlitePool, settlement_id: DbId) -> Result<f64, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        paid_amount(&mut conn, settlement_id).await
    }
}

async fn paid_amount(conn: &mut SqliteConnection, settlement_id: DbId) -> Result<f64, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT COALESCE(SUM(amount), 0.0) FROM customer_payments WHERE customer_settlement_id = ?1",
    )
    .bind(settlement_id)
    .fetch_one(conn)
    .await
}

/// Re-derive the status of a project's settlement, if it has one.
///
/// Runs on the caller's connection so it joins the transaction that changed
/// the project total.
pub(crate) async fn refresh_for_project(
    conn: &mut SqliteConnection,
    project_id: DbId,
) -> Result<Option<CustomerSettlement>, sqlx::Error> {
    let settlement_id: Option<DbId> =
        sqlx::query_scalar("SELECT id FROM customer_settlements WHERE project_id = ?1")
            .bind(project_id)
            .fetch_optional(&mut *conn)
            .await?;
    match settlement_id {
        Some(id) => refresh_status(conn, id).await.map(Some),
        None => Ok(None),
    }
}

async fn refresh_status(
    conn: &mut SqliteConnection,
    settlement_id: DbId,
) -> Result<CustomerSettlement, sqlx::Error> {
    let total: f64 = sqlx::query_scalar(
        "SELECT p.total_amount FROM customer_settlements cs
         JOIN projects p ON p.id = cs.project_id
         WHERE cs.id = ?1",
    )
    .bind(settlement_id)
    .fetch_one(&mut *conn)
    .await?;
    let paid = paid_amount(&mut *conn, settlement_id).await?;

    sqlx::query(&format!(
        "UPDATE customer_settlements SET status = ?2, updated_at = {NOW} WHERE id = ?1"
    ))
    .bind(settlement_id)
    .bind(derive_status(paid, total).as_str())
    .execute(&mut *conn)
    .await?;

    let query = format!("{SELECT} WHERE cs.id = ?1");
    sqlx::query_as::<_, CustomerSettlement>(&query)
        .bind(settlement_id)
        .fetch_one(conn)
        .await
}
