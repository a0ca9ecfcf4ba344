//! Repository for the `customers` table.

use pms_core::types::DbId;
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::models::customer::{CreateCustomer, Customer, UpdateCustomer};
use crate::repositories::NOW;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, nickname, email, phone, address, billing_address, \
                        shipping_address, gst_number, logo_url, contact_persons, \
                        created_at, updated_at";

/// Provides CRUD operations for customers.
pub struct CustomerRepo;

impl CustomerRepo {
    /// Insert a new customer, returning the created row.
    pub async fn create(pool: &SqlitePool, input: &CreateCustomer) -> Result<Customer, sqlx::Error> {
        let query = format!(
            "INSERT INTO customers (name, nickname, email, phone, address, billing_address,
                                    shipping_address, gst_number, logo_url, contact_persons)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Customer>(&query)
            .bind(&input.name)
            .bind(&input.nickname)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.address)
            .bind(&input.billing_address)
            .bind(&input.shipping_address)
            .bind(&input.gst_number)
            .bind(&input.logo_url)
            .bind(Json(&input.contact_persons))
            .fetch_one(pool)
            .await
    }

    /// Find a customer by internal ID.
    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Customer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM customers WHERE id = ?1");
        sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List customers alphabetically.
    pub async fn list(pool: &SqlitePool) -> Result<Vec<Customer>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM customers ORDER BY name, id");
        sqlx::query_as::<_, Customer>(&query).fetch_all(pool).await
    }

    /// Update a customer. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateCustomer,
    ) -> Result<Option<Customer>, sqlx::Error> {
        let query = format!(
            "UPDATE customers SET
                name = COALESCE(?2, name),
                nickname = COALESCE(?3, nickname),
                email = COALESCE(?4, email),
                phone = COALESCE(?5, phone),
                address = COALESCE(?6, address),
                billing_address = COALESCE(?7, billing_address),
                shipping_address = COALESCE(?8, shipping_address),
                gst_number = COALESCE(?9, gst_number),
                logo_url = COALESCE(?10, logo_url),
                contact_persons = COALESCE(?11, contact_persons),
                updated_at = {NOW}
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Customer>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.nickname)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.address)
            .bind(&input.billing_address)
            .bind(&input.shipping_address)
            .bind(&input.gst_number)
            .bind(&input.logo_url)
            .bind(input.contact_persons.as_ref().map(Json))
            .fetch_optional(pool)
            .await
    }

    /// Delete a customer. Returns `true` if a row was removed.
    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM customers WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
