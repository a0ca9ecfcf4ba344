//! Repository for the `enquiries` and `enquiry_deliverables` tables.

use pms_core::enquiry::{deliverable_total, ConversionPlan, INITIAL_STATUS, STATUS_MOVED_TO_PROJECTS};
use pms_core::status::ProjectStatus;
use pms_core::types::DbId;
use sqlx::types::Json;
use sqlx::{SqliteConnection, SqlitePool};

use crate::models::enquiry::{
    CreateDeliverable, CreateEnquiry, Deliverable, Enquiry, UpdateEnquiry,
};
use crate::models::project::Project;
use crate::repositories::{project_repo, NOW};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, enquiry_number, name, description, customer_id, currency_id, \
                        scope_of_work, end_client, deadline, inputs_required, exclusions, \
                        charges, status, created_at, updated_at";

const DELIVERABLE_COLUMNS: &str =
    "id, enquiry_id, name, description, hours, cost_per_hour, total, created_at";

/// Provides CRUD and conversion operations for enquiries.
pub struct EnquiryRepo;

impl EnquiryRepo {
    /// Insert an enquiry and its deliverables in one transaction.
    pub async fn create(pool: &SqlitePool, input: &CreateEnquiry) -> Result<Enquiry, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO enquiries (enquiry_number, name, description, customer_id, currency_id,
                                    scope_of_work, end_client, deadline, inputs_required,
                                    exclusions, charges, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             RETURNING {COLUMNS}"
        );
        let enquiry = sqlx::query_as::<_, Enquiry>(&query)
            .bind(&input.enquiry_number)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.customer_id)
            .bind(input.currency_id)
            .bind(&input.scope_of_work)
            .bind(&input.end_client)
            .bind(input.deadline)
            .bind(Json(&input.inputs_required))
            .bind(Json(&input.exclusions))
            .bind(Json(&input.charges))
            .bind(INITIAL_STATUS)
            .fetch_one(&mut *tx)
            .await?;

        for deliverable in &input.deliverables {
            insert_deliverable(&mut tx, enquiry.id, deliverable).await?;
        }

        tx.commit().await?;
        Ok(enquiry)
    }

    /// Find an enquiry by internal ID.
    pub async fn find_by_id(pool: &SqlitePool, id: DbId) -> Result<Option<Enquiry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM enquiries WHERE id = ?1");
        sqlx::query_as::<_, Enquiry>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List enquiries, newest first, optionally filtered by customer.
    pub async fn list(
        pool: &SqlitePool,
        customer_id: Option<DbId>,
    ) -> Result<Vec<Enquiry>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM enquiries
             WHERE (?1 IS NULL OR customer_id = ?1)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Enquiry>(&query)
            .bind(customer_id)
            .fetch_all(pool)
            .await
    }

    /// Update an enquiry. When `deliverables` is present the existing list is replaced.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        input: &UpdateEnquiry,
    ) -> Result<Option<Enquiry>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE enquiries SET
                name = COALESCE(?2, name),
                description = COALESCE(?3, description),
                customer_id = COALESCE(?4, customer_id),
                currency_id = COALESCE(?5, currency_id),
                scope_of_work = COALESCE(?6, scope_of_work),
                end_client = COALESCE(?7, end_client),
                deadline = COALESCE(?8, deadline),
                inputs_required = COALESCE(?9, inputs_required),
                exclusions = COALESCE(?10, exclusions),
                charges = COALESCE(?11, charges),
                updated_at = {NOW}
             WHERE id = ?1
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Enquiry>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.customer_id)
            .bind(input.currency_id)
            .bind(&input.scope_of_work)
            .bind(&input.end_client)
            .bind(input.deadline)
            .bind(input.inputs_required.as_ref().map(Json))
            .bind(input.exclusions.as_ref().map(Json))
            .bind(input.charges.as_ref().map(Json))
            .fetch_optional(&mut *tx)
            .await?;

        if updated.is_some() {
            if let Some(deliverables) = &input.deliverables {
                sqlx::query("DELETE FROM enquiry_deliverables WHERE enquiry_id = ?1")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
                for deliverable in deliverables {
                    insert_deliverable(&mut tx, id, deliverable).await?;
                }
            }
        }

        tx.commit().await?;
        Ok(updated)
    }

    /// Set the free-text status.
    pub async fn set_status(
        pool: &SqlitePool,
        id: DbId,
        status: &str,
    ) -> Result<Option<Enquiry>, sqlx::Error> {
        let query = format!(
            "UPDATE enquiries SET status = ?2, updated_at = {NOW} WHERE id = ?1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Enquiry>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Delete an enquiry and its deliverables. Returns `true` if a row was removed.
    pub async fn delete(pool: &SqlitePool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM enquiries WHERE id = ?1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Deliverables of an enquiry in entry order.
    pub async fn list_deliverables(
        pool: &SqlitePool,
        enquiry_id: DbId,
    ) -> Result<Vec<Deliverable>, sqlx::Error> {
        let query = format!(
            "SELECT {DELIVERABLE_COLUMNS} FROM enquiry_deliverables WHERE enquiry_id = ?1 ORDER BY id"
        );
        sqlx::query_as::<_, Deliverable>(&query)
            .bind(enquiry_id)
            .fetch_all(pool)
            .await
    }

    /// Append one deliverable.
    pub async fn add_deliverable(
        pool: &SqlitePool,
        enquiry_id: DbId,
        input: &CreateDeliverable,
    ) -> Result<Deliverable, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        insert_deliverable(&mut conn, enquiry_id, input).await
    }

    /// Remove one deliverable. Returns `true` if a row was removed.
    pub async fn delete_deliverable(
        pool: &SqlitePool,
        enquiry_id: DbId,
        deliverable_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM enquiry_deliverables WHERE id = ?1 AND enquiry_id = ?2")
                .bind(deliverable_id)
                .bind(enquiry_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Convert an enquiry into a project in a single transaction.
    ///
    /// Creates the project, one root task per planned deliverable, and flips
    /// the enquiry to `moved to projects`. Either everything is written or
    /// nothing is. A second conversion of the same enquiry violates the
    /// unique `projects.enquiry_id` and fails.
    pub async fn convert(
        pool: &SqlitePool,
        enquiry: &Enquiry,
        plan: &ConversionPlan,
    ) -> Result<Project, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO projects (project_number, name, description, customer_id, enquiry_id,
                                   currency_id, end_client, status, total_amount)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             RETURNING {}",
            project_repo::COLUMNS
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(&plan.project_number)
            .bind(&enquiry.name)
            .bind(&enquiry.description)
            .bind(enquiry.customer_id)
            .bind(enquiry.id)
            .bind(enquiry.currency_id)
            .bind(&enquiry.end_client)
            .bind(ProjectStatus::NotStarted.as_str())
            .bind(plan.total_amount)
            .fetch_one(&mut *tx)
            .await?;

        for task in &plan.root_tasks {
            sqlx::query(
                "INSERT INTO tasks (project_id, name, description, hours, cost_per_hour)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )
            .bind(project.id)
            .bind(&task.name)
            .bind(&task.description)
            .bind(task.hours)
            .bind(task.cost_per_hour)
            .execute(&mut *tx)
            .await?;
        }

        let status = format!("UPDATE enquiries SET status = ?2, updated_at = {NOW} WHERE id = ?1");
        sqlx::query(&status)
            .bind(enquiry.id)
            .bind(STATUS_MOVED_TO_PROJECTS)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(
            enquiry_id = enquiry.id,
            project_id = project.id,
            tasks = plan.root_tasks.len(),
            "Enquiry converted to project"
        );
        Ok(project)
    }
}

async fn insert_deliverable(
    conn: &mut SqliteConnection,
    enquiry_id: DbId,
    input: &CreateDeliverable,
) -> Result<Deliverable, sqlx::Error> {
    let query = format!(
        "INSERT INTO enquiry_deliverables (enquiry_id, name, description, hours, cost_per_hour, total)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         RETURNING {DELIVERABLE_COLUMNS}"
    );
    sqlx::query_as::<_, Deliverable>(&query)
        .bind(enquiry_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(input.hours)
        .bind(input.cost_per_hour)
        .bind(deliverable_total(input.hours, input.cost_per_hour))
        .fetch_one(conn)
        .await
}
