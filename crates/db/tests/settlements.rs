//! Integration tests for outsource team and customer settlement ledgers.

use chrono::NaiveDate;
use pms_db::models::project::CreateProject;
use pms_db::models::settlement::{
    CreateCustomerPayment, CreatePayment, CreateSettlement, UpdatePayment,
};
use pms_db::models::task::CreateTask;
use pms_db::repositories::{CustomerSettlementRepo, ProjectRepo, SettlementRepo, TaskRepo};
use sqlx::SqlitePool;

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
}

async fn seed_customer(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("INSERT INTO customers (name) VALUES ('Acme') RETURNING id")
        .fetch_one(pool)
        .await
        .unwrap()
}

async fn seed_project(pool: &SqlitePool, customer_id: Option<i64>) -> i64 {
    let input = CreateProject {
        project_number: "300".to_string(),
        name: "Warehouse".to_string(),
        description: None,
        customer_id,
        currency_id: None,
        end_client: None,
        start_date: None,
        due_date: None,
        status: None,
    };
    ProjectRepo::create(pool, &input).await.unwrap().id
}

async fn seed_team_settlement(pool: &SqlitePool, total: f64) -> i64 {
    let project_id = seed_project(pool, None).await;
    let task = TaskRepo::create(
        pool,
        project_id,
        &CreateTask {
            name: "Detailing".to_string(),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    let team_id: i64 =
        sqlx::query_scalar("INSERT INTO outsource_teams (name) VALUES ('Drafting Co') RETURNING id")
            .fetch_one(pool)
            .await
            .unwrap();
    SettlementRepo::create(
        pool,
        &CreateSettlement {
            task_id: task.id,
            outsource_team_id: team_id,
            total_amount: total,
        },
    )
    .await
    .unwrap()
    .id
}

fn payment(amount: f64, d: u32) -> CreatePayment {
    CreatePayment {
        amount,
        paid_on: day(d),
        notes: None,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_status_follows_payments(pool: SqlitePool) {
    let id = seed_team_settlement(&pool, 1000.0).await;
    let fresh = SettlementRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(fresh.status, "pending");

    let partial = SettlementRepo::add_payment(&pool, id, &payment(400.0, 1)).await.unwrap();
    assert_eq!(partial.status, "partial");

    let done = SettlementRepo::add_payment(&pool, id, &payment(600.0, 8)).await.unwrap();
    assert_eq!(done.status, "completed");
    assert_eq!(SettlementRepo::paid_amount(&pool, id).await.unwrap(), 1000.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_editing_and_deleting_payments_rederives_status(pool: SqlitePool) {
    let id = seed_team_settlement(&pool, 500.0).await;
    SettlementRepo::add_payment(&pool, id, &payment(500.0, 2)).await.unwrap();
    let payments = SettlementRepo::list_payments(&pool, id).await.unwrap();
    let payment_id = payments[0].id;

    let update = UpdatePayment {
        amount: Some(100.0),
        ..Default::default()
    };
    let edited = SettlementRepo::update_payment(&pool, id, payment_id, &update)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(edited.status, "partial");

    let cleared = SettlementRepo::delete_payment(&pool, id, payment_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cleared.status, "pending");

    assert!(SettlementRepo::delete_payment(&pool, id, payment_id)
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_raising_total_reopens_settlement(pool: SqlitePool) {
    let id = seed_team_settlement(&pool, 100.0).await;
    SettlementRepo::add_payment(&pool, id, &payment(100.0, 3)).await.unwrap();

    let raised = SettlementRepo::update_total(&pool, id, 150.0).await.unwrap().unwrap();
    assert_eq!(raised.status, "partial");
    assert!(SettlementRepo::update_total(&pool, 9999, 1.0).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_customer_settlement_tracks_project_total(pool: SqlitePool) {
    let customer_id = seed_customer(&pool).await;
    let project_id = seed_project(&pool, Some(customer_id)).await;
    TaskRepo::create(
        &pool,
        project_id,
        &CreateTask {
            name: "Drawings".to_string(),
            hours: Some(10.0),
            cost_per_hour: Some(80.0),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let settlement = CustomerSettlementRepo::create(&pool, project_id, customer_id)
        .await
        .unwrap();
    assert_eq!(settlement.total_amount, 800.0);
    assert_eq!(settlement.status, "pending");

    let paid = CustomerSettlementRepo::add_payment(
        &pool,
        settlement.id,
        &CreateCustomerPayment {
            amount: 800.0,
            paid_on: day(10),
            payment_ref: Some("TXN-1".to_string()),
        },
    )
    .await
    .unwrap();
    assert_eq!(paid.status, "completed");

    let by_project = CustomerSettlementRepo::find_by_project(&pool, project_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_project.id, settlement.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_one_customer_settlement_per_project(pool: SqlitePool) {
    let customer_id = seed_customer(&pool).await;
    let project_id = seed_project(&pool, Some(customer_id)).await;
    CustomerSettlementRepo::create(&pool, project_id, customer_id)
        .await
        .unwrap();
    let err = CustomerSettlementRepo::create(&pool, project_id, customer_id)
        .await
        .unwrap_err();
    assert!(err.as_database_error().is_some_and(|e| e.is_unique_violation()));
}

/// Task changes move the project total; the stored settlement status follows.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_customer_settlement_status_follows_task_changes(pool: SqlitePool) {
    let customer_id = seed_customer(&pool).await;
    let project_id = seed_project(&pool, Some(customer_id)).await;
    let line = CreateTask {
        name: "Survey".to_string(),
        hours: Some(10.0),
        cost_per_hour: Some(10.0),
        ..Default::default()
    };
    TaskRepo::create(&pool, project_id, &line).await.unwrap();

    let settlement = CustomerSettlementRepo::create(&pool, project_id, customer_id)
        .await
        .unwrap();
    let paid = CustomerSettlementRepo::add_payment(
        &pool,
        settlement.id,
        &CreateCustomerPayment {
            amount: 100.0,
            paid_on: day(3),
            payment_ref: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(paid.status, "completed");
    assert_eq!(paid.total_amount, 100.0);

    let extra = TaskRepo::create(&pool, project_id, &line).await.unwrap();
    let reopened = CustomerSettlementRepo::find_by_id(&pool, settlement.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(reopened.total_amount, 200.0);
    assert_eq!(reopened.status, "partial");

    TaskRepo::delete_cascade(&pool, extra.id).await.unwrap();
    let settled = CustomerSettlementRepo::find_by_id(&pool, settlement.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(settled.total_amount, 100.0);
    assert_eq!(settled.status, "completed");
}
