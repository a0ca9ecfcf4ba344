//! Integration tests for enquiries and their conversion into projects.

use pms_core::enquiry::{plan_conversion, DeliverableLine, STATUS_MOVED_TO_PROJECTS};
use pms_db::models::enquiry::{CreateDeliverable, CreateEnquiry, UpdateEnquiry};
use pms_db::repositories::{EnquiryRepo, ProjectRepo, TaskRepo};
use sqlx::SqlitePool;

fn deliverable(name: &str, hours: f64, rate: f64) -> CreateDeliverable {
    CreateDeliverable {
        name: name.to_string(),
        description: Some(format!("{name} work")),
        hours: Some(hours),
        cost_per_hour: Some(rate),
    }
}

fn new_enquiry(number: &str, deliverables: Vec<CreateDeliverable>) -> CreateEnquiry {
    CreateEnquiry {
        enquiry_number: number.to_string(),
        name: format!("Enquiry {number}"),
        description: None,
        customer_id: None,
        currency_id: None,
        scope_of_work: Some("Structural drawings".to_string()),
        end_client: None,
        deadline: None,
        inputs_required: vec!["Site survey".to_string()],
        exclusions: vec![],
        charges: vec![],
        deliverables,
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_with_deliverables(pool: SqlitePool) {
    let input = new_enquiry(
        "2001",
        vec![deliverable("Plans", 10.0, 40.0), deliverable("Sections", 5.0, 40.0)],
    );
    let enquiry = EnquiryRepo::create(&pool, &input).await.unwrap();
    assert_eq!(enquiry.status, "on hold");
    assert_eq!(enquiry.inputs_required.0, vec!["Site survey".to_string()]);

    let lines = EnquiryRepo::list_deliverables(&pool, enquiry.id).await.unwrap();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].total, 400.0);
    assert_eq!(lines[1].total, 200.0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_enquiry_number_rejected(pool: SqlitePool) {
    EnquiryRepo::create(&pool, &new_enquiry("2002", vec![])).await.unwrap();
    let err = EnquiryRepo::create(&pool, &new_enquiry("2002", vec![]))
        .await
        .unwrap_err();
    assert!(err.as_database_error().is_some_and(|e| e.is_unique_violation()));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_replaces_deliverables(pool: SqlitePool) {
    let enquiry = EnquiryRepo::create(
        &pool,
        &new_enquiry("2003", vec![deliverable("Old", 1.0, 1.0)]),
    )
    .await
    .unwrap();

    let update = UpdateEnquiry {
        name: Some("Renamed".to_string()),
        description: None,
        customer_id: None,
        currency_id: None,
        scope_of_work: None,
        end_client: None,
        deadline: None,
        inputs_required: None,
        exclusions: Some(vec!["Permits".to_string()]),
        charges: None,
        deliverables: Some(vec![deliverable("New A", 2.0, 5.0), deliverable("New B", 1.0, 5.0)]),
    };
    let updated = EnquiryRepo::update(&pool, enquiry.id, &update).await.unwrap().unwrap();
    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.exclusions.0, vec!["Permits".to_string()]);
    assert_eq!(updated.inputs_required.0, vec!["Site survey".to_string()]);

    let names: Vec<String> = EnquiryRepo::list_deliverables(&pool, enquiry.id)
        .await
        .unwrap()
        .into_iter()
        .map(|d| d.name)
        .collect();
    assert_eq!(names, vec!["New A", "New B"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_convert_creates_project_and_root_tasks(pool: SqlitePool) {
    let enquiry = EnquiryRepo::create(
        &pool,
        &new_enquiry("2004", vec![deliverable("Plans", 10.0, 50.0), deliverable("Review", 2.0, 25.0)]),
    )
    .await
    .unwrap();

    let lines: Vec<DeliverableLine> = EnquiryRepo::list_deliverables(&pool, enquiry.id)
        .await
        .unwrap()
        .into_iter()
        .map(Into::into)
        .collect();
    let plan = plan_conversion(&enquiry.enquiry_number, &enquiry.status, lines).unwrap();
    let project = EnquiryRepo::convert(&pool, &enquiry, &plan).await.unwrap();

    assert_eq!(project.project_number, "2004");
    assert_eq!(project.enquiry_id, Some(enquiry.id));
    assert_eq!(project.total_amount, 550.0);

    let tasks = TaskRepo::list_by_project(&pool, project.id).await.unwrap();
    assert_eq!(tasks.len(), 2);
    assert!(tasks.iter().all(|t| t.parent_id.is_none()));

    let reloaded = EnquiryRepo::find_by_id(&pool, enquiry.id).await.unwrap().unwrap();
    assert_eq!(reloaded.status, STATUS_MOVED_TO_PROJECTS);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_second_conversion_fails_without_side_effects(pool: SqlitePool) {
    let enquiry = EnquiryRepo::create(&pool, &new_enquiry("2005", vec![deliverable("A", 1.0, 1.0)]))
        .await
        .unwrap();
    let plan = plan_conversion(
        &enquiry.enquiry_number,
        &enquiry.status,
        vec![DeliverableLine {
            name: "A".to_string(),
            description: None,
            hours: Some(1.0),
            cost_per_hour: Some(1.0),
        }],
    )
    .unwrap();

    EnquiryRepo::convert(&pool, &enquiry, &plan).await.unwrap();
    assert!(EnquiryRepo::convert(&pool, &enquiry, &plan).await.is_err());

    let projects = ProjectRepo::list(&pool).await.unwrap();
    assert_eq!(projects.len(), 1);
    let tasks = TaskRepo::list_by_project(&pool, projects[0].id).await.unwrap();
    assert_eq!(tasks.len(), 1, "failed conversion must not leave tasks behind");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_filters_by_customer(pool: SqlitePool) {
    let customer_id: i64 =
        sqlx::query_scalar("INSERT INTO customers (name) VALUES ('Acme') RETURNING id")
            .fetch_one(&pool)
            .await
            .unwrap();
    let mut owned = new_enquiry("2006", vec![]);
    owned.customer_id = Some(customer_id);
    EnquiryRepo::create(&pool, &owned).await.unwrap();
    EnquiryRepo::create(&pool, &new_enquiry("2007", vec![])).await.unwrap();

    assert_eq!(EnquiryRepo::list(&pool, None).await.unwrap().len(), 2);
    let filtered = EnquiryRepo::list(&pool, Some(customer_id)).await.unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].enquiry_number, "2006");
}
