//! Integration tests for documents, comments, todos, time sheets and notifications.

use chrono::NaiveDate;
use pms_core::calendar::DateRange;
use pms_db::models::comment::CreateComment;
use pms_db::models::document::{AttachFile, CreateDocument};
use pms_db::models::notification::CreateNotification;
use pms_db::models::project::CreateProject;
use pms_db::models::time_sheet::CreateTimeSheet;
use pms_db::models::todo::{CreateTodo, UpdateTodo};
use pms_db::models::user::CreateUser;
use pms_db::repositories::{
    CommentRepo, DocumentRepo, NotificationRepo, ProjectRepo, TimeSheetRepo, TodoRepo, UserRepo,
};
use sqlx::SqlitePool;

async fn seed_user(pool: &SqlitePool, email: &str, name: &str) -> i64 {
    let input = CreateUser {
        email: email.to_string(),
        full_name: name.to_string(),
        password_hash: "hash".to_string(),
        role: "member".to_string(),
        is_verified: true,
        customer_id: None,
    };
    UserRepo::create(pool, &input).await.unwrap().id
}

async fn seed_project(pool: &SqlitePool) -> i64 {
    let input = CreateProject {
        project_number: "500".to_string(),
        name: "Bridge".to_string(),
        description: None,
        customer_id: None,
        currency_id: None,
        end_client: None,
        start_date: None,
        due_date: None,
        status: None,
    };
    ProjectRepo::create(pool, &input).await.unwrap().id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_document_defaults_and_attachment(pool: SqlitePool) {
    let user = seed_user(&pool, "doc@example.com", "Doc").await;
    let project_id = seed_project(&pool).await;

    let doc = DocumentRepo::create(
        &pool,
        project_id,
        user,
        &CreateDocument {
            document_number: "DOC-1".to_string(),
            enquiry_number: None,
            project_number: Some("500".to_string()),
            sent_by: Some("Doc".to_string()),
            sent_on: None,
            medium: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(doc.medium, "email");
    assert!(doc.storage_key.is_none());

    let file = AttachFile {
        file_name: "plan.pdf".to_string(),
        storage_key: format!("projects/{project_id}/abc_plan.pdf"),
        content_type: Some("application/pdf".to_string()),
        size_bytes: 1024,
    };
    let attached = DocumentRepo::attach_file(&pool, doc.id, &file).await.unwrap().unwrap();
    assert_eq!(attached.file_name.as_deref(), Some("plan.pdf"));
    assert_eq!(attached.size_bytes, Some(1024));

    assert_eq!(DocumentRepo::list_by_project(&pool, project_id).await.unwrap().len(), 1);
    assert!(DocumentRepo::delete(&pool, doc.id).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_comments_paginate_newest_first(pool: SqlitePool) {
    let user = seed_user(&pool, "c@example.com", "Commenter").await;
    let project_id = seed_project(&pool).await;

    for i in 0..5 {
        CommentRepo::create(
            &pool,
            project_id,
            user,
            &CreateComment {
                body: format!("comment {i}"),
                attachments: vec![],
            },
        )
        .await
        .unwrap();
    }

    let first = CommentRepo::list_by_project(&pool, project_id, 2, 0).await.unwrap();
    let bodies: Vec<&str> = first.iter().map(|c| c.body.as_str()).collect();
    assert_eq!(bodies, vec!["comment 4", "comment 3"]);
    assert_eq!(first[0].author_name.as_deref(), Some("Commenter"));

    let last = CommentRepo::list_by_project(&pool, project_id, 2, 4).await.unwrap();
    assert_eq!(last.len(), 1);
    assert_eq!(last[0].body, "comment 0");
    assert_eq!(CommentRepo::count_by_project(&pool, project_id).await.unwrap(), 5);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_comment_keeps_attachments(pool: SqlitePool) {
    let user = seed_user(&pool, "att@example.com", "Att").await;
    let project_id = seed_project(&pool).await;
    let comment = CommentRepo::create(
        &pool,
        project_id,
        user,
        &CreateComment {
            body: "see files".to_string(),
            attachments: vec!["/files/a.png".to_string(), "/files/b.png".to_string()],
        },
    )
    .await
    .unwrap();
    assert_eq!(comment.attachments.0.len(), 2);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_todos_are_private(pool: SqlitePool) {
    let owner = seed_user(&pool, "owner@example.com", "Owner").await;
    let other = seed_user(&pool, "other@example.com", "Other").await;

    let todo = TodoRepo::create(
        &pool,
        owner,
        &CreateTodo {
            title: "Call client".to_string(),
            description: None,
            end_date: None,
        },
    )
    .await
    .unwrap();
    assert!(!todo.completed);

    assert!(TodoRepo::find(&pool, other, todo.id).await.unwrap().is_none());
    assert!(TodoRepo::toggle(&pool, other, todo.id).await.unwrap().is_none());
    assert!(!TodoRepo::delete(&pool, other, todo.id).await.unwrap());

    let toggled = TodoRepo::toggle(&pool, owner, todo.id).await.unwrap().unwrap();
    assert!(toggled.completed);

    let update = UpdateTodo {
        title: Some("Call client back".to_string()),
        ..Default::default()
    };
    let updated = TodoRepo::update(&pool, owner, todo.id, &update).await.unwrap().unwrap();
    assert_eq!(updated.title, "Call client back");
    assert!(updated.completed);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_time_sheets_filter_by_range(pool: SqlitePool) {
    let user = seed_user(&pool, "ts@example.com", "Sheet").await;
    let day = |d| NaiveDate::from_ymd_opt(2024, 6, d).unwrap();

    for d in [3, 10, 17] {
        TimeSheetRepo::create(
            &pool,
            user,
            day(d),
            &CreateTimeSheet {
                title: format!("Work {d}"),
                description: None,
                work_date: None,
                hours: 7,
                minutes: 30,
            },
        )
        .await
        .unwrap();
    }

    let range = DateRange::new(day(5), day(20)).unwrap();
    let sheets = TimeSheetRepo::list(&pool, user, Some(&range)).await.unwrap();
    assert_eq!(sheets.len(), 2);
    assert_eq!(sheets[0].work_date, day(17));
    assert_eq!(sheets[0].total_minutes(), 450);
    assert_eq!(TimeSheetRepo::list(&pool, user, None).await.unwrap().len(), 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_notifications_read_state(pool: SqlitePool) {
    let user = seed_user(&pool, "n@example.com", "N").await;
    for i in 0..3 {
        NotificationRepo::create(
            &pool,
            &CreateNotification {
                user_id: user,
                event_type: "task.assigned".to_string(),
                content: format!("Assigned task {i}"),
                url: Some(format!("/tasks/{i}")),
            },
        )
        .await
        .unwrap();
    }
    assert_eq!(NotificationRepo::unread_count(&pool, user).await.unwrap(), 3);

    let all = NotificationRepo::list_for_user(&pool, user, false, 50, 0).await.unwrap();
    assert!(NotificationRepo::mark_read(&pool, all[0].id, user).await.unwrap());
    assert_eq!(
        NotificationRepo::list_for_user(&pool, user, true, 50, 0).await.unwrap().len(),
        2
    );

    assert_eq!(NotificationRepo::mark_all_read(&pool, user).await.unwrap(), 2);
    assert_eq!(NotificationRepo::unread_count(&pool, user).await.unwrap(), 0);
}
