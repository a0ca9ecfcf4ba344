//! Handlers for the `/enquiries` resource and enquiry-to-project conversion.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use pms_core::billing::round_currency;
use pms_core::enquiry::{
    normalize_status, plan_conversion, validate_enquiry_number, DeliverableLine,
    STATUS_MOVED_TO_PROJECTS,
};
use pms_core::error::CoreError;
use pms_core::types::DbId;
use pms_db::models::enquiry::{
    CreateDeliverable, CreateEnquiry, Deliverable, Enquiry, EnquiryDetail, UpdateEnquiry,
};
use pms_db::models::project::Project;
use pms_db::repositories::{EnquiryRepo, UserRepo};
use pms_events::{event_types, DomainEvent};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireStaff};
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EnquiryListParams {
    pub customer_id: Option<DbId>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEnquiryStatus {
    pub status: String,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Enquiry",
        id,
    })
}

async fn load(state: &AppState, id: DbId) -> AppResult<Enquiry> {
    EnquiryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))
}

async fn detail(state: &AppState, enquiry: Enquiry) -> AppResult<EnquiryDetail> {
    let deliverables = EnquiryRepo::list_deliverables(&state.pool, enquiry.id).await?;
    let total_amount = round_currency(deliverables.iter().map(|d| d.total).sum());
    Ok(EnquiryDetail {
        code: enquiry.code(),
        enquiry,
        deliverables,
        total_amount,
    })
}

/// GET /api/v1/enquiries
pub async fn list(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Query(params): Query<EnquiryListParams>,
) -> AppResult<Json<DataResponse<Vec<Enquiry>>>> {
    let enquiries = EnquiryRepo::list(&state.pool, params.customer_id).await?;
    Ok(Json(DataResponse { data: enquiries }))
}

/// POST /api/v1/enquiries
pub async fn create(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Json(input): Json<CreateEnquiry>,
) -> AppResult<(StatusCode, Json<EnquiryDetail>)> {
    input.validate()?;
    validate_enquiry_number(&input.enquiry_number)?;

    let enquiry = EnquiryRepo::create(&state.pool, &input).await?;
    tracing::info!(
        enquiry_id = enquiry.id,
        code = %enquiry.code(),
        user_id = user.user_id,
        "Enquiry created"
    );
    Ok((StatusCode::CREATED, Json(detail(&state, enquiry).await?)))
}

/// GET /api/v1/enquiries/{id}
pub async fn get_by_id(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<EnquiryDetail>> {
    let enquiry = load(&state, id).await?;
    Ok(Json(detail(&state, enquiry).await?))
}

/// PUT /api/v1/enquiries/{id}
pub async fn update(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateEnquiry>,
) -> AppResult<Json<EnquiryDetail>> {
    input.validate()?;
    let enquiry = EnquiryRepo::update(&state.pool, id, &input)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(detail(&state, enquiry).await?))
}

/// PUT /api/v1/enquiries/{id}/status
///
/// Statuses are free text, stored trimmed and lowercased. "moved to
/// projects" is reserved for the conversion endpoint.
pub async fn set_status(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateEnquiryStatus>,
) -> AppResult<Json<Enquiry>> {
    let status = normalize_status(&input.status);
    if status.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Status must not be empty".into(),
        )));
    }
    if status == STATUS_MOVED_TO_PROJECTS {
        return Err(AppError::BadRequest(
            "Use POST /enquiries/{id}/convert to move an enquiry to projects".into(),
        ));
    }

    let enquiry = EnquiryRepo::set_status(&state.pool, id, &status)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(enquiry))
}

/// DELETE /api/v1/enquiries/{id}
pub async fn delete(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if EnquiryRepo::delete(&state.pool, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// POST /api/v1/enquiries/{id}/deliverables
pub async fn add_deliverable(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<CreateDeliverable>,
) -> AppResult<(StatusCode, Json<Deliverable>)> {
    input.validate()?;
    load(&state, id).await?;
    let deliverable = EnquiryRepo::add_deliverable(&state.pool, id, &input).await?;
    Ok((StatusCode::CREATED, Json(deliverable)))
}

/// DELETE /api/v1/enquiries/{id}/deliverables/{deliverable_id}
pub async fn delete_deliverable(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Path((id, deliverable_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    if EnquiryRepo::delete_deliverable(&state.pool, id, deliverable_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Deliverable",
            id: deliverable_id,
        }))
    }
}

/// POST /api/v1/enquiries/{id}/convert
///
/// Create the project and one root task per deliverable, then flip the
/// enquiry to "moved to projects", all in one transaction. Converting twice
/// is a conflict.
pub async fn convert(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<(StatusCode, Json<Project>)> {
    let enquiry = load(&state, id).await?;
    let deliverables = EnquiryRepo::list_deliverables(&state.pool, id).await?;
    let plan = plan_conversion(
        &enquiry.enquiry_number,
        &enquiry.status,
        deliverables.into_iter().map(DeliverableLine::from).collect(),
    )?;

    let project = EnquiryRepo::convert(&state.pool, &enquiry, &plan).await?;

    let admins = UserRepo::admin_ids(&state.pool).await?;
    state.event_bus.publish(
        DomainEvent::new(
            event_types::ENQUIRY_CONVERTED,
            format!("Enquiry {} was converted to project {}", enquiry.code(), plan.project_code),
        )
        .with_source("project", project.id)
        .with_actor(admin.user_id)
        .with_recipients(admins)
        .with_url(format!("/projects/{}", project.id)),
    );

    Ok((StatusCode::CREATED, Json(project)))
}
