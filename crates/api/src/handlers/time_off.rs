//! Handlers for leave, work-from-home and out-of-office requests.
//!
//! All three kinds share one table and one lifecycle: requested as
//! `pending`, then approved or rejected by an admin. Only pending requests
//! can be cancelled by their owner.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use pms_core::calendar::{validate_time_off, DateRange};
use pms_core::error::CoreError;
use pms_core::status::{parse_optional, AttendanceKind, LeaveSession, RequestStatus, TimeOffKind};
use pms_core::types::DbId;
use pms_db::models::time_off::{CreateTimeOff, DecideTimeOff, TimeOffRequest, UpdateTimeOffDates};
use pms_db::repositories::{TimeOffRepo, UserRepo};
use pms_events::{event_types, DomainEvent};
use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{ensure_self_or_admin, RequireAdmin, RequireStaff};
use crate::response::DataResponse;
use crate::state::AppState;

/// Body for `POST /time-off`.
#[derive(Debug, Deserialize)]
pub struct RequestTimeOff {
    pub kind: String,
    #[serde(flatten)]
    pub request: CreateTimeOff,
}

#[derive(Debug, Default, Deserialize)]
pub struct TimeOffFilter {
    pub kind: Option<String>,
    pub status: Option<String>,
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "TimeOffRequest",
        id,
    })
}

async fn load_for(state: &AppState, user: &AuthUser, id: DbId) -> AppResult<TimeOffRequest> {
    let request = TimeOffRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    ensure_self_or_admin(user, request.user_id)?;
    Ok(request)
}

/// Re-check the stored request's shape against a new date range.
fn check_shape(request: &TimeOffRequest, range: &DateRange) -> AppResult<()> {
    let kind: TimeOffKind = request.kind.parse()?;
    let leave_type = parse_optional::<AttendanceKind>(request.leave_type.as_deref())?;
    let session = parse_optional::<LeaveSession>(request.session.as_deref())?;
    validate_time_off(kind, range, leave_type, session)?;
    Ok(())
}

/// POST /api/v1/time-off
///
/// File a request for the caller. Admins are notified.
pub async fn create(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Json(input): Json<RequestTimeOff>,
) -> AppResult<(StatusCode, Json<TimeOffRequest>)> {
    input.request.validate()?;
    let kind: TimeOffKind = input.kind.parse()?;
    let range = DateRange::new(input.request.start_date, input.request.end_date)?;
    let leave_type = parse_optional::<AttendanceKind>(input.request.leave_type.as_deref())?;
    let session = parse_optional::<LeaveSession>(input.request.session.as_deref())?;
    validate_time_off(kind, &range, leave_type, session)?;

    let request = TimeOffRepo::create(&state.pool, user.user_id, kind, &input.request).await?;
    tracing::info!(
        request_id = request.id,
        user_id = user.user_id,
        kind = %kind,
        start = %range.start,
        end = %range.end,
        "Time off requested",
    );

    let admins = UserRepo::admin_ids(&state.pool).await?;
    state.event_bus.publish(
        DomainEvent::new(
            event_types::TIME_OFF_REQUESTED,
            format!("New {kind} request from {} to {}", range.start, range.end),
        )
        .with_source("time_off", request.id)
        .with_actor(user.user_id)
        .with_recipients(admins)
        .with_url(format!("/time-off/{}", request.id)),
    );

    Ok((StatusCode::CREATED, Json(request)))
}

/// GET /api/v1/time-off?kind=
///
/// The caller's own requests, newest first.
pub async fn list_mine(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Query(filter): Query<TimeOffFilter>,
) -> AppResult<Json<DataResponse<Vec<TimeOffRequest>>>> {
    let kind = parse_optional::<TimeOffKind>(filter.kind.as_deref())?;
    let requests = TimeOffRepo::list_for_user(&state.pool, user.user_id, kind).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// GET /api/v1/time-off/all?kind=&status=
pub async fn list_all(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(filter): Query<TimeOffFilter>,
) -> AppResult<Json<DataResponse<Vec<TimeOffRequest>>>> {
    let kind = parse_optional::<TimeOffKind>(filter.kind.as_deref())?;
    let status = parse_optional::<RequestStatus>(filter.status.as_deref())?;
    let requests = TimeOffRepo::list_all(&state.pool, kind, status).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// GET /api/v1/time-off/{id}
pub async fn get_by_id(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<TimeOffRequest>> {
    Ok(Json(load_for(&state, &user, id).await?))
}

/// PUT /api/v1/time-off/{id}/decision
///
/// Approve or reject, optionally moving the dates in the same step. The
/// requester is notified.
pub async fn decide(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<DecideTimeOff>,
) -> AppResult<Json<TimeOffRequest>> {
    let status: RequestStatus = input.status.parse()?;
    if status == RequestStatus::Pending {
        return Err(AppError::Core(CoreError::Validation(
            "A decision must approve or reject the request".into(),
        )));
    }
    let existing = load_for(&state, &admin, id).await?;

    let range = match (input.start_date, input.end_date) {
        (None, None) => None,
        (Some(start), Some(end)) => Some(DateRange::new(start, end)?),
        _ => {
            return Err(AppError::BadRequest(
                "start_date and end_date must be given together".into(),
            ))
        }
    };
    if let Some(range) = &range {
        check_shape(&existing, range)?;
    }

    let request = TimeOffRepo::decide(&state.pool, id, status, admin.user_id, range.as_ref())
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(request_id = id, status = %status, decided_by = admin.user_id, "Time off decided");

    state.event_bus.publish(
        DomainEvent::new(
            event_types::TIME_OFF_DECIDED,
            format!(
                "Your {} request from {} to {} was {status}",
                request.kind, request.start_date, request.end_date
            ),
        )
        .with_source("time_off", id)
        .with_actor(admin.user_id)
        .with_recipients([request.user_id])
        .with_url(format!("/time-off/{id}")),
    );

    Ok(Json(request))
}

/// PUT /api/v1/time-off/{id}/dates
///
/// Owners may move their own pending requests; admins may move any.
pub async fn update_dates(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateTimeOffDates>,
) -> AppResult<Json<TimeOffRequest>> {
    let existing = load_for(&state, &user, id).await?;
    if !user.is_admin() && existing.status != RequestStatus::Pending.as_str() {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Request {id} has already been {}",
            existing.status
        ))));
    }

    let range = DateRange::new(input.start_date, input.end_date)?;
    check_shape(&existing, &range)?;

    let request = TimeOffRepo::update_dates(&state.pool, id, &range)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(request))
}

/// DELETE /api/v1/time-off/{id}
pub async fn cancel(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let existing = load_for(&state, &user, id).await?;
    if !TimeOffRepo::cancel_pending(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "Only pending requests can be cancelled; request {id} is {}",
            existing.status
        ))));
    }
    tracing::info!(request_id = id, user_id = user.user_id, "Time off cancelled");
    Ok(StatusCode::NO_CONTENT)
}
