use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::appointments::aggregation::{merge_sources, AppointmentViews, ViewCounts, ViewKind};
use crate::appointments::reminders::{build_reminder_candidates, ReminderCandidate};
use crate::appointments::store::{
    insert_booking, list_for_user, update_status, validate_booking, BookAppointmentRequest,
};
use crate::errors::AppError;
use crate::models::appointment::{Appointment, AppointmentStatus};
use crate::queue::adapter::to_appointment;
use crate::queue::store::{list_entries, QueueFilter};
use crate::routes::UserIdQuery;
use crate::state::AppState;
use crate::users::store::require_user;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct AppointmentListQuery {
    pub user_id: Uuid,
    #[serde(default)]
    pub view: ViewKind,
}

#[derive(Serialize)]
pub struct AppointmentListResponse {
    pub view: ViewKind,
    pub appointments: Vec<Appointment>,
    pub counts: ViewCounts,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub user_id: Uuid,
    pub status: AppointmentStatus,
}

#[derive(Deserialize)]
pub struct AcknowledgeRequest {
    pub user_id: Uuid,
    pub appointment_ids: Vec<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Source loading
// ────────────────────────────────────────────────────────────────────────────

/// Local bookings followed by active queue entries adapted for the user.
/// The queue source falls back to its last good snapshot when the read fails.
async fn load_merged_appointments(
    state: &AppState,
    user_id: Uuid,
) -> Result<Vec<Appointment>, AppError> {
    let user = require_user(&state.db, user_id).await?;

    let local: Vec<Appointment> = list_for_user(&state.db, user_id)
        .await?
        .into_iter()
        .map(Appointment::from)
        .collect();

    let queue_entries = state
        .queue_snapshot
        .resolve(list_entries(&state.db, &QueueFilter::default()).await)
        .await;
    let subject_id = user.id.to_string();
    let subject_name = user.full_name();
    let queued: Vec<Appointment> = queue_entries
        .iter()
        .map(|entry| to_appointment(entry, &subject_id, &subject_name))
        .collect();

    Ok(merge_sources([local, queued]))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/appointments
///
/// Returns one derived view plus the counts of every view for filter badges.
pub async fn handle_list_appointments(
    State(state): State<AppState>,
    Query(params): Query<AppointmentListQuery>,
) -> Result<Json<AppointmentListResponse>, AppError> {
    let appointments = load_merged_appointments(&state, params.user_id).await?;
    let views = AppointmentViews::build(&appointments, Utc::now());
    let counts = views.counts();
    Ok(Json(AppointmentListResponse {
        view: params.view,
        appointments: views.into_view(params.view),
        counts,
    }))
}

/// POST /api/v1/appointments
pub async fn handle_book_appointment(
    State(state): State<AppState>,
    Json(req): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    validate_booking(&req, Utc::now()).map_err(AppError::Validation)?;
    require_user(&state.db, req.user_id).await?;

    let row = insert_booking(&state.db, &req).await?;
    Ok((StatusCode::CREATED, Json(Appointment::from(row))))
}

/// PATCH /api/v1/appointments/:id/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<Appointment>, AppError> {
    if req.status == AppointmentStatus::Unrecognized {
        return Err(AppError::Validation(
            "status must be one of upcoming, completed, cancelled, rescheduled, no-show"
                .to_string(),
        ));
    }

    let row = update_status(&state.db, req.user_id, id, req.status)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Appointment {id} not found")))?;
    Ok(Json(Appointment::from(row)))
}

/// GET /api/v1/appointments/reminders
pub async fn handle_list_reminders(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<ReminderCandidate>>, AppError> {
    let appointments = load_merged_appointments(&state, params.user_id).await?;
    let acknowledged = state.acknowledgements.acknowledged_ids(params.user_id).await?;
    let reminders =
        build_reminder_candidates(&appointments, Utc::now(), |id| acknowledged.contains(id));
    Ok(Json(reminders))
}

/// POST /api/v1/appointments/reminders/acknowledge
pub async fn handle_acknowledge_reminders(
    State(state): State<AppState>,
    Json(req): Json<AcknowledgeRequest>,
) -> Result<StatusCode, AppError> {
    if req.appointment_ids.is_empty() {
        return Err(AppError::Validation(
            "appointment_ids cannot be empty".to_string(),
        ));
    }
    state
        .acknowledgements
        .mark_acknowledged(req.user_id, &req.appointment_ids)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
