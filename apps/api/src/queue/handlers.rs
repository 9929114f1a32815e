use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::queue::QueueEntryRow;
use crate::queue::store::{
    clear_inactive, deactivate_entry, get_entry, list_entries, upsert_entries, BulkUploadResponse,
    QueueEntryInput, QueueFilter,
};
use crate::state::AppState;

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize)]
pub struct ClearInactiveResponse {
    pub message: String,
    pub deleted_count: u64,
}

/// POST /api/v1/queue/entries
pub async fn handle_upload_entries(
    State(state): State<AppState>,
    Json(entries): Json<Vec<QueueEntryInput>>,
) -> Result<Json<BulkUploadResponse>, AppError> {
    if entries.is_empty() {
        return Err(AppError::Validation("No queue entries provided".to_string()));
    }
    let response = upsert_entries(&state.db, &entries).await?;
    Ok(Json(response))
}

/// GET /api/v1/queue/entries
pub async fn handle_list_entries(
    State(state): State<AppState>,
    Query(filter): Query<QueueFilter>,
) -> Result<Json<Vec<QueueEntryRow>>, AppError> {
    filter.validate().map_err(AppError::Validation)?;
    Ok(Json(list_entries(&state.db, &filter).await?))
}

/// GET /api/v1/queue/entries/:queue_id
pub async fn handle_get_entry(
    State(state): State<AppState>,
    Path(queue_id): Path<String>,
) -> Result<Json<QueueEntryRow>, AppError> {
    get_entry(&state.db, &queue_id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Queue entry {queue_id} not found")))
}

/// PUT /api/v1/queue/entries/:queue_id/deactivate
pub async fn handle_deactivate_entry(
    State(state): State<AppState>,
    Path(queue_id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    if !deactivate_entry(&state.db, &queue_id).await? {
        return Err(AppError::NotFound(format!("Queue entry {queue_id} not found")));
    }
    Ok(Json(MessageResponse {
        message: "Queue entry deactivated".to_string(),
    }))
}

/// DELETE /api/v1/queue/entries
pub async fn handle_clear_inactive(
    State(state): State<AppState>,
) -> Result<Json<ClearInactiveResponse>, AppError> {
    let deleted_count = clear_inactive(&state.db).await?;
    Ok(Json(ClearInactiveResponse {
        message: format!("Deleted {deleted_count} inactive queue entries"),
        deleted_count,
    }))
}
