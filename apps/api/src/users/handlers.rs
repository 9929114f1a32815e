use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::UserRow;
use crate::state::AppState;
use crate::users::store::{insert_user, require_user, validate_new_user, CreateUserRequest};

/// POST /api/v1/users
pub async fn handle_create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<UserRow>), AppError> {
    validate_new_user(&req).map_err(AppError::Validation)?;
    let user = insert_user(&state.db, &req)
        .await?
        .ok_or_else(|| AppError::Conflict(format!("User {} already exists", req.email.trim())))?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// GET /api/v1/users/:id
pub async fn handle_get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserRow>, AppError> {
    Ok(Json(require_user(&state.db, id).await?))
}
