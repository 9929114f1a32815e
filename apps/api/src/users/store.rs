use anyhow::Result;
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::user::UserRow;

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// Returns a human-readable reason when the user cannot be created.
pub fn validate_new_user(req: &CreateUserRequest) -> Result<(), String> {
    let email = req.email.trim();
    let well_formed = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !well_formed {
        return Err("email must be a valid address".to_string());
    }
    if req.first_name.trim().is_empty() {
        return Err("first_name cannot be empty".to_string());
    }
    if req.last_name.trim().is_empty() {
        return Err("last_name cannot be empty".to_string());
    }
    Ok(())
}

pub fn user_or_not_found(user: Option<UserRow>, user_id: Uuid) -> Result<UserRow, AppError> {
    user.ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))
}

pub async fn find_user(pool: &PgPool, user_id: Uuid) -> Result<Option<UserRow>> {
    Ok(sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?)
}

/// Looks the user up and maps absence to `NotFound`.
pub async fn require_user(pool: &PgPool, user_id: Uuid) -> Result<UserRow, AppError> {
    user_or_not_found(find_user(pool, user_id).await?, user_id)
}

/// Returns `None` when the email is already registered.
pub async fn insert_user(pool: &PgPool, req: &CreateUserRequest) -> Result<Option<UserRow>> {
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (id, email, first_name, last_name)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(req.email.trim().to_lowercase())
    .bind(req.first_name.trim())
    .bind(req.last_name.trim())
    .fetch_optional(pool)
    .await?;

    if let Some(user) = &row {
        info!("Created user {} ({})", user.id, user.email);
    }
    Ok(row)
}
