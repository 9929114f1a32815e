pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post, put},
    Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::appointments::handlers as appointments;
use crate::documents::handlers as documents;
use crate::queue::handlers as queue;
use crate::state::AppState;
use crate::users::handlers as users;

const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Deserialize)]
pub struct UserIdQuery {
    pub user_id: Uuid,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Users
        .route("/api/v1/users", post(users::handle_create_user))
        .route("/api/v1/users/:id", get(users::handle_get_user))
        // Appointments
        .route(
            "/api/v1/appointments",
            get(appointments::handle_list_appointments).post(appointments::handle_book_appointment),
        )
        .route(
            "/api/v1/appointments/:id/status",
            patch(appointments::handle_update_status),
        )
        .route(
            "/api/v1/appointments/reminders",
            get(appointments::handle_list_reminders),
        )
        .route(
            "/api/v1/appointments/reminders/acknowledge",
            post(appointments::handle_acknowledge_reminders),
        )
        // Documents
        .route("/api/v1/documents", get(documents::handle_list_documents))
        .route(
            "/api/v1/documents/timeline",
            get(documents::handle_document_timeline),
        )
        .route(
            "/api/v1/documents/search",
            get(documents::handle_search_documents),
        )
        .route("/api/v1/documents/:id", get(documents::handle_get_document))
        .route(
            "/api/v1/documents/parse",
            post(documents::handle_parse_document).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        // Provider queue
        .route(
            "/api/v1/queue/entries",
            get(queue::handle_list_entries)
                .post(queue::handle_upload_entries)
                .delete(queue::handle_clear_inactive),
        )
        .route(
            "/api/v1/queue/entries/:queue_id",
            get(queue::handle_get_entry),
        )
        .route(
            "/api/v1/queue/entries/:queue_id/deactivate",
            put(queue::handle_deactivate_entry),
        )
        .with_state(state)
}
