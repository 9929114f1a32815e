use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::documents::extraction::{extract_document, validate_extraction};
use crate::documents::grouping::{group_documents_by_month, DocumentGroup};
use crate::documents::search::search_documents;
use crate::documents::store::{
    delete_pdf, document_s3_key, get_document, insert_document, list_documents, upload_pdf,
    NewDocument,
};
use crate::documents::transform::to_document;
use crate::errors::AppError;
use crate::models::document::{Document, MedicalDocumentRow};
use crate::routes::UserIdQuery;
use crate::state::AppState;
use crate::users::store::require_user;

#[derive(Deserialize)]
pub struct DocumentSearchQuery {
    pub user_id: Uuid,
    pub q: String,
}

#[derive(Serialize)]
pub struct DocumentSearchResponse {
    pub query: String,
    pub count: usize,
    pub documents: Vec<MedicalDocumentRow>,
}

async fn load_documents(state: &AppState, user_id: Uuid) -> Result<Vec<Document>, AppError> {
    Ok(list_documents(&state.db, user_id)
        .await?
        .iter()
        .map(to_document)
        .collect())
}

/// GET /api/v1/documents
pub async fn handle_list_documents(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<Document>>, AppError> {
    Ok(Json(load_documents(&state, params.user_id).await?))
}

/// GET /api/v1/documents/timeline
pub async fn handle_document_timeline(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<DocumentGroup>>, AppError> {
    let documents = load_documents(&state, params.user_id).await?;
    Ok(Json(group_documents_by_month(&documents)))
}

/// GET /api/v1/documents/search
pub async fn handle_search_documents(
    State(state): State<AppState>,
    Query(params): Query<DocumentSearchQuery>,
) -> Result<Json<DocumentSearchResponse>, AppError> {
    let query = params.q.trim().to_string();
    if query.is_empty() {
        return Err(AppError::Validation("q cannot be empty".to_string()));
    }
    let documents = search_documents(list_documents(&state.db, params.user_id).await?, &query);
    Ok(Json(DocumentSearchResponse {
        query,
        count: documents.len(),
        documents,
    }))
}

/// GET /api/v1/documents/:id
pub async fn handle_get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<MedicalDocumentRow>, AppError> {
    get_document(&state.db, params.user_id, id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Document {id} not found")))
}

struct PdfUpload {
    user_id: Uuid,
    filename: String,
    data: Bytes,
}

async fn read_upload(mut multipart: Multipart) -> Result<PdfUpload, AppError> {
    let mut user_id = None;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "user_id" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid user_id field: {e}")))?;
                let parsed = Uuid::parse_str(text.trim())
                    .map_err(|_| AppError::Validation("user_id must be a UUID".to_string()))?;
                user_id = Some(parsed);
            }
            "file" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Invalid file field: {e}")))?;
                file = Some((filename, data));
            }
            _ => {}
        }
    }

    let user_id =
        user_id.ok_or_else(|| AppError::Validation("user_id field is required".to_string()))?;
    let (filename, data) =
        file.ok_or_else(|| AppError::Validation("file field is required".to_string()))?;

    Ok(PdfUpload {
        user_id,
        filename,
        data,
    })
}

/// POST /api/v1/documents/parse
///
/// PDF → text → LLM extraction → validation → database row + S3 object.
/// The row is inserted in a transaction that only commits after the upload
/// succeeds, so neither side is left without the other.
pub async fn handle_parse_document(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<MedicalDocumentRow>), AppError> {
    let upload = read_upload(multipart).await?;

    if !upload.filename.to_lowercase().ends_with(".pdf") {
        return Err(AppError::Validation("File must be a PDF".to_string()));
    }
    require_user(&state.db, upload.user_id).await?;

    let pdf = upload.data.clone();
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&pdf))
        .await
        .map_err(|e| anyhow::anyhow!("PDF extraction task failed: {e}"))?
        .map_err(|e| AppError::Validation(format!("Could not read PDF: {e}")))?;

    if text.trim().is_empty() {
        return Err(AppError::Validation(
            "Could not extract text from PDF".to_string(),
        ));
    }

    let raw = extract_document(&text, &state.llm).await?;
    let extraction = validate_extraction(&raw, Utc::now().date_naive())?;

    let document_id = Uuid::new_v4();
    let s3_key = document_s3_key(upload.user_id, document_id);
    let file_size = i64::try_from(upload.data.len())
        .map_err(|_| AppError::Validation("File is too large".to_string()))?;

    let mut tx = state.db.begin().await?;
    let row = insert_document(
        &mut *tx,
        NewDocument {
            id: document_id,
            user_id: upload.user_id,
            original_filename: &upload.filename,
            file_size,
            s3_key: &s3_key,
            extraction: &extraction,
        },
    )
    .await?;

    // An upload failure drops `tx`, rolling the row back.
    let bucket = &state.config.s3_bucket;
    upload_pdf(&state.s3, bucket, &s3_key, upload.data).await?;
    if let Err(e) = tx.commit().await {
        if let Err(cleanup) = delete_pdf(&state.s3, bucket, &s3_key).await {
            warn!("Could not remove {s3_key} after failed commit: {cleanup}");
        }
        return Err(e.into());
    }

    info!(
        "Parsed '{}' as {} (confidence {})",
        upload.filename,
        extraction.appointment_type.label(),
        extraction.confidence_score
    );
    Ok((StatusCode::CREATED, Json(row)))
}
