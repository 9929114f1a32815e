use anyhow::Result;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use sqlx::{PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::documents::extraction::ValidatedExtraction;
use crate::errors::AppError;
use crate::models::document::MedicalDocumentRow;

pub fn document_s3_key(user_id: Uuid, document_id: Uuid) -> String {
    format!("documents/{user_id}/{document_id}.pdf")
}

/// Parameters for persisting a parsed document.
pub struct NewDocument<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub original_filename: &'a str,
    pub file_size: i64,
    pub s3_key: &'a str,
    pub extraction: &'a ValidatedExtraction,
}

pub async fn upload_pdf(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    body: Bytes,
) -> Result<(), AppError> {
    s3.put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(body))
        .content_type("application/pdf")
        .send()
        .await
        .map_err(|e| AppError::S3(format!("PDF upload failed: {e}")))?;

    info!("Uploaded document to s3://{bucket}/{key}");
    Ok(())
}

/// Removes an uploaded object whose database row was never committed.
pub async fn delete_pdf(s3: &aws_sdk_s3::Client, bucket: &str, key: &str) -> Result<(), AppError> {
    s3.delete_object()
        .bucket(bucket)
        .key(key)
        .send()
        .await
        .map_err(|e| AppError::S3(format!("PDF cleanup failed: {e}")))?;

    info!("Deleted orphaned object s3://{bucket}/{key}");
    Ok(())
}

/// Runs on the caller's transaction so the row can be rolled back when the
/// upload that follows fails.
pub async fn insert_document(
    conn: &mut PgConnection,
    doc: NewDocument<'_>,
) -> Result<MedicalDocumentRow> {
    let NewDocument {
        id,
        user_id,
        original_filename,
        file_size,
        s3_key,
        extraction,
    } = doc;

    let row = sqlx::query_as::<_, MedicalDocumentRow>(
        r#"
        INSERT INTO medical_documents
            (id, user_id, original_filename, name, date, appointment_type, summary,
             doctor, file_size, s3_key, processing_status, confidence_score)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'completed', $11)
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(original_filename)
    .bind(&extraction.name)
    .bind(extraction.date)
    .bind(extraction.appointment_type.label())
    .bind(&extraction.summary)
    .bind(&extraction.doctor)
    .bind(file_size)
    .bind(s3_key)
    .bind(extraction.confidence_score)
    .fetch_one(conn)
    .await?;

    info!("Stored document {id} for user {user_id}");
    Ok(row)
}

pub async fn list_documents(pool: &PgPool, user_id: Uuid) -> Result<Vec<MedicalDocumentRow>> {
    Ok(sqlx::query_as::<_, MedicalDocumentRow>(
        "SELECT * FROM medical_documents WHERE user_id = $1 ORDER BY date DESC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

/// Returns `None` when the document does not exist for this user.
pub async fn get_document(
    pool: &PgPool,
    user_id: Uuid,
    document_id: Uuid,
) -> Result<Option<MedicalDocumentRow>> {
    Ok(sqlx::query_as::<_, MedicalDocumentRow>(
        "SELECT * FROM medical_documents WHERE id = $1 AND user_id = $2",
    )
    .bind(document_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?)
}
