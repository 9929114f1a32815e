use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DocumentType {
    #[serde(rename = "Medical Record")]
    MedicalRecord,
    Prescription,
    #[serde(rename = "Lab Result")]
    LabResult,
    Vaccination,
    Imaging,
    Insurance,
    Referral,
    Diagnosis,
    Other,
}

/// A document as shown on the timeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: String,
    pub title: String,
    pub document_type: DocumentType,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub file_size_label: Option<String>,
    pub uploaded_by: Option<String>,
}

/// A parsed medical document as persisted by the extraction flow.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MedicalDocumentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub original_filename: String,
    pub name: String,
    pub date: NaiveDate,
    pub appointment_type: String,
    pub summary: Option<String>,
    pub doctor: Option<String>,
    pub file_size: i64,
    pub s3_key: String,
    pub processing_status: String,
    pub confidence_score: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
