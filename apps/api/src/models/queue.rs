use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A provider-queue entry as stored after bulk upload.
/// `queue_id` is the identifier assigned by the national queue API.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QueueEntryRow {
    pub id: Uuid,
    pub queue_id: String,
    pub place: String,
    pub provider: String,
    pub phone: Option<String>,
    pub address: String,
    pub locality: String,
    pub date: NaiveDate,
    pub benefit: String,
    pub waiting_people: i32,
    pub average_wait_days: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
