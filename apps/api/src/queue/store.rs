use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::{Connection, PgPool};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::queue::QueueEntryRow;

/// One entry as produced by the queue-API client.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueEntryInput {
    pub id: String,
    pub place: String,
    pub provider: String,
    pub phone: Option<String>,
    pub address: String,
    pub locality: String,
    pub date: String,
    pub benefit: String,
    pub waiting_people: i32,
    pub average_wait_days: i32,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BulkUploadResponse {
    pub success: bool,
    pub total_processed: usize,
    pub new_records: usize,
    pub updated_records: usize,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueueFilter {
    pub locality: Option<String>,
    pub benefit: Option<String>,
    pub max_wait_days: Option<i32>,
    #[serde(default = "default_active_only")]
    pub active_only: bool,
    /// Caps the result to the next N entries by date.
    pub limit: Option<i64>,
}

fn default_active_only() -> bool {
    true
}

impl Default for QueueFilter {
    fn default() -> Self {
        Self {
            locality: None,
            benefit: None,
            max_wait_days: None,
            active_only: true,
            limit: None,
        }
    }
}

impl QueueFilter {
    pub fn validate(&self) -> Result<(), String> {
        match self.limit {
            Some(limit) if limit < 1 => Err("limit must be at least 1".to_string()),
            _ => Ok(()),
        }
    }
}

/// Running totals for one bulk upload.
#[derive(Debug, Default)]
struct UploadTally {
    new_records: usize,
    updated_records: usize,
    errors: Vec<String>,
}

impl UploadTally {
    fn record(&mut self, inserted: bool) {
        if inserted {
            self.new_records += 1;
        } else {
            self.updated_records += 1;
        }
    }

    fn fail(&mut self, message: String) {
        self.errors.push(message);
    }

    fn finish(self, total_processed: usize) -> BulkUploadResponse {
        BulkUploadResponse {
            success: self.errors.is_empty(),
            total_processed,
            new_records: self.new_records,
            updated_records: self.updated_records,
            errors: self.errors,
        }
    }
}

/// Accepts `YYYY-MM-DD`, falling back to `DD-MM-YYYY`.
pub fn parse_queue_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d-%m-%Y"))
        .ok()
}

/// Upserts entries by queue id inside one transaction. Each entry runs in its
/// own savepoint: an unparsable date or a failing statement is reported in
/// `errors` and the rest of the batch still commits.
pub async fn upsert_entries(pool: &PgPool, entries: &[QueueEntryInput]) -> Result<BulkUploadResponse> {
    let mut tx = pool.begin().await?;
    let mut tally = UploadTally::default();

    for entry in entries {
        let Some(date) = parse_queue_date(&entry.date) else {
            warn!("Skipping queue entry {} with invalid date '{}'", entry.id, entry.date);
            tally.fail(format!(
                "Invalid date format for queue entry {}: {}",
                entry.id, entry.date
            ));
            continue;
        };

        let mut savepoint = Connection::begin(&mut *tx).await?;
        // xmax = 0 only for freshly inserted tuples
        let upserted: Result<bool, sqlx::Error> = sqlx::query_scalar(
            r#"
            INSERT INTO queue_entries
                (id, queue_id, place, provider, phone, address, locality, date, benefit,
                 waiting_people, average_wait_days, latitude, longitude, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, TRUE)
            ON CONFLICT (queue_id) DO UPDATE SET
                place = EXCLUDED.place,
                provider = EXCLUDED.provider,
                phone = EXCLUDED.phone,
                address = EXCLUDED.address,
                locality = EXCLUDED.locality,
                date = EXCLUDED.date,
                benefit = EXCLUDED.benefit,
                waiting_people = EXCLUDED.waiting_people,
                average_wait_days = EXCLUDED.average_wait_days,
                latitude = EXCLUDED.latitude,
                longitude = EXCLUDED.longitude,
                is_active = TRUE,
                updated_at = now()
            RETURNING (xmax = 0)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&entry.id)
        .bind(&entry.place)
        .bind(&entry.provider)
        .bind(&entry.phone)
        .bind(&entry.address)
        .bind(&entry.locality)
        .bind(date)
        .bind(&entry.benefit)
        .bind(entry.waiting_people)
        .bind(entry.average_wait_days)
        .bind(entry.latitude)
        .bind(entry.longitude)
        .fetch_one(&mut *savepoint)
        .await;

        match upserted {
            Ok(inserted) => {
                savepoint.commit().await?;
                tally.record(inserted);
            }
            Err(e) => {
                savepoint.rollback().await?;
                warn!("Failed to upsert queue entry {}: {e}", entry.id);
                tally.fail(format!("Failed to upsert queue entry {}: {e}", entry.id));
            }
        }
    }

    tx.commit()
        .await
        .context("Failed to commit queue upload")?;

    let response = tally.finish(entries.len());
    info!(
        "Queue upload: {} processed, {} new, {} updated, {} errors",
        response.total_processed,
        response.new_records,
        response.updated_records,
        response.errors.len()
    );
    Ok(response)
}

/// Lists entries ordered by next available date, then average wait.
pub async fn list_entries(pool: &PgPool, filter: &QueueFilter) -> Result<Vec<QueueEntryRow>> {
    Ok(sqlx::query_as::<_, QueueEntryRow>(
        r#"
        SELECT * FROM queue_entries
        WHERE ($1 = FALSE OR is_active = TRUE)
          AND ($2::TEXT IS NULL OR locality ILIKE '%' || $2 || '%')
          AND ($3::TEXT IS NULL OR benefit ILIKE '%' || $3 || '%')
          AND ($4::INTEGER IS NULL OR average_wait_days <= $4)
        ORDER BY date ASC, average_wait_days ASC
        LIMIT $5
        "#,
    )
    .bind(filter.active_only)
    .bind(&filter.locality)
    .bind(&filter.benefit)
    .bind(filter.max_wait_days)
    .bind(filter.limit)
    .fetch_all(pool)
    .await?)
}

pub async fn get_entry(pool: &PgPool, queue_id: &str) -> Result<Option<QueueEntryRow>> {
    Ok(
        sqlx::query_as::<_, QueueEntryRow>("SELECT * FROM queue_entries WHERE queue_id = $1")
            .bind(queue_id)
            .fetch_optional(pool)
            .await?,
    )
}

/// Returns false when no entry has this queue id.
pub async fn deactivate_entry(pool: &PgPool, queue_id: &str) -> Result<bool> {
    let result = sqlx::query(
        "UPDATE queue_entries SET is_active = FALSE, updated_at = now() WHERE queue_id = $1",
    )
    .bind(queue_id)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn clear_inactive(pool: &PgPool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM queue_entries WHERE is_active = FALSE")
        .execute(pool)
        .await?;
    info!("Deleted {} inactive queue entries", result.rows_affected());
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(
            parse_queue_date("2025-11-03"),
            NaiveDate::from_ymd_opt(2025, 11, 3)
        );
    }

    #[test]
    fn test_parse_day_first_date() {
        assert_eq!(
            parse_queue_date("03-11-2025"),
            NaiveDate::from_ymd_opt(2025, 11, 3)
        );
    }

    #[test]
    fn test_parse_rejects_placeholder() {
        assert_eq!(parse_queue_date("No date available"), None);
        assert_eq!(parse_queue_date("2025/11/03"), None);
    }

    #[test]
    fn test_input_uses_camel_case_fields() {
        let json = r#"{
            "id": "abc",
            "place": "Poradnia",
            "provider": "SPZOZ",
            "phone": null,
            "address": "ul. Lipowa 1",
            "locality": "Bialystok",
            "date": "2025-11-03",
            "benefit": "PORADNIA ALERGOLOGICZNA",
            "waitingPeople": 4,
            "averageWaitDays": 21
        }"#;
        let entry: QueueEntryInput = serde_json::from_str(json).unwrap();
        assert_eq!(entry.waiting_people, 4);
        assert_eq!(entry.average_wait_days, 21);
        assert!(entry.latitude.is_none());
    }

    #[test]
    fn test_filter_limit_must_be_positive() {
        let filter: QueueFilter = serde_json::from_str(r#"{"limit": 5}"#).unwrap();
        assert_eq!(filter.limit, Some(5));
        assert!(filter.validate().is_ok());

        let filter: QueueFilter = serde_json::from_str(r#"{"limit": 0}"#).unwrap();
        assert_eq!(filter.validate(), Err("limit must be at least 1".to_string()));
        assert!(QueueFilter::default().validate().is_ok());
    }

    #[test]
    fn test_failed_entry_does_not_discard_later_ones() {
        let mut tally = UploadTally::default();
        tally.record(true);
        tally.fail("Failed to upsert queue entry b: value too long".to_string());
        tally.record(false);
        tally.record(true);

        let response = tally.finish(4);
        assert!(!response.success);
        assert_eq!(response.total_processed, 4);
        assert_eq!(response.new_records, 2);
        assert_eq!(response.updated_records, 1);
        assert_eq!(response.errors.len(), 1);
    }

    #[test]
    fn test_clean_upload_is_successful() {
        let mut tally = UploadTally::default();
        tally.record(true);
        let response = tally.finish(1);
        assert_eq!(
            response,
            BulkUploadResponse {
                success: true,
                total_processed: 1,
                new_records: 1,
                updated_records: 0,
                errors: Vec::new(),
            }
        );
    }

    #[test]
    fn test_filter_defaults_to_active_only() {
        let filter: QueueFilter = serde_json::from_str("{}").unwrap();
        assert!(filter.active_only);
        assert!(QueueFilter::default().active_only);
    }
}
