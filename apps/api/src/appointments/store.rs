use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::appointment::{AppointmentRow, AppointmentStatus, AppointmentType};

#[derive(Debug, Clone, Deserialize)]
pub struct BookAppointmentRequest {
    pub user_id: Uuid,
    pub subject_id: String,
    pub subject_name: String,
    pub facility_name: String,
    pub facility_address: Option<String>,
    pub doctor_name: Option<String>,
    pub appointment_type: AppointmentType,
    pub date_time: DateTime<Utc>,
    pub notes: Option<String>,
    pub duration_minutes: Option<u32>,
    pub reminder_enabled: Option<bool>,
}

/// Returns a human-readable reason when the booking cannot be accepted.
pub fn validate_booking(req: &BookAppointmentRequest, now: DateTime<Utc>) -> Result<(), String> {
    if req.subject_name.trim().is_empty() {
        return Err("subject_name cannot be empty".to_string());
    }
    if req.facility_name.trim().is_empty() {
        return Err("facility_name cannot be empty".to_string());
    }
    if req.date_time <= now {
        return Err("date_time must be in the future".to_string());
    }
    if let Some(minutes) = req.duration_minutes {
        if minutes == 0 || i32::try_from(minutes).is_err() {
            return Err("duration_minutes must be a positive number".to_string());
        }
    }
    Ok(())
}

pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<AppointmentRow>> {
    Ok(sqlx::query_as::<_, AppointmentRow>(
        "SELECT * FROM appointments WHERE user_id = $1 ORDER BY created_at ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?)
}

/// Inserts a new appointment with status `upcoming`.
pub async fn insert_booking(pool: &PgPool, req: &BookAppointmentRequest) -> Result<AppointmentRow> {
    let row = sqlx::query_as::<_, AppointmentRow>(
        r#"
        INSERT INTO appointments
            (id, user_id, subject_id, subject_name, facility_name, facility_address,
             doctor_name, appointment_type, date_time, status, notes,
             duration_minutes, reminder_enabled)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(req.user_id)
    .bind(&req.subject_id)
    .bind(req.subject_name.trim())
    .bind(req.facility_name.trim())
    .bind(&req.facility_address)
    .bind(&req.doctor_name)
    .bind(req.appointment_type.label())
    .bind(req.date_time)
    .bind(AppointmentStatus::Upcoming.as_str())
    .bind(&req.notes)
    .bind(req.duration_minutes.and_then(|m| i32::try_from(m).ok()))
    .bind(req.reminder_enabled)
    .fetch_one(pool)
    .await?;

    info!(
        "Booked {} appointment {} for user {}",
        row.appointment_type, row.id, row.user_id
    );
    Ok(row)
}

/// Returns `None` when the appointment does not exist for this user.
pub async fn update_status(
    pool: &PgPool,
    user_id: Uuid,
    appointment_id: Uuid,
    status: AppointmentStatus,
) -> Result<Option<AppointmentRow>> {
    Ok(sqlx::query_as::<_, AppointmentRow>(
        "UPDATE appointments SET status = $1 WHERE id = $2 AND user_id = $3 RETURNING *",
    )
    .bind(status.as_str())
    .bind(appointment_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn make_request(date_time: DateTime<Utc>) -> BookAppointmentRequest {
        BookAppointmentRequest {
            user_id: Uuid::new_v4(),
            subject_id: "4".to_string(),
            subject_name: "Maniek".to_string(),
            facility_name: "Vet Clinic".to_string(),
            facility_address: None,
            doctor_name: None,
            appointment_type: AppointmentType::Veterinary,
            date_time,
            notes: None,
            duration_minutes: Some(30),
            reminder_enabled: Some(true),
        }
    }

    #[test]
    fn test_future_booking_is_valid() {
        let now = Utc::now();
        assert!(validate_booking(&make_request(now + Duration::days(3)), now).is_ok());
    }

    #[test]
    fn test_past_booking_is_rejected() {
        let now = Utc::now();
        let err = validate_booking(&make_request(now - Duration::hours(1)), now).unwrap_err();
        assert!(err.contains("future"));
    }

    #[test]
    fn test_blank_subject_is_rejected() {
        let now = Utc::now();
        let mut req = make_request(now + Duration::days(1));
        req.subject_name = "   ".to_string();
        assert!(validate_booking(&req, now).unwrap_err().contains("subject_name"));
    }

    #[test]
    fn test_zero_duration_is_rejected() {
        let now = Utc::now();
        let mut req = make_request(now + Duration::days(1));
        req.duration_minutes = Some(0);
        assert!(validate_booking(&req, now).is_err());
    }

    #[test]
    fn test_request_accepts_type_labels() {
        let json = r#"{
            "user_id": "00000000-0000-0000-0000-000000000001",
            "subject_id": "current",
            "subject_name": "Adam Kowalski",
            "facility_name": "Dental Care",
            "appointment_type": "Follow-up",
            "date_time": "2030-01-15T10:30:00Z"
        }"#;
        let req: BookAppointmentRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.appointment_type, AppointmentType::FollowUp);
        assert!(req.notes.is_none());
    }
}
