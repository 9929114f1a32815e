use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AppointmentType {
    #[serde(rename = "General Checkup")]
    GeneralCheckup,
    Dental,
    Vision,
    Specialist,
    Vaccination,
    #[serde(rename = "Follow-up")]
    FollowUp,
    Emergency,
    #[serde(rename = "Lab Work")]
    LabWork,
    #[serde(rename = "Physical Therapy")]
    PhysicalTherapy,
    #[serde(rename = "Mental Health")]
    MentalHealth,
    Veterinary,
    Other,
}

impl AppointmentType {
    pub const ALL: [AppointmentType; 12] = [
        AppointmentType::GeneralCheckup,
        AppointmentType::Dental,
        AppointmentType::Vision,
        AppointmentType::Specialist,
        AppointmentType::Vaccination,
        AppointmentType::FollowUp,
        AppointmentType::Emergency,
        AppointmentType::LabWork,
        AppointmentType::PhysicalTherapy,
        AppointmentType::MentalHealth,
        AppointmentType::Veterinary,
        AppointmentType::Other,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AppointmentType::GeneralCheckup => "General Checkup",
            AppointmentType::Dental => "Dental",
            AppointmentType::Vision => "Vision",
            AppointmentType::Specialist => "Specialist",
            AppointmentType::Vaccination => "Vaccination",
            AppointmentType::FollowUp => "Follow-up",
            AppointmentType::Emergency => "Emergency",
            AppointmentType::LabWork => "Lab Work",
            AppointmentType::PhysicalTherapy => "Physical Therapy",
            AppointmentType::MentalHealth => "Mental Health",
            AppointmentType::Veterinary => "Veterinary",
            AppointmentType::Other => "Other",
        }
    }

    /// Exact label match. Stored values and LLM output both use the labels.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.label() == label)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentStatus {
    Upcoming,
    Completed,
    Cancelled,
    Rescheduled,
    NoShow,
    /// Any status string this service does not know about.
    #[serde(other)]
    Unrecognized,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Upcoming => "upcoming",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
            AppointmentStatus::Rescheduled => "rescheduled",
            AppointmentStatus::NoShow => "no-show",
            AppointmentStatus::Unrecognized => "unrecognized",
        }
    }

    /// Lenient parse: unknown strings map to `Unrecognized` instead of failing.
    pub fn from_db_str(s: &str) -> Self {
        match s {
            "upcoming" => AppointmentStatus::Upcoming,
            "completed" => AppointmentStatus::Completed,
            "cancelled" => AppointmentStatus::Cancelled,
            "rescheduled" => AppointmentStatus::Rescheduled,
            "no-show" => AppointmentStatus::NoShow,
            _ => AppointmentStatus::Unrecognized,
        }
    }

    /// Cancelled, rescheduled and no-show share the "other" bucket.
    pub fn is_other(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Cancelled | AppointmentStatus::Rescheduled | AppointmentStatus::NoShow
        )
    }
}

/// The in-memory appointment record every source is adapted into.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    pub id: String,
    pub subject_id: String,
    pub subject_name: String,
    pub facility_name: String,
    pub facility_address: Option<String>,
    pub doctor_name: Option<String>,
    pub appointment_type: AppointmentType,
    pub date_time: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub duration_minutes: Option<u32>,
    pub reminder_enabled: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AppointmentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subject_id: String,
    pub subject_name: String,
    pub facility_name: String,
    pub facility_address: Option<String>,
    pub doctor_name: Option<String>,
    pub appointment_type: String,
    pub date_time: DateTime<Utc>,
    pub status: String,
    pub notes: Option<String>,
    pub duration_minutes: Option<i32>,
    pub reminder_enabled: Option<bool>,
    pub created_at: DateTime<Utc>,
}

impl From<AppointmentRow> for Appointment {
    fn from(row: AppointmentRow) -> Self {
        let appointment_type = AppointmentType::from_label(&row.appointment_type)
            .unwrap_or_else(|| {
                warn!(
                    "Appointment {} has unknown type '{}', treating as Other",
                    row.id, row.appointment_type
                );
                AppointmentType::Other
            });

        Appointment {
            id: row.id.to_string(),
            subject_id: row.subject_id,
            subject_name: row.subject_name,
            facility_name: row.facility_name,
            facility_address: row.facility_address,
            doctor_name: row.doctor_name,
            appointment_type,
            date_time: row.date_time,
            status: AppointmentStatus::from_db_str(&row.status),
            notes: row.notes,
            duration_minutes: row.duration_minutes.and_then(|m| u32::try_from(m).ok()),
            reminder_enabled: row.reminder_enabled,
        }
    }
}
