use chrono::{NaiveTime, TimeZone, Utc};

use crate::models::appointment::{Appointment, AppointmentStatus, AppointmentType};
use crate::models::queue::QueueEntryRow;

/// Queue-derived ids are prefixed so they never collide with local UUIDs.
pub fn queue_appointment_id(queue_id: &str) -> String {
    format!("queue:{queue_id}")
}

/// Adapts a provider-queue entry into an upcoming specialist appointment
/// for the given subject, at midnight UTC of the next available date.
pub fn to_appointment(entry: &QueueEntryRow, subject_id: &str, subject_name: &str) -> Appointment {
    Appointment {
        id: queue_appointment_id(&entry.queue_id),
        subject_id: subject_id.to_string(),
        subject_name: subject_name.to_string(),
        facility_name: entry.provider.clone(),
        facility_address: Some(format!("{}, {}", entry.address, entry.locality)),
        doctor_name: None,
        appointment_type: AppointmentType::Specialist,
        date_time: Utc.from_utc_datetime(&entry.date.and_time(NaiveTime::MIN)),
        status: AppointmentStatus::Upcoming,
        notes: Some(entry.benefit.clone()),
        duration_minutes: None,
        reminder_enabled: None,
    }
}
