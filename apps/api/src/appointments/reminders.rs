//! Rebooking reminders for completed appointments that are more than
//! `REMINDER_LOOKBACK_DAYS` old and not yet acknowledged by the user.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::appointment::{Appointment, AppointmentStatus};

pub const REMINDER_LOOKBACK_DAYS: i64 = 30;

#[derive(Debug, Clone, Serialize)]
pub struct ReminderCandidate {
    pub appointment: Appointment,
    /// Whole days elapsed since the appointment.
    pub days_since: i64,
}

/// Completed appointments strictly older than the lookback window whose id
/// `is_acknowledged` rejects. Input order is preserved.
pub fn appointments_needing_reminder<F>(
    appointments: &[Appointment],
    now: DateTime<Utc>,
    is_acknowledged: F,
) -> Vec<Appointment>
where
    F: Fn(&str) -> bool,
{
    let lookback = Duration::days(REMINDER_LOOKBACK_DAYS);
    appointments
        .iter()
        .filter(|a| a.status == AppointmentStatus::Completed)
        .filter(|a| now.signed_duration_since(a.date_time) > lookback)
        .filter(|a| !is_acknowledged(&a.id))
        .cloned()
        .collect()
}

pub fn build_reminder_candidates<F>(
    appointments: &[Appointment],
    now: DateTime<Utc>,
    is_acknowledged: F,
) -> Vec<ReminderCandidate>
where
    F: Fn(&str) -> bool,
{
    appointments_needing_reminder(appointments, now, is_acknowledged)
        .into_iter()
        .map(|appointment| ReminderCandidate {
            days_since: now.signed_duration_since(appointment.date_time).num_days(),
            appointment,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use uuid::Uuid;

    use super::*;
    use crate::appointments::acknowledgements::{AcknowledgementStore, InMemoryAcknowledgementStore};
    use crate::appointments::aggregation::tests::{at, make_appointment};

    #[test]
    fn test_exactly_thirty_days_is_excluded() {
        let now = at(2025, 10, 31);
        let appointments = vec![make_appointment(
            "boundary",
            AppointmentStatus::Completed,
            now - Duration::days(30),
        )];
        assert!(appointments_needing_reminder(&appointments, now, |_| false).is_empty());
    }

    #[test]
    fn test_thirty_one_days_is_included() {
        let now = at(2025, 10, 31);
        let appointments = vec![make_appointment(
            "old",
            AppointmentStatus::Completed,
            now - Duration::days(31),
        )];
        let reminders = build_reminder_candidates(&appointments, now, |_| false);
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].appointment.id, "old");
        assert_eq!(reminders[0].days_since, 31);
    }

    #[test]
    fn test_only_completed_appointments_qualify() {
        let now = at(2025, 10, 31);
        let old = now - Duration::days(90);
        let appointments = vec![
            make_appointment("cancelled", AppointmentStatus::Cancelled, old),
            make_appointment("stale-upcoming", AppointmentStatus::Upcoming, old),
            make_appointment("completed", AppointmentStatus::Completed, old),
        ];
        let reminders = appointments_needing_reminder(&appointments, now, |_| false);
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].id, "completed");
    }

    #[test]
    fn test_acknowledged_appointments_are_skipped() {
        let now = at(2025, 10, 31);
        let old = now - Duration::days(45);
        let appointments = vec![
            make_appointment("seen", AppointmentStatus::Completed, old),
            make_appointment("unseen", AppointmentStatus::Completed, old),
        ];
        let acknowledged: HashSet<String> = ["seen".to_string()].into_iter().collect();

        let reminders =
            appointments_needing_reminder(&appointments, now, |id| acknowledged.contains(id));
        assert_eq!(reminders.len(), 1);
        assert_eq!(reminders[0].id, "unseen");
    }

    #[tokio::test]
    async fn test_acknowledgement_survives_repeated_calls() {
        let store = InMemoryAcknowledgementStore::default();
        let user_id = Uuid::new_v4();
        let now = at(2025, 10, 31);
        let appointments = vec![make_appointment(
            "old",
            AppointmentStatus::Completed,
            now - Duration::days(31),
        )];

        let acked = store.acknowledged_ids(user_id).await.unwrap();
        assert_eq!(
            appointments_needing_reminder(&appointments, now, |id| acked.contains(id)).len(),
            1
        );

        store
            .mark_acknowledged(user_id, &["old".to_string()])
            .await
            .unwrap();
        store
            .mark_acknowledged(user_id, &["old".to_string()])
            .await
            .unwrap();

        for _ in 0..2 {
            let acked = store.acknowledged_ids(user_id).await.unwrap();
            assert!(
                appointments_needing_reminder(&appointments, now, |id| acked.contains(id))
                    .is_empty()
            );
        }
    }
}
