//! Appointment aggregation — merges appointment sources and derives the
//! upcoming / completed / other / all views rendered by the dashboard.
//!
//! Every function here is pure. Views are recomputed per request because
//! `now` moves and the sources are re-read each time.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::appointment::{Appointment, AppointmentStatus};

// ────────────────────────────────────────────────────────────────────────────
// Merge + per-bucket selection
// ────────────────────────────────────────────────────────────────────────────

/// Concatenates sources in the order given. Ids are not de-duplicated.
pub fn merge_sources<I>(sources: I) -> Vec<Appointment>
where
    I: IntoIterator<Item = Vec<Appointment>>,
{
    sources.into_iter().flatten().collect()
}

/// Upcoming appointments still in the future, earliest first.
pub fn select_upcoming(appointments: &[Appointment], now: DateTime<Utc>) -> Vec<Appointment> {
    let mut upcoming: Vec<Appointment> = appointments
        .iter()
        .filter(|a| a.status == AppointmentStatus::Upcoming && a.date_time > now)
        .cloned()
        .collect();
    upcoming.sort_by(|a, b| a.date_time.cmp(&b.date_time));
    upcoming
}

/// Completed appointments, most recent first.
pub fn select_completed(appointments: &[Appointment]) -> Vec<Appointment> {
    let mut completed: Vec<Appointment> = appointments
        .iter()
        .filter(|a| a.status == AppointmentStatus::Completed)
        .cloned()
        .collect();
    completed.sort_by(|a, b| b.date_time.cmp(&a.date_time));
    completed
}

/// Cancelled, rescheduled and no-show appointments, most recent first.
pub fn select_other(appointments: &[Appointment]) -> Vec<Appointment> {
    let mut other: Vec<Appointment> = appointments
        .iter()
        .filter(|a| a.status.is_other())
        .cloned()
        .collect();
    other.sort_by(|a, b| b.date_time.cmp(&a.date_time));
    other
}

/// Every appointment, grouped upcoming → completed → other → unrecognized.
/// Upcoming is ascending by date; every other group is descending.
pub fn select_all(appointments: &[Appointment]) -> Vec<Appointment> {
    let mut all = appointments.to_vec();
    all.sort_by(compare_for_all_view);
    all
}

fn status_rank(status: AppointmentStatus) -> u8 {
    match status {
        AppointmentStatus::Upcoming => 0,
        AppointmentStatus::Completed => 1,
        AppointmentStatus::Cancelled
        | AppointmentStatus::Rescheduled
        | AppointmentStatus::NoShow => 2,
        AppointmentStatus::Unrecognized => 3,
    }
}

fn compare_for_all_view(a: &Appointment, b: &Appointment) -> Ordering {
    status_rank(a.status)
        .cmp(&status_rank(b.status))
        .then_with(|| {
            if a.status == AppointmentStatus::Upcoming {
                a.date_time.cmp(&b.date_time)
            } else {
                b.date_time.cmp(&a.date_time)
            }
        })
}

// ────────────────────────────────────────────────────────────────────────────
// Combined views for the HTTP layer
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    #[default]
    All,
    Upcoming,
    Completed,
    Other,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ViewCounts {
    pub all: usize,
    pub upcoming: usize,
    pub completed: usize,
    pub other: usize,
}

#[derive(Debug, Clone)]
pub struct AppointmentViews {
    pub all: Vec<Appointment>,
    pub upcoming: Vec<Appointment>,
    pub completed: Vec<Appointment>,
    pub other: Vec<Appointment>,
}

impl AppointmentViews {
    pub fn build(appointments: &[Appointment], now: DateTime<Utc>) -> Self {
        Self {
            all: select_all(appointments),
            upcoming: select_upcoming(appointments, now),
            completed: select_completed(appointments),
            other: select_other(appointments),
        }
    }

    pub fn counts(&self) -> ViewCounts {
        ViewCounts {
            all: self.all.len(),
            upcoming: self.upcoming.len(),
            completed: self.completed.len(),
            other: self.other.len(),
        }
    }

    pub fn into_view(self, kind: ViewKind) -> Vec<Appointment> {
        match kind {
            ViewKind::All => self.all,
            ViewKind::Upcoming => self.upcoming,
            ViewKind::Completed => self.completed,
            ViewKind::Other => self.other,
        }
    }
}
