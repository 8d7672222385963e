//! Front-desk dashboard counts and recent activity.

use serde::{Deserialize, Serialize};

use crate::models::{Appointment, Patient, Visit};

/// Rows per list in the recent-activity panel.
pub const RECENT_ACTIVITY_LIMIT: usize = 5;

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_patients: usize,
    pub todays_appointments: usize,
    pub todays_visits: usize,
    pub total_doctors: usize,
}

/// Newest registrations, bookings and check-ins.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecentActivity {
    /// By registration date
    pub patients: Vec<Patient>,
    /// By booking timestamp
    pub appointments: Vec<Appointment>,
    /// By check-in date and time
    pub visits: Vec<Visit>,
}

impl RecentActivity {
    /// Keep the `limit` newest of each record type. Ties keep storage order.
    pub fn build(
        mut patients: Vec<Patient>,
        mut appointments: Vec<Appointment>,
        mut visits: Vec<Visit>,
        limit: usize,
    ) -> Self {
        patients.sort_by(|a, b| b.registration_date.cmp(&a.registration_date));
        patients.truncate(limit);

        appointments.sort_by(|a, b| b.created_date.cmp(&a.created_date));
        appointments.truncate(limit);

        visits.sort_by(|a, b| checked_in_key(b).cmp(&checked_in_key(a)));
        visits.truncate(limit);

        Self {
            patients,
            appointments,
            visits,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty() && self.appointments.is_empty() && self.visits.is_empty()
    }
}

fn checked_in_key(visit: &Visit) -> (&str, &str) {
    (visit.visit_date.as_str(), visit.visit_time.as_deref().unwrap_or(""))
}
