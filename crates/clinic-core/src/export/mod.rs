//! Reports: OPD visit register, appointment list and dashboard panels.

mod appointments;
mod dashboard;
mod opd;

pub use appointments::*;
pub use dashboard::*;
pub use opd::*;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::models::{Patient, DATE_FORMAT};
use crate::store::{Store, StoreResult};

/// Report metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportMetadata {
    /// Generation timestamp (RFC 3339, local offset)
    pub generated_at: String,
    /// Date filter (`YYYY-MM-DD`), or `None` for all records
    pub date: Option<String>,
    pub row_count: usize,
    /// SHA-256 hex digest of the rows as compact JSON
    pub rows_sha256: String,
}

impl ReportMetadata {
    fn for_rows<T: Serialize>(rows: &[T], date: Option<NaiveDate>) -> serde_json::Result<Self> {
        Ok(Self {
            generated_at: Local::now().to_rfc3339(),
            date: date.map(|d| d.format(DATE_FORMAT).to_string()),
            row_count: rows.len(),
            rows_sha256: digest_rows(rows)?,
        })
    }
}

/// SHA-256 over the compact JSON encoding of `rows`.
pub fn digest_rows<T: Serialize>(rows: &[T]) -> serde_json::Result<String> {
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_vec(rows)?);
    Ok(hex::encode(hasher.finalize()))
}

/// Builds reports from a store.
pub struct ReportExporter<'a> {
    store: &'a Store,
}

impl<'a> ReportExporter<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    /// OPD register for `date`, or every visit when `date` is `None`.
    pub fn opd_report(&self, date: Option<NaiveDate>) -> StoreResult<OpdReport> {
        let visits = match date {
            Some(day) => self.store.visits_by_date(day)?,
            None => self.store.list_visits()?,
        };
        let patients = self.store.load_all::<Patient>()?;
        Ok(OpdReport::build(&visits, &patients, date)?)
    }

    /// Appointment list for `date`, or every appointment when `date` is `None`.
    pub fn appointment_report(&self, date: Option<NaiveDate>) -> StoreResult<AppointmentReport> {
        let appointments = match date {
            Some(day) => self
                .store
                .appointments_by_date(&day.format(DATE_FORMAT).to_string())?,
            None => self.store.list_appointments()?,
        };
        Ok(AppointmentReport::build(&appointments, date)?)
    }

    /// Dashboard counts for today.
    pub fn dashboard_stats(&self) -> StoreResult<DashboardStats> {
        self.dashboard_stats_for(Local::now().date_naive())
    }

    pub fn dashboard_stats_for(&self, today: NaiveDate) -> StoreResult<DashboardStats> {
        let today_label = today.format(DATE_FORMAT).to_string();
        Ok(DashboardStats {
            total_patients: self.store.list_patients()?.len(),
            todays_appointments: self.store.appointments_by_date(&today_label)?.len(),
            todays_visits: self.store.visits_by_date(today)?.len(),
            total_doctors: self.store.list_doctors()?.len(),
        })
    }

    /// The `limit` newest patients, appointments and visits.
    pub fn recent_activity(&self, limit: usize) -> StoreResult<RecentActivity> {
        Ok(RecentActivity::build(
            self.store.list_patients()?,
            self.store.list_appointments()?,
            self.store.list_visits()?,
            limit,
        ))
    }
}

/// Escape a string for CSV output.
pub(crate) fn escape_csv(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}
