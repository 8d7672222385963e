//! Appointment list report.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{escape_csv, ReportMetadata};
use crate::models::Appointment;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentReport {
    pub metadata: ReportMetadata,
    pub rows: Vec<AppointmentReportRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppointmentReportRow {
    pub appointment_id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub doctor_id: String,
    pub doctor_name: String,
    pub appointment_date: String,
    pub appointment_time: String,
    pub status: String,
}

impl AppointmentReport {
    /// Rows are sorted by date then time.
    pub fn build(appointments: &[Appointment], date: Option<NaiveDate>) -> serde_json::Result<Self> {
        let mut rows: Vec<AppointmentReportRow> = appointments
            .iter()
            .map(|a| AppointmentReportRow {
                appointment_id: a.id.clone(),
                patient_id: a.patient_id.clone(),
                patient_name: a.patient_name.clone().unwrap_or_default(),
                doctor_id: a.doctor_id.clone(),
                doctor_name: a.doctor_name.clone().unwrap_or_default(),
                appointment_date: a.appointment_date.clone(),
                appointment_time: a.appointment_time.clone(),
                status: a.status.to_string(),
            })
            .collect();
        rows.sort_by(|a, b| {
            (&a.appointment_date, &a.appointment_time).cmp(&(&b.appointment_date, &b.appointment_time))
        });

        Ok(Self {
            metadata: ReportMetadata::for_rows(&rows, date)?,
            rows,
        })
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn to_csv(&self) -> String {
        let mut csv = String::new();
        csv.push_str("appointment_id,patient_id,patient_name,doctor_id,doctor_name,appointment_date,appointment_time,status\n");

        for row in &self.rows {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{},{}\n",
                escape_csv(&row.appointment_id),
                escape_csv(&row.patient_id),
                escape_csv(&row.patient_name),
                escape_csv(&row.doctor_id),
                escape_csv(&row.doctor_name),
                escape_csv(&row.appointment_date),
                escape_csv(&row.appointment_time),
                escape_csv(&row.status),
            ));
        }

        csv
    }
}
