//! OPD visit register.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{escape_csv, ReportMetadata};
use crate::models::Visit;
use crate::queue::{truncate_text, PatientDirectory, UNKNOWN_PATIENT};

/// Complaint characters shown in the register.
pub const REPORT_COMPLAINT_CHARS: usize = 30;

/// OPD register for a day or for all visits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpdReport {
    pub metadata: ReportMetadata,
    pub rows: Vec<OpdReportRow>,
}

/// One visit in the register.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpdReportRow {
    pub visit_id: String,
    pub patient_id: String,
    pub patient_name: String,
    pub visit_date: String,
    pub visit_time: String,
    pub chief_complaint: String,
    pub status: String,
}

impl OpdReport {
    /// Build the register. Visits are expected to be pre-filtered to `date`.
    pub fn build<D>(
        visits: &[Visit],
        directory: &D,
        date: Option<NaiveDate>,
    ) -> serde_json::Result<Self>
    where
        D: PatientDirectory + ?Sized,
    {
        let rows: Vec<OpdReportRow> = visits
            .iter()
            .map(|visit| OpdReportRow {
                visit_id: visit.id.clone(),
                patient_id: visit.patient_id.clone(),
                patient_name: directory
                    .display_name(&visit.patient_id)
                    .unwrap_or_else(|| UNKNOWN_PATIENT.to_string()),
                visit_date: visit.visit_date.clone(),
                visit_time: visit.visit_time.clone().unwrap_or_default(),
                chief_complaint: truncate_text(&visit.chief_complaint, REPORT_COMPLAINT_CHARS),
                status: visit.status.to_string(),
            })
            .collect();

        Ok(Self {
            metadata: ReportMetadata::for_rows(&rows, date)?,
            rows,
        })
    }

    /// Export to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Export to CSV format.
    pub fn to_csv(&self) -> String {
        let mut csv = String::new();

        // Header
        csv.push_str("visit_id,patient_id,patient_name,visit_date,visit_time,chief_complaint,status\n");

        for row in &self.rows {
            csv.push_str(&format!(
                "{},{},{},{},{},{},{}\n",
                escape_csv(&row.visit_id),
                escape_csv(&row.patient_id),
                escape_csv(&row.patient_name),
                escape_csv(&row.visit_date),
                escape_csv(&row.visit_time),
                escape_csv(&row.chief_complaint),
                escape_csv(&row.status),
            ));
        }

        csv
    }
}
