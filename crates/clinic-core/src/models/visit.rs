//! OPD visit models.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::lenient;
use super::validation::{self, ValidationResult};

/// Default label for walk-in consultations.
pub const DEFAULT_VISIT_TYPE: &str = "OPD Consultation";

/// Visit date format on disk.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Check-in time format on disk.
pub const TIME_FORMAT: &str = "%H:%M:%S";

/// Triage priority of a visit.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    Emergency,
    High,
    #[default]
    Normal,
    Low,
}

impl Priority {
    /// Parse an exact priority label.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim() {
            "Emergency" => Some(Self::Emergency),
            "High" => Some(Self::High),
            "Normal" => Some(Self::Normal),
            "Low" => Some(Self::Low),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Emergency => "Emergency",
            Self::High => "High",
            Self::Normal => "Normal",
            Self::Low => "Low",
        }
    }

    /// Queue rank; lower is served first.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Emergency => 1,
            Self::High => 2,
            Self::Normal => 3,
            Self::Low => 4,
        }
    }
}

// Unknown labels rank as Normal.
impl From<String> for Priority {
    fn from(label: String) -> Self {
        Self::parse(&label).unwrap_or_default()
    }
}

impl From<Priority> for String {
    fn from(priority: Priority) -> Self {
        priority.as_str().to_string()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a visit is in its same-day lifecycle.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub enum VisitStatus {
    #[default]
    Waiting,
    InProgress,
    Completed,
    Cancelled,
}

impl VisitStatus {
    pub const ALL: [VisitStatus; 4] = [
        Self::Waiting,
        Self::InProgress,
        Self::Completed,
        Self::Cancelled,
    ];

    pub fn parse(label: &str) -> Option<Self> {
        match label.trim() {
            "Waiting" => Some(Self::Waiting),
            "In Progress" => Some(Self::InProgress),
            "Completed" => Some(Self::Completed),
            "Cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "Waiting",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Completed and Cancelled visits are closed.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl TryFrom<String> for VisitStatus {
    type Error = String;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        if label.trim().is_empty() {
            return Ok(Self::default());
        }
        Self::parse(&label).ok_or_else(|| format!("unknown visit status: {}", label))
    }
}

impl From<VisitStatus> for String {
    fn from(status: VisitStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for VisitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_visit_type() -> String {
    DEFAULT_VISIT_TYPE.to_string()
}

/// One outpatient encounter, from check-in to completion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Visit {
    /// Sequential ID (`OPD001`), assigned by the store
    #[serde(default)]
    pub id: String,
    /// Patient ID (`PAT###`)
    pub patient_id: String,
    /// Patient name captured at check-in
    #[serde(default, deserialize_with = "lenient::empty_as_none")]
    pub patient_name: Option<String>,
    /// Attending doctor ID
    #[serde(default, deserialize_with = "lenient::empty_as_none")]
    pub doctor_id: Option<String>,
    /// Doctor name captured at check-in
    #[serde(default, deserialize_with = "lenient::empty_as_none")]
    pub doctor_name: Option<String>,
    /// Check-in date (`YYYY-MM-DD`)
    #[serde(default)]
    pub visit_date: String,
    /// Check-in time (`HH:MM:SS`)
    #[serde(default, deserialize_with = "lenient::empty_as_none")]
    pub visit_time: Option<String>,
    #[serde(default = "default_visit_type")]
    pub visit_type: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub status: VisitStatus,
    pub chief_complaint: String,
    #[serde(default, deserialize_with = "lenient::empty_as_none")]
    pub diagnosis: Option<String>,
    #[serde(default, deserialize_with = "lenient::empty_as_none")]
    pub treatment: Option<String>,
    #[serde(default, deserialize_with = "lenient::empty_as_none")]
    pub prescription: Option<String>,
    #[serde(default, deserialize_with = "lenient::empty_as_none")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_date")]
    pub followup_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub payment_amount: Option<f64>,
}

impl Visit {
    /// Create an unsaved visit; the store assigns the ID and check-in stamp.
    pub fn new(patient_id: String, chief_complaint: String) -> Self {
        Self {
            id: String::new(),
            patient_id,
            patient_name: None,
            doctor_id: None,
            doctor_name: None,
            visit_date: String::new(),
            visit_time: None,
            visit_type: default_visit_type(),
            priority: Priority::default(),
            status: VisitStatus::default(),
            chief_complaint,
            diagnosis: None,
            treatment: None,
            prescription: None,
            notes: None,
            followup_date: None,
            payment_amount: None,
        }
    }

    /// Quick check-in: patient, priority and complaint only.
    pub fn quick(patient_id: String, priority: Priority, chief_complaint: String) -> Self {
        let mut visit = Self::new(patient_id, chief_complaint);
        visit.priority = priority;
        visit
    }

    pub fn validate(&self) -> ValidationResult {
        validation::require("patient_id", &self.patient_id)?;
        validation::require("chief_complaint", &self.chief_complaint)?;
        validation::non_negative("payment_amount", self.payment_amount)?;
        Ok(())
    }

    /// Check-in timestamp, if the stored date and time parse.
    pub fn checked_in_at(&self) -> Option<NaiveDateTime> {
        let time = self.visit_time.as_deref()?;
        NaiveDateTime::parse_from_str(
            &format!("{} {}", self.visit_date, time.trim()),
            &format!("{} {}", DATE_FORMAT, TIME_FORMAT),
        )
        .ok()
    }

    pub fn is_on(&self, date: NaiveDate) -> bool {
        self.visit_date == date.format(DATE_FORMAT).to_string()
    }

    /// Shallow-merge an update. Status is not touched here; the store routes
    /// status changes through the visit workflow.
    pub fn merge(&mut self, update: &VisitUpdate) -> ValidationResult {
        if let Some(patient_id) = &update.patient_id {
            validation::require("patient_id", patient_id)?;
        }
        if let Some(complaint) = &update.chief_complaint {
            validation::require("chief_complaint", complaint)?;
        }
        if let Some(amount) = update.payment_amount {
            validation::non_negative("payment_amount", amount)?;
        }

        if let Some(patient_id) = &update.patient_id {
            self.patient_id = patient_id.clone();
        }
        if let Some(complaint) = &update.chief_complaint {
            self.chief_complaint = complaint.clone();
        }
        if let Some(amount) = update.payment_amount {
            self.payment_amount = amount;
        }

        merge_text(&mut self.patient_name, &update.patient_name);
        merge_text(&mut self.doctor_id, &update.doctor_id);
        merge_text(&mut self.doctor_name, &update.doctor_name);
        merge_text(&mut self.diagnosis, &update.diagnosis);
        merge_text(&mut self.treatment, &update.treatment);
        merge_text(&mut self.prescription, &update.prescription);
        merge_text(&mut self.notes, &update.notes);

        if let Some(visit_type) = &update.visit_type {
            if !visit_type.trim().is_empty() {
                self.visit_type = visit_type.clone();
            }
        }
        if let Some(priority) = update.priority {
            self.priority = priority;
        }
        if let Some(followup) = update.followup_date {
            self.followup_date = followup;
        }
        Ok(())
    }
}

/// `Some("")` clears an optional text field.
fn merge_text(field: &mut Option<String>, update: &Option<String>) {
    if let Some(value) = update {
        *field = if value.trim().is_empty() {
            None
        } else {
            Some(value.clone())
        };
    }
}

/// Partial update of a visit. `None` leaves a field untouched.
///
/// For `followup_date` and `payment_amount`, `Some(None)` clears the value.
/// `id`, `visit_date` and `visit_time` are immutable and have no field here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisitUpdate {
    pub patient_id: Option<String>,
    pub patient_name: Option<String>,
    pub doctor_id: Option<String>,
    pub doctor_name: Option<String>,
    pub visit_type: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<VisitStatus>,
    pub chief_complaint: Option<String>,
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub prescription: Option<String>,
    pub notes: Option<String>,
    pub followup_date: Option<Option<NaiveDate>>,
    pub payment_amount: Option<Option<f64>>,
}

impl VisitUpdate {
    pub fn status(status: VisitStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ValidationError;

    #[test]
    fn test_priority_rank_order() {
        assert!(Priority::Emergency.rank() < Priority::High.rank());
        assert!(Priority::High.rank() < Priority::Normal.rank());
        assert!(Priority::Normal.rank() < Priority::Low.rank());
    }

    #[test]
    fn test_unknown_priority_reads_as_normal() {
        let p: Priority = serde_json::from_str("\"Urgent-ish\"").unwrap();
        assert_eq!(p, Priority::Normal);
        assert_eq!(p.rank(), 3);
    }

    #[test]
    fn test_status_labels_round_trip() {
        for status in VisitStatus::ALL {
            let json = serde_json::to_string(&status).unwrap();
            let back: VisitStatus = serde_json::from_str(&json).unwrap();
            assert_eq!(back, status);
        }
        assert_eq!(
            serde_json::to_string(&VisitStatus::InProgress).unwrap(),
            "\"In Progress\""
        );
    }

    #[test]
    fn test_unknown_status_rejected() {
        let result: Result<VisitStatus, _> = serde_json::from_str("\"Snoozed\"");
        assert!(result.is_err());
        let empty: VisitStatus = serde_json::from_str("\"\"").unwrap();
        assert_eq!(empty, VisitStatus::Waiting);
    }

    #[test]
    fn test_legacy_visit_record() {
        let json = r#"{
            "patient_id": "PAT001",
            "visit_type": "OPD Consultation",
            "priority": "High",
            "status": "Waiting",
            "chief_complaint": "Fever",
            "id": "OPD007",
            "visit_date": "2024-05-02",
            "visit_time": "09:15:00",
            "doctor_id": "",
            "followup_date": "",
            "payment_amount": "250"
        }"#;
        let visit: Visit = serde_json::from_str(json).unwrap();
        assert_eq!(visit.id, "OPD007");
        assert_eq!(visit.priority, Priority::High);
        assert!(visit.doctor_id.is_none());
        assert!(visit.followup_date.is_none());
        assert_eq!(visit.payment_amount, Some(250.0));
        assert!(visit.diagnosis.is_none());
    }

    #[test]
    fn test_checked_in_at() {
        let mut visit = Visit::new("PAT001".into(), "Cough".into());
        visit.visit_date = "2024-05-02".into();
        visit.visit_time = Some("09:15:00".into());
        let at = visit.checked_in_at().unwrap();
        assert_eq!(at.format("%H:%M").to_string(), "09:15");

        visit.visit_time = Some("quarter past nine".into());
        assert!(visit.checked_in_at().is_none());

        visit.visit_time = None;
        assert!(visit.checked_in_at().is_none());
    }

    #[test]
    fn test_validate() {
        let visit = Visit::new("PAT001".into(), "  ".into());
        assert_eq!(
            visit.validate(),
            Err(ValidationError::MissingField("chief_complaint"))
        );

        let mut visit = Visit::new("PAT001".into(), "Headache".into());
        visit.payment_amount = Some(-5.0);
        assert_eq!(
            visit.validate(),
            Err(ValidationError::Negative("payment_amount"))
        );
    }

    #[test]
    fn test_merge_is_shallow() {
        let mut visit = Visit::new("PAT001".into(), "Headache".into());
        visit.notes = Some("bring reports".into());

        let update = VisitUpdate {
            diagnosis: Some("Migraine".into()),
            notes: Some(String::new()),
            payment_amount: Some(Some(300.0)),
            ..VisitUpdate::default()
        };
        visit.merge(&update).unwrap();

        assert_eq!(visit.diagnosis.as_deref(), Some("Migraine"));
        assert!(visit.notes.is_none());
        assert_eq!(visit.payment_amount, Some(300.0));
        assert_eq!(visit.chief_complaint, "Headache");
    }

    #[test]
    fn test_merge_rejects_blank_complaint() {
        let mut visit = Visit::new("PAT001".into(), "Headache".into());
        let update = VisitUpdate {
            chief_complaint: Some(" ".into()),
            ..VisitUpdate::default()
        };
        assert!(visit.merge(&update).is_err());
        assert_eq!(visit.chief_complaint, "Headache");
    }
}
