//! Appointment models.

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use super::lenient;
use super::validation::{self, ValidationError, ValidationResult};
use super::DATE_FORMAT;

/// Default label for booked appointments.
pub const DEFAULT_APPOINTMENT_TYPE: &str = "Consultation";

/// Booking slots run every 30 minutes from 09:00 to 17:30.
const FIRST_SLOT_HOUR: u32 = 9;
const LAST_SLOT_HOUR: u32 = 17;

/// Appointment lifecycle status.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim() {
            "Scheduled" => Some(Self::Scheduled),
            "Confirmed" => Some(Self::Confirmed),
            "In Progress" => Some(Self::InProgress),
            "Completed" => Some(Self::Completed),
            "Cancelled" => Some(Self::Cancelled),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "Scheduled",
            Self::Confirmed => "Confirmed",
            Self::InProgress => "In Progress",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl TryFrom<String> for AppointmentStatus {
    type Error = String;

    fn try_from(label: String) -> Result<Self, Self::Error> {
        if label.trim().is_empty() {
            return Ok(Self::default());
        }
        Self::parse(&label).ok_or_else(|| format!("unknown appointment status: {}", label))
    }
}

impl From<AppointmentStatus> for String {
    fn from(status: AppointmentStatus) -> Self {
        status.as_str().to_string()
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_appointment_type() -> String {
    DEFAULT_APPOINTMENT_TYPE.to_string()
}

/// A future-scheduled consultation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Appointment {
    /// Sequential ID (`APT001`), assigned by the store
    #[serde(default)]
    pub id: String,
    pub patient_id: String,
    #[serde(default, deserialize_with = "lenient::empty_as_none")]
    pub patient_name: Option<String>,
    pub doctor_id: String,
    #[serde(default, deserialize_with = "lenient::empty_as_none")]
    pub doctor_name: Option<String>,
    /// Appointment date (`YYYY-MM-DD`)
    pub appointment_date: String,
    /// Slot start (`HH:MM`)
    pub appointment_time: String,
    #[serde(default = "default_appointment_type")]
    pub appointment_type: String,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default, deserialize_with = "lenient::empty_as_none")]
    pub notes: Option<String>,
    /// Booking timestamp (`YYYY-MM-DD HH:MM:SS`), stamped by the store
    #[serde(default)]
    pub created_date: String,
}

impl Appointment {
    /// Create an unsaved appointment.
    pub fn new(
        patient_id: String,
        doctor_id: String,
        appointment_date: String,
        appointment_time: String,
    ) -> Self {
        Self {
            id: String::new(),
            patient_id,
            patient_name: None,
            doctor_id,
            doctor_name: None,
            appointment_date,
            appointment_time,
            appointment_type: default_appointment_type(),
            status: AppointmentStatus::default(),
            notes: None,
            created_date: String::new(),
        }
    }

    pub fn validate(&self) -> ValidationResult {
        validation::require("patient_id", &self.patient_id)?;
        validation::require("doctor_id", &self.doctor_id)?;
        validation::require("appointment_date", &self.appointment_date)?;
        validation::require("appointment_time", &self.appointment_time)?;
        if NaiveDate::parse_from_str(self.appointment_date.trim(), DATE_FORMAT).is_err() {
            return Err(ValidationError::InvalidFormat {
                field: "appointment_date",
                value: self.appointment_date.clone(),
            });
        }
        Ok(())
    }

    pub fn is_on(&self, date: &str) -> bool {
        self.appointment_date == date
    }
}

/// Bookable half-hour slots for a clinic day.
pub fn time_slots() -> Vec<String> {
    (FIRST_SLOT_HOUR..=LAST_SLOT_HOUR)
        .flat_map(|hour| [0, 30].map(|minute| NaiveTime::from_hms_opt(hour, minute, 0)))
        .flatten()
        .map(|t| t.format("%H:%M").to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_slots() {
        let slots = time_slots();
        assert_eq!(slots.len(), 18);
        assert_eq!(slots.first().map(String::as_str), Some("09:00"));
        assert_eq!(slots.last().map(String::as_str), Some("17:30"));
        assert!(slots.contains(&"12:30".to_string()));
    }

    #[test]
    fn test_validate_date_format() {
        let mut appt = Appointment::new(
            "PAT001".into(),
            "DOC001".into(),
            "2024-06-01".into(),
            "10:30".into(),
        );
        assert!(appt.validate().is_ok());

        appt.appointment_date = "01/06/2024".into();
        assert!(matches!(
            appt.validate(),
            Err(ValidationError::InvalidFormat {
                field: "appointment_date",
                ..
            })
        ));
    }

    #[test]
    fn test_status_labels() {
        let s: AppointmentStatus = serde_json::from_str("\"In Progress\"").unwrap();
        assert_eq!(s, AppointmentStatus::InProgress);
        let empty: AppointmentStatus = serde_json::from_str("\"\"").unwrap();
        assert_eq!(empty, AppointmentStatus::Scheduled);
    }
}
