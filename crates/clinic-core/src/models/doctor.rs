//! Doctor and weekly schedule models.

use std::collections::BTreeMap;

use chrono::Weekday;
use serde::{Deserialize, Serialize};

use super::lenient;
use super::validation::{self, ValidationError, ValidationResult};

/// One day of a doctor's weekly schedule.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DaySchedule {
    #[serde(default)]
    pub available: bool,
    #[serde(default = "DaySchedule::default_start")]
    pub start_time: String,
    #[serde(default = "DaySchedule::default_end")]
    pub end_time: String,
    #[serde(default = "DaySchedule::default_break_start")]
    pub break_start: String,
    #[serde(default = "DaySchedule::default_break_end")]
    pub break_end: String,
}

impl DaySchedule {
    fn default_start() -> String {
        "09:00".into()
    }
    fn default_end() -> String {
        "17:00".into()
    }
    fn default_break_start() -> String {
        "12:00".into()
    }
    fn default_break_end() -> String {
        "13:00".into()
    }
}

impl Default for DaySchedule {
    fn default() -> Self {
        Self {
            available: false,
            start_time: Self::default_start(),
            end_time: Self::default_end(),
            break_start: Self::default_break_start(),
            break_end: Self::default_break_end(),
        }
    }
}

/// Weekly schedule keyed by weekday name ("Monday" .. "Sunday").
pub type WeeklySchedule = BTreeMap<String, DaySchedule>;

/// A doctor on the clinic roster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Doctor {
    /// Sequential ID (`DOC001`), assigned by the store
    #[serde(default)]
    pub id: String,
    pub name: String,
    pub specialization: String,
    pub phone: String,
    #[serde(default, deserialize_with = "lenient::empty_as_none")]
    pub qualification: Option<String>,
    /// Years of experience
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub experience: Option<f64>,
    #[serde(default, deserialize_with = "lenient::empty_as_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient::empty_as_none")]
    pub license_number: Option<String>,
    #[serde(default, deserialize_with = "lenient::empty_as_none")]
    pub department: Option<String>,
    #[serde(default, deserialize_with = "lenient::optional_number")]
    pub consultation_fee: Option<f64>,
    #[serde(default, deserialize_with = "lenient::empty_as_none")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient::empty_as_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<WeeklySchedule>,
}

impl Doctor {
    /// Create an unsaved doctor with required fields.
    pub fn new(name: String, specialization: String, phone: String) -> Self {
        Self {
            id: String::new(),
            name,
            specialization,
            phone,
            qualification: None,
            experience: None,
            email: None,
            license_number: None,
            department: None,
            consultation_fee: None,
            address: None,
            notes: None,
            schedule: None,
        }
    }

    pub fn validate(&self) -> ValidationResult {
        validation::require("name", &self.name)?;
        validation::require("specialization", &self.specialization)?;
        validation::phone("phone", &self.phone)?;
        validation::email("email", self.email.as_deref())?;
        if let Some(years) = self.experience {
            validation::in_range("experience", years, 0.0, 60.0)?;
        }
        validation::non_negative("consultation_fee", self.consultation_fee)?;
        if let Some(schedule) = &self.schedule {
            validate_schedule(schedule)?;
        }
        Ok(())
    }

    /// Whether the doctor is scheduled to work on `day`.
    pub fn is_available_on(&self, day: Weekday) -> bool {
        self.schedule
            .as_ref()
            .and_then(|schedule| {
                schedule
                    .iter()
                    .find(|(name, _)| name.parse::<Weekday>().ok() == Some(day))
            })
            .map(|(_, d)| d.available)
            .unwrap_or(false)
    }
}

/// Schedule keys must name weekdays.
pub fn validate_schedule(schedule: &WeeklySchedule) -> ValidationResult {
    for day in schedule.keys() {
        if day.parse::<Weekday>().is_err() {
            return Err(ValidationError::InvalidFormat {
                field: "schedule",
                value: day.clone(),
            });
        }
    }
    Ok(())
}
