//! Patient models.

use serde::{Deserialize, Serialize};

use super::lenient;
use super::validation::{self, ValidationResult};

/// A registered clinic patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Sequential ID (`PAT001`), assigned by the store
    #[serde(default)]
    pub id: String,
    /// Full name
    pub name: String,
    /// Age in years
    #[serde(deserialize_with = "lenient::number")]
    pub age: u32,
    /// Gender label (Male, Female, Other)
    pub gender: String,
    /// Contact phone
    pub phone: String,
    #[serde(default, deserialize_with = "lenient::empty_as_none")]
    pub email: Option<String>,
    #[serde(default, deserialize_with = "lenient::empty_as_none")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient::empty_as_none")]
    pub emergency_contact: Option<String>,
    #[serde(default, deserialize_with = "lenient::empty_as_none")]
    pub blood_group: Option<String>,
    #[serde(default, deserialize_with = "lenient::empty_as_none")]
    pub medical_history: Option<String>,
    /// Registration date (`YYYY-MM-DD`), stamped by the store
    #[serde(default)]
    pub registration_date: String,
}

impl Patient {
    /// Create an unsaved patient with required fields.
    pub fn new(name: String, age: u32, gender: String, phone: String) -> Self {
        Self {
            id: String::new(),
            name,
            age,
            gender,
            phone,
            email: None,
            address: None,
            emergency_contact: None,
            blood_group: None,
            medical_history: None,
            registration_date: String::new(),
        }
    }

    pub fn validate(&self) -> ValidationResult {
        validation::require("name", &self.name)?;
        validation::require("gender", &self.gender)?;
        validation::in_range("age", f64::from(self.age), 0.0, 150.0)?;
        validation::phone("phone", &self.phone)?;
        validation::email("email", self.email.as_deref())?;
        Ok(())
    }

    /// Case-insensitive substring match over name, ID and phone.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        self.name.to_lowercase().contains(&query)
            || self.id.to_lowercase().contains(&query)
            || self.phone.to_lowercase().contains(&query)
    }
}
