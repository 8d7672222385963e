//! Persisted record kinds and their ID scheme.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::{Appointment, Doctor, Patient, Visit};

/// A record kind stored as one JSON array file.
pub trait Record: Serialize + DeserializeOwned + Clone {
    /// File name inside the data directory.
    const FILE_NAME: &'static str;
    /// ID prefix; IDs are the prefix plus a zero-padded number.
    const ID_PREFIX: &'static str;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
}

macro_rules! impl_record {
    ($ty:ty, $file:literal, $prefix:literal) => {
        impl Record for $ty {
            const FILE_NAME: &'static str = $file;
            const ID_PREFIX: &'static str = $prefix;

            fn id(&self) -> &str {
                &self.id
            }

            fn set_id(&mut self, id: String) {
                self.id = id;
            }
        }
    };
}

impl_record!(Visit, "opd_visits.json", "OPD");
impl_record!(Patient, "patients.json", "PAT");
impl_record!(Doctor, "doctors.json", "DOC");
impl_record!(Appointment, "appointments.json", "APT");

/// Numeric part of `id` after `prefix`. IDs that don't fit the scheme yield `None`.
pub(crate) fn numeric_suffix(id: &str, prefix: &str) -> Option<u64> {
    id.strip_prefix(prefix)?.parse().ok()
}

/// `OPD` + 7 → `OPD007`. Numbers past 999 keep all their digits.
pub(crate) fn format_id(prefix: &str, number: u64) -> String {
    format!("{}{:03}", prefix, number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_suffix() {
        assert_eq!(numeric_suffix("OPD007", "OPD"), Some(7));
        assert_eq!(numeric_suffix("OPD1234", "OPD"), Some(1234));
        assert_eq!(numeric_suffix("PAT007", "OPD"), None);
        assert_eq!(numeric_suffix("OPD-x", "OPD"), None);
        assert_eq!(numeric_suffix("OPD", "OPD"), None);
    }

    #[test]
    fn test_format_id() {
        assert_eq!(format_id("PAT", 1), "PAT001");
        assert_eq!(format_id("APT", 42), "APT042");
        assert_eq!(format_id("OPD", 1000), "OPD1000");
    }
}
