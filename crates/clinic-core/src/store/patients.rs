//! Patient registry.

use chrono::Local;
use serde::Serialize;
use strsim::jaro_winkler;
use tracing::info;

use super::{Store, StoreError, StoreResult};
use crate::models::{Appointment, Patient, Visit, DATE_FORMAT};

/// Minimum Jaro-Winkler similarity for a fuzzy name match.
pub const FUZZY_NAME_THRESHOLD: f64 = 0.85;

/// A payment taken at a visit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentRecord {
    /// Visit date (`YYYY-MM-DD`)
    pub date: String,
    pub visit_id: String,
    /// Visit type, e.g. "OPD Consultation"
    pub service: String,
    pub amount: f64,
}

/// Activity and billing overview for one patient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientSummary {
    pub patient: Patient,
    pub appointment_count: usize,
    pub visit_count: usize,
    /// Latest visit or appointment date, `None` if there has been neither
    pub last_visit: Option<String>,
    /// Newest first
    pub payments: Vec<PaymentRecord>,
    pub total_paid: f64,
    pub last_payment: Option<String>,
}

impl PatientSummary {
    fn build(patient: Patient, visits: &[Visit], appointments: &[Appointment]) -> Self {
        let last_visit = visits
            .iter()
            .map(|v| v.visit_date.as_str())
            .chain(appointments.iter().map(|a| a.appointment_date.as_str()))
            .filter(|date| !date.trim().is_empty())
            .max()
            .map(str::to_string);

        let mut payments: Vec<PaymentRecord> = visits
            .iter()
            .filter_map(|v| {
                v.payment_amount.map(|amount| PaymentRecord {
                    date: v.visit_date.clone(),
                    visit_id: v.id.clone(),
                    service: v.visit_type.clone(),
                    amount,
                })
            })
            .collect();
        payments.sort_by(|a, b| b.date.cmp(&a.date));

        Self {
            patient,
            appointment_count: appointments.len(),
            visit_count: visits.len(),
            last_visit,
            total_paid: payments.iter().map(|p| p.amount).sum(),
            last_payment: payments.first().map(|p| p.date.clone()),
            payments,
        }
    }
}

impl Store {
    /// Register a patient, stamping today's registration date.
    pub fn add_patient(&self, mut patient: Patient) -> StoreResult<Patient> {
        patient.validate()?;
        patient.registration_date = Local::now().format(DATE_FORMAT).to_string();
        let patient = self.insert_record(patient)?;
        info!("registered patient {}", patient.id);
        Ok(patient)
    }

    /// Replace the stored patient with the same ID. ID and registration date
    /// are kept from the stored record.
    pub fn update_patient(&self, patient: &Patient) -> StoreResult<bool> {
        patient.validate()?;
        self.modify_record(&patient.id, |stored: &mut Patient| {
            let registration_date = std::mem::take(&mut stored.registration_date);
            *stored = Patient {
                registration_date,
                ..patient.clone()
            };
            Ok(())
        })
    }

    pub fn delete_patient(&self, id: &str) -> StoreResult<bool> {
        let deleted = self.remove_record::<Patient>(id)?;
        if deleted {
            info!("deleted patient {}", id);
        }
        Ok(deleted)
    }

    pub fn get_patient(&self, id: &str) -> StoreResult<Option<Patient>> {
        self.find_record(id)
    }

    pub fn list_patients(&self) -> StoreResult<Vec<Patient>> {
        self.load_all()
    }

    /// Search by name, ID or phone.
    ///
    /// Substring matches win. When there are none, names are compared with
    /// Jaro-Winkler (whole name and each word) and close matches are returned
    /// best first.
    pub fn search_patients(&self, query: &str) -> StoreResult<Vec<Patient>> {
        let query = query.trim();
        let patients = self.list_patients()?;
        if query.is_empty() {
            return Ok(patients);
        }

        let exact: Vec<Patient> = patients.iter().filter(|p| p.matches(query)).cloned().collect();
        if !exact.is_empty() {
            return Ok(exact);
        }

        let needle = query.to_lowercase();
        let mut scored: Vec<(f64, Patient)> = patients
            .into_iter()
            .filter_map(|p| {
                let score = name_similarity(&p.name, &needle);
                (score >= FUZZY_NAME_THRESHOLD).then_some((score, p))
            })
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        Ok(scored.into_iter().map(|(_, p)| p).collect())
    }

    /// Visit and appointment counts plus payment history for patient `id`.
    pub fn patient_summary(&self, id: &str) -> StoreResult<PatientSummary> {
        let patient = self
            .get_patient(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        let visits = self.visits_by_patient(id)?;
        let appointments = self.appointments_by_patient(id)?;
        Ok(PatientSummary::build(patient, &visits, &appointments))
    }
}

/// Best similarity of `needle` against the whole name or any of its words.
fn name_similarity(name: &str, needle: &str) -> f64 {
    let name = name.to_lowercase();
    name.split_whitespace()
        .map(|token| jaro_winkler(token, needle))
        .fold(jaro_winkler(&name, needle), f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::VisitUpdate;
    use crate::store::tests::setup_store;

    fn register(store: &Store, name: &str, phone: &str) -> Patient {
        store
            .add_patient(Patient::new(name.into(), 40, "Female".into(), phone.into()))
            .unwrap()
    }

    #[test]
    fn test_add_patient() {
        let (_dir, store) = setup_store();
        let patient = register(&store, "Asha Verma", "555-0101");
        assert_eq!(patient.id, "PAT001");
        assert_eq!(
            patient.registration_date,
            Local::now().format(DATE_FORMAT).to_string()
        );
    }

    #[test]
    fn test_add_rejects_bad_phone() {
        let (_dir, store) = setup_store();
        let result = store.add_patient(Patient::new(
            "Asha".into(),
            40,
            "Female".into(),
            "call me".into(),
        ));
        assert!(matches!(result, Err(StoreError::Validation(_))));
    }

    #[test]
    fn test_update_keeps_registration_date() {
        let (_dir, store) = setup_store();
        let mut patient = register(&store, "Asha Verma", "555-0101");
        let registered = patient.registration_date.clone();

        patient.phone = "555-0199".into();
        patient.registration_date = "1999-01-01".into();
        assert!(store.update_patient(&patient).unwrap());

        let stored = store.get_patient("PAT001").unwrap().unwrap();
        assert_eq!(stored.phone, "555-0199");
        assert_eq!(stored.registration_date, registered);

        patient.id = "PAT404".into();
        assert!(!store.update_patient(&patient).unwrap());
    }

    #[test]
    fn test_delete_patient() {
        let (_dir, store) = setup_store();
        register(&store, "Asha Verma", "555-0101");
        assert!(store.delete_patient("PAT001").unwrap());
        assert!(!store.delete_patient("PAT001").unwrap());
        assert!(store.list_patients().unwrap().is_empty());
    }

    #[test]
    fn test_search_substring() {
        let (_dir, store) = setup_store();
        register(&store, "Asha Verma", "555-0101");
        register(&store, "Ravi Kumar", "555-0202");

        let found = store.search_patients("kumar").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Ravi Kumar");
        assert_eq!(store.search_patients("0101").unwrap()[0].id, "PAT001");
        assert_eq!(store.search_patients("").unwrap().len(), 2);
    }

    #[test]
    fn test_search_fuzzy_fallback() {
        let (_dir, store) = setup_store();
        register(&store, "Asha Verma", "555-0101");
        register(&store, "Ravi Kumar", "555-0202");

        let found = store.search_patients("Kumaar").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Ravi Kumar");
        assert!(store.search_patients("Zzyzx").unwrap().is_empty());
    }

    #[test]
    fn test_patient_summary() {
        let (_dir, store) = setup_store();
        register(&store, "Asha Verma", "555-0101");
        for complaint in ["Fever", "Follow-up", "Cough"] {
            store
                .add_visit(Visit::new("PAT001".into(), complaint.into()))
                .unwrap();
        }
        store
            .add_visit(Visit::new("PAT002".into(), "Rash".into()))
            .unwrap();
        store
            .add_appointment(Appointment::new(
                "PAT001".into(),
                "DOC001".into(),
                "2099-01-15".into(),
                "10:00".into(),
            ))
            .unwrap();

        let paid = |amount| VisitUpdate {
            payment_amount: Some(Some(amount)),
            ..VisitUpdate::default()
        };
        store.update_visit("OPD001", &paid(300.0)).unwrap();
        store.update_visit("OPD003", &paid(150.0)).unwrap();

        let summary = store.patient_summary("PAT001").unwrap();
        assert_eq!(summary.patient.name, "Asha Verma");
        assert_eq!(summary.visit_count, 3);
        assert_eq!(summary.appointment_count, 1);
        // A booked appointment counts towards the last visit date.
        assert_eq!(summary.last_visit.as_deref(), Some("2099-01-15"));

        let ids: Vec<&str> = summary.payments.iter().map(|p| p.visit_id.as_str()).collect();
        assert_eq!(ids, vec!["OPD001", "OPD003"]);
        assert_eq!(summary.payments[0].service, "OPD Consultation");
        assert_eq!(summary.total_paid, 450.0);
        assert_eq!(
            summary.last_payment,
            Some(Local::now().format(DATE_FORMAT).to_string())
        );
    }

    #[test]
    fn test_patient_summary_without_activity() {
        let (_dir, store) = setup_store();
        register(&store, "Ravi Kumar", "555-0202");

        let summary = store.patient_summary("PAT001").unwrap();
        assert_eq!(summary.visit_count, 0);
        assert!(summary.last_visit.is_none());
        assert!(summary.payments.is_empty());
        assert_eq!(summary.total_paid, 0.0);
        assert!(summary.last_payment.is_none());

        assert!(matches!(
            store.patient_summary("PAT404"),
            Err(StoreError::NotFound(id)) if id == "PAT404"
        ));
    }
}
