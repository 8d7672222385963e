//! Front-desk facade tests.

use std::sync::Arc;

use clinic_core::models::DEFAULT_VISIT_TYPE;
use clinic_core::{
    open_clinic, ClinicCore, ClinicError, FfiCheckIn, FfiConsultation, FfiNewPatient,
};
use tempfile::TempDir;

fn open() -> (TempDir, Arc<ClinicCore>) {
    let dir = tempfile::tempdir().unwrap();
    let core = open_clinic(dir.path().to_string_lossy().into_owned(), false).unwrap();
    (dir, core)
}

fn register(core: &ClinicCore, name: &str) -> String {
    core.register_patient(FfiNewPatient {
        name: name.into(),
        age: 34,
        gender: "Female".into(),
        phone: "555-0101".into(),
        email: None,
        address: None,
        emergency_contact: None,
        blood_group: None,
        medical_history: None,
    })
    .unwrap()
    .id
}

fn check_in_request(patient_id: &str, visit_type: Option<&str>) -> FfiCheckIn {
    FfiCheckIn {
        patient_id: patient_id.into(),
        doctor_id: None,
        visit_type: visit_type.map(String::from),
        priority: "High".into(),
        chief_complaint: "Fever".into(),
        notes: None,
    }
}

#[test]
fn test_check_in_blank_visit_type_keeps_default() {
    let (_dir, core) = open();
    let patient_id = register(&core, "Asha Verma");

    for blank in [None, Some(""), Some("   ")] {
        let visit = core.check_in(check_in_request(&patient_id, blank)).unwrap();
        assert_eq!(visit.visit_type, DEFAULT_VISIT_TYPE);
        assert_eq!(visit.patient_name.as_deref(), Some("Asha Verma"));
    }

    let visit = core
        .check_in(check_in_request(&patient_id, Some("Follow-up")))
        .unwrap();
    assert_eq!(visit.visit_type, "Follow-up");
}

#[test]
fn test_check_in_unknown_patient() {
    let (_dir, core) = open();
    assert!(matches!(
        core.check_in(check_in_request("PAT404", None)),
        Err(ClinicError::NotFound(id)) if id == "PAT404"
    ));
}

#[test]
fn test_patient_summary() {
    let (_dir, core) = open();
    let patient_id = register(&core, "Asha Verma");
    let visit = core.check_in(check_in_request(&patient_id, None)).unwrap();
    core.record_consultation(
        visit.id.clone(),
        FfiConsultation {
            diagnosis: Some("Viral fever".into()),
            treatment: None,
            prescription: None,
            notes: None,
            followup_date: None,
            payment_amount: Some(250.0),
        },
    )
    .unwrap();

    let summary = core.patient_summary(patient_id).unwrap();
    assert_eq!(summary.visit_count, 1);
    assert_eq!(summary.payments.len(), 1);
    assert_eq!(summary.payments[0].visit_id, visit.id);
    assert_eq!(summary.total_paid, 250.0);
    assert_eq!(summary.last_payment, Some(visit.visit_date));

    assert!(matches!(
        core.patient_summary("PAT404".into()),
        Err(ClinicError::NotFound(_))
    ));
}

#[test]
fn test_search_appointments_rejects_unknown_status() {
    let (_dir, core) = open();
    assert!(core.search_appointments(String::new(), None).unwrap().is_empty());
    assert!(matches!(
        core.search_appointments(String::new(), Some("Lost".into())),
        Err(ClinicError::InvalidInput(_))
    ));
}

#[test]
fn test_recent_activity() {
    let (_dir, core) = open();
    let patient_id = register(&core, "Asha Verma");
    core.check_in(check_in_request(&patient_id, None)).unwrap();

    let recent = core.recent_activity().unwrap();
    assert_eq!(recent.patients.len(), 1);
    assert_eq!(recent.visits.len(), 1);
    assert!(recent.appointments.is_empty());
}
