//! Clinic Core Library
//!
//! Local-first records for a small outpatient clinic: patient registry,
//! doctor roster, appointment book and the same-day OPD queue.
//!
//! # Architecture
//!
//! ```text
//!   Front desk check-in
//!           │
//!           ▼
//!   ┌──────────────────┐   Start / Complete / Cancel   ┌──────────────┐
//!   │  Visit (Waiting) │ ────────────────────────────▶ │ VisitWorkflow │
//!   └────────┬─────────┘                               └──────────────┘
//!            │
//!            ▼
//!   ┌──────────────────────────────┐
//!   │ Store (JSON files, atomic    │──▶ QueueEngine ──▶ today's queue
//!   │ rename, ID high-water marks) │──▶ ReportExporter ──▶ JSON / CSV
//!   └──────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`config`]: Runtime configuration resolved at startup
//! - [`models`]: Domain types (Visit, Patient, Doctor, Appointment)
//! - [`store`]: JSON file store with per-entity repositories
//! - [`workflow`]: Visit status transitions (strict or legacy)
//! - [`queue`]: Priority queue projection for today's waiting patients
//! - [`export`]: OPD register, appointment list and dashboard counts

pub mod config;
pub mod export;
pub mod models;
pub mod queue;
pub mod store;
pub mod workflow;

// Re-export commonly used types
pub use config::ClinicConfig;
pub use export::{DashboardStats, OpdReport, RecentActivity, ReportExporter};
pub use models::{
    Appointment, AppointmentStatus, Doctor, Patient, Priority, Visit, VisitStatus, VisitUpdate,
};
pub use queue::{QueueEngine, QueueEntry, QueueStats, WaitTime};
pub use store::{PatientSummary, PaymentRecord, Store, StoreError};
pub use workflow::{TransitionPolicy, VisitEvent, VisitWorkflow};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum ClinicError {
    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<store::StoreError> for ClinicError {
    fn from(e: store::StoreError) -> Self {
        match e {
            StoreError::Validation(v) => ClinicError::InvalidInput(v.to_string()),
            StoreError::Transition(t) => ClinicError::InvalidTransition(t.to_string()),
            StoreError::NotFound(id) => ClinicError::NotFound(id),
            StoreError::Json(j) => ClinicError::SerializationError(j.to_string()),
            StoreError::Io(io) => ClinicError::StorageError(io.to_string()),
        }
    }
}

impl From<config::ConfigError> for ClinicError {
    fn from(e: config::ConfigError) -> Self {
        ClinicError::InvalidInput(e.to_string())
    }
}

impl From<serde_json::Error> for ClinicError {
    fn from(e: serde_json::Error) -> Self {
        ClinicError::SerializationError(e.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for ClinicError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        ClinicError::StorageError(format!("Lock poisoned: {}", e))
    }
}

fn parse_date(date: &str) -> Result<NaiveDate, ClinicError> {
    NaiveDate::parse_from_str(date.trim(), models::DATE_FORMAT)
        .map_err(|_| ClinicError::InvalidInput(format!("expected YYYY-MM-DD, got {:?}", date)))
}

fn parse_priority(label: &str) -> Result<Priority, ClinicError> {
    Priority::parse(label)
        .ok_or_else(|| ClinicError::InvalidInput(format!("unknown priority: {}", label)))
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a clinic data directory.
#[uniffi::export]
pub fn open_clinic(
    data_dir: String,
    legacy_transitions: bool,
) -> Result<Arc<ClinicCore>, ClinicError> {
    let policy = if legacy_transitions {
        TransitionPolicy::Legacy
    } else {
        TransitionPolicy::Strict
    };
    let config = ClinicConfig::new(data_dir)?.with_transition_policy(policy);
    let store = Store::open(config)?;
    Ok(Arc::new(ClinicCore {
        store: Arc::new(Mutex::new(store)),
    }))
}

/// Bookable half-hour slots.
#[uniffi::export]
pub fn appointment_time_slots() -> Vec<String> {
    models::time_slots()
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe store wrapper for FFI.
#[derive(uniffi::Object)]
pub struct ClinicCore {
    store: Arc<Mutex<Store>>,
}

#[uniffi::export]
impl ClinicCore {
    // =========================================================================
    // Patient Operations
    // =========================================================================

    /// Register a new patient.
    pub fn register_patient(&self, patient: FfiNewPatient) -> Result<FfiPatient, ClinicError> {
        let store = self.store.lock()?;
        let patient = store.add_patient(patient.into())?;
        Ok(patient.into())
    }

    /// Get a patient by ID.
    pub fn get_patient(&self, id: String) -> Result<Option<FfiPatient>, ClinicError> {
        let store = self.store.lock()?;
        let patient = store.get_patient(&id)?;
        Ok(patient.map(|p| p.into()))
    }

    /// Search patients by name, ID or phone.
    pub fn search_patients(&self, query: String) -> Result<Vec<FfiPatient>, ClinicError> {
        let store = self.store.lock()?;
        let patients = store.search_patients(&query)?;
        Ok(patients.into_iter().map(|p| p.into()).collect())
    }

    /// Visit counts and payment history for a patient.
    pub fn patient_summary(&self, id: String) -> Result<FfiPatientSummary, ClinicError> {
        let store = self.store.lock()?;
        Ok(store.patient_summary(&id)?.into())
    }

    // =========================================================================
    // Visit Operations
    // =========================================================================

    /// Check a registered patient in.
    pub fn check_in(&self, request: FfiCheckIn) -> Result<FfiVisit, ClinicError> {
        let store = self.store.lock()?;
        let patient = store
            .get_patient(&request.patient_id)?
            .ok_or_else(|| ClinicError::NotFound(request.patient_id.clone()))?;

        let mut visit = Visit::quick(
            request.patient_id,
            parse_priority(&request.priority)?,
            request.chief_complaint,
        );
        visit.patient_name = Some(patient.name);
        if let Some(doctor_id) = request.doctor_id {
            let doctor = store
                .get_doctor(&doctor_id)?
                .ok_or_else(|| ClinicError::NotFound(doctor_id.clone()))?;
            visit.doctor_id = Some(doctor.id);
            visit.doctor_name = Some(doctor.name);
        }
        if let Some(visit_type) = request.visit_type.filter(|t| !t.trim().is_empty()) {
            visit.visit_type = visit_type;
        }
        visit.notes = request.notes;

        Ok(store.add_visit(visit)?.into())
    }

    /// Quick check-in with patient, priority and complaint only.
    pub fn quick_check_in(
        &self,
        patient_id: String,
        priority: String,
        chief_complaint: String,
    ) -> Result<FfiVisit, ClinicError> {
        let store = self.store.lock()?;
        let visit = Visit::quick(patient_id, parse_priority(&priority)?, chief_complaint);
        Ok(store.add_visit(visit)?.into())
    }

    /// Record the consultation outcome on a visit.
    pub fn record_consultation(
        &self,
        visit_id: String,
        notes: FfiConsultation,
    ) -> Result<(), ClinicError> {
        let store = self.store.lock()?;
        let followup_date = notes
            .followup_date
            .as_deref()
            .map(parse_date)
            .transpose()?;
        let update = VisitUpdate {
            diagnosis: notes.diagnosis,
            treatment: notes.treatment,
            prescription: notes.prescription,
            notes: notes.notes,
            followup_date: followup_date.map(Some),
            payment_amount: notes.payment_amount.map(Some),
            ..VisitUpdate::default()
        };
        if !store.update_visit(&visit_id, &update)? {
            return Err(ClinicError::NotFound(visit_id));
        }
        Ok(())
    }

    pub fn start_visit(&self, visit_id: String) -> Result<bool, ClinicError> {
        let store = self.store.lock()?;
        Ok(store.start_visit(&visit_id)?)
    }

    pub fn complete_visit(&self, visit_id: String) -> Result<bool, ClinicError> {
        let store = self.store.lock()?;
        Ok(store.complete_visit(&visit_id)?)
    }

    pub fn cancel_visit(&self, visit_id: String) -> Result<bool, ClinicError> {
        let store = self.store.lock()?;
        Ok(store.cancel_visit(&visit_id)?)
    }

    pub fn delete_visit(&self, visit_id: String) -> Result<bool, ClinicError> {
        let store = self.store.lock()?;
        Ok(store.delete_visit(&visit_id)?)
    }

    /// Visits checked in on a date (`YYYY-MM-DD`).
    pub fn visits_for_date(&self, date: String) -> Result<Vec<FfiVisit>, ClinicError> {
        let date = parse_date(&date)?;
        let store = self.store.lock()?;
        let visits = store.visits_by_date(date)?;
        Ok(visits.into_iter().map(|v| v.into()).collect())
    }

    // =========================================================================
    // Queue Operations
    // =========================================================================

    /// Today's queue, highest priority first.
    pub fn todays_queue(&self) -> Result<Vec<FfiQueueEntry>, ClinicError> {
        let store = self.store.lock()?;
        let queue = store.todays_queue()?;
        Ok(queue.into_iter().map(|e| e.into()).collect())
    }

    pub fn queue_stats(&self) -> Result<FfiQueueStats, ClinicError> {
        let store = self.store.lock()?;
        Ok(store.queue_stats()?.into())
    }

    // =========================================================================
    // Doctor and Appointment Operations
    // =========================================================================

    pub fn list_doctors(&self) -> Result<Vec<FfiDoctor>, ClinicError> {
        let store = self.store.lock()?;
        let doctors = store.list_doctors()?;
        Ok(doctors.into_iter().map(|d| d.into()).collect())
    }

    /// Search doctors by name, specialization or ID within an optional department.
    pub fn search_doctors(
        &self,
        query: String,
        department: Option<String>,
    ) -> Result<Vec<FfiDoctor>, ClinicError> {
        let store = self.store.lock()?;
        let doctors = store.search_doctors(&query, department.as_deref())?;
        Ok(doctors.into_iter().map(|d| d.into()).collect())
    }

    /// Book an appointment slot.
    pub fn book_appointment(
        &self,
        patient_id: String,
        doctor_id: String,
        date: String,
        time: String,
    ) -> Result<FfiAppointment, ClinicError> {
        let store = self.store.lock()?;
        let patient = store
            .get_patient(&patient_id)?
            .ok_or_else(|| ClinicError::NotFound(patient_id.clone()))?;
        let doctor = store
            .get_doctor(&doctor_id)?
            .ok_or_else(|| ClinicError::NotFound(doctor_id.clone()))?;

        let mut appointment = Appointment::new(patient_id, doctor_id, date, time);
        appointment.patient_name = Some(patient.name);
        appointment.doctor_name = Some(doctor.name);
        Ok(store.add_appointment(appointment)?.into())
    }

    pub fn appointments_for_date(&self, date: String) -> Result<Vec<FfiAppointment>, ClinicError> {
        let date = parse_date(&date)?;
        let store = self.store.lock()?;
        let appointments = store.appointments_by_date(&date.format(models::DATE_FORMAT).to_string())?;
        Ok(appointments.into_iter().map(|a| a.into()).collect())
    }

    /// Search appointments by patient name, doctor name or ID, optionally by status.
    pub fn search_appointments(
        &self,
        query: String,
        status: Option<String>,
    ) -> Result<Vec<FfiAppointment>, ClinicError> {
        let status = status
            .as_deref()
            .map(|label| {
                AppointmentStatus::parse(label).ok_or_else(|| {
                    ClinicError::InvalidInput(format!("unknown appointment status: {}", label))
                })
            })
            .transpose()?;
        let store = self.store.lock()?;
        let appointments = store.search_appointments(&query, status)?;
        Ok(appointments.into_iter().map(|a| a.into()).collect())
    }

    pub fn cancel_appointment(&self, appointment_id: String) -> Result<bool, ClinicError> {
        let store = self.store.lock()?;
        Ok(store.cancel_appointment(&appointment_id)?)
    }

    // =========================================================================
    // Export Operations
    // =========================================================================

    /// OPD register as JSON. `date` of `None` exports every visit.
    pub fn export_opd_report_json(&self, date: Option<String>) -> Result<String, ClinicError> {
        let date = date.as_deref().map(parse_date).transpose()?;
        let store = self.store.lock()?;
        let report = ReportExporter::new(&store).opd_report(date)?;
        Ok(report.to_json()?)
    }

    /// OPD register as CSV.
    pub fn export_opd_report_csv(&self, date: Option<String>) -> Result<String, ClinicError> {
        let date = date.as_deref().map(parse_date).transpose()?;
        let store = self.store.lock()?;
        let report = ReportExporter::new(&store).opd_report(date)?;
        Ok(report.to_csv())
    }

    /// Appointment list as CSV.
    pub fn export_appointments_csv(&self, date: Option<String>) -> Result<String, ClinicError> {
        let date = date.as_deref().map(parse_date).transpose()?;
        let store = self.store.lock()?;
        let report = ReportExporter::new(&store).appointment_report(date)?;
        Ok(report.to_csv())
    }

    pub fn dashboard_stats(&self) -> Result<FfiDashboardStats, ClinicError> {
        let store = self.store.lock()?;
        Ok(ReportExporter::new(&store).dashboard_stats()?.into())
    }

    /// Newest registrations, bookings and check-ins for the dashboard.
    pub fn recent_activity(&self) -> Result<FfiRecentActivity, ClinicError> {
        let store = self.store.lock()?;
        let recent = ReportExporter::new(&store).recent_activity(export::RECENT_ACTIVITY_LIMIT)?;
        Ok(recent.into())
    }

    /// Back up every record file. Returns the backup paths written.
    pub fn backup_all(&self) -> Result<Vec<String>, ClinicError> {
        let store = self.store.lock()?;
        let paths = store.backup_all()?;
        Ok(paths
            .into_iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect())
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe patient registration form.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiNewPatient {
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub emergency_contact: Option<String>,
    pub blood_group: Option<String>,
    pub medical_history: Option<String>,
}

impl From<FfiNewPatient> for Patient {
    fn from(form: FfiNewPatient) -> Self {
        let mut patient = Patient::new(form.name, form.age, form.gender, form.phone);
        patient.email = form.email;
        patient.address = form.address;
        patient.emergency_contact = form.emergency_contact;
        patient.blood_group = form.blood_group;
        patient.medical_history = form.medical_history;
        patient
    }
}

/// FFI-safe patient.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatient {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub phone: String,
    pub blood_group: Option<String>,
    pub registration_date: String,
}

impl From<Patient> for FfiPatient {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name,
            age: patient.age,
            gender: patient.gender,
            phone: patient.phone,
            blood_group: patient.blood_group,
            registration_date: patient.registration_date,
        }
    }
}

/// FFI-safe check-in request.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiCheckIn {
    pub patient_id: String,
    pub doctor_id: Option<String>,
    pub visit_type: Option<String>,
    pub priority: String,
    pub chief_complaint: String,
    pub notes: Option<String>,
}

/// FFI-safe consultation outcome.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiConsultation {
    pub diagnosis: Option<String>,
    pub treatment: Option<String>,
    pub prescription: Option<String>,
    pub notes: Option<String>,
    /// `YYYY-MM-DD`
    pub followup_date: Option<String>,
    pub payment_amount: Option<f64>,
}

/// FFI-safe visit.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiVisit {
    pub id: String,
    pub patient_id: String,
    pub patient_name: Option<String>,
    pub doctor_name: Option<String>,
    pub visit_date: String,
    pub visit_time: Option<String>,
    pub visit_type: String,
    pub priority: String,
    pub status: String,
    pub chief_complaint: String,
    pub diagnosis: Option<String>,
}

impl From<Visit> for FfiVisit {
    fn from(visit: Visit) -> Self {
        Self {
            id: visit.id,
            patient_id: visit.patient_id,
            patient_name: visit.patient_name,
            doctor_name: visit.doctor_name,
            visit_date: visit.visit_date,
            visit_time: visit.visit_time,
            visit_type: visit.visit_type,
            priority: visit.priority.to_string(),
            status: visit.status.to_string(),
            chief_complaint: visit.chief_complaint,
            diagnosis: visit.diagnosis,
        }
    }
}

/// FFI-safe queue row.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiQueueEntry {
    pub position: u32,
    pub visit_id: String,
    pub patient_name: String,
    pub priority: String,
    pub chief_complaint: String,
    /// `None` when the check-in time is unreadable
    pub wait_minutes: Option<i64>,
    pub wait_display: String,
}

impl From<QueueEntry> for FfiQueueEntry {
    fn from(entry: QueueEntry) -> Self {
        let wait_minutes = match entry.wait {
            WaitTime::Minutes(m) => Some(m),
            WaitTime::Unavailable => None,
        };
        Self {
            position: entry.position as u32,
            wait_display: entry.wait_display(),
            visit_id: entry.visit_id,
            patient_name: entry.patient_name,
            priority: entry.priority.to_string(),
            chief_complaint: entry.chief_complaint,
            wait_minutes,
        }
    }
}

/// FFI-safe queue statistics.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiQueueStats {
    pub waiting: u32,
    pub in_progress: u32,
    pub completed: u32,
}

impl From<QueueStats> for FfiQueueStats {
    fn from(stats: QueueStats) -> Self {
        Self {
            waiting: stats.waiting as u32,
            in_progress: stats.in_progress as u32,
            completed: stats.completed as u32,
        }
    }
}

/// FFI-safe doctor.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDoctor {
    pub id: String,
    pub name: String,
    pub specialization: String,
    pub department: Option<String>,
    pub consultation_fee: Option<f64>,
}

impl From<Doctor> for FfiDoctor {
    fn from(doctor: Doctor) -> Self {
        Self {
            id: doctor.id,
            name: doctor.name,
            specialization: doctor.specialization,
            department: doctor.department,
            consultation_fee: doctor.consultation_fee,
        }
    }
}

/// FFI-safe appointment.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiAppointment {
    pub id: String,
    pub patient_id: String,
    pub patient_name: Option<String>,
    pub doctor_id: String,
    pub doctor_name: Option<String>,
    pub appointment_date: String,
    pub appointment_time: String,
    pub status: String,
}

impl From<Appointment> for FfiAppointment {
    fn from(appointment: Appointment) -> Self {
        Self {
            id: appointment.id,
            patient_id: appointment.patient_id,
            patient_name: appointment.patient_name,
            doctor_id: appointment.doctor_id,
            doctor_name: appointment.doctor_name,
            appointment_date: appointment.appointment_date,
            appointment_time: appointment.appointment_time,
            status: appointment.status.to_string(),
        }
    }
}

/// FFI-safe dashboard counts.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiDashboardStats {
    pub total_patients: u32,
    pub todays_appointments: u32,
    pub todays_visits: u32,
    pub total_doctors: u32,
}

impl From<DashboardStats> for FfiDashboardStats {
    fn from(stats: DashboardStats) -> Self {
        Self {
            total_patients: stats.total_patients as u32,
            todays_appointments: stats.todays_appointments as u32,
            todays_visits: stats.todays_visits as u32,
            total_doctors: stats.total_doctors as u32,
        }
    }
}

/// FFI-safe payment row.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPayment {
    pub date: String,
    pub visit_id: String,
    pub service: String,
    pub amount: f64,
}

impl From<PaymentRecord> for FfiPayment {
    fn from(payment: PaymentRecord) -> Self {
        Self {
            date: payment.date,
            visit_id: payment.visit_id,
            service: payment.service,
            amount: payment.amount,
        }
    }
}

/// FFI-safe patient overview.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiPatientSummary {
    pub patient: FfiPatient,
    pub appointment_count: u32,
    pub visit_count: u32,
    pub last_visit: Option<String>,
    pub payments: Vec<FfiPayment>,
    pub total_paid: f64,
    pub last_payment: Option<String>,
}

impl From<PatientSummary> for FfiPatientSummary {
    fn from(summary: PatientSummary) -> Self {
        Self {
            patient: summary.patient.into(),
            appointment_count: summary.appointment_count as u32,
            visit_count: summary.visit_count as u32,
            last_visit: summary.last_visit,
            payments: summary.payments.into_iter().map(|p| p.into()).collect(),
            total_paid: summary.total_paid,
            last_payment: summary.last_payment,
        }
    }
}

/// FFI-safe recent-activity panel.
#[derive(Debug, Clone, uniffi::Record)]
pub struct FfiRecentActivity {
    pub patients: Vec<FfiPatient>,
    pub appointments: Vec<FfiAppointment>,
    pub visits: Vec<FfiVisit>,
}

impl From<RecentActivity> for FfiRecentActivity {
    fn from(recent: RecentActivity) -> Self {
        Self {
            patients: recent.patients.into_iter().map(|p| p.into()).collect(),
            appointments: recent.appointments.into_iter().map(|a| a.into()).collect(),
            visits: recent.visits.into_iter().map(|v| v.into()).collect(),
        }
    }
}
