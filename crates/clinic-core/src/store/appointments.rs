//! Appointment book.

use chrono::Local;
use tracing::info;

use super::{contains_lower, Store, StoreResult};
use crate::models::{Appointment, AppointmentStatus};

/// Booking timestamp format.
const CREATED_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl Store {
    /// Book an appointment, stamping the creation time.
    pub fn add_appointment(&self, mut appointment: Appointment) -> StoreResult<Appointment> {
        appointment.validate()?;
        appointment.created_date = Local::now().format(CREATED_FORMAT).to_string();
        let appointment = self.insert_record(appointment)?;
        info!(
            "booked appointment {} for {} on {} {}",
            appointment.id,
            appointment.patient_id,
            appointment.appointment_date,
            appointment.appointment_time
        );
        Ok(appointment)
    }

    /// Replace the stored appointment with the same ID, keeping its creation stamp.
    pub fn update_appointment(&self, appointment: &Appointment) -> StoreResult<bool> {
        appointment.validate()?;
        self.modify_record(&appointment.id, |stored: &mut Appointment| {
            let created_date = std::mem::take(&mut stored.created_date);
            *stored = Appointment {
                created_date,
                ..appointment.clone()
            };
            Ok(())
        })
    }

    pub fn delete_appointment(&self, id: &str) -> StoreResult<bool> {
        let deleted = self.remove_record::<Appointment>(id)?;
        if deleted {
            info!("deleted appointment {}", id);
        }
        Ok(deleted)
    }

    pub fn get_appointment(&self, id: &str) -> StoreResult<Option<Appointment>> {
        self.find_record(id)
    }

    pub fn list_appointments(&self) -> StoreResult<Vec<Appointment>> {
        self.load_all()
    }

    /// Appointments on `date` (`YYYY-MM-DD`).
    pub fn appointments_by_date(&self, date: &str) -> StoreResult<Vec<Appointment>> {
        let mut appointments = self.list_appointments()?;
        appointments.retain(|a| a.is_on(date));
        Ok(appointments)
    }

    pub fn appointments_by_patient(&self, patient_id: &str) -> StoreResult<Vec<Appointment>> {
        let mut appointments = self.list_appointments()?;
        appointments.retain(|a| a.patient_id == patient_id);
        Ok(appointments)
    }

    /// Case-insensitive search over patient name, doctor name and appointment
    /// ID, optionally limited to one status. An empty query matches everything.
    pub fn search_appointments(
        &self,
        query: &str,
        status: Option<AppointmentStatus>,
    ) -> StoreResult<Vec<Appointment>> {
        let query = query.trim().to_lowercase();
        let mut appointments = self.list_appointments()?;
        appointments.retain(|a| {
            let status_ok = status.map_or(true, |s| a.status == s);
            let text_ok = query.is_empty()
                || a.id.to_lowercase().contains(&query)
                || contains_lower(a.patient_name.as_deref(), &query)
                || contains_lower(a.doctor_name.as_deref(), &query);
            status_ok && text_ok
        });
        Ok(appointments)
    }

    /// Mark an appointment Completed whatever its current status.
    pub fn complete_appointment(&self, id: &str) -> StoreResult<bool> {
        self.set_appointment_status(id, AppointmentStatus::Completed)
    }

    /// Mark an appointment Cancelled whatever its current status.
    pub fn cancel_appointment(&self, id: &str) -> StoreResult<bool> {
        self.set_appointment_status(id, AppointmentStatus::Cancelled)
    }

    fn set_appointment_status(&self, id: &str, status: AppointmentStatus) -> StoreResult<bool> {
        let changed = self.modify_record(id, |appointment: &mut Appointment| {
            appointment.status = status;
            Ok(())
        })?;
        if changed {
            info!("appointment {} is now {}", id, status);
        }
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::setup_store;
    use crate::store::StoreError;

    fn book(store: &Store, patient_id: &str, date: &str) -> Appointment {
        store
            .add_appointment(Appointment::new(
                patient_id.into(),
                "DOC001".into(),
                date.into(),
                "10:30".into(),
            ))
            .unwrap()
    }

    #[test]
    fn test_add_appointment() {
        let (_dir, store) = setup_store();
        let appt = book(&store, "PAT001", "2024-06-01");
        assert_eq!(appt.id, "APT001");
        assert_eq!(appt.status, AppointmentStatus::Scheduled);
        assert_eq!(appt.created_date.len(), 19);
    }

    #[test]
    fn test_add_rejects_bad_date() {
        let (_dir, store) = setup_store();
        let result = store.add_appointment(Appointment::new(
            "PAT001".into(),
            "DOC001".into(),
            "June 1st".into(),
            "10:30".into(),
        ));
        assert!(matches!(result, Err(StoreError::Validation(_))));
    }

    #[test]
    fn test_filters() {
        let (_dir, store) = setup_store();
        book(&store, "PAT001", "2024-06-01");
        book(&store, "PAT002", "2024-06-01");
        book(&store, "PAT001", "2024-06-02");

        assert_eq!(store.appointments_by_date("2024-06-01").unwrap().len(), 2);
        let ravi = store.appointments_by_patient("PAT001").unwrap();
        let ids: Vec<&str> = ravi.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["APT001", "APT003"]);
    }

    #[test]
    fn test_search_appointments() {
        let (_dir, store) = setup_store();
        let mut appt = Appointment::new(
            "PAT001".into(),
            "DOC001".into(),
            "2024-06-01".into(),
            "09:30".into(),
        );
        appt.patient_name = Some("Asha Verma".into());
        appt.doctor_name = Some("Dr. Rao".into());
        store.add_appointment(appt).unwrap();
        book(&store, "PAT002", "2024-06-01");
        store.cancel_appointment("APT002").unwrap();

        assert_eq!(store.search_appointments("VERMA", None).unwrap()[0].id, "APT001");
        assert_eq!(store.search_appointments("dr. rao", None).unwrap().len(), 1);
        assert_eq!(store.search_appointments("apt00", None).unwrap().len(), 2);

        let cancelled = store
            .search_appointments("", Some(AppointmentStatus::Cancelled))
            .unwrap();
        assert_eq!(cancelled.len(), 1);
        assert_eq!(cancelled[0].id, "APT002");
        assert!(store
            .search_appointments("asha", Some(AppointmentStatus::Cancelled))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_status_changes_are_unconditional() {
        let (_dir, store) = setup_store();
        book(&store, "PAT001", "2024-06-01");

        assert!(store.cancel_appointment("APT001").unwrap());
        assert!(store.complete_appointment("APT001").unwrap());
        let appt = store.get_appointment("APT001").unwrap().unwrap();
        assert_eq!(appt.status, AppointmentStatus::Completed);
        assert!(!store.cancel_appointment("APT404").unwrap());
    }

    #[test]
    fn test_update_keeps_created_date() {
        let (_dir, store) = setup_store();
        let mut appt = book(&store, "PAT001", "2024-06-01");
        let created = appt.created_date.clone();

        appt.appointment_time = "11:00".into();
        appt.created_date = String::new();
        assert!(store.update_appointment(&appt).unwrap());

        let stored = store.get_appointment("APT001").unwrap().unwrap();
        assert_eq!(stored.appointment_time, "11:00");
        assert_eq!(stored.created_date, created);
        assert!(store.delete_appointment("APT001").unwrap());
    }
}
