//! Doctor roster.

use tracing::info;

use super::{Store, StoreResult};
use crate::models::{validate_schedule, Doctor, WeeklySchedule};

impl Store {
    pub fn add_doctor(&self, doctor: Doctor) -> StoreResult<Doctor> {
        doctor.validate()?;
        let doctor = self.insert_record(doctor)?;
        info!("added doctor {} ({})", doctor.id, doctor.specialization);
        Ok(doctor)
    }

    /// Replace the stored doctor with the same ID.
    pub fn update_doctor(&self, doctor: &Doctor) -> StoreResult<bool> {
        doctor.validate()?;
        self.modify_record(&doctor.id, |stored: &mut Doctor| {
            *stored = doctor.clone();
            Ok(())
        })
    }

    pub fn delete_doctor(&self, id: &str) -> StoreResult<bool> {
        let deleted = self.remove_record::<Doctor>(id)?;
        if deleted {
            info!("deleted doctor {}", id);
        }
        Ok(deleted)
    }

    pub fn get_doctor(&self, id: &str) -> StoreResult<Option<Doctor>> {
        self.find_record(id)
    }

    pub fn list_doctors(&self) -> StoreResult<Vec<Doctor>> {
        self.load_all()
    }

    /// Doctors whose department matches, ignoring case.
    pub fn list_doctors_by_department(&self, department: &str) -> StoreResult<Vec<Doctor>> {
        let mut doctors = self.list_doctors()?;
        doctors.retain(|d| {
            d.department
                .as_deref()
                .is_some_and(|dept| dept.eq_ignore_ascii_case(department.trim()))
        });
        Ok(doctors)
    }

    /// Case-insensitive search over name, specialization and ID, optionally
    /// limited to one department. An empty query matches everything.
    pub fn search_doctors(
        &self,
        query: &str,
        department: Option<&str>,
    ) -> StoreResult<Vec<Doctor>> {
        let query = query.trim().to_lowercase();
        let mut doctors = self.list_doctors()?;
        doctors.retain(|d| {
            let department_ok = department.map_or(true, |wanted| {
                d.department
                    .as_deref()
                    .is_some_and(|dept| dept.eq_ignore_ascii_case(wanted.trim()))
            });
            let text_ok = query.is_empty()
                || d.id.to_lowercase().contains(&query)
                || d.name.to_lowercase().contains(&query)
                || d.specialization.to_lowercase().contains(&query);
            department_ok && text_ok
        });
        Ok(doctors)
    }

    /// Replace a doctor's weekly schedule. Returns `false` if the doctor is absent.
    pub fn set_doctor_schedule(&self, id: &str, schedule: WeeklySchedule) -> StoreResult<bool> {
        validate_schedule(&schedule)?;
        self.modify_record(id, |doctor: &mut Doctor| {
            doctor.schedule = Some(schedule);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Weekday;

    use super::*;
    use crate::models::DaySchedule;
    use crate::store::tests::setup_store;

    fn make_doctor(name: &str, department: &str) -> Doctor {
        let mut doctor = Doctor::new(name.into(), "General Medicine".into(), "555 0100".into());
        doctor.department = Some(department.into());
        doctor
    }

    #[test]
    fn test_doctor_crud() {
        let (_dir, store) = setup_store();
        let mut doctor = store.add_doctor(make_doctor("Dr. Rao", "OPD")).unwrap();
        assert_eq!(doctor.id, "DOC001");

        doctor.consultation_fee = Some(500.0);
        assert!(store.update_doctor(&doctor).unwrap());
        let stored = store.get_doctor("DOC001").unwrap().unwrap();
        assert_eq!(stored.consultation_fee, Some(500.0));

        assert!(store.delete_doctor("DOC001").unwrap());
        assert!(store.get_doctor("DOC001").unwrap().is_none());
    }

    #[test]
    fn test_doctors_by_department() {
        let (_dir, store) = setup_store();
        store.add_doctor(make_doctor("Dr. Rao", "Cardiology")).unwrap();
        store.add_doctor(make_doctor("Dr. Shah", "Pediatrics")).unwrap();
        store.add_doctor(make_doctor("Dr. Iyer", "cardiology")).unwrap();

        let cardio = store.list_doctors_by_department("Cardiology").unwrap();
        assert_eq!(cardio.len(), 2);
        assert_eq!(store.list_doctors().unwrap().len(), 3);
    }

    #[test]
    fn test_search_doctors() {
        let (_dir, store) = setup_store();
        store.add_doctor(make_doctor("Dr. Rao", "Cardiology")).unwrap();
        let mut shah = make_doctor("Dr. Shah", "Pediatrics");
        shah.specialization = "Neonatology".into();
        store.add_doctor(shah).unwrap();
        store.add_doctor(make_doctor("Dr. Iyer", "cardiology")).unwrap();

        let found = store.search_doctors("NEONAT", None).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Dr. Shah");
        assert_eq!(store.search_doctors("doc003", None).unwrap()[0].name, "Dr. Iyer");
        assert_eq!(store.search_doctors("general", None).unwrap().len(), 2);
        assert_eq!(store.search_doctors("", None).unwrap().len(), 3);

        let cardio = store.search_doctors("", Some("Cardiology")).unwrap();
        assert_eq!(cardio.len(), 2);
        assert!(store
            .search_doctors("rao", Some("Pediatrics"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_set_schedule() {
        let (_dir, store) = setup_store();
        store.add_doctor(make_doctor("Dr. Rao", "OPD")).unwrap();

        let mut schedule = WeeklySchedule::new();
        schedule.insert(
            "Wednesday".into(),
            DaySchedule {
                available: true,
                ..DaySchedule::default()
            },
        );
        assert!(store.set_doctor_schedule("DOC001", schedule.clone()).unwrap());
        assert!(!store.set_doctor_schedule("DOC404", schedule).unwrap());

        let doctor = store.get_doctor("DOC001").unwrap().unwrap();
        assert!(doctor.is_available_on(Weekday::Wed));
        assert!(!doctor.is_available_on(Weekday::Thu));

        let mut bad = WeeklySchedule::new();
        bad.insert("Someday".into(), DaySchedule::default());
        assert!(store.set_doctor_schedule("DOC001", bad).is_err());
    }
}
