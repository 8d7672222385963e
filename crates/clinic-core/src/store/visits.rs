//! OPD visit repository and same-day workflow.

use chrono::{Local, NaiveDate, NaiveDateTime};
use tracing::{info, warn};

use super::{contains_lower, Store, StoreResult};
use crate::models::{Patient, Visit, VisitStatus, VisitUpdate, DATE_FORMAT, TIME_FORMAT};
use crate::queue::{QueueEngine, QueueEntry, QueueStats};
use crate::workflow::VisitEvent;

impl Store {
    // =========================================================================
    // Repository
    // =========================================================================

    /// Check a patient in. The visit is stamped with the current date and time
    /// and always enters the queue as Waiting.
    pub fn add_visit(&self, mut visit: Visit) -> StoreResult<Visit> {
        visit.validate()?;
        let now = Local::now().naive_local();
        visit.visit_date = now.format(DATE_FORMAT).to_string();
        visit.visit_time = Some(now.format(TIME_FORMAT).to_string());
        visit.status = VisitStatus::Waiting;

        let visit = self.insert_record(visit)?;
        info!(
            "checked in visit {} for patient {} ({})",
            visit.id, visit.patient_id, visit.priority
        );
        Ok(visit)
    }

    /// Shallow-merge `update` into visit `id`.
    ///
    /// Returns `false` without writing if the visit does not exist. A status
    /// change must be allowed by the configured transition policy.
    pub fn update_visit(&self, id: &str, update: &VisitUpdate) -> StoreResult<bool> {
        let workflow = *self.workflow();
        self.modify_record(id, |visit: &mut Visit| {
            if let Some(status) = update.status {
                if let Err(e) = workflow.check_status_change(visit.status, status) {
                    warn!("visit {}: {}", visit.id, e);
                    return Err(e.into());
                }
            }
            visit.merge(update)?;
            if let Some(status) = update.status {
                visit.status = status;
            }
            Ok(())
        })
    }

    pub fn delete_visit(&self, id: &str) -> StoreResult<bool> {
        let deleted = self.remove_record::<Visit>(id)?;
        if deleted {
            info!("deleted visit {}", id);
        }
        Ok(deleted)
    }

    pub fn get_visit(&self, id: &str) -> StoreResult<Option<Visit>> {
        self.find_record(id)
    }

    /// All visits in storage order.
    pub fn list_visits(&self) -> StoreResult<Vec<Visit>> {
        self.load_all()
    }

    pub fn visits_by_patient(&self, patient_id: &str) -> StoreResult<Vec<Visit>> {
        let mut visits = self.list_visits()?;
        visits.retain(|v| v.patient_id == patient_id);
        Ok(visits)
    }

    pub fn visits_by_date(&self, date: NaiveDate) -> StoreResult<Vec<Visit>> {
        let mut visits = self.list_visits()?;
        visits.retain(|v| v.is_on(date));
        Ok(visits)
    }

    pub fn todays_visits(&self) -> StoreResult<Vec<Visit>> {
        self.visits_by_date(Local::now().date_naive())
    }

    /// Case-insensitive search over patient name, doctor name and visit ID,
    /// optionally limited to one status. An empty query matches everything.
    pub fn search_visits(
        &self,
        query: &str,
        status: Option<VisitStatus>,
    ) -> StoreResult<Vec<Visit>> {
        let query = query.trim().to_lowercase();
        let mut visits = self.list_visits()?;
        visits.retain(|v| {
            let status_ok = status.map_or(true, |s| v.status == s);
            let text_ok = query.is_empty()
                || v.id.to_lowercase().contains(&query)
                || contains_lower(v.patient_name.as_deref(), &query)
                || contains_lower(v.doctor_name.as_deref(), &query);
            status_ok && text_ok
        });
        Ok(visits)
    }

    // =========================================================================
    // Workflow
    // =========================================================================

    /// Apply a workflow event to visit `id`. Returns `false` if absent.
    pub fn transition_visit(&self, id: &str, event: VisitEvent) -> StoreResult<bool> {
        let workflow = *self.workflow();
        self.modify_record(id, |visit: &mut Visit| {
            let from = visit.status;
            match workflow.apply(from, event) {
                Ok(to) => {
                    visit.status = to;
                    info!("visit {}: {} -> {}", visit.id, from, to);
                    Ok(())
                }
                Err(e) => {
                    warn!("visit {}: {}", visit.id, e);
                    Err(e.into())
                }
            }
        })
    }

    pub fn start_visit(&self, id: &str) -> StoreResult<bool> {
        self.transition_visit(id, VisitEvent::Start)
    }

    pub fn complete_visit(&self, id: &str) -> StoreResult<bool> {
        self.transition_visit(id, VisitEvent::Complete)
    }

    pub fn cancel_visit(&self, id: &str) -> StoreResult<bool> {
        self.transition_visit(id, VisitEvent::Cancel)
    }

    // =========================================================================
    // Queue
    // =========================================================================

    fn queue_engine(&self) -> QueueEngine {
        QueueEngine::new(self.config().complaint_preview_chars())
    }

    /// Today's queue as of now.
    pub fn todays_queue(&self) -> StoreResult<Vec<QueueEntry>> {
        let now = Local::now().naive_local();
        self.queue_at(now.date(), now)
    }

    /// Queue for `today` with waits measured at `now`.
    pub fn queue_at(&self, today: NaiveDate, now: NaiveDateTime) -> StoreResult<Vec<QueueEntry>> {
        let visits = self.list_visits()?;
        let patients = self.load_all::<Patient>()?;
        Ok(self.queue_engine().build(&visits, &patients, today, now))
    }

    pub fn queue_stats(&self) -> StoreResult<QueueStats> {
        self.queue_stats_for(Local::now().date_naive())
    }

    pub fn queue_stats_for(&self, date: NaiveDate) -> StoreResult<QueueStats> {
        let visits = self.list_visits()?;
        Ok(self.queue_engine().stats(&visits, date))
    }
}
