//! Today's OPD queue.
//!
//! The queue is a projection over the visit list, recomputed on demand:
//!
//! 1. keep visits that are Waiting and checked in today
//! 2. stable sort by (priority rank, check-in time)
//! 3. number the rows from 1
//!
//! Nothing here touches storage, so a projection can be rebuilt any number of
//! times from the same inputs with the same result.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::DEFAULT_COMPLAINT_PREVIEW_CHARS;
use crate::models::{Patient, Priority, Visit, VisitStatus};

/// Fallback queue label when a patient cannot be resolved.
pub const UNKNOWN_PATIENT: &str = "Unknown";

/// Resolves patient IDs to display names.
pub trait PatientDirectory {
    fn display_name(&self, patient_id: &str) -> Option<String>;
}

impl PatientDirectory for [Patient] {
    fn display_name(&self, patient_id: &str) -> Option<String> {
        self.iter()
            .find(|p| p.id == patient_id)
            .map(|p| p.name.clone())
    }
}

impl PatientDirectory for Vec<Patient> {
    fn display_name(&self, patient_id: &str) -> Option<String> {
        self.as_slice().display_name(patient_id)
    }
}

/// How long a patient has been waiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WaitTime {
    Minutes(i64),
    /// Check-in time missing or unreadable
    Unavailable,
}

impl fmt::Display for WaitTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Minutes(m) => write!(f, "{} min", m),
            Self::Unavailable => f.write_str("N/A"),
        }
    }
}

/// One row of the queue display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    /// 1-based position
    pub position: usize,
    pub visit_id: String,
    pub patient_name: String,
    pub priority: Priority,
    /// Chief complaint, truncated for display
    pub chief_complaint: String,
    pub wait: WaitTime,
}

impl QueueEntry {
    pub fn wait_display(&self) -> String {
        self.wait.to_string()
    }
}

/// Today's visit counts by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueStats {
    pub waiting: usize,
    pub in_progress: usize,
    pub completed: usize,
}

/// Builds queue projections.
#[derive(Debug, Clone, Copy)]
pub struct QueueEngine {
    complaint_chars: usize,
}

impl Default for QueueEngine {
    fn default() -> Self {
        Self::new(DEFAULT_COMPLAINT_PREVIEW_CHARS)
    }
}

impl QueueEngine {
    pub fn new(complaint_chars: usize) -> Self {
        Self { complaint_chars }
    }

    /// Project `visits` into the queue for `today` as seen at `now`.
    pub fn build<D>(
        &self,
        visits: &[Visit],
        directory: &D,
        today: NaiveDate,
        now: NaiveDateTime,
    ) -> Vec<QueueEntry>
    where
        D: PatientDirectory + ?Sized,
    {
        let mut waiting: Vec<&Visit> = visits
            .iter()
            .filter(|v| v.status == VisitStatus::Waiting && v.is_on(today))
            .collect();

        // sort_by is stable: true ties keep storage order.
        waiting.sort_by(|a, b| {
            a.priority
                .rank()
                .cmp(&b.priority.rank())
                .then_with(|| time_key(a).cmp(time_key(b)))
        });

        debug!("queue rebuilt with {} waiting visits", waiting.len());

        waiting
            .into_iter()
            .enumerate()
            .map(|(index, visit)| QueueEntry {
                position: index + 1,
                visit_id: visit.id.clone(),
                patient_name: resolve_name(visit, directory),
                priority: visit.priority,
                chief_complaint: truncate_text(&visit.chief_complaint, self.complaint_chars),
                wait: wait_time(visit, now),
            })
            .collect()
    }

    /// Count today's visits by status.
    pub fn stats(&self, visits: &[Visit], today: NaiveDate) -> QueueStats {
        visits
            .iter()
            .filter(|v| v.is_on(today))
            .fold(QueueStats::default(), |mut stats, visit| {
                match visit.status {
                    VisitStatus::Waiting => stats.waiting += 1,
                    VisitStatus::InProgress => stats.in_progress += 1,
                    VisitStatus::Completed => stats.completed += 1,
                    VisitStatus::Cancelled => {}
                }
                stats
            })
    }
}

fn time_key(visit: &Visit) -> &str {
    visit.visit_time.as_deref().unwrap_or("")
}

/// Directory lookup, then the check-in snapshot, then [`UNKNOWN_PATIENT`].
fn resolve_name<D: PatientDirectory + ?Sized>(visit: &Visit, directory: &D) -> String {
    directory
        .display_name(&visit.patient_id)
        .or_else(|| visit.patient_name.clone())
        .unwrap_or_else(|| UNKNOWN_PATIENT.to_string())
}

/// Whole minutes since check-in, rounded down.
pub fn wait_time(visit: &Visit, now: NaiveDateTime) -> WaitTime {
    match visit.checked_in_at() {
        Some(checked_in) => {
            WaitTime::Minutes((now - checked_in).num_seconds().div_euclid(60))
        }
        None => {
            if visit.visit_time.is_some() {
                warn!(
                    "visit {} has unreadable check-in time {:?}",
                    visit.id, visit.visit_time
                );
            }
            WaitTime::Unavailable
        }
    }
}

/// Cut `text` to `max_chars` characters, marking the cut with `...`.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push_str("...");
    cut
}
