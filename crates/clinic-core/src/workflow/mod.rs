//! Visit status workflow.
//!
//! ```text
//!            Start               Complete
//! Waiting ─────────▶ In Progress ─────────▶ Completed
//!    │                    │
//!    │ Complete / Cancel  │ Cancel
//!    ▼                    ▼
//! Completed          Cancelled
//! ```
//!
//! Completed and Cancelled are terminal under [`TransitionPolicy::Strict`].
//! [`TransitionPolicy::Legacy`] applies every event unconditionally, which is
//! how records written by the old desktop app were allowed to move.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::VisitStatus;

/// Workflow errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    #[error("cannot {event} a visit that is {from}")]
    InvalidTransition { from: VisitStatus, event: VisitEvent },

    #[error("cannot change visit status from {from} to {to}")]
    InvalidStatusChange { from: VisitStatus, to: VisitStatus },
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// How strictly status changes are checked.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    /// Terminal states are final; only the edges in the diagram apply.
    #[default]
    Strict,
    /// Any status may be set from any other.
    Legacy,
}

/// Something that happens to a visit at the front desk.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum VisitEvent {
    /// Patient called in to see the doctor
    Start,
    /// Consultation finished
    Complete,
    /// Visit abandoned
    Cancel,
}

impl VisitEvent {
    pub const ALL: [VisitEvent; 3] = [Self::Start, Self::Complete, Self::Cancel];

    /// Status the event moves a visit to.
    pub fn target(&self) -> VisitStatus {
        match self {
            Self::Start => VisitStatus::InProgress,
            Self::Complete => VisitStatus::Completed,
            Self::Cancel => VisitStatus::Cancelled,
        }
    }
}

impl fmt::Display for VisitEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Start => "start",
            Self::Complete => "complete",
            Self::Cancel => "cancel",
        })
    }
}

/// Validates visit status changes under a [`TransitionPolicy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct VisitWorkflow {
    policy: TransitionPolicy,
}

impl VisitWorkflow {
    pub fn new(policy: TransitionPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    /// Check whether `event` may be applied to a visit in state `from`.
    pub fn can_apply(&self, from: VisitStatus, event: VisitEvent) -> bool {
        match self.policy {
            TransitionPolicy::Legacy => true,
            TransitionPolicy::Strict => match event {
                VisitEvent::Start => from == VisitStatus::Waiting,
                VisitEvent::Complete | VisitEvent::Cancel => !from.is_terminal(),
            },
        }
    }

    /// Apply `event`, returning the new status.
    pub fn apply(&self, from: VisitStatus, event: VisitEvent) -> WorkflowResult<VisitStatus> {
        if !self.can_apply(from, event) {
            return Err(WorkflowError::InvalidTransition { from, event });
        }
        Ok(event.target())
    }

    /// Check a direct status write (the generic update path).
    ///
    /// Rewriting the current status is always allowed. Legacy policy accepts
    /// any write, including reopening a closed visit.
    pub fn check_status_change(&self, from: VisitStatus, to: VisitStatus) -> WorkflowResult<()> {
        if from == to || self.policy == TransitionPolicy::Legacy {
            return Ok(());
        }
        let reachable = VisitEvent::ALL
            .iter()
            .any(|event| event.target() == to && self.can_apply(from, *event));
        if !reachable {
            return Err(WorkflowError::InvalidStatusChange { from, to });
        }
        Ok(())
    }

    /// Events that can be applied from `from`.
    pub fn allowed_events(&self, from: VisitStatus) -> Vec<VisitEvent> {
        VisitEvent::ALL
            .into_iter()
            .filter(|event| self.can_apply(from, *event))
            .collect()
    }
}
