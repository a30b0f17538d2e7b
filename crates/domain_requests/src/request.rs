//! Document request entity
//!
//! A request is a reviewer-issued demand for one document type on one
//! claim, with its own business-day deadline. Reminder and escalation
//! bookkeeping lives on the row so the daily sweep acts on persisted
//! counters, never on in-process memory.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{DocumentRequestId, IncapacityId};
use domain_incapacity::DocumentKind;

use crate::error::WorkflowError;

/// Lifecycle status of a document request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Waiting for the claimant to deliver the document
    Pending,
    /// The document arrived and passed validation
    Fulfilled,
    /// The deadline ran out past the grace window
    RequiresEscalation,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Fulfilled => "fulfilled",
            RequestStatus::RequiresEscalation => "requires_escalation",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One document type requested from a claimant, as workflow input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestedDocument {
    pub kind: DocumentKind,
    /// Reviewer note shown to the claimant for this type
    pub note: Option<String>,
}

impl RequestedDocument {
    pub fn new(kind: DocumentKind, note: impl Into<Option<String>>) -> Self {
        Self {
            kind,
            note: note.into(),
        }
    }
}

/// A reviewer's demand for one missing document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRequest {
    pub id: DocumentRequestId,
    pub incapacity_id: IncapacityId,
    pub kind: DocumentKind,
    /// Reviewer note carried into the claimant notification
    pub note: Option<String>,
    pub status: RequestStatus,
    /// Due date in business days, extended at most once
    pub deadline: NaiveDate,
    /// Due-today reminders sent
    pub reminder_count: u32,
    /// Overdue urgent reminders sent
    pub escalation_count: u32,
    pub extension_granted: bool,
    pub extension_justification: Option<String>,
    pub fulfilled_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentRequest {
    pub fn new(
        incapacity_id: IncapacityId,
        kind: DocumentKind,
        note: Option<String>,
        deadline: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: DocumentRequestId::new_v7(),
            incapacity_id,
            kind,
            note,
            status: RequestStatus::Pending,
            deadline,
            reminder_count: 0,
            escalation_count: 0,
            extension_granted: false,
            extension_justification: None,
            fulfilled_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// Marks the request answered at `at`
    ///
    /// Only a pending request can be fulfilled; the fulfillment timestamp
    /// is written once and never overwritten.
    pub fn fulfill(&mut self, at: DateTime<Utc>) -> Result<(), WorkflowError> {
        if !self.is_pending() {
            return Err(WorkflowError::NotPending {
                request: self.id,
                status: self.status,
            });
        }
        self.status = RequestStatus::Fulfilled;
        self.fulfilled_at = Some(at);
        self.updated_at = at;
        Ok(())
    }

    /// Moves the deadline forward once
    ///
    /// A second extension is refused regardless of who asks.
    pub fn grant_extension(
        &mut self,
        new_deadline: NaiveDate,
        justification: impl Into<String>,
    ) -> Result<(), WorkflowError> {
        if !self.is_pending() {
            return Err(WorkflowError::NotPending {
                request: self.id,
                status: self.status,
            });
        }
        if self.extension_granted {
            return Err(WorkflowError::AlreadyExtended(self.id));
        }
        self.deadline = new_deadline;
        self.extension_granted = true;
        self.extension_justification = Some(justification.into());
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Books one due-today reminder
    pub fn record_reminder(&mut self) {
        self.reminder_count += 1;
        self.updated_at = Utc::now();
    }

    /// Books one overdue urgent reminder
    pub fn record_urgent_reminder(&mut self) {
        self.escalation_count += 1;
        self.updated_at = Utc::now();
    }

    /// Marks the request as having exhausted its grace window
    pub fn escalate(&mut self) -> Result<(), WorkflowError> {
        if !self.is_pending() {
            return Err(WorkflowError::NotPending {
                request: self.id,
                status: self.status,
            });
        }
        self.status = RequestStatus::RequiresEscalation;
        self.updated_at = Utc::now();
        Ok(())
    }
}
