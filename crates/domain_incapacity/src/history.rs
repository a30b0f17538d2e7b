//! Append-only audit records for state changes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{DocumentId, EmployeeId, IncapacityId, TransitionId};

use crate::state::IncapacityState;

/// One accepted state change, written exactly once and never mutated
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransitionRecord {
    pub id: TransitionId,
    pub incapacity_id: IncapacityId,
    /// None only for the record written at registration
    pub previous_state: Option<IncapacityState>,
    pub new_state: IncapacityState,
    /// Who performed the transition
    pub actor: EmployeeId,
    pub note: Option<String>,
    /// Document that triggered or supports the change
    pub supporting_document: Option<DocumentId>,
    pub recorded_at: DateTime<Utc>,
}

impl StateTransitionRecord {
    /// Record for a real state change
    pub fn change(
        incapacity_id: IncapacityId,
        previous_state: IncapacityState,
        new_state: IncapacityState,
        actor: EmployeeId,
        note: impl Into<Option<String>>,
    ) -> Self {
        Self {
            id: TransitionId::new_v7(),
            incapacity_id,
            previous_state: Some(previous_state),
            new_state,
            actor,
            note: note.into(),
            supporting_document: None,
            recorded_at: Utc::now(),
        }
    }

    /// First record of a claim, written at registration
    pub fn initial(incapacity_id: IncapacityId, actor: EmployeeId) -> Self {
        Self {
            id: TransitionId::new_v7(),
            incapacity_id,
            previous_state: None,
            new_state: IncapacityState::PendingValidation,
            actor,
            note: Some("claim registered".to_string()),
            supporting_document: None,
            recorded_at: Utc::now(),
        }
    }

    /// Same-state note, used for audit-only events such as extensions
    pub fn annotation(
        incapacity_id: IncapacityId,
        state: IncapacityState,
        actor: EmployeeId,
        note: impl Into<String>,
    ) -> Self {
        Self {
            id: TransitionId::new_v7(),
            incapacity_id,
            previous_state: Some(state),
            new_state: state,
            actor,
            note: Some(note.into()),
            supporting_document: None,
            recorded_at: Utc::now(),
        }
    }

    /// Attaches a supporting document reference
    pub fn with_document(mut self, document_id: DocumentId) -> Self {
        self.supporting_document = Some(document_id);
        self
    }
}
