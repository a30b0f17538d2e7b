//! Guarded transition rules for the incapacity lifecycle
//!
//! `can_transition` answers the pure adjacency question; `validate` layers
//! the semantic preconditions on top. Neither touches storage, so callers
//! decide the transaction boundary.

use crate::error::IncapacityError;
use crate::state::IncapacityState;

/// Snapshot of the claim attributes a transition guard may inspect
///
/// Built by the caller from the aggregate plus repository counts, so the
/// guard itself stays free of I/O.
#[derive(Debug, Clone, Default)]
pub struct TransitionSnapshot {
    /// Document requests still in `pending` for this claim
    pub pending_request_count: usize,
    /// Documents attached to this claim so far
    pub attached_document_count: usize,
    /// Reason supplied when rejecting
    pub rejection_reason: Option<String>,
}

/// Pure decision function for incapacity state changes
pub struct IncapacityStateMachine;

impl IncapacityStateMachine {
    /// Checks structural legality of a transition
    ///
    /// Same-state is always legal (no-op update). Otherwise the target must
    /// appear in the adjacency list of the current state; terminal states
    /// have no outgoing edges.
    pub fn can_transition(current: IncapacityState, target: IncapacityState) -> bool {
        use IncapacityState::*;

        if current == target {
            return true;
        }
        matches!(
            (current, target),
            (PendingValidation, DocumentationIncomplete)
                | (PendingValidation, DocumentationComplete)
                | (PendingValidation, Rejected)
                | (DocumentationIncomplete, PendingValidation)
                | (DocumentationIncomplete, DocumentationComplete)
                | (DocumentationIncomplete, Rejected)
                | (DocumentationComplete, ApprovedPendingTranscription)
                | (DocumentationComplete, Rejected)
                | (ApprovedPendingTranscription, Transcribed)
                | (Transcribed, Billed)
                | (Transcribed, RejectedByPayer)
                | (Billed, Paid)
                | (RejectedByPayer, Transcribed)
        )
    }

    /// Checks legality plus semantic preconditions
    ///
    /// On failure the caller must not persist anything. Same-state updates
    /// skip the precondition checks since no state actually changes.
    pub fn validate(
        current: IncapacityState,
        target: IncapacityState,
        snapshot: &TransitionSnapshot,
    ) -> Result<(), IncapacityError> {
        if !Self::can_transition(current, target) {
            return Err(IncapacityError::InvalidTransition {
                from: current,
                to: target,
            });
        }
        if current == target {
            return Ok(());
        }

        match target {
            IncapacityState::DocumentationComplete => {
                if snapshot.pending_request_count > 0 {
                    return Err(IncapacityError::blocked(
                        target,
                        format!(
                            "{} document request(s) still pending",
                            snapshot.pending_request_count
                        ),
                    ));
                }
                if snapshot.attached_document_count == 0 {
                    return Err(IncapacityError::blocked(target, "no documents attached"));
                }
            }
            IncapacityState::ApprovedPendingTranscription => {
                if current != IncapacityState::DocumentationComplete {
                    return Err(IncapacityError::blocked(
                        target,
                        "documentation must be complete before approval",
                    ));
                }
            }
            IncapacityState::Transcribed => {
                if !matches!(
                    current,
                    IncapacityState::ApprovedPendingTranscription
                        | IncapacityState::RejectedByPayer
                ) {
                    return Err(IncapacityError::blocked(
                        target,
                        "only approved or payer-rejected claims can be transcribed",
                    ));
                }
            }
            IncapacityState::Rejected => {
                let has_reason = snapshot
                    .rejection_reason
                    .as_deref()
                    .is_some_and(|r| !r.trim().is_empty());
                if !has_reason {
                    return Err(IncapacityError::blocked(target, "rejection reason required"));
                }
            }
            _ => {}
        }

        Ok(())
    }
}
