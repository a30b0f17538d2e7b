//! Incapacity domain errors

use thiserror::Error;

use core_kernel::PortError;

use crate::state::IncapacityState;

/// Errors that can occur in the incapacity domain
#[derive(Debug, Error)]
pub enum IncapacityError {
    #[error("Incapacity not found: {0}")]
    NotFound(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition {
        from: IncapacityState,
        to: IncapacityState,
    },

    #[error("Transition to {to} blocked: {reason}")]
    TransitionBlocked {
        to: IncapacityState,
        reason: String,
    },

    #[error("Invalid claim dates: {0}")]
    InvalidDates(String),

    #[error("Unknown incapacity state: {0}")]
    UnknownState(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error("Actor {actor} lacks the {required} role")]
    RoleRequired { actor: String, required: String },

    #[error("Storage error: {0}")]
    Storage(#[from] PortError),
}

impl IncapacityError {
    /// Precondition failure for an otherwise legal transition
    pub fn blocked(to: IncapacityState, reason: impl Into<String>) -> Self {
        IncapacityError::TransitionBlocked {
            to,
            reason: reason.into(),
        }
    }
}
