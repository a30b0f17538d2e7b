//! Workflow errors
//!
//! Validation and precondition failures are synchronous and side-effect
//! free. Storage conflicts from the optimistic claim version are the one
//! retryable class: the caller re-fetches and replays the operation.

use thiserror::Error;

use core_kernel::{DocumentRequestId, PortError};
use domain_incapacity::{IncapacityError, IncapacityState};

use crate::request::RequestStatus;

/// Errors from document request operations
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Actor {actor} lacks the {required} role")]
    RoleRequired { actor: String, required: String },

    #[error("Claim is {actual}, operation requires {expected}")]
    InvalidClaimState {
        expected: IncapacityState,
        actual: IncapacityState,
    },

    #[error("Request {request} is {status}, operation requires a pending request")]
    NotPending {
        request: DocumentRequestId,
        status: RequestStatus,
    },

    #[error("Request {0} has already received its one extension")]
    AlreadyExtended(DocumentRequestId),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Claim(#[from] IncapacityError),

    #[error("Storage error: {0}")]
    Storage(#[from] PortError),
}

impl WorkflowError {
    pub fn validation(message: impl Into<String>) -> Self {
        WorkflowError::Validation(message.into())
    }

    pub fn role_required(actor: impl ToString, required: impl Into<String>) -> Self {
        WorkflowError::RoleRequired {
            actor: actor.to_string(),
            required: required.into(),
        }
    }

    /// True for failures worth replaying after a re-fetch
    pub fn is_retryable(&self) -> bool {
        match self {
            WorkflowError::Storage(err) => err.is_conflict() || err.is_transient(),
            WorkflowError::Claim(IncapacityError::Storage(err)) => {
                err.is_conflict() || err.is_transient()
            }
            _ => false,
        }
    }
}
