//! Incapacity lifecycle states

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IncapacityError;

/// State of an incapacity claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncapacityState {
    /// Awaiting eligibility review
    PendingValidation,
    /// Reviewer has requested missing documents
    DocumentationIncomplete,
    /// Every required document is attached and verified
    DocumentationComplete,
    /// Approved, waiting to be transcribed into the payer system
    ApprovedPendingTranscription,
    /// Transcribed into the payer system
    Transcribed,
    /// Invoiced to the payer
    Billed,
    /// Payer bounced the transcription back
    RejectedByPayer,
    /// Payer settled the claim
    Paid,
    /// Rejected
    Rejected,
}

impl IncapacityState {
    /// All states, in lifecycle order
    pub const ALL: [IncapacityState; 9] = [
        IncapacityState::PendingValidation,
        IncapacityState::DocumentationIncomplete,
        IncapacityState::DocumentationComplete,
        IncapacityState::ApprovedPendingTranscription,
        IncapacityState::Transcribed,
        IncapacityState::Billed,
        IncapacityState::RejectedByPayer,
        IncapacityState::Paid,
        IncapacityState::Rejected,
    ];

    /// Canonical string form, used for persistence and logging
    pub fn as_str(&self) -> &'static str {
        match self {
            IncapacityState::PendingValidation => "pending_validation",
            IncapacityState::DocumentationIncomplete => "documentation_incomplete",
            IncapacityState::DocumentationComplete => "documentation_complete",
            IncapacityState::ApprovedPendingTranscription => "approved_pending_transcription",
            IncapacityState::Transcribed => "transcribed",
            IncapacityState::Billed => "billed",
            IncapacityState::RejectedByPayer => "rejected_by_payer",
            IncapacityState::Paid => "paid",
            IncapacityState::Rejected => "rejected",
        }
    }

    /// True for states with no outgoing transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, IncapacityState::Paid | IncapacityState::Rejected)
    }
}

impl fmt::Display for IncapacityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for IncapacityState {
    type Err = IncapacityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IncapacityState::ALL
            .iter()
            .find(|state| state.as_str() == s)
            .copied()
            .ok_or_else(|| IncapacityError::UnknownState(s.to_string()))
    }
}
