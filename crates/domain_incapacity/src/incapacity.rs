//! Incapacity aggregate

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{EmployeeId, IncapacityId};

use crate::error::IncapacityError;
use crate::state::IncapacityState;
use crate::state_machine::{IncapacityStateMachine, TransitionSnapshot};
use crate::validation::CompletenessReport;

/// Type of leave being claimed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveType {
    GeneralIllness,
    WorkplaceAccident,
    TrafficAccident,
    MaternityLeave,
    PaternityLeave,
}

impl LeaveType {
    /// All leave types
    pub const ALL: [LeaveType; 5] = [
        LeaveType::GeneralIllness,
        LeaveType::WorkplaceAccident,
        LeaveType::TrafficAccident,
        LeaveType::MaternityLeave,
        LeaveType::PaternityLeave,
    ];

    /// Canonical string form, used for persistence and logging
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveType::GeneralIllness => "general_illness",
            LeaveType::WorkplaceAccident => "workplace_accident",
            LeaveType::TrafficAccident => "traffic_accident",
            LeaveType::MaternityLeave => "maternity_leave",
            LeaveType::PaternityLeave => "paternity_leave",
        }
    }

    /// Human-readable name for notification copy
    pub fn display_name(&self) -> &'static str {
        match self {
            LeaveType::GeneralIllness => "general illness",
            LeaveType::WorkplaceAccident => "workplace accident",
            LeaveType::TrafficAccident => "traffic accident",
            LeaveType::MaternityLeave => "maternity",
            LeaveType::PaternityLeave => "paternity",
        }
    }
}

impl fmt::Display for LeaveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An employee's incapacity claim
///
/// Mutated only through state-machine-guarded transitions and never
/// hard-deleted; every state change leaves an audit record behind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incapacity {
    /// Unique identifier
    pub id: IncapacityId,
    /// Owning claimant
    pub employee_id: EmployeeId,
    /// Type of leave
    pub leave_type: LeaveType,
    /// First day of leave
    pub start_date: NaiveDate,
    /// Last day of leave, inclusive
    pub end_date: NaiveDate,
    /// Calendar days covered, `end - start + 1`
    pub duration_days: i64,
    /// Current lifecycle state
    pub state: IncapacityState,
    /// Reason recorded when the claim was rejected
    pub rejection_reason: Option<String>,
    /// Outcome of the latest completeness check
    pub validation_outcome: Option<CompletenessReport>,
    /// Optimistic-lock version, bumped by the store on every save
    pub version: i64,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Incapacity {
    /// Creates a claim in the initial `PendingValidation` state
    ///
    /// # Errors
    ///
    /// Returns `InvalidDates` if `end_date` precedes `start_date`.
    pub fn new(
        employee_id: EmployeeId,
        leave_type: LeaveType,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Self, IncapacityError> {
        if end_date < start_date {
            return Err(IncapacityError::InvalidDates(format!(
                "end date {end_date} precedes start date {start_date}"
            )));
        }
        let now = Utc::now();
        let duration_days = (end_date - start_date).num_days() + 1;

        Ok(Self {
            id: IncapacityId::new_v7(),
            employee_id,
            leave_type,
            start_date,
            end_date,
            duration_days,
            state: IncapacityState::PendingValidation,
            rejection_reason: None,
            validation_outcome: None,
            version: 0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies a guarded state transition
    ///
    /// Validates adjacency and preconditions against the snapshot; on a
    /// transition to `Rejected` the snapshot's reason is recorded on the
    /// claim. The caller persists the change together with its audit record.
    pub fn transition(
        &mut self,
        target: IncapacityState,
        snapshot: &TransitionSnapshot,
    ) -> Result<(), IncapacityError> {
        IncapacityStateMachine::validate(self.state, target, snapshot)?;

        if target == IncapacityState::Rejected {
            self.rejection_reason = snapshot.rejection_reason.clone();
        }
        self.state = target;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Records the outcome of a completeness check
    pub fn record_validation(&mut self, report: CompletenessReport) {
        self.validation_outcome = Some(report);
        self.updated_at = Utc::now();
    }
}
