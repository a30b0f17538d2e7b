//! Actors and roles

use std::fmt;

use serde::{Deserialize, Serialize};

use core_kernel::EmployeeId;

/// Role an employee holds in the claim process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Employee filing claims for themselves
    Claimant,
    /// Staff member reviewing documentation
    Reviewer,
    /// Operations staff receiving system alerts
    Administrator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Claimant => "claimant",
            Role::Reviewer => "reviewer",
            Role::Administrator => "administrator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The employee performing an operation, with their role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: EmployeeId,
    pub role: Role,
}

impl Actor {
    pub fn new(id: EmployeeId, role: Role) -> Self {
        Self { id, role }
    }

    pub fn reviewer(id: EmployeeId) -> Self {
        Self::new(id, Role::Reviewer)
    }

    pub fn claimant(id: EmployeeId) -> Self {
        Self::new(id, Role::Claimant)
    }

    pub fn is_reviewer(&self) -> bool {
        self.role == Role::Reviewer
    }
}
