//! Recipients and the employee directory

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use core_kernel::{DomainPort, EmployeeId, PortError};

/// Someone a notification can be addressed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub id: EmployeeId,
    pub display_name: String,
    /// Missing or malformed addresses downgrade delivery to internal-only
    pub email: Option<String>,
}

impl Recipient {
    pub fn new(id: EmployeeId, display_name: impl Into<String>, email: Option<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            email,
        }
    }
}

/// Lookup of recipients by identity or role
#[async_trait]
pub trait RecipientDirectory: DomainPort {
    /// Resolves a single employee
    async fn find(&self, id: EmployeeId) -> Result<Recipient, PortError>;

    /// Everyone holding the reviewer role
    async fn reviewers(&self) -> Result<Vec<Recipient>, PortError>;

    /// Everyone holding the administrator role
    async fn administrators(&self) -> Result<Vec<Recipient>, PortError>;
}
