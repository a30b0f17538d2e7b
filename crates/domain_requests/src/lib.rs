//! domain_requests: the document request workflow around incapacity claims
//!
//! Reviewers open requests for missing documents, each with a business-day
//! deadline. Claimants answer them; answers close the documentation
//! round-trip on the claim. A daily sweep walks everything due and climbs
//! the reminder ladder: a nudge on the due date, an urgent reminder while
//! recently overdue, silence through the grace days, and rejection of the
//! claim once the grace window runs out.
//!
//! All writes commit through business-operation-shaped port calls before
//! any notification is attempted, so delivery trouble can never corrupt or
//! roll back claim state.

pub mod error;
pub mod escalation;
pub mod messages;
pub mod ports;
pub mod request;
pub mod scheduler;
pub mod workflow;

pub use error::WorkflowError;
pub use escalation::{EscalationAction, EscalationPolicy};
pub use ports::DocumentRequestRepository;
pub use request::{DocumentRequest, RequestStatus, RequestedDocument};
pub use scheduler::{ReminderScheduler, SchedulerConfig, SweepStats};
pub use workflow::{
    ActionOutcome, CreatedRequests, DocumentRequestWorkflow, RejectedDocument, ResponseOutcome,
    WorkflowConfig, ESCALATION_REJECTION_REASON,
};
