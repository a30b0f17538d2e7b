//! Incapacity Claim Domain
//!
//! This crate implements the employee incapacity claim lifecycle: a guarded
//! state machine, the per-leave-type document catalog, completeness
//! validation, and claim registration.
//!
//! # Claim Lifecycle
//!
//! ```text
//! PendingValidation <-> DocumentationIncomplete
//!        |                      |
//!        v                      v
//! DocumentationComplete -> ApprovedPendingTranscription -> Transcribed
//!                                                           |      ^
//!                                                           v      |
//!                                                 Billed   RejectedByPayer
//!                                                   |
//!                                                   v
//!                                                 Paid
//! ```
//!
//! `Rejected` is reachable from every pre-approval state and, like `Paid`,
//! is terminal.

pub mod actor;
pub mod catalog;
pub mod document;
pub mod error;
pub mod history;
pub mod incapacity;
pub mod ports;
pub mod registration;
pub mod state;
pub mod state_machine;
pub mod validation;

pub use actor::{Actor, Role};
pub use catalog::{
    DocumentRuleset, RequiredDocumentsCatalog, RequirementsOutcome, StandardCatalog,
};
pub use document::{Document, DocumentKind, SubmittedDocument, MAX_DOCUMENT_BYTES};
pub use error::IncapacityError;
pub use history::StateTransitionRecord;
pub use incapacity::{Incapacity, LeaveType};
pub use ports::IncapacityRepository;
pub use registration::{RegistrationOutcome, RegistrationService, MAX_CLAIM_DURATION_DAYS};
pub use state::IncapacityState;
pub use state_machine::{IncapacityStateMachine, TransitionSnapshot};
pub use validation::CompletenessReport;
