//! Persistence port for document requests
//!
//! Methods are shaped after business operations rather than row CRUD:
//! whatever must commit together arrives in one call so the adapter can
//! wrap it in one transaction. Claim writes inside these calls are
//! version-checked the same way `IncapacityRepository::save` is.

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{DocumentRequestId, DomainPort, IncapacityId, PortError};
use domain_incapacity::{Document, Incapacity, StateTransitionRecord};

use crate::request::DocumentRequest;

/// Storage for document requests and their joint commits with the claim
#[async_trait]
pub trait DocumentRequestRepository: DomainPort {
    /// Inserts a batch of requests together with the claim's transition to
    /// `DocumentationIncomplete` and its audit record
    ///
    /// All requests and the claim update commit together or not at all.
    async fn create_batch(
        &self,
        requests: &[DocumentRequest],
        claim: &Incapacity,
        record: &StateTransitionRecord,
    ) -> Result<(), PortError>;

    /// Fetches one request
    async fn get(&self, id: DocumentRequestId) -> Result<DocumentRequest, PortError>;

    /// Writes request bookkeeping changes (reminder counters)
    async fn update(&self, request: &DocumentRequest) -> Result<(), PortError>;

    /// Writes a request change together with a claim audit record, used by
    /// extensions
    async fn update_with_audit(
        &self,
        request: &DocumentRequest,
        record: &StateTransitionRecord,
    ) -> Result<(), PortError>;

    /// Marks a request fulfilled and stores the accepted document in one
    /// transaction
    async fn fulfill(
        &self,
        request: &DocumentRequest,
        document: &Document,
    ) -> Result<(), PortError>;

    /// Commits an escalation: the request status change, the claim's
    /// rejection, and the audit record, all in one transaction
    async fn escalate(
        &self,
        request: &DocumentRequest,
        claim: &Incapacity,
        record: &StateTransitionRecord,
    ) -> Result<(), PortError>;

    /// Pending requests for one claim, oldest first
    async fn list_pending_by_claim(
        &self,
        claim: IncapacityId,
    ) -> Result<Vec<DocumentRequest>, PortError>;

    /// Pending requests whose deadline is on or before `today`
    async fn list_due(&self, today: NaiveDate) -> Result<Vec<DocumentRequest>, PortError>;
}
