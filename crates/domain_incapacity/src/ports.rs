//! Persistence port for incapacity claims

use async_trait::async_trait;

use core_kernel::{DomainPort, IncapacityId, PortError};

use crate::document::Document;
use crate::history::StateTransitionRecord;
use crate::incapacity::Incapacity;
use crate::state::IncapacityState;

/// Storage for claims, their audit trail, and attached documents
///
/// Every mutating method is one transaction in the adapter. `save` is
/// version-checked: a concurrent writer makes it fail with
/// [`PortError::Conflict`] and the caller re-fetches and retries.
#[async_trait]
pub trait IncapacityRepository: DomainPort {
    /// Inserts a new claim with its first audit record and any documents
    /// attached at registration
    async fn create(
        &self,
        claim: &Incapacity,
        record: &StateTransitionRecord,
        documents: &[Document],
    ) -> Result<(), PortError>;

    /// Fetches a claim by id
    async fn get(&self, id: IncapacityId) -> Result<Incapacity, PortError>;

    /// Cheap existence check
    async fn exists(&self, id: IncapacityId) -> Result<bool, PortError>;

    /// Writes the claim row, optionally with an audit record, in one
    /// transaction
    ///
    /// The update is conditional on the version the claim was loaded with.
    async fn save(
        &self,
        claim: &Incapacity,
        record: Option<&StateTransitionRecord>,
    ) -> Result<(), PortError>;

    /// All claims currently in the given state
    async fn list_by_state(&self, state: IncapacityState) -> Result<Vec<Incapacity>, PortError>;

    /// Audit trail for a claim, newest first
    async fn history(&self, id: IncapacityId) -> Result<Vec<StateTransitionRecord>, PortError>;

    /// Documents attached to a claim, oldest first
    async fn list_documents(&self, id: IncapacityId) -> Result<Vec<Document>, PortError>;
}
