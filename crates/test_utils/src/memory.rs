//! In-Memory Ports
//!
//! Mutex-backed implementations of the persistence ports, honoring the same
//! contracts as the Postgres adapters: version-checked claim writes, joint
//! commits, and newest-first ordering. They let workflow and scheduler tests
//! run the real components without a database.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use core_kernel::{DocumentRequestId, DomainPort, EmployeeId, IncapacityId, NotificationId, PortError};
use domain_incapacity::{Document, Incapacity, IncapacityRepository, IncapacityState, StateTransitionRecord};
use domain_notifications::{InboxFilter, Notification, NotificationStore, Recipient, RecipientDirectory};
use domain_requests::{DocumentRequest, DocumentRequestRepository};

/// In-memory claim store with optimistic locking
#[derive(Default)]
pub struct InMemoryClaims {
    claims: Mutex<HashMap<IncapacityId, Incapacity>>,
    history: Mutex<Vec<StateTransitionRecord>>,
    documents: Mutex<Vec<Document>>,
}

impl InMemoryClaims {
    /// Inserts a claim without an audit record
    pub fn seed(&self, claim: &Incapacity) {
        self.claims.lock().unwrap().insert(claim.id, claim.clone());
    }

    /// Current stored row for a claim, panicking when absent
    pub fn stored(&self, id: IncapacityId) -> Incapacity {
        self.claims
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .expect("claim seeded")
    }

    fn push_history(&self, record: &StateTransitionRecord) {
        self.history.lock().unwrap().push(record.clone());
    }

    fn push_document(&self, document: &Document) {
        self.documents.lock().unwrap().push(document.clone());
    }

    /// Version-checked claim write shared by every mutating port call
    fn apply_save(
        &self,
        claim: &Incapacity,
        record: Option<&StateTransitionRecord>,
    ) -> Result<(), PortError> {
        let mut claims = self.claims.lock().unwrap();
        let existing = claims
            .get(&claim.id)
            .ok_or_else(|| PortError::not_found("Incapacity", claim.id))?;
        if existing.version != claim.version {
            return Err(PortError::conflict(format!(
                "claim {} version moved from {}",
                claim.id, claim.version
            )));
        }
        let mut updated = claim.clone();
        updated.version += 1;
        claims.insert(claim.id, updated);
        drop(claims);
        if let Some(record) = record {
            self.push_history(record);
        }
        Ok(())
    }
}

impl DomainPort for InMemoryClaims {}

#[async_trait]
impl IncapacityRepository for InMemoryClaims {
    async fn create(
        &self,
        claim: &Incapacity,
        record: &StateTransitionRecord,
        documents: &[Document],
    ) -> Result<(), PortError> {
        self.seed(claim);
        self.push_history(record);
        self.documents.lock().unwrap().extend_from_slice(documents);
        Ok(())
    }

    async fn get(&self, id: IncapacityId) -> Result<Incapacity, PortError> {
        self.claims
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Incapacity", id))
    }

    async fn exists(&self, id: IncapacityId) -> Result<bool, PortError> {
        Ok(self.claims.lock().unwrap().contains_key(&id))
    }

    async fn save(
        &self,
        claim: &Incapacity,
        record: Option<&StateTransitionRecord>,
    ) -> Result<(), PortError> {
        self.apply_save(claim, record)
    }

    async fn list_by_state(&self, state: IncapacityState) -> Result<Vec<Incapacity>, PortError> {
        Ok(self
            .claims
            .lock()
            .unwrap()
            .values()
            .filter(|claim| claim.state == state)
            .cloned()
            .collect())
    }

    async fn history(&self, id: IncapacityId) -> Result<Vec<StateTransitionRecord>, PortError> {
        let mut records: Vec<_> = self
            .history
            .lock()
            .unwrap()
            .iter()
            .filter(|record| record.incapacity_id == id)
            .cloned()
            .collect();
        records.reverse();
        Ok(records)
    }

    async fn list_documents(&self, id: IncapacityId) -> Result<Vec<Document>, PortError> {
        Ok(self
            .documents
            .lock()
            .unwrap()
            .iter()
            .filter(|document| document.incapacity_id == id)
            .cloned()
            .collect())
    }
}

/// In-memory request store, committing jointly against [`InMemoryClaims`]
pub struct InMemoryRequests {
    rows: Mutex<Vec<DocumentRequest>>,
    claims: Arc<InMemoryClaims>,
    fail_update_for: Mutex<HashSet<DocumentRequestId>>,
}

impl InMemoryRequests {
    pub fn new(claims: Arc<InMemoryClaims>) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            claims,
            fail_update_for: Mutex::new(HashSet::new()),
        }
    }

    /// Inserts a request row directly, bypassing the joint commit
    pub fn seed(&self, request: &DocumentRequest) {
        self.rows.lock().unwrap().push(request.clone());
    }

    /// Current stored row for a request, panicking when absent
    pub fn stored(&self, id: DocumentRequestId) -> DocumentRequest {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.id == id)
            .cloned()
            .expect("request stored")
    }

    /// Every stored request, in insertion order
    pub fn all(&self) -> Vec<DocumentRequest> {
        self.rows.lock().unwrap().clone()
    }

    /// Makes subsequent writes to one request fail with a connection error
    pub fn fail_update(&self, id: DocumentRequestId) {
        self.fail_update_for.lock().unwrap().insert(id);
    }

    fn replace(&self, request: &DocumentRequest) -> Result<(), PortError> {
        if self.fail_update_for.lock().unwrap().contains(&request.id) {
            return Err(PortError::connection("request row unavailable"));
        }
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|row| row.id == request.id) {
            Some(row) => {
                *row = request.clone();
                Ok(())
            }
            None => Err(PortError::not_found("DocumentRequest", request.id)),
        }
    }
}

impl DomainPort for InMemoryRequests {}

#[async_trait]
impl DocumentRequestRepository for InMemoryRequests {
    async fn create_batch(
        &self,
        requests: &[DocumentRequest],
        claim: &Incapacity,
        record: &StateTransitionRecord,
    ) -> Result<(), PortError> {
        self.claims.apply_save(claim, Some(record))?;
        self.rows.lock().unwrap().extend_from_slice(requests);
        Ok(())
    }

    async fn get(&self, id: DocumentRequestId) -> Result<DocumentRequest, PortError> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.id == id)
            .cloned()
            .ok_or_else(|| PortError::not_found("DocumentRequest", id))
    }

    async fn update(&self, request: &DocumentRequest) -> Result<(), PortError> {
        self.replace(request)
    }

    async fn update_with_audit(
        &self,
        request: &DocumentRequest,
        record: &StateTransitionRecord,
    ) -> Result<(), PortError> {
        self.replace(request)?;
        self.claims.push_history(record);
        Ok(())
    }

    async fn fulfill(
        &self,
        request: &DocumentRequest,
        document: &Document,
    ) -> Result<(), PortError> {
        self.replace(request)?;
        self.claims.push_document(document);
        Ok(())
    }

    async fn escalate(
        &self,
        request: &DocumentRequest,
        claim: &Incapacity,
        record: &StateTransitionRecord,
    ) -> Result<(), PortError> {
        self.claims.apply_save(claim, Some(record))?;
        self.replace(request)
    }

    async fn list_pending_by_claim(
        &self,
        claim: IncapacityId,
    ) -> Result<Vec<DocumentRequest>, PortError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.incapacity_id == claim && row.is_pending())
            .cloned()
            .collect())
    }

    async fn list_due(&self, today: NaiveDate) -> Result<Vec<DocumentRequest>, PortError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.is_pending() && row.deadline <= today)
            .cloned()
            .collect())
    }
}

/// In-memory notification store
#[derive(Default)]
pub struct InMemoryNotifications {
    rows: Mutex<Vec<Notification>>,
}

impl InMemoryNotifications {
    /// Every stored notification, in insertion order
    pub fn all(&self) -> Vec<Notification> {
        self.rows.lock().unwrap().clone()
    }

    /// Stored notifications addressed to one recipient, in insertion order
    pub fn for_recipient(&self, recipient: EmployeeId) -> Vec<Notification> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.recipient_id == recipient)
            .cloned()
            .collect()
    }
}

impl DomainPort for InMemoryNotifications {}

#[async_trait]
impl NotificationStore for InMemoryNotifications {
    async fn create(&self, notification: &Notification) -> Result<(), PortError> {
        self.rows.lock().unwrap().push(notification.clone());
        Ok(())
    }

    async fn update(&self, notification: &Notification) -> Result<(), PortError> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|row| row.id == notification.id) {
            Some(row) => {
                *row = notification.clone();
                Ok(())
            }
            None => Err(PortError::not_found("Notification", notification.id)),
        }
    }

    async fn get(&self, id: NotificationId) -> Result<Notification, PortError> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|row| row.id == id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Notification", id))
    }

    async fn list_by_recipient(
        &self,
        recipient: EmployeeId,
        filter: InboxFilter,
    ) -> Result<Vec<Notification>, PortError> {
        let rows = self.rows.lock().unwrap();
        let matching = rows
            .iter()
            .rev()
            .filter(|row| row.recipient_id == recipient)
            .filter(|row| !filter.unread_only || !row.is_read())
            .skip(filter.offset as usize)
            .take(filter.limit.map(|l| l as usize).unwrap_or(usize::MAX))
            .cloned()
            .collect();
        Ok(matching)
    }

    async fn unread_count(&self, recipient: EmployeeId) -> Result<u64, PortError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows
            .iter()
            .filter(|row| row.recipient_id == recipient && !row.is_read())
            .count() as u64)
    }
}

/// In-memory employee directory
#[derive(Default)]
pub struct InMemoryDirectory {
    people: HashMap<EmployeeId, Recipient>,
    reviewers: Vec<Recipient>,
    administrators: Vec<Recipient>,
}

impl InMemoryDirectory {
    /// Adds a plain employee
    pub fn with_person(mut self, recipient: Recipient) -> Self {
        self.people.insert(recipient.id, recipient);
        self
    }

    /// Adds an employee holding the reviewer role
    pub fn with_reviewer(mut self, recipient: Recipient) -> Self {
        self.people.insert(recipient.id, recipient.clone());
        self.reviewers.push(recipient);
        self
    }

    /// Adds an employee holding the administrator role
    pub fn with_administrator(mut self, recipient: Recipient) -> Self {
        self.people.insert(recipient.id, recipient.clone());
        self.administrators.push(recipient);
        self
    }
}

impl DomainPort for InMemoryDirectory {}

#[async_trait]
impl RecipientDirectory for InMemoryDirectory {
    async fn find(&self, id: EmployeeId) -> Result<Recipient, PortError> {
        self.people
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Recipient", id))
    }

    async fn reviewers(&self) -> Result<Vec<Recipient>, PortError> {
        Ok(self.reviewers.clone())
    }

    async fn administrators(&self) -> Result<Vec<Recipient>, PortError> {
        Ok(self.administrators.clone())
    }
}
