//! Comprehensive tests for the document request workflow
//!
//! Exercises request creation, the claimant response round-trip, the
//! one-shot extension, and the daily sweep end to end over in-memory
//! ports, with a recording notification sink standing in for dispatch.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use tokio::sync::watch;

use core_kernel::{
    BusinessCalendar, Clock, DocumentRequestId, DomainPort, EmployeeId, IncapacityId,
    NotificationId, PortError,
};
use domain_incapacity::{
    Actor, Document, DocumentKind, Incapacity, IncapacityRepository, IncapacityState, LeaveType,
    StateTransitionRecord, SubmittedDocument, TransitionSnapshot, MAX_DOCUMENT_BYTES,
};
use domain_notifications::{
    DeliveryResult, NotificationCategory, NotificationMessage, NotificationSink,
};
use domain_requests::{
    DocumentRequestRepository, DocumentRequestWorkflow, ReminderScheduler, RequestStatus,
    RequestedDocument, SchedulerConfig, WorkflowError, ESCALATION_REJECTION_REASON,
};

// ============================================================================
// Test Doubles
// ============================================================================

struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    fn at(date: NaiveDate) -> Self {
        Self {
            now: Mutex::new(midday(date)),
        }
    }

    fn advance_to(&self, date: NaiveDate) {
        *self.now.lock().unwrap() = midday(date);
    }
}

fn midday(date: NaiveDate) -> DateTime<Utc> {
    date.and_hms_opt(12, 0, 0).unwrap().and_utc()
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

#[derive(Default)]
struct InMemoryClaims {
    claims: Mutex<HashMap<IncapacityId, Incapacity>>,
    history: Mutex<Vec<StateTransitionRecord>>,
    documents: Mutex<Vec<Document>>,
}

impl InMemoryClaims {
    fn seed(&self, claim: &Incapacity) {
        self.claims.lock().unwrap().insert(claim.id, claim.clone());
    }

    fn stored(&self, id: IncapacityId) -> Incapacity {
        self.claims.lock().unwrap().get(&id).cloned().expect("claim seeded")
    }

    fn push_history(&self, record: &StateTransitionRecord) {
        self.history.lock().unwrap().push(record.clone());
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
            .filter(|c| c.state == state)
            .cloned()
            .collect())
    }

    async fn history(&self, id: IncapacityId) -> Result<Vec<StateTransitionRecord>, PortError> {
        let mut records: Vec<_> = self
            .history
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.incapacity_id == id)
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
            .filter(|d| d.incapacity_id == id)
            .cloned()
            .collect())
    }
}

struct InMemoryRequests {
    rows: Mutex<Vec<domain_requests::DocumentRequest>>,
    claims: Arc<InMemoryClaims>,
    fail_update_for: Mutex<HashSet<DocumentRequestId>>,
}

impl InMemoryRequests {
    fn new(claims: Arc<InMemoryClaims>) -> Arc<Self> {
        Arc::new(Self {
            rows: Mutex::new(Vec::new()),
            claims,
            fail_update_for: Mutex::new(HashSet::new()),
        })
    }

    fn stored(&self, id: DocumentRequestId) -> domain_requests::DocumentRequest {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .expect("request stored")
    }

    fn fail_update(&self, id: DocumentRequestId) {
        self.fail_update_for.lock().unwrap().insert(id);
    }

    fn replace(&self, request: &domain_requests::DocumentRequest) -> Result<(), PortError> {
        if self.fail_update_for.lock().unwrap().contains(&request.id) {
            return Err(PortError::connection("request row unavailable"));
        }
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|r| r.id == request.id) {
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
        requests: &[domain_requests::DocumentRequest],
        claim: &Incapacity,
        record: &StateTransitionRecord,
    ) -> Result<(), PortError> {
        self.claims.apply_save(claim, Some(record))?;
        self.rows.lock().unwrap().extend_from_slice(requests);
        Ok(())
    }

    async fn get(
        &self,
        id: DocumentRequestId,
    ) -> Result<domain_requests::DocumentRequest, PortError> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| PortError::not_found("DocumentRequest", id))
    }

    async fn update(&self, request: &domain_requests::DocumentRequest) -> Result<(), PortError> {
        self.replace(request)
    }

    async fn update_with_audit(
        &self,
        request: &domain_requests::DocumentRequest,
        record: &StateTransitionRecord,
    ) -> Result<(), PortError> {
        self.replace(request)?;
        self.claims.push_history(record);
        Ok(())
    }

    async fn fulfill(
        &self,
        request: &domain_requests::DocumentRequest,
        document: &Document,
    ) -> Result<(), PortError> {
        self.replace(request)?;
        self.claims.documents.lock().unwrap().push(document.clone());
        Ok(())
    }

    async fn escalate(
        &self,
        request: &domain_requests::DocumentRequest,
        claim: &Incapacity,
        record: &StateTransitionRecord,
    ) -> Result<(), PortError> {
        self.claims.apply_save(claim, Some(record))?;
        self.replace(request)
    }

    async fn list_pending_by_claim(
        &self,
        claim: IncapacityId,
    ) -> Result<Vec<domain_requests::DocumentRequest>, PortError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.incapacity_id == claim && r.is_pending())
            .cloned()
            .collect())
    }

    async fn list_due(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<domain_requests::DocumentRequest>, PortError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.is_pending() && r.deadline <= today)
            .cloned()
            .collect())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Audience {
    Claimant(EmployeeId),
    Reviewers,
    Operators,
}

/// Sink that records every message instead of dispatching it
struct RecordingSink {
    sent: Mutex<Vec<(Audience, NotificationMessage)>>,
    fail_deliveries: AtomicBool,
}

impl RecordingSink {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            fail_deliveries: AtomicBool::new(false),
        })
    }

    fn fail_all(&self) {
        self.fail_deliveries.store(true, Ordering::SeqCst);
    }

    fn count_category(&self, category: NotificationCategory) -> usize {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, m)| m.category == category)
            .count()
    }

    fn last_for(&self, audience: &Audience) -> Option<NotificationMessage> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(a, _)| a == audience)
            .map(|(_, m)| m.clone())
    }

    fn result(&self) -> DeliveryResult {
        if self.fail_deliveries.load(Ordering::SeqCst) {
            DeliveryResult::Failed {
                notification_id: None,
                attempts: 3,
                error: "transport exhausted".to_string(),
            }
        } else {
            DeliveryResult::Sent {
                notification_id: NotificationId::new_v7(),
                attempts: 1,
            }
        }
    }
}

impl DomainPort for RecordingSink {}

#[async_trait]
impl NotificationSink for RecordingSink {
    async fn notify_claimant(
        &self,
        claimant: EmployeeId,
        message: NotificationMessage,
    ) -> DeliveryResult {
        self.sent
            .lock()
            .unwrap()
            .push((Audience::Claimant(claimant), message));
        self.result()
    }

    async fn notify_reviewers(&self, message: NotificationMessage) -> Vec<DeliveryResult> {
        self.sent.lock().unwrap().push((Audience::Reviewers, message));
        vec![self.result()]
    }

    async fn alert_operators(&self, message: NotificationMessage) -> Vec<DeliveryResult> {
        self.sent.lock().unwrap().push((Audience::Operators, message));
        vec![self.result()]
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn create_test_claim(employee: EmployeeId) -> Incapacity {
    Incapacity::new(
        employee,
        LeaveType::GeneralIllness,
        date(2025, 10, 13),
        date(2025, 10, 17),
    )
    .unwrap()
}

struct Harness {
    claims: Arc<InMemoryClaims>,
    requests: Arc<InMemoryRequests>,
    sink: Arc<RecordingSink>,
    clock: Arc<FixedClock>,
    workflow: Arc<DocumentRequestWorkflow>,
}

/// Workflow over fresh in-memory ports, with today pinned to Monday
/// 2025-10-20 so the three-business-day deadline lands on Thursday the 23rd
fn harness() -> Harness {
    let claims = Arc::new(InMemoryClaims::default());
    let requests = InMemoryRequests::new(claims.clone());
    let sink = RecordingSink::new();
    let clock = Arc::new(FixedClock::at(date(2025, 10, 20)));
    let workflow = Arc::new(DocumentRequestWorkflow::new(
        claims.clone(),
        requests.clone(),
        sink.clone(),
        BusinessCalendar::with_standard_holidays(),
        clock.clone(),
    ));
    Harness {
        claims,
        requests,
        sink,
        clock,
        workflow,
    }
}

impl Harness {
    fn seed_claim(&self) -> Incapacity {
        let claim = create_test_claim(EmployeeId::new_v7());
        self.claims.seed(&claim);
        claim
    }

    async fn seed_requests(&self, kinds: &[DocumentKind]) -> (Incapacity, Vec<DocumentRequestId>) {
        let claim = self.seed_claim();
        let items: Vec<_> = kinds
            .iter()
            .map(|&kind| RequestedDocument::new(kind, None))
            .collect();
        let created = self
            .workflow
            .create_requests(claim.id, &items, &Actor::reviewer(EmployeeId::new_v7()))
            .await
            .unwrap();
        let ids = created.requests.iter().map(|r| r.id).collect();
        (claim, ids)
    }

    fn scheduler(&self) -> ReminderScheduler {
        ReminderScheduler::new(
            self.workflow.clone(),
            self.requests.clone(),
            self.clock.clone(),
        )
    }
}

fn pdf(kind: DocumentKind) -> SubmittedDocument {
    SubmittedDocument::new(kind, format!("{kind}.pdf"), 64 * 1024)
}

// ============================================================================
// Request Creation Tests
// ============================================================================

mod creation_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_requests_commits_batch_with_transition() {
        let h = harness();
        let claim = h.seed_claim();
        let items = [
            RequestedDocument::new(DocumentKind::MedicalCertificate, None),
            RequestedDocument::new(
                DocumentKind::Epicrisis,
                Some("include the discharge page".to_string()),
            ),
        ];

        let created = h
            .workflow
            .create_requests(claim.id, &items, &Actor::reviewer(EmployeeId::new_v7()))
            .await
            .unwrap();

        assert_eq!(created.requests.len(), 2);
        for request in &created.requests {
            assert_eq!(request.status, RequestStatus::Pending);
            assert_eq!(request.deadline, date(2025, 10, 23));
        }
        assert!(!created.notification.is_failure());

        let stored_claim = h.claims.stored(claim.id);
        assert_eq!(stored_claim.state, IncapacityState::DocumentationIncomplete);
        assert_eq!(stored_claim.version, 1);

        let history = h.claims.history(claim.id).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].note.as_deref(), Some("requested 2 document(s)"));

        let message = h
            .sink
            .last_for(&Audience::Claimant(claim.employee_id))
            .expect("claimant notified");
        assert_eq!(message.category, NotificationCategory::RequestCreated);
        assert!(message.body.contains("medical certificate"));
        assert!(message.body.contains("epicrisis: include the discharge page"));
        assert!(message.body.contains("Thursday 23 October 2025"));
    }

    #[tokio::test]
    async fn test_create_requests_requires_reviewer_role() {
        let h = harness();
        let claim = h.seed_claim();
        let items = [RequestedDocument::new(DocumentKind::Epicrisis, None)];

        let outcome = h
            .workflow
            .create_requests(claim.id, &items, &Actor::claimant(claim.employee_id))
            .await;

        assert!(matches!(outcome, Err(WorkflowError::RoleRequired { .. })));
        assert_eq!(
            h.claims.stored(claim.id).state,
            IncapacityState::PendingValidation
        );
        assert!(h.requests.rows.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_requests_requires_pending_validation_state() {
        let h = harness();
        let mut claim = create_test_claim(EmployeeId::new_v7());
        claim
            .transition(
                IncapacityState::DocumentationIncomplete,
                &TransitionSnapshot::default(),
            )
            .unwrap();
        h.claims.seed(&claim);

        let outcome = h
            .workflow
            .create_requests(
                claim.id,
                &[RequestedDocument::new(DocumentKind::Epicrisis, None)],
                &Actor::reviewer(EmployeeId::new_v7()),
            )
            .await;

        assert!(matches!(
            outcome,
            Err(WorkflowError::InvalidClaimState { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_requests_rejects_empty_and_duplicate_types() {
        let h = harness();
        let claim = h.seed_claim();
        let reviewer = Actor::reviewer(EmployeeId::new_v7());

        let empty = h.workflow.create_requests(claim.id, &[], &reviewer).await;
        assert!(matches!(empty, Err(WorkflowError::Validation(_))));

        let duplicated = h
            .workflow
            .create_requests(
                claim.id,
                &[
                    RequestedDocument::new(DocumentKind::Epicrisis, None),
                    RequestedDocument::new(DocumentKind::Epicrisis, None),
                ],
                &reviewer,
            )
            .await;
        assert!(matches!(duplicated, Err(WorkflowError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_requests_unknown_claim() {
        let h = harness();
        let outcome = h
            .workflow
            .create_requests(
                IncapacityId::new_v7(),
                &[RequestedDocument::new(DocumentKind::Epicrisis, None)],
                &Actor::reviewer(EmployeeId::new_v7()),
            )
            .await;

        assert!(matches!(outcome, Err(WorkflowError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_notification_failure_keeps_committed_requests() {
        let h = harness();
        let claim = h.seed_claim();
        h.sink.fail_all();

        let created = h
            .workflow
            .create_requests(
                claim.id,
                &[RequestedDocument::new(DocumentKind::Epicrisis, None)],
                &Actor::reviewer(EmployeeId::new_v7()),
            )
            .await
            .unwrap();

        assert!(created.notification.is_failure());
        assert_eq!(h.requests.rows.lock().unwrap().len(), 1);
        assert_eq!(
            h.claims.stored(claim.id).state,
            IncapacityState::DocumentationIncomplete
        );
    }
}

// ============================================================================
// Response Round-Trip Tests
// ============================================================================

mod response_tests {
    use super::*;

    #[tokio::test]
    async fn test_full_response_closes_round_trip() {
        let h = harness();
        let (claim, ids) = h
            .seed_requests(&[DocumentKind::MedicalCertificate, DocumentKind::Epicrisis])
            .await;

        let outcome = h
            .workflow
            .record_response(
                claim.id,
                &[
                    pdf(DocumentKind::MedicalCertificate),
                    pdf(DocumentKind::Epicrisis),
                ],
            )
            .await
            .unwrap();

        assert!(outcome.complete);
        assert_eq!(outcome.accepted.len(), 2);
        assert!(outcome.rejected.is_empty());
        assert!(outcome.still_pending.is_empty());

        for id in ids {
            let stored = h.requests.stored(id);
            assert_eq!(stored.status, RequestStatus::Fulfilled);
            assert!(stored.fulfilled_at.is_some());
        }

        let stored_claim = h.claims.stored(claim.id);
        assert_eq!(stored_claim.state, IncapacityState::PendingValidation);

        let documents = h.claims.list_documents(claim.id).await.unwrap();
        assert_eq!(documents.len(), 2);

        assert_eq!(
            h.sink.count_category(NotificationCategory::DocumentsComplete),
            1
        );
        let history = h.claims.history(claim.id).await.unwrap();
        assert_eq!(
            history[0].note.as_deref(),
            Some("all requested documents received")
        );
    }

    #[tokio::test]
    async fn test_partial_response_keeps_claim_incomplete() {
        let h = harness();
        let (claim, _) = h
            .seed_requests(&[DocumentKind::MedicalCertificate, DocumentKind::Epicrisis])
            .await;

        let outcome = h
            .workflow
            .record_response(claim.id, &[pdf(DocumentKind::MedicalCertificate)])
            .await
            .unwrap();

        assert!(!outcome.complete);
        assert_eq!(outcome.accepted, vec![DocumentKind::MedicalCertificate]);
        assert_eq!(outcome.still_pending.len(), 1);
        assert_eq!(outcome.still_pending[0].kind, DocumentKind::Epicrisis);

        assert_eq!(
            h.claims.stored(claim.id).state,
            IncapacityState::DocumentationIncomplete
        );
        assert_eq!(
            h.sink.count_category(NotificationCategory::DocumentsComplete),
            0
        );
    }

    #[tokio::test]
    async fn test_invalid_submission_rejected_without_hurting_siblings() {
        let h = harness();
        let (claim, _) = h
            .seed_requests(&[DocumentKind::MedicalCertificate, DocumentKind::Epicrisis])
            .await;

        let bad = SubmittedDocument::new(DocumentKind::MedicalCertificate, "scan.exe", 1024);
        let outcome = h
            .workflow
            .record_response(claim.id, &[bad, pdf(DocumentKind::Epicrisis)])
            .await
            .unwrap();

        assert!(!outcome.complete);
        assert_eq!(outcome.accepted, vec![DocumentKind::Epicrisis]);
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].kind, DocumentKind::MedicalCertificate);
        assert!(outcome.rejected[0].reason.contains("not accepted"));
        assert_eq!(
            outcome.still_pending[0].kind,
            DocumentKind::MedicalCertificate
        );
    }

    #[tokio::test]
    async fn test_oversized_submission_is_rejected() {
        let h = harness();
        let (claim, _) = h.seed_requests(&[DocumentKind::Epicrisis]).await;

        let huge = SubmittedDocument::new(
            DocumentKind::Epicrisis,
            "epicrisis.pdf",
            MAX_DOCUMENT_BYTES + 1,
        );
        let outcome = h.workflow.record_response(claim.id, &[huge]).await.unwrap();

        assert!(outcome.accepted.is_empty());
        assert_eq!(outcome.rejected.len(), 1);
        assert!(outcome.rejected[0].reason.contains("limit"));
    }

    #[tokio::test]
    async fn test_resubmitting_fulfilled_type_is_a_noop() {
        let h = harness();
        let (claim, ids) = h.seed_requests(&[DocumentKind::Epicrisis]).await;

        let first = h
            .workflow
            .record_response(claim.id, &[pdf(DocumentKind::Epicrisis)])
            .await
            .unwrap();
        assert!(first.complete);
        let fulfilled_at = h.requests.stored(ids[0]).fulfilled_at;

        let second = h
            .workflow
            .record_response(claim.id, &[pdf(DocumentKind::Epicrisis)])
            .await
            .unwrap();

        assert!(second.complete);
        assert!(second.accepted.is_empty());
        assert!(second.rejected.is_empty());
        assert_eq!(h.requests.stored(ids[0]).fulfilled_at, fulfilled_at);
        // the round-trip closed on the first call, no second reviewer notice
        assert_eq!(
            h.sink.count_category(NotificationCategory::DocumentsComplete),
            1
        );
    }

    #[tokio::test]
    async fn test_submission_for_unrequested_type_is_ignored() {
        let h = harness();
        let (claim, _) = h.seed_requests(&[DocumentKind::Epicrisis]).await;

        let outcome = h
            .workflow
            .record_response(claim.id, &[pdf(DocumentKind::Furips)])
            .await
            .unwrap();

        assert!(outcome.accepted.is_empty());
        assert!(outcome.rejected.is_empty());
        assert!(!outcome.complete);
    }
}

// ============================================================================
// Extension Tests
// ============================================================================

mod extension_tests {
    use super::*;

    #[tokio::test]
    async fn test_extension_moves_deadline_once() {
        let h = harness();
        let (claim, ids) = h.seed_requests(&[DocumentKind::Epicrisis]).await;
        let reviewer = Actor::reviewer(EmployeeId::new_v7());

        let extended = h
            .workflow
            .grant_extension(ids[0], "courier strike in the region", &reviewer)
            .await
            .unwrap();

        // Thursday the 23rd plus three business days is Tuesday the 28th
        assert_eq!(extended.deadline, date(2025, 10, 28));
        assert!(extended.extension_granted);
        assert_eq!(
            extended.extension_justification.as_deref(),
            Some("courier strike in the region")
        );

        let history = h.claims.history(claim.id).await.unwrap();
        let annotation = &history[0];
        assert_eq!(annotation.previous_state, Some(annotation.new_state));
        assert!(annotation
            .note
            .as_deref()
            .unwrap()
            .contains("extended to 2025-10-28"));

        let again = h
            .workflow
            .grant_extension(ids[0], "one more week please", &reviewer)
            .await;
        assert!(matches!(again, Err(WorkflowError::AlreadyExtended(_))));
        assert_eq!(h.requests.stored(ids[0]).deadline, date(2025, 10, 28));
    }

    #[tokio::test]
    async fn test_extension_preconditions() {
        let h = harness();
        let (claim, ids) = h.seed_requests(&[DocumentKind::Epicrisis]).await;

        let not_reviewer = h
            .workflow
            .grant_extension(ids[0], "reason", &Actor::claimant(claim.employee_id))
            .await;
        assert!(matches!(not_reviewer, Err(WorkflowError::RoleRequired { .. })));

        let blank = h
            .workflow
            .grant_extension(ids[0], "   ", &Actor::reviewer(EmployeeId::new_v7()))
            .await;
        assert!(matches!(blank, Err(WorkflowError::Validation(_))));

        h.workflow
            .record_response(claim.id, &[pdf(DocumentKind::Epicrisis)])
            .await
            .unwrap();
        let fulfilled = h
            .workflow
            .grant_extension(ids[0], "too late", &Actor::reviewer(EmployeeId::new_v7()))
            .await;
        assert!(matches!(fulfilled, Err(WorkflowError::NotPending { .. })));
    }
}

// ============================================================================
// Sweep Tests
// ============================================================================

mod sweep_tests {
    use super::*;

    #[tokio::test]
    async fn test_sweep_sends_first_reminders_on_due_date() {
        let h = harness();
        let (_, ids) = h
            .seed_requests(&[DocumentKind::MedicalCertificate, DocumentKind::Epicrisis])
            .await;
        h.clock.advance_to(date(2025, 10, 23));

        let stats = h.scheduler().run_once().await.unwrap();

        assert_eq!(stats.examined, 2);
        assert_eq!(stats.reminders_sent, 2);
        assert_eq!(stats.urgent_reminders_sent, 0);
        assert_eq!(stats.escalations_triggered, 0);
        assert_eq!(stats.errors, 0);
        for id in &ids {
            assert_eq!(h.requests.stored(*id).reminder_count, 1);
        }
        assert_eq!(h.sink.count_category(NotificationCategory::Reminder), 2);

        // same-day rerun finds the counters set and does nothing
        let rerun = h.scheduler().run_once().await.unwrap();
        assert_eq!(rerun.examined, 2);
        assert_eq!(rerun.actions_taken(), 0);
        assert_eq!(h.sink.count_category(NotificationCategory::Reminder), 2);
    }

    #[tokio::test]
    async fn test_sweep_sends_urgent_reminder_in_overdue_window() {
        let h = harness();
        let (claim, ids) = h.seed_requests(&[DocumentKind::Epicrisis]).await;

        h.clock.advance_to(date(2025, 10, 23));
        h.scheduler().run_once().await.unwrap();

        // Friday the 24th, one business day past due
        h.clock.advance_to(date(2025, 10, 24));
        let stats = h.scheduler().run_once().await.unwrap();

        assert_eq!(stats.urgent_reminders_sent, 1);
        assert_eq!(h.requests.stored(ids[0]).escalation_count, 1);
        let urgent = h
            .sink
            .last_for(&Audience::Claimant(claim.employee_id))
            .expect("claimant warned");
        assert_eq!(urgent.category, NotificationCategory::UrgentReminder);
        assert!(urgent.body.contains("1 business day(s) late"));

        // still inside the window but already warned
        h.clock.advance_to(date(2025, 10, 28));
        let silent = h.scheduler().run_once().await.unwrap();
        assert_eq!(silent.actions_taken(), 0);
    }

    #[tokio::test]
    async fn test_sweep_covers_backlog_after_downtime() {
        let h = harness();
        let (_, ids) = h.seed_requests(&[DocumentKind::Epicrisis]).await;

        // the process was down on the due date; two business days late now
        h.clock.advance_to(date(2025, 10, 27));
        let stats = h.scheduler().run_once().await.unwrap();

        assert_eq!(stats.reminders_sent, 0);
        assert_eq!(stats.urgent_reminders_sent, 1);
        assert_eq!(h.requests.stored(ids[0]).reminder_count, 0);
        assert_eq!(h.requests.stored(ids[0]).escalation_count, 1);
    }

    #[tokio::test]
    async fn test_sweep_escalates_past_grace_window() {
        let h = harness();
        let (claim, ids) = h.seed_requests(&[DocumentKind::Epicrisis]).await;

        // deadline Thursday 2025-10-23; 2025-11-04 is 7 business days past
        // due because Monday 2025-11-03 is a holiday
        h.clock.advance_to(date(2025, 11, 4));
        let stats = h.scheduler().run_once().await.unwrap();

        assert_eq!(stats.examined, 1);
        assert_eq!(stats.escalations_triggered, 1);
        assert_eq!(stats.errors, 0);

        let request = h.requests.stored(ids[0]);
        assert_eq!(request.status, RequestStatus::RequiresEscalation);

        let stored_claim = h.claims.stored(claim.id);
        assert_eq!(stored_claim.state, IncapacityState::Rejected);
        assert_eq!(
            stored_claim.rejection_reason.as_deref(),
            Some(ESCALATION_REJECTION_REASON)
        );

        assert_eq!(h.sink.count_category(NotificationCategory::Escalation), 1);
        assert_eq!(
            h.sink.last_for(&Audience::Reviewers).map(|m| m.category),
            Some(NotificationCategory::Escalation)
        );

        // the escalated request leaves the due set
        let rerun = h.scheduler().run_once().await.unwrap();
        assert_eq!(rerun.examined, 0);
    }

    #[tokio::test]
    async fn test_sweep_counts_exhausted_deliveries_as_errors() {
        let h = harness();
        h.seed_requests(&[DocumentKind::MedicalCertificate, DocumentKind::Epicrisis])
            .await;
        h.clock.advance_to(date(2025, 10, 23));
        h.sink.fail_all();

        let stats = h.scheduler().run_once().await.unwrap();

        // the reminders committed, their deliveries did not
        assert_eq!(stats.reminders_sent, 2);
        assert_eq!(stats.errors, 2);
    }

    #[tokio::test]
    async fn test_sweep_isolates_item_failures() {
        let h = harness();
        let (_, ids) = h
            .seed_requests(&[DocumentKind::MedicalCertificate, DocumentKind::Epicrisis])
            .await;
        h.clock.advance_to(date(2025, 10, 23));
        h.requests.fail_update(ids[0]);

        let stats = h.scheduler().run_once().await.unwrap();

        assert_eq!(stats.examined, 2);
        assert_eq!(stats.reminders_sent, 1);
        assert_eq!(stats.errors, 1);
        assert_eq!(h.requests.stored(ids[1]).reminder_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_shutdown_signal() {
        let h = harness();
        let scheduler = Arc::new(h.scheduler().with_config(SchedulerConfig {
            sweep_on_start: false,
            ..SchedulerConfig::default()
        }));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn({
            let scheduler = scheduler.clone();
            async move { scheduler.run(shutdown_rx).await }
        });

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();
    }
}

// ============================================================================
// Query Tests
// ============================================================================

mod query_tests {
    use super::*;

    #[tokio::test]
    async fn test_claim_history_is_newest_first() {
        let h = harness();
        let (claim, ids) = h.seed_requests(&[DocumentKind::Epicrisis]).await;
        h.workflow
            .grant_extension(ids[0], "mail delay", &Actor::reviewer(EmployeeId::new_v7()))
            .await
            .unwrap();

        let history = h.workflow.claim_history(claim.id).await.unwrap();

        assert_eq!(history.len(), 2);
        assert!(history[0].note.as_deref().unwrap().contains("extended"));
        assert_eq!(history[1].note.as_deref(), Some("requested 1 document(s)"));
    }

    #[tokio::test]
    async fn test_claim_history_unknown_claim() {
        let h = harness();
        let outcome = h.workflow.claim_history(IncapacityId::new_v7()).await;
        assert!(matches!(outcome, Err(WorkflowError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_pending_requests_lists_open_only() {
        let h = harness();
        let (claim, _) = h
            .seed_requests(&[DocumentKind::MedicalCertificate, DocumentKind::Epicrisis])
            .await;
        h.workflow
            .record_response(claim.id, &[pdf(DocumentKind::MedicalCertificate)])
            .await
            .unwrap();

        let pending = h.workflow.pending_requests(claim.id).await.unwrap();

        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].kind, DocumentKind::Epicrisis);
    }
}
