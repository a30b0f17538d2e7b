//! Document request workflow
//!
//! The write side of the request lifecycle: reviewers open requests,
//! claimants answer them, reviewers may extend one deadline once, and the
//! daily sweep executes whatever the escalation policy decides. Domain
//! state always commits before any notification is attempted; delivery
//! outcomes travel back to the caller in the operation result and never
//! unwind a commit.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use core_kernel::{BusinessCalendar, Clock, DocumentRequestId, EmployeeId, IncapacityId};
use domain_incapacity::{
    Actor, Document, DocumentKind, Incapacity, IncapacityRepository, IncapacityState, Role,
    StateTransitionRecord, SubmittedDocument, TransitionSnapshot,
};
use domain_notifications::{DeliveryResult, NotificationSink};

use crate::error::WorkflowError;
use crate::escalation::{EscalationAction, EscalationPolicy};
use crate::messages;
use crate::ports::DocumentRequestRepository;
use crate::request::{DocumentRequest, RequestedDocument};

/// Rejection reason written on the claim when a request escalates
pub const ESCALATION_REJECTION_REASON: &str = "documents not delivered within deadline";

/// Tunable knobs of the request workflow
#[derive(Debug, Clone)]
pub struct WorkflowConfig {
    /// Business days a claimant gets to answer a new request
    pub deadline_business_days: u32,
    /// Business days added by the one-time extension
    pub extension_business_days: u32,
    /// Actor recorded on sweep-driven transitions
    pub system_actor: EmployeeId,
    pub escalation: EscalationPolicy,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            deadline_business_days: 3,
            extension_business_days: 3,
            system_actor: EmployeeId::from_uuid(Uuid::nil()),
            escalation: EscalationPolicy::default(),
        }
    }
}

/// Result of `create_requests`
#[derive(Debug)]
pub struct CreatedRequests {
    pub requests: Vec<DocumentRequest>,
    /// Outcome of the post-commit claimant notification
    pub notification: DeliveryResult,
}

/// One submitted document the workflow refused
#[derive(Debug, Clone)]
pub struct RejectedDocument {
    pub kind: DocumentKind,
    pub reason: String,
}

/// Result of `record_response`
#[derive(Debug)]
pub struct ResponseOutcome {
    /// True when no request on the claim is left pending
    pub complete: bool,
    pub accepted: Vec<DocumentKind>,
    pub rejected: Vec<RejectedDocument>,
    pub still_pending: Vec<DocumentRequest>,
    /// Reviewer notifications fired when the round-trip closed
    pub notifications: Vec<DeliveryResult>,
}

/// Result of executing one sweep action
#[derive(Debug)]
pub struct ActionOutcome {
    pub action: EscalationAction,
    pub deliveries: Vec<DeliveryResult>,
}

impl ActionOutcome {
    fn none() -> Self {
        Self {
            action: EscalationAction::None,
            deliveries: Vec::new(),
        }
    }

    pub fn delivery_failed(&self) -> bool {
        self.deliveries.iter().any(DeliveryResult::is_failure)
    }
}

/// Orchestrates document requests around the claim state machine
pub struct DocumentRequestWorkflow {
    claims: Arc<dyn IncapacityRepository>,
    requests: Arc<dyn DocumentRequestRepository>,
    notifications: Arc<dyn NotificationSink>,
    calendar: BusinessCalendar,
    clock: Arc<dyn Clock>,
    config: WorkflowConfig,
}

impl DocumentRequestWorkflow {
    pub fn new(
        claims: Arc<dyn IncapacityRepository>,
        requests: Arc<dyn DocumentRequestRepository>,
        notifications: Arc<dyn NotificationSink>,
        calendar: BusinessCalendar,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            claims,
            requests,
            notifications,
            calendar,
            clock,
            config: WorkflowConfig::default(),
        }
    }

    pub fn with_config(mut self, config: WorkflowConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Opens one request per document type against a claim
    ///
    /// Only a reviewer may call this, only while the claim is awaiting
    /// validation. The requests, the claim's move to
    /// `DocumentationIncomplete`, and the audit record commit atomically;
    /// the claimant notification happens after the commit and its outcome
    /// is returned, not raised.
    pub async fn create_requests(
        &self,
        incapacity_id: IncapacityId,
        items: &[RequestedDocument],
        actor: &Actor,
    ) -> Result<CreatedRequests, WorkflowError> {
        self.require_reviewer(actor)?;
        if items.is_empty() {
            return Err(WorkflowError::validation(
                "at least one document type must be requested",
            ));
        }
        let mut seen = HashSet::new();
        for item in items {
            if !seen.insert(item.kind) {
                return Err(WorkflowError::validation(format!(
                    "document type {} requested twice",
                    item.kind
                )));
            }
        }

        let mut claim = self.fetch_claim(incapacity_id).await?;
        if claim.state != IncapacityState::PendingValidation {
            return Err(WorkflowError::InvalidClaimState {
                expected: IncapacityState::PendingValidation,
                actual: claim.state,
            });
        }

        let deadline = self
            .calendar
            .add_business_days(self.clock.today(), self.config.deadline_business_days);
        let requests: Vec<DocumentRequest> = items
            .iter()
            .map(|item| DocumentRequest::new(claim.id, item.kind, item.note.clone(), deadline))
            .collect();

        let previous = claim.state;
        claim.transition(
            IncapacityState::DocumentationIncomplete,
            &TransitionSnapshot::default(),
        )?;
        let record = StateTransitionRecord::change(
            claim.id,
            previous,
            claim.state,
            actor.id,
            Some(format!("requested {} document(s)", requests.len())),
        );
        self.requests
            .create_batch(&requests, &claim, &record)
            .await?;
        info!(
            claim_id = %claim.id,
            count = requests.len(),
            deadline = %deadline,
            "document requests created"
        );

        let message = messages::request_created(&claim, &requests, deadline);
        let notification = self
            .notifications
            .notify_claimant(claim.employee_id, message)
            .await;
        if notification.is_failure() {
            warn!(claim_id = %claim.id, "claimant notification failed after request creation");
        }

        Ok(CreatedRequests {
            requests,
            notification,
        })
    }

    /// Applies a claimant's submitted documents to the open requests
    ///
    /// Each submission is validated on its own; a bad file rejects that
    /// submission without touching its siblings. Types with no open
    /// request, including already-fulfilled ones, are skipped silently,
    /// which makes resubmission a no-op. When the last open request closes,
    /// the claim returns to `PendingValidation` and the reviewers are told
    /// the documentation is complete.
    pub async fn record_response(
        &self,
        incapacity_id: IncapacityId,
        submissions: &[SubmittedDocument],
    ) -> Result<ResponseOutcome, WorkflowError> {
        let mut claim = self.fetch_claim(incapacity_id).await?;
        let pending = self.requests.list_pending_by_claim(claim.id).await?;

        let mut accepted = Vec::new();
        let mut rejected = Vec::new();
        let mut fulfilled_now: HashSet<DocumentKind> = HashSet::new();

        for submission in submissions {
            if fulfilled_now.contains(&submission.kind) {
                continue;
            }
            let Some(request) = pending.iter().find(|r| r.kind == submission.kind) else {
                debug!(kind = %submission.kind, "no open request for submitted type, ignoring");
                continue;
            };
            if let Err(err) = submission.validate() {
                rejected.push(RejectedDocument {
                    kind: submission.kind,
                    reason: err.to_string(),
                });
                continue;
            }
            let mut request = request.clone();
            request.fulfill(self.clock.now())?;
            let document = Document::new(claim.id, submission);
            self.requests.fulfill(&request, &document).await?;
            fulfilled_now.insert(submission.kind);
            accepted.push(submission.kind);
        }

        let still_pending = self.requests.list_pending_by_claim(claim.id).await?;
        let complete = still_pending.is_empty();

        let mut notifications = Vec::new();
        if complete && claim.state == IncapacityState::DocumentationIncomplete {
            let previous = claim.state;
            claim.transition(
                IncapacityState::PendingValidation,
                &TransitionSnapshot::default(),
            )?;
            let record = StateTransitionRecord::change(
                claim.id,
                previous,
                claim.state,
                claim.employee_id,
                Some("all requested documents received".to_string()),
            );
            self.claims.save(&claim, Some(&record)).await?;
            info!(claim_id = %claim.id, "documentation round-trip closed");
            notifications = self
                .notifications
                .notify_reviewers(messages::documents_complete(&claim))
                .await;
        }

        Ok(ResponseOutcome {
            complete,
            accepted,
            rejected,
            still_pending,
            notifications,
        })
    }

    /// Grants the one allowed deadline extension on a pending request
    ///
    /// The new deadline is counted in business days from the current one,
    /// and the parent claim gets a same-state audit note.
    pub async fn grant_extension(
        &self,
        request_id: DocumentRequestId,
        justification: &str,
        actor: &Actor,
    ) -> Result<DocumentRequest, WorkflowError> {
        self.require_reviewer(actor)?;
        let justification = justification.trim();
        if justification.is_empty() {
            return Err(WorkflowError::validation(
                "an extension needs a justification",
            ));
        }

        let mut request = self.fetch_request(request_id).await?;
        let claim = self.fetch_claim(request.incapacity_id).await?;
        let new_deadline = self
            .calendar
            .add_business_days(request.deadline, self.config.extension_business_days);
        request.grant_extension(new_deadline, justification)?;

        let record = StateTransitionRecord::annotation(
            claim.id,
            claim.state,
            actor.id,
            format!(
                "deadline for {} extended to {new_deadline}: {justification}",
                request.kind.display_name()
            ),
        );
        self.requests.update_with_audit(&request, &record).await?;
        info!(request_id = %request.id, %new_deadline, "extension granted");

        Ok(request)
    }

    /// Sweep decision for one request as of `today`
    pub fn assess(&self, request: &DocumentRequest, today: chrono::NaiveDate) -> EscalationAction {
        self.config.escalation.assess(request, today, &self.calendar)
    }

    /// Executes one sweep decision against a due request
    ///
    /// Reminder counters commit before the notification goes out, so a
    /// crashed dispatch never re-sends on the next sweep. Escalation
    /// commits the request, the claim rejection, and the audit record in
    /// one transaction before the reviewers are told.
    pub async fn apply(
        &self,
        mut request: DocumentRequest,
        action: EscalationAction,
    ) -> Result<ActionOutcome, WorkflowError> {
        match action {
            EscalationAction::None => Ok(ActionOutcome::none()),
            EscalationAction::FirstReminder => {
                let claim = self.fetch_claim(request.incapacity_id).await?;
                request.record_reminder();
                self.requests.update(&request).await?;
                let delivery = self
                    .notifications
                    .notify_claimant(claim.employee_id, messages::first_reminder(&request))
                    .await;
                Ok(ActionOutcome {
                    action,
                    deliveries: vec![delivery],
                })
            }
            EscalationAction::UrgentReminder => {
                let claim = self.fetch_claim(request.incapacity_id).await?;
                request.record_urgent_reminder();
                self.requests.update(&request).await?;
                let overdue = self
                    .calendar
                    .business_days_between(request.deadline, self.clock.today());
                let delivery = self
                    .notifications
                    .notify_claimant(
                        claim.employee_id,
                        messages::urgent_reminder(&request, overdue),
                    )
                    .await;
                Ok(ActionOutcome {
                    action,
                    deliveries: vec![delivery],
                })
            }
            EscalationAction::Escalate => {
                let mut claim = self.fetch_claim(request.incapacity_id).await?;
                request.escalate()?;
                let previous = claim.state;
                let snapshot = TransitionSnapshot {
                    rejection_reason: Some(ESCALATION_REJECTION_REASON.to_string()),
                    ..TransitionSnapshot::default()
                };
                claim.transition(IncapacityState::Rejected, &snapshot)?;
                let record = StateTransitionRecord::change(
                    claim.id,
                    previous,
                    claim.state,
                    self.config.system_actor,
                    Some(format!(
                        "escalated: {} never delivered",
                        request.kind.display_name()
                    )),
                );
                self.requests.escalate(&request, &claim, &record).await?;
                warn!(
                    claim_id = %claim.id,
                    request_id = %request.id,
                    "claim rejected after missed deadline"
                );
                let deliveries = self
                    .notifications
                    .notify_reviewers(messages::escalation_notice(&claim, &request))
                    .await;
                Ok(ActionOutcome { action, deliveries })
            }
        }
    }

    /// Audit trail of a claim, newest first
    pub async fn claim_history(
        &self,
        incapacity_id: IncapacityId,
    ) -> Result<Vec<StateTransitionRecord>, WorkflowError> {
        if !self.claims.exists(incapacity_id).await? {
            return Err(WorkflowError::NotFound(format!("claim {incapacity_id}")));
        }
        Ok(self.claims.history(incapacity_id).await?)
    }

    /// Open requests on a claim, oldest first
    pub async fn pending_requests(
        &self,
        incapacity_id: IncapacityId,
    ) -> Result<Vec<DocumentRequest>, WorkflowError> {
        Ok(self.requests.list_pending_by_claim(incapacity_id).await?)
    }

    fn require_reviewer(&self, actor: &Actor) -> Result<(), WorkflowError> {
        if actor.is_reviewer() {
            Ok(())
        } else {
            Err(WorkflowError::role_required(
                actor.id,
                Role::Reviewer.as_str(),
            ))
        }
    }

    async fn fetch_claim(&self, id: IncapacityId) -> Result<Incapacity, WorkflowError> {
        self.claims.get(id).await.map_err(|err| {
            if err.is_not_found() {
                WorkflowError::NotFound(format!("claim {id}"))
            } else {
                err.into()
            }
        })
    }

    async fn fetch_request(
        &self,
        id: DocumentRequestId,
    ) -> Result<DocumentRequest, WorkflowError> {
        self.requests.get(id).await.map_err(|err| {
            if err.is_not_found() {
                WorkflowError::NotFound(format!("request {id}"))
            } else {
                err.into()
            }
        })
    }
}
