//! Notification dispatch with bounded retries
//!
//! The dispatcher always persists the notification before the first
//! delivery attempt, so an unreachable transport can never lose the
//! message. External delivery is retried a fixed number of times with a
//! fixed delay; the outcome lands on the notification row either way and
//! never unwinds the caller's domain commit.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, warn};
use validator::ValidateEmail;

use core_kernel::{DocumentRequestId, DomainPort, EmployeeId, NotificationId};

use crate::notification::{Notification, NotificationCategory};
use crate::ports::NotificationStore;
use crate::recipient::{Recipient, RecipientDirectory};
use crate::transport::MailTransport;

/// Retry behavior for external delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Transport attempts before giving up
    pub max_attempts: u32,
    /// Pause between attempts
    pub delay: Duration,
    /// Upper bound on a single transport call
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(5),
            attempt_timeout: Duration::from_secs(10),
        }
    }
}

/// Outcome of dispatching one notification
#[derive(Debug, Clone)]
pub enum DeliveryResult {
    /// Transport accepted the message
    Sent {
        notification_id: NotificationId,
        attempts: u32,
    },
    /// Recorded in-app only; the recipient has no usable address
    Internal { notification_id: NotificationId },
    /// Attempts exhausted, or the notification could not be recorded
    Failed {
        notification_id: Option<NotificationId>,
        attempts: u32,
        error: String,
    },
    /// Handed to a background queue; the outcome lands on the row later
    Queued,
}

impl DeliveryResult {
    pub fn is_failure(&self) -> bool {
        matches!(self, DeliveryResult::Failed { .. })
    }
}

/// Persist-then-retry delivery of a single notification
#[derive(Clone)]
pub struct NotificationDispatcher {
    store: Arc<dyn NotificationStore>,
    transport: Arc<dyn MailTransport>,
    policy: RetryPolicy,
}

impl NotificationDispatcher {
    pub fn new(
        store: Arc<dyn NotificationStore>,
        transport: Arc<dyn MailTransport>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            store,
            transport,
            policy,
        }
    }

    /// Records and delivers one notification
    ///
    /// A recipient without a well-formed address gets an internal-only
    /// notification: the row is marked sent immediately and the transport
    /// is never invoked. Otherwise delivery is attempted up to
    /// `max_attempts` times with `delay` between attempts; exhaustion marks
    /// the row failed with the last error appended to the body.
    pub async fn send(
        &self,
        recipient: &Recipient,
        subject: &str,
        body: &str,
        category: NotificationCategory,
        related_request: Option<DocumentRequestId>,
    ) -> DeliveryResult {
        let mut notification =
            Notification::new(recipient.id, category, subject, body, related_request);

        if let Err(err) = self.store.create(&notification).await {
            error!(
                recipient = %recipient.id,
                category = %category,
                error = %err,
                "could not record notification"
            );
            return DeliveryResult::Failed {
                notification_id: None,
                attempts: 0,
                error: err.to_string(),
            };
        }

        let address = match &recipient.email {
            Some(address) if address.validate_email() => address.clone(),
            _ => {
                notification.mark_sent(0);
                self.persist(&notification).await;
                warn!(
                    recipient = %recipient.id,
                    notification_id = %notification.id,
                    "no valid address, recorded internal-only notification"
                );
                return DeliveryResult::Internal {
                    notification_id: notification.id,
                };
            }
        };

        let mut last_error = String::new();
        for attempt in 1..=self.policy.max_attempts {
            let outcome = tokio::time::timeout(
                self.policy.attempt_timeout,
                self.transport.deliver(&address, subject, &notification.body),
            )
            .await;

            match outcome {
                Ok(Ok(())) => {
                    notification.mark_sent(attempt);
                    self.persist(&notification).await;
                    return DeliveryResult::Sent {
                        notification_id: notification.id,
                        attempts: attempt,
                    };
                }
                Ok(Err(err)) => {
                    last_error = err.to_string();
                }
                Err(_) => {
                    last_error = format!(
                        "transport timed out after {}ms",
                        self.policy.attempt_timeout.as_millis()
                    );
                }
            }

            warn!(
                notification_id = %notification.id,
                attempt,
                max_attempts = self.policy.max_attempts,
                error = %last_error,
                "delivery attempt failed"
            );
            if attempt < self.policy.max_attempts {
                tokio::time::sleep(self.policy.delay).await;
            }
        }

        notification.record_failure(self.policy.max_attempts, &last_error);
        self.persist(&notification).await;
        DeliveryResult::Failed {
            notification_id: Some(notification.id),
            attempts: self.policy.max_attempts,
            error: last_error,
        }
    }

    /// Records an in-app notification without touching the transport
    ///
    /// The row goes straight to sent with zero attempts, same as the
    /// invalid-address downgrade in [`send`](Self::send).
    pub async fn record_internal(
        &self,
        recipient: &Recipient,
        subject: &str,
        body: &str,
        category: NotificationCategory,
        related_request: Option<DocumentRequestId>,
    ) -> DeliveryResult {
        let mut notification =
            Notification::new(recipient.id, category, subject, body, related_request);
        if let Err(err) = self.store.create(&notification).await {
            error!(
                recipient = %recipient.id,
                category = %category,
                error = %err,
                "could not record notification"
            );
            return DeliveryResult::Failed {
                notification_id: None,
                attempts: 0,
                error: err.to_string(),
            };
        }
        notification.mark_sent(0);
        self.persist(&notification).await;
        DeliveryResult::Internal {
            notification_id: notification.id,
        }
    }

    /// Row updates must not mask the delivery outcome; failures are logged
    /// and the stale row is left for reconciliation.
    async fn persist(&self, notification: &Notification) {
        if let Err(err) = self.store.update(notification).await {
            error!(
                notification_id = %notification.id,
                state = %notification.state,
                error = %err,
                "could not persist notification state"
            );
        }
    }
}

/// Channel-independent content for one notification
#[derive(Debug, Clone)]
pub struct NotificationMessage {
    pub subject: String,
    pub body: String,
    pub category: NotificationCategory,
    pub related_request: Option<DocumentRequestId>,
}

impl NotificationMessage {
    pub fn new(
        category: NotificationCategory,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            category,
            related_request: None,
        }
    }

    pub fn about_request(mut self, id: DocumentRequestId) -> Self {
        self.related_request = Some(id);
        self
    }
}

/// Role-addressed notification delivery
///
/// Workflows talk to this seam; implementations decide whether dispatch is
/// awaited inline or handed to a queue.
#[async_trait]
pub trait NotificationSink: DomainPort {
    /// One message to the claimant
    async fn notify_claimant(
        &self,
        claimant: EmployeeId,
        message: NotificationMessage,
    ) -> DeliveryResult;

    /// Fans out to every reviewer; when none exist, the administrators are
    /// alerted instead with an urgent subject
    async fn notify_reviewers(&self, message: NotificationMessage) -> Vec<DeliveryResult>;

    /// Operator alert to every administrator
    async fn alert_operators(&self, message: NotificationMessage) -> Vec<DeliveryResult>;
}

/// Sink that resolves recipients and awaits delivery inline
pub struct NotificationService {
    directory: Arc<dyn RecipientDirectory>,
    dispatcher: NotificationDispatcher,
}

impl NotificationService {
    pub fn new(directory: Arc<dyn RecipientDirectory>, dispatcher: NotificationDispatcher) -> Self {
        Self {
            directory,
            dispatcher,
        }
    }

    /// Delivers to an already-resolved recipient
    ///
    /// An exhausted delivery is reported to the administrators as an
    /// internal-only operator alert; failed operator alerts are not
    /// re-surfaced.
    pub async fn deliver(
        &self,
        recipient: &Recipient,
        message: &NotificationMessage,
    ) -> DeliveryResult {
        let result = self
            .dispatcher
            .send(
                recipient,
                &message.subject,
                &message.body,
                message.category,
                message.related_request,
            )
            .await;
        if result.is_failure() && message.category != NotificationCategory::OperatorAlert {
            self.surface_failure(recipient, message, &result).await;
        }
        result
    }

    async fn surface_failure(
        &self,
        recipient: &Recipient,
        message: &NotificationMessage,
        result: &DeliveryResult,
    ) {
        let (attempts, error) = match result {
            DeliveryResult::Failed {
                attempts, error, ..
            } => (attempts, error),
            _ => return,
        };
        let administrators = match self.directory.administrators().await {
            Ok(administrators) => administrators,
            Err(err) => {
                error!(error = %err, "administrator lookup failed");
                return;
            }
        };
        let body = format!(
            "Delivery of \"{}\" to {} failed after {} attempt(s): {}",
            message.subject, recipient.display_name, attempts, error
        );
        for administrator in &administrators {
            self.dispatcher
                .record_internal(
                    administrator,
                    "Notification delivery failed",
                    &body,
                    NotificationCategory::OperatorAlert,
                    message.related_request,
                )
                .await;
        }
    }

    async fn fan_out(
        &self,
        recipients: Vec<Recipient>,
        message: &NotificationMessage,
    ) -> Vec<DeliveryResult> {
        let mut results = Vec::with_capacity(recipients.len());
        for recipient in &recipients {
            results.push(self.deliver(recipient, message).await);
        }
        results
    }
}

impl DomainPort for NotificationService {}

#[async_trait]
impl NotificationSink for NotificationService {
    async fn notify_claimant(
        &self,
        claimant: EmployeeId,
        message: NotificationMessage,
    ) -> DeliveryResult {
        let recipient = match self.directory.find(claimant).await {
            Ok(recipient) => recipient,
            Err(err) => {
                error!(claimant = %claimant, error = %err, "claimant not resolvable");
                return DeliveryResult::Failed {
                    notification_id: None,
                    attempts: 0,
                    error: err.to_string(),
                };
            }
        };
        self.deliver(&recipient, &message).await
    }

    async fn notify_reviewers(&self, message: NotificationMessage) -> Vec<DeliveryResult> {
        let reviewers = match self.directory.reviewers().await {
            Ok(reviewers) => reviewers,
            Err(err) => {
                error!(error = %err, "reviewer lookup failed");
                return vec![DeliveryResult::Failed {
                    notification_id: None,
                    attempts: 0,
                    error: err.to_string(),
                }];
            }
        };

        if reviewers.is_empty() {
            warn!("no reviewers configured, alerting administrators instead");
            let urgent = NotificationMessage {
                subject: format!("URGENT: {}", message.subject),
                category: NotificationCategory::OperatorAlert,
                ..message
            };
            return self.alert_operators(urgent).await;
        }

        self.fan_out(reviewers, &message).await
    }

    async fn alert_operators(&self, message: NotificationMessage) -> Vec<DeliveryResult> {
        let administrators = match self.directory.administrators().await {
            Ok(administrators) => administrators,
            Err(err) => {
                error!(error = %err, "administrator lookup failed");
                return vec![DeliveryResult::Failed {
                    notification_id: None,
                    attempts: 0,
                    error: err.to_string(),
                }];
            }
        };
        self.fan_out(administrators, &message).await
    }
}
