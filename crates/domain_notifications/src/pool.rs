//! Bounded background dispatch
//!
//! `DispatchQueue` is the fire-and-forget face of the dispatcher: callers
//! that must not block on mail delivery enqueue and move on, and a
//! `DispatchWorker` drains the queue with a cap on concurrent transport
//! calls. A full queue is reported to the caller, never silently dropped.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch, Semaphore};
use tracing::{debug, error, info, warn};

use core_kernel::{DomainPort, EmployeeId};

use crate::dispatcher::{
    DeliveryResult, NotificationDispatcher, NotificationMessage, NotificationService,
    NotificationSink,
};
use crate::notification::NotificationCategory;
use crate::recipient::{Recipient, RecipientDirectory};

struct DispatchJob {
    recipient: Recipient,
    message: NotificationMessage,
}

/// Queueing sink backed by a bounded channel
pub struct DispatchQueue {
    directory: Arc<dyn RecipientDirectory>,
    sender: mpsc::Sender<DispatchJob>,
}

impl DispatchQueue {
    /// Builds the queue and its worker half
    ///
    /// `capacity` bounds the number of waiting jobs and `max_in_flight`
    /// bounds concurrent transport calls once the worker runs.
    pub fn bounded(
        directory: Arc<dyn RecipientDirectory>,
        dispatcher: NotificationDispatcher,
        capacity: usize,
        max_in_flight: u32,
    ) -> (Self, DispatchWorker) {
        let (sender, receiver) = mpsc::channel(capacity);
        let service = Arc::new(NotificationService::new(Arc::clone(&directory), dispatcher));
        let queue = Self { directory, sender };
        let worker = DispatchWorker {
            receiver,
            service,
            limiter: Arc::new(Semaphore::new(max_in_flight as usize)),
            max_in_flight,
        };
        (queue, worker)
    }

    fn enqueue(&self, recipient: Recipient, message: NotificationMessage) -> DeliveryResult {
        match self.sender.try_send(DispatchJob { recipient, message }) {
            Ok(()) => DeliveryResult::Queued,
            Err(err) => {
                error!(error = %err, "dispatch queue rejected notification");
                DeliveryResult::Failed {
                    notification_id: None,
                    attempts: 0,
                    error: "dispatch queue full or closed".to_string(),
                }
            }
        }
    }
}

impl DomainPort for DispatchQueue {}

#[async_trait]
impl NotificationSink for DispatchQueue {
    async fn notify_claimant(
        &self,
        claimant: EmployeeId,
        message: NotificationMessage,
    ) -> DeliveryResult {
        match self.directory.find(claimant).await {
            Ok(recipient) => self.enqueue(recipient, message),
            Err(err) => {
                error!(claimant = %claimant, error = %err, "claimant not resolvable");
                DeliveryResult::Failed {
                    notification_id: None,
                    attempts: 0,
                    error: err.to_string(),
                }
            }
        }
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

        reviewers
            .into_iter()
            .map(|recipient| self.enqueue(recipient, message.clone()))
            .collect()
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
        administrators
            .into_iter()
            .map(|recipient| self.enqueue(recipient, message.clone()))
            .collect()
    }
}

/// Drains the dispatch queue with bounded concurrency
pub struct DispatchWorker {
    receiver: mpsc::Receiver<DispatchJob>,
    service: Arc<NotificationService>,
    limiter: Arc<Semaphore>,
    max_in_flight: u32,
}

impl DispatchWorker {
    /// Runs until shutdown is signalled or every queue handle is dropped,
    /// then finishes buffered jobs and waits for in-flight deliveries.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        info!(max_in_flight = self.max_in_flight, "dispatch worker started");
        loop {
            tokio::select! {
                job = self.receiver.recv() => match job {
                    Some(job) => self.spawn(job).await,
                    None => break,
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        while let Ok(job) = self.receiver.try_recv() {
            self.spawn(job).await;
        }
        let _ = self.limiter.acquire_many(self.max_in_flight).await;
        info!("dispatch worker drained");
    }

    async fn spawn(&self, job: DispatchJob) {
        let permit = match self.limiter.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => return,
        };
        let service = Arc::clone(&self.service);
        tokio::spawn(async move {
            let result = service.deliver(&job.recipient, &job.message).await;
            if result.is_failure() {
                warn!(recipient = %job.recipient.id, "queued delivery failed");
            } else {
                debug!(recipient = %job.recipient.id, "queued delivery finished");
            }
            drop(permit);
        });
    }
}
