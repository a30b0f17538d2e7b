//! Comprehensive tests for the notification domain
//!
//! Covers the dispatcher retry loop, internal-only downgrades, role
//! fan-out with the administrator fallback, the inbox read lifecycle, and
//! the bounded background queue.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use core_kernel::{DomainPort, EmployeeId, NotificationId, PortError};
use domain_notifications::{
    DeliveryResult, DeliveryState, DispatchQueue, InboxFilter, MailTransport, Notification,
    NotificationCategory, NotificationDispatcher, NotificationError, NotificationInbox,
    NotificationMessage, NotificationService, NotificationSink, NotificationStore, Recipient,
    RecipientDirectory, RetryPolicy,
};

// ============================================================================
// Test Doubles
// ============================================================================

/// Scripted transport: fails the first `fail_first` calls, then succeeds,
/// unless `always_fail` is set.
struct MockMailTransport {
    calls: AtomicU32,
    fail_first: u32,
    always_fail: bool,
}

impl MockMailTransport {
    fn reliable() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU32::new(0),
            fail_first: 0,
            always_fail: false,
        })
    }

    fn failing_first(fail_first: u32) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU32::new(0),
            fail_first,
            always_fail: false,
        })
    }

    fn broken() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicU32::new(0),
            fail_first: 0,
            always_fail: true,
        })
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl DomainPort for MockMailTransport {}

#[async_trait]
impl MailTransport for MockMailTransport {
    async fn deliver(&self, _address: &str, _subject: &str, _body: &str) -> Result<(), PortError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.always_fail || call <= self.fail_first {
            return Err(PortError::connection("smtp refused"));
        }
        Ok(())
    }
}

#[derive(Default)]
struct InMemoryNotificationStore {
    rows: Mutex<Vec<Notification>>,
    fail_create: bool,
}

impl InMemoryNotificationStore {
    fn rejecting_writes() -> Arc<Self> {
        Arc::new(Self {
            rows: Mutex::new(Vec::new()),
            fail_create: true,
        })
    }

    fn single(&self) -> Notification {
        let rows = self.rows.lock().unwrap();
        assert_eq!(rows.len(), 1, "expected exactly one stored notification");
        rows[0].clone()
    }

    fn all(&self) -> Vec<Notification> {
        self.rows.lock().unwrap().clone()
    }
}

impl DomainPort for InMemoryNotificationStore {}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn create(&self, notification: &Notification) -> Result<(), PortError> {
        if self.fail_create {
            return Err(PortError::connection("database unavailable"));
        }
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

#[derive(Default)]
struct MockDirectory {
    people: HashMap<EmployeeId, Recipient>,
    reviewers: Vec<Recipient>,
    administrators: Vec<Recipient>,
}

impl MockDirectory {
    fn with_person(mut self, recipient: Recipient) -> Self {
        self.people.insert(recipient.id, recipient);
        self
    }

    fn with_reviewer(mut self, recipient: Recipient) -> Self {
        self.people.insert(recipient.id, recipient.clone());
        self.reviewers.push(recipient);
        self
    }

    fn with_administrator(mut self, recipient: Recipient) -> Self {
        self.people.insert(recipient.id, recipient.clone());
        self.administrators.push(recipient);
        self
    }
}

impl DomainPort for MockDirectory {}

#[async_trait]
impl RecipientDirectory for MockDirectory {
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

// ============================================================================
// Helpers
// ============================================================================

fn create_test_recipient() -> Recipient {
    Recipient::new(
        EmployeeId::new_v7(),
        "Laura Gomez",
        Some("laura.gomez@example.com".to_string()),
    )
}

fn reminder_message() -> NotificationMessage {
    NotificationMessage::new(
        NotificationCategory::Reminder,
        "Document reminder",
        "Your medical certificate is due today.",
    )
}

fn dispatcher_with(
    store: Arc<InMemoryNotificationStore>,
    transport: Arc<MockMailTransport>,
) -> NotificationDispatcher {
    NotificationDispatcher::new(store, transport, RetryPolicy::default())
}

async fn stored_reminder(
    store: &Arc<InMemoryNotificationStore>,
    recipient: EmployeeId,
) -> Notification {
    let notification = Notification::new(
        recipient,
        NotificationCategory::Reminder,
        "Document reminder",
        "Your medical certificate is due today.",
        None,
    );
    store.create(&notification).await.unwrap();
    notification
}

// ============================================================================
// Dispatcher Tests
// ============================================================================

mod dispatcher_tests {
    use super::*;

    #[tokio::test]
    async fn test_delivers_on_first_attempt() {
        let store = Arc::new(InMemoryNotificationStore::default());
        let transport = MockMailTransport::reliable();
        let dispatcher = dispatcher_with(store.clone(), transport.clone());
        let recipient = create_test_recipient();

        let result = dispatcher
            .send(
                &recipient,
                "Document reminder",
                "Your medical certificate is due today.",
                NotificationCategory::Reminder,
                None,
            )
            .await;

        match result {
            DeliveryResult::Sent {
                notification_id,
                attempts,
            } => {
                assert_eq!(attempts, 1);
                let row = store.single();
                assert_eq!(row.id, notification_id);
                assert_eq!(row.state, DeliveryState::Sent);
                assert_eq!(row.retry_count, 1);
            }
            other => panic!("expected Sent, got {other:?}"),
        }
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_then_succeeds() {
        let store = Arc::new(InMemoryNotificationStore::default());
        let transport = MockMailTransport::failing_first(2);
        let dispatcher = dispatcher_with(store.clone(), transport.clone());
        let recipient = create_test_recipient();
        let started = tokio::time::Instant::now();

        let result = dispatcher
            .send(
                &recipient,
                "Document reminder",
                "Your medical certificate is due today.",
                NotificationCategory::Reminder,
                None,
            )
            .await;

        assert!(matches!(result, DeliveryResult::Sent { attempts: 3, .. }));
        assert_eq!(transport.calls(), 3);
        // two pauses, one between each consecutive pair of attempts
        assert_eq!(started.elapsed(), Duration::from_secs(10));
        assert_eq!(store.single().state, DeliveryState::Sent);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_attempts_record_failure() {
        let store = Arc::new(InMemoryNotificationStore::default());
        let transport = MockMailTransport::broken();
        let dispatcher = dispatcher_with(store.clone(), transport.clone());
        let recipient = create_test_recipient();
        let started = tokio::time::Instant::now();

        let result = dispatcher
            .send(
                &recipient,
                "Document reminder",
                "Your medical certificate is due today.",
                NotificationCategory::Reminder,
                None,
            )
            .await;

        match result {
            DeliveryResult::Failed {
                notification_id,
                attempts,
                ..
            } => {
                assert!(notification_id.is_some());
                assert_eq!(attempts, 3);
            }
            other => panic!("expected Failed, got {other:?}"),
        }
        assert_eq!(transport.calls(), 3);
        // no pause after the final attempt
        assert_eq!(started.elapsed(), Duration::from_secs(10));

        let row = store.single();
        assert_eq!(row.state, DeliveryState::Failed);
        assert_eq!(row.retry_count, 3);
        assert!(row.body.ends_with("Error: Connection error: smtp refused"));
    }

    #[tokio::test]
    async fn test_malformed_address_never_reaches_transport() {
        let store = Arc::new(InMemoryNotificationStore::default());
        let transport = MockMailTransport::reliable();
        let dispatcher = dispatcher_with(store.clone(), transport.clone());
        let recipient = Recipient::new(
            EmployeeId::new_v7(),
            "Laura Gomez",
            Some("not-an-address".to_string()),
        );

        let result = dispatcher
            .send(
                &recipient,
                "Document reminder",
                "Your medical certificate is due today.",
                NotificationCategory::Reminder,
                None,
            )
            .await;

        assert!(matches!(result, DeliveryResult::Internal { .. }));
        assert_eq!(transport.calls(), 0);

        let row = store.single();
        assert_eq!(row.state, DeliveryState::Sent);
        assert_eq!(row.retry_count, 0);
    }

    #[tokio::test]
    async fn test_missing_address_is_internal_only() {
        let store = Arc::new(InMemoryNotificationStore::default());
        let transport = MockMailTransport::reliable();
        let dispatcher = dispatcher_with(store.clone(), transport.clone());
        let recipient = Recipient::new(EmployeeId::new_v7(), "Laura Gomez", None);

        let result = dispatcher
            .send(
                &recipient,
                "Document reminder",
                "Your medical certificate is due today.",
                NotificationCategory::Reminder,
                None,
            )
            .await;

        assert!(matches!(result, DeliveryResult::Internal { .. }));
        assert_eq!(transport.calls(), 0);
        assert_eq!(store.single().state, DeliveryState::Sent);
    }

    #[tokio::test]
    async fn test_unrecorded_notification_is_never_delivered() {
        let store = InMemoryNotificationStore::rejecting_writes();
        let transport = MockMailTransport::reliable();
        let dispatcher = dispatcher_with(store.clone(), transport.clone());
        let recipient = create_test_recipient();

        let result = dispatcher
            .send(
                &recipient,
                "Document reminder",
                "Your medical certificate is due today.",
                NotificationCategory::Reminder,
                None,
            )
            .await;

        match result {
            DeliveryResult::Failed {
                notification_id,
                attempts,
                ..
            } => {
                assert!(notification_id.is_none());
                assert_eq!(attempts, 0);
            }
            other => panic!("expected Failed, got {other:?}"),
        }
        assert_eq!(transport.calls(), 0);
    }
}

// ============================================================================
// Sink and Fan-Out Tests
// ============================================================================

mod sink_tests {
    use super::*;

    #[tokio::test]
    async fn test_notifies_every_reviewer() {
        let store = Arc::new(InMemoryNotificationStore::default());
        let transport = MockMailTransport::reliable();
        let directory = Arc::new(
            MockDirectory::default()
                .with_reviewer(create_test_recipient())
                .with_reviewer(create_test_recipient()),
        );
        let service =
            NotificationService::new(directory, dispatcher_with(store.clone(), transport.clone()));

        let results = service.notify_reviewers(reminder_message()).await;

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| !r.is_failure()));
        assert_eq!(store.all().len(), 2);
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test]
    async fn test_no_reviewers_escalates_to_administrators() {
        let store = Arc::new(InMemoryNotificationStore::default());
        let transport = MockMailTransport::reliable();
        let directory =
            Arc::new(MockDirectory::default().with_administrator(create_test_recipient()));
        let service =
            NotificationService::new(directory, dispatcher_with(store.clone(), transport.clone()));

        let results = service.notify_reviewers(reminder_message()).await;

        assert_eq!(results.len(), 1);
        let row = store.single();
        assert!(row.subject.starts_with("URGENT: "));
        assert_eq!(row.category, NotificationCategory::OperatorAlert);
    }

    #[tokio::test]
    async fn test_unknown_claimant_is_reported() {
        let store = Arc::new(InMemoryNotificationStore::default());
        let transport = MockMailTransport::reliable();
        let directory = Arc::new(MockDirectory::default());
        let service =
            NotificationService::new(directory, dispatcher_with(store.clone(), transport.clone()));

        let result = service
            .notify_claimant(EmployeeId::new_v7(), reminder_message())
            .await;

        assert!(result.is_failure());
        assert!(store.all().is_empty());
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_operator_alert_reaches_all_administrators() {
        let store = Arc::new(InMemoryNotificationStore::default());
        let transport = MockMailTransport::reliable();
        let directory = Arc::new(
            MockDirectory::default()
                .with_administrator(create_test_recipient())
                .with_administrator(create_test_recipient()),
        );
        let service =
            NotificationService::new(directory, dispatcher_with(store.clone(), transport.clone()));

        let message = NotificationMessage::new(
            NotificationCategory::OperatorAlert,
            "Catalog fallback in use",
            "No ruleset is configured for leave type paternity.",
        );
        let results = service.alert_operators(message).await;

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| !r.is_failure()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_delivery_alerts_administrators() {
        let store = Arc::new(InMemoryNotificationStore::default());
        let transport = MockMailTransport::broken();
        let claimant = create_test_recipient();
        let claimant_id = claimant.id;
        let administrator = create_test_recipient();
        let administrator_id = administrator.id;
        let directory = Arc::new(
            MockDirectory::default()
                .with_person(claimant)
                .with_administrator(administrator),
        );
        let service =
            NotificationService::new(directory, dispatcher_with(store.clone(), transport.clone()));

        let result = service
            .notify_claimant(claimant_id, reminder_message())
            .await;

        assert!(result.is_failure());
        // the operator alert is internal-only, so only the claimant
        // delivery reached the transport
        assert_eq!(transport.calls(), 3);

        let rows = store.all();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].recipient_id, claimant_id);
        assert_eq!(rows[0].state, DeliveryState::Failed);
        let alert = &rows[1];
        assert_eq!(alert.recipient_id, administrator_id);
        assert_eq!(alert.category, NotificationCategory::OperatorAlert);
        assert_eq!(alert.state, DeliveryState::Sent);
        assert_eq!(alert.retry_count, 0);
        assert!(alert.subject.contains("delivery failed"));
        assert!(alert.body.contains("Document reminder"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_operator_alert_is_not_resurfaced() {
        let store = Arc::new(InMemoryNotificationStore::default());
        let transport = MockMailTransport::broken();
        let directory =
            Arc::new(MockDirectory::default().with_administrator(create_test_recipient()));
        let service =
            NotificationService::new(directory, dispatcher_with(store.clone(), transport.clone()));

        let message = NotificationMessage::new(
            NotificationCategory::OperatorAlert,
            "Catalog fallback in use",
            "No ruleset is configured for leave type paternity.",
        );
        let results = service.alert_operators(message).await;

        assert_eq!(results.len(), 1);
        assert!(results[0].is_failure());
        // only the failed alert row itself, no alert about the alert
        assert_eq!(store.all().len(), 1);
        assert_eq!(store.single().state, DeliveryState::Failed);
    }
}

// ============================================================================
// Inbox Tests
// ============================================================================

mod inbox_tests {
    use super::*;

    #[tokio::test]
    async fn test_mark_read_keeps_first_timestamp() {
        let store = Arc::new(InMemoryNotificationStore::default());
        let recipient = EmployeeId::new_v7();
        let stored = stored_reminder(&store, recipient).await;
        let inbox = NotificationInbox::new(store.clone());

        let first = inbox.mark_read(recipient, stored.id).await.unwrap();
        assert!(first.is_read());
        let first_read_at = first.read_at;

        let second = inbox.mark_read(recipient, stored.id).await.unwrap();
        assert_eq!(second.read_at, first_read_at);
    }

    #[tokio::test]
    async fn test_mark_read_rejects_foreign_reader() {
        let store = Arc::new(InMemoryNotificationStore::default());
        let owner = EmployeeId::new_v7();
        let stored = stored_reminder(&store, owner).await;
        let inbox = NotificationInbox::new(store.clone());

        let outcome = inbox.mark_read(EmployeeId::new_v7(), stored.id).await;

        assert!(matches!(outcome, Err(NotificationError::NotOwner(_))));
        assert!(!store.single().is_read());
    }

    #[tokio::test]
    async fn test_mark_read_missing_notification() {
        let store = Arc::new(InMemoryNotificationStore::default());
        let inbox = NotificationInbox::new(store);

        let outcome = inbox
            .mark_read(EmployeeId::new_v7(), NotificationId::new_v7())
            .await;

        assert!(matches!(outcome, Err(NotificationError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_mark_all_read_counts_changes() {
        let store = Arc::new(InMemoryNotificationStore::default());
        let recipient = EmployeeId::new_v7();
        let first = stored_reminder(&store, recipient).await;
        stored_reminder(&store, recipient).await;
        stored_reminder(&store, recipient).await;
        let inbox = NotificationInbox::new(store.clone());

        inbox.mark_read(recipient, first.id).await.unwrap();
        let changed = inbox.mark_all_read(recipient).await.unwrap();

        assert_eq!(changed, 2);
        assert_eq!(inbox.unread_count(recipient).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_filters_unread() {
        let store = Arc::new(InMemoryNotificationStore::default());
        let recipient = EmployeeId::new_v7();
        let older = stored_reminder(&store, recipient).await;
        let newer = stored_reminder(&store, recipient).await;
        stored_reminder(&store, EmployeeId::new_v7()).await;
        let inbox = NotificationInbox::new(store.clone());

        let all = inbox
            .list(recipient, InboxFilter::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, newer.id);
        assert_eq!(all[1].id, older.id);

        inbox.mark_read(recipient, newer.id).await.unwrap();
        let unread = inbox
            .list(recipient, InboxFilter::unread_only())
            .await
            .unwrap();
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].id, older.id);
    }

    #[tokio::test]
    async fn test_mark_unread_returns_to_unread_pile() {
        let store = Arc::new(InMemoryNotificationStore::default());
        let recipient = EmployeeId::new_v7();
        let stored = stored_reminder(&store, recipient).await;
        let inbox = NotificationInbox::new(store.clone());

        inbox.mark_read(recipient, stored.id).await.unwrap();
        assert_eq!(inbox.unread_count(recipient).await.unwrap(), 0);

        let reverted = inbox.mark_unread(recipient, stored.id).await.unwrap();
        assert_eq!(reverted.state, DeliveryState::Delivered);
        assert_eq!(inbox.unread_count(recipient).await.unwrap(), 1);
    }
}

// ============================================================================
// Dispatch Queue Tests
// ============================================================================

mod pool_tests {
    use super::*;

    #[tokio::test]
    async fn test_worker_delivers_queued_notifications() {
        let store = Arc::new(InMemoryNotificationStore::default());
        let transport = MockMailTransport::reliable();
        let claimant = create_test_recipient();
        let claimant_id = claimant.id;
        let directory = Arc::new(MockDirectory::default().with_person(claimant));
        let dispatcher = dispatcher_with(store.clone(), transport.clone());
        let (queue, worker) = DispatchQueue::bounded(directory, dispatcher, 8, 4);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(worker.run(shutdown_rx));

        let result = queue.notify_claimant(claimant_id, reminder_message()).await;
        assert!(matches!(result, DeliveryResult::Queued));

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();

        assert_eq!(transport.calls(), 1);
        assert_eq!(store.single().state, DeliveryState::Sent);
    }

    #[tokio::test]
    async fn test_full_queue_rejects_instead_of_blocking() {
        let store = Arc::new(InMemoryNotificationStore::default());
        let transport = MockMailTransport::reliable();
        let claimant = create_test_recipient();
        let claimant_id = claimant.id;
        let directory = Arc::new(MockDirectory::default().with_person(claimant));
        let dispatcher = dispatcher_with(store.clone(), transport);
        let (queue, _worker) = DispatchQueue::bounded(directory, dispatcher, 1, 1);

        let first = queue.notify_claimant(claimant_id, reminder_message()).await;
        let second = queue.notify_claimant(claimant_id, reminder_message()).await;

        assert!(matches!(first, DeliveryResult::Queued));
        assert!(second.is_failure());
    }

    #[tokio::test]
    async fn test_queue_fans_out_reviewer_fallback() {
        let store = Arc::new(InMemoryNotificationStore::default());
        let transport = MockMailTransport::reliable();
        let directory =
            Arc::new(MockDirectory::default().with_administrator(create_test_recipient()));
        let dispatcher = dispatcher_with(store.clone(), transport.clone());
        let (queue, worker) = DispatchQueue::bounded(directory, dispatcher, 8, 4);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(worker.run(shutdown_rx));

        let results = queue.notify_reviewers(reminder_message()).await;
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], DeliveryResult::Queued));

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();

        let row = store.single();
        assert!(row.subject.starts_with("URGENT: "));
        assert_eq!(row.category, NotificationCategory::OperatorAlert);
    }

    #[tokio::test(start_paused = true)]
    async fn test_queued_failure_alerts_administrators() {
        let store = Arc::new(InMemoryNotificationStore::default());
        let transport = MockMailTransport::broken();
        let claimant = create_test_recipient();
        let claimant_id = claimant.id;
        let administrator = create_test_recipient();
        let administrator_id = administrator.id;
        let directory = Arc::new(
            MockDirectory::default()
                .with_person(claimant)
                .with_administrator(administrator),
        );
        let dispatcher = dispatcher_with(store.clone(), transport.clone());
        let (queue, worker) = DispatchQueue::bounded(directory, dispatcher, 8, 4);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(worker.run(shutdown_rx));

        let result = queue.notify_claimant(claimant_id, reminder_message()).await;
        assert!(matches!(result, DeliveryResult::Queued));

        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();

        assert_eq!(transport.calls(), 3);
        let rows = store.all();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].recipient_id, claimant_id);
        assert_eq!(rows[0].state, DeliveryState::Failed);
        assert_eq!(rows[1].recipient_id, administrator_id);
        assert_eq!(rows[1].category, NotificationCategory::OperatorAlert);
    }
}

// ============================================================================
// Serialization Tests
// ============================================================================

mod serde_tests {
    use super::*;

    #[test]
    fn test_delivery_state_uses_snake_case() {
        assert_eq!(
            serde_json::to_string(&DeliveryState::Pending).unwrap(),
            "\"pending\""
        );
        assert_eq!(
            serde_json::to_string(&NotificationCategory::UrgentReminder).unwrap(),
            "\"urgent_reminder\""
        );
    }

    #[test]
    fn test_notification_round_trips() {
        let notification = Notification::new(
            EmployeeId::new_v7(),
            NotificationCategory::Escalation,
            "Claim escalated",
            "The claim was rejected after repeated reminders.",
            None,
        );

        let json = serde_json::to_string(&notification).unwrap();
        let back: Notification = serde_json::from_str(&json).unwrap();

        assert_eq!(back.id, notification.id);
        assert_eq!(back.state, DeliveryState::Pending);
        assert_eq!(back.category, NotificationCategory::Escalation);
    }
}
