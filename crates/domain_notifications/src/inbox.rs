//! Recipient-facing notification queries and read receipts

use std::sync::Arc;

use tracing::debug;

use core_kernel::{EmployeeId, NotificationId};

use crate::error::NotificationError;
use crate::notification::Notification;
use crate::ports::{InboxFilter, NotificationStore};

/// Per-recipient view over stored notifications
///
/// Every state change is ownership checked: a recipient can only touch
/// rows addressed to them.
pub struct NotificationInbox {
    store: Arc<dyn NotificationStore>,
}

impl NotificationInbox {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    /// Notifications for one recipient, newest first
    pub async fn list(
        &self,
        recipient: EmployeeId,
        filter: InboxFilter,
    ) -> Result<Vec<Notification>, NotificationError> {
        Ok(self.store.list_by_recipient(recipient, filter).await?)
    }

    pub async fn unread_count(&self, recipient: EmployeeId) -> Result<u64, NotificationError> {
        Ok(self.store.unread_count(recipient).await?)
    }

    /// Confirms the channel handed the message to the recipient
    pub async fn mark_delivered(
        &self,
        notification_id: NotificationId,
    ) -> Result<Notification, NotificationError> {
        let mut notification = self.fetch(notification_id).await?;
        notification.mark_delivered();
        self.store.update(&notification).await?;
        Ok(notification)
    }

    /// Marks one notification read
    ///
    /// Reading an already-read notification is a no-op that keeps the
    /// original read timestamp.
    pub async fn mark_read(
        &self,
        recipient: EmployeeId,
        notification_id: NotificationId,
    ) -> Result<Notification, NotificationError> {
        let mut notification = self.fetch_owned(recipient, notification_id).await?;
        if notification.is_read() {
            debug!(notification_id = %notification_id, "already read, keeping timestamp");
            return Ok(notification);
        }
        notification.mark_read();
        self.store.update(&notification).await?;
        Ok(notification)
    }

    /// Returns a read notification to the unread pile
    pub async fn mark_unread(
        &self,
        recipient: EmployeeId,
        notification_id: NotificationId,
    ) -> Result<Notification, NotificationError> {
        let mut notification = self.fetch_owned(recipient, notification_id).await?;
        notification.mark_unread();
        self.store.update(&notification).await?;
        Ok(notification)
    }

    /// Marks every unread notification read, returning how many changed
    pub async fn mark_all_read(&self, recipient: EmployeeId) -> Result<u64, NotificationError> {
        let unread = self
            .store
            .list_by_recipient(recipient, InboxFilter::unread_only())
            .await?;
        let mut changed = 0;
        for mut notification in unread {
            notification.mark_read();
            self.store.update(&notification).await?;
            changed += 1;
        }
        Ok(changed)
    }

    async fn fetch(&self, id: NotificationId) -> Result<Notification, NotificationError> {
        self.store.get(id).await.map_err(|err| {
            if err.is_not_found() {
                NotificationError::NotFound(id.to_string())
            } else {
                NotificationError::Storage(err)
            }
        })
    }

    async fn fetch_owned(
        &self,
        recipient: EmployeeId,
        id: NotificationId,
    ) -> Result<Notification, NotificationError> {
        let notification = self.fetch(id).await?;
        if notification.recipient_id != recipient {
            return Err(NotificationError::NotOwner(format!(
                "notification {id} does not belong to {recipient}"
            )));
        }
        Ok(notification)
    }
}
