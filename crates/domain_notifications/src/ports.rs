//! Persistence port for notifications

use async_trait::async_trait;

use core_kernel::{DomainPort, EmployeeId, NotificationId, PortError};

use crate::notification::Notification;

/// Paging and filtering for inbox queries
#[derive(Debug, Clone, Copy, Default)]
pub struct InboxFilter {
    pub unread_only: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl InboxFilter {
    pub fn unread_only() -> Self {
        Self {
            unread_only: true,
            ..Self::default()
        }
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }
}

/// Storage for notification rows
#[async_trait]
pub trait NotificationStore: DomainPort {
    /// Persists a new notification in its current state
    async fn create(&self, notification: &Notification) -> Result<(), PortError>;

    /// Writes lifecycle changes back
    async fn update(&self, notification: &Notification) -> Result<(), PortError>;

    /// Fetches one notification
    async fn get(&self, id: NotificationId) -> Result<Notification, PortError>;

    /// A recipient's notifications, newest first
    async fn list_by_recipient(
        &self,
        recipient: EmployeeId,
        filter: InboxFilter,
    ) -> Result<Vec<Notification>, PortError>;

    /// Notifications the recipient has not read yet
    async fn unread_count(&self, recipient: EmployeeId) -> Result<u64, PortError>;
}
