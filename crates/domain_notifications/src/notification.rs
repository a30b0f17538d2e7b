//! Notification entity and delivery lifecycle

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{DocumentRequestId, EmployeeId, NotificationId};

/// Delivery state of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryState {
    /// Row persisted, no delivery attempted yet
    Pending,
    /// Accepted by the transport, or recorded internal-only
    Sent,
    /// Confirmed in the recipient's inbox
    Delivered,
    /// Opened by the recipient
    Read,
    /// Every delivery attempt failed
    Failed,
}

impl DeliveryState {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryState::Pending => "pending",
            DeliveryState::Sent => "sent",
            DeliveryState::Delivered => "delivered",
            DeliveryState::Read => "read",
            DeliveryState::Failed => "failed",
        }
    }
}

impl fmt::Display for DeliveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What a notification is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    /// Reviewer requested documents from the claimant
    RequestCreated,
    /// Deadline is today
    Reminder,
    /// Deadline has passed
    UrgentReminder,
    /// Claim rejected after the grace period ran out
    Escalation,
    /// Claimant answered every open request
    DocumentsComplete,
    /// System condition needing operator action
    OperatorAlert,
}

impl NotificationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationCategory::RequestCreated => "request_created",
            NotificationCategory::Reminder => "reminder",
            NotificationCategory::UrgentReminder => "urgent_reminder",
            NotificationCategory::Escalation => "escalation",
            NotificationCategory::DocumentsComplete => "documents_complete",
            NotificationCategory::OperatorAlert => "operator_alert",
        }
    }
}

impl fmt::Display for NotificationCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single message to a single recipient
///
/// Created by the dispatcher before any delivery attempt so the attempt is
/// durable even when the transport is down. Mutated only through the
/// lifecycle methods below; never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: NotificationId,
    pub recipient_id: EmployeeId,
    pub category: NotificationCategory,
    pub subject: String,
    pub body: String,
    pub state: DeliveryState,
    /// When the message was handed to the transport, or recorded internally
    pub sent_at: DateTime<Utc>,
    pub read_at: Option<DateTime<Utc>>,
    /// Document request this message is about, if any
    pub related_request: Option<DocumentRequestId>,
    /// Transport attempts consumed
    pub retry_count: u32,
}

impl Notification {
    pub fn new(
        recipient_id: EmployeeId,
        category: NotificationCategory,
        subject: impl Into<String>,
        body: impl Into<String>,
        related_request: Option<DocumentRequestId>,
    ) -> Self {
        Self {
            id: NotificationId::new_v7(),
            recipient_id,
            category,
            subject: subject.into(),
            body: body.into(),
            state: DeliveryState::Pending,
            sent_at: Utc::now(),
            read_at: None,
            related_request,
            retry_count: 0,
        }
    }

    /// Transport accepted the message, or delivery was internal-only
    pub fn mark_sent(&mut self, attempts: u32) {
        self.state = DeliveryState::Sent;
        self.sent_at = Utc::now();
        self.retry_count = attempts;
    }

    /// Confirmed visible in the recipient's inbox
    pub fn mark_delivered(&mut self) {
        self.state = DeliveryState::Delivered;
    }

    /// Recipient opened the notification; repeated marking keeps the first
    /// read timestamp
    pub fn mark_read(&mut self) {
        if self.state == DeliveryState::Read {
            return;
        }
        self.state = DeliveryState::Read;
        self.read_at = Some(Utc::now());
    }

    /// Reverts a read notification to delivered
    pub fn mark_unread(&mut self) {
        self.state = DeliveryState::Delivered;
        self.read_at = None;
    }

    /// All attempts exhausted; the last error is appended to the body so
    /// operators can see it next to the content
    pub fn record_failure(&mut self, attempts: u32, error: &str) {
        self.state = DeliveryState::Failed;
        self.retry_count = attempts;
        self.body = format!("{}\n\nError: {error}", self.body);
    }

    pub fn is_read(&self) -> bool {
        self.state == DeliveryState::Read
    }
}
