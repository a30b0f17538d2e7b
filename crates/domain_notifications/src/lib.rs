//! domain_notifications: outbound messaging for the incapacity lifecycle
//!
//! Notifications are durable rows first and emails second. The dispatcher
//! persists every message before touching the transport, retries external
//! delivery a bounded number of times, and downgrades recipients without a
//! usable address to internal-only delivery. Workflows address people by
//! role through [`NotificationSink`]; the inbox gives recipients their
//! read/unread view.
//!
//! Delivery states move `pending -> sent -> delivered -> read`, with
//! `failed` as the terminal state for exhausted retries.

pub mod dispatcher;
pub mod error;
pub mod inbox;
pub mod notification;
pub mod pool;
pub mod ports;
pub mod recipient;
pub mod transport;

pub use dispatcher::{
    DeliveryResult, NotificationDispatcher, NotificationMessage, NotificationService,
    NotificationSink, RetryPolicy,
};
pub use error::NotificationError;
pub use inbox::NotificationInbox;
pub use notification::{DeliveryState, Notification, NotificationCategory};
pub use pool::{DispatchQueue, DispatchWorker};
pub use ports::{InboxFilter, NotificationStore};
pub use recipient::{Recipient, RecipientDirectory};
pub use transport::{LoggingMailTransport, MailTransport};
