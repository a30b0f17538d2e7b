//! Notification domain errors

use thiserror::Error;

use core_kernel::PortError;

/// Errors that can occur in the notification domain
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Notification not found: {0}")]
    NotFound(String),

    #[error("Notification {0} does not belong to the reader")]
    NotOwner(String),

    #[error("Storage error: {0}")]
    Storage(#[from] PortError),
}
