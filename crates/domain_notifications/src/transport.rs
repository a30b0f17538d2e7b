//! External mail transport

use async_trait::async_trait;
use tracing::{debug, info};

use core_kernel::{DomainPort, PortError};

/// Channel that carries a message out of the process
#[async_trait]
pub trait MailTransport: DomainPort {
    /// Delivers one message to one address
    async fn deliver(&self, address: &str, subject: &str, body: &str) -> Result<(), PortError>;
}

/// Transport that writes the message to the log instead of a wire
///
/// Stands in for a real mail gateway in every environment that has none.
/// With `enabled` off it records nothing but a debug line.
#[derive(Debug, Clone)]
pub struct LoggingMailTransport {
    enabled: bool,
    sender: Option<String>,
}

impl LoggingMailTransport {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            sender: None,
        }
    }

    /// Sender identity shown on every delivery line
    pub fn with_sender(mut self, name: &str, address: &str) -> Self {
        self.sender = Some(format!("{name} <{address}>"));
        self
    }
}

impl Default for LoggingMailTransport {
    fn default() -> Self {
        Self::new(true)
    }
}

impl DomainPort for LoggingMailTransport {}

#[async_trait]
impl MailTransport for LoggingMailTransport {
    async fn deliver(&self, address: &str, subject: &str, body: &str) -> Result<(), PortError> {
        if !self.enabled {
            debug!(address, subject, "mail transport disabled, skipping delivery");
            return Ok(());
        }
        info!(
            address,
            subject,
            from = self.sender.as_deref().unwrap_or("-"),
            body_length = body.len(),
            "delivering mail"
        );
        Ok(())
    }
}
