//! Scripted Mail Transport
//!
//! A [`MailTransport`] double that records every delivery and fails on a
//! script: the first `n` calls, or all of them. Lets dispatcher and workflow
//! tests observe retry behavior without a mail server.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use core_kernel::{DomainPort, PortError};
use domain_notifications::MailTransport;

/// One recorded delivery attempt that succeeded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedMail {
    pub address: String,
    pub subject: String,
    pub body: String,
}

/// Transport that fails the first `fail_first` calls, then succeeds,
/// unless `always_fail` is set
pub struct MockMailTransport {
    calls: AtomicU32,
    fail_first: u32,
    always_fail: bool,
    delivered: Mutex<Vec<RecordedMail>>,
}

impl MockMailTransport {
    /// Accepts every delivery
    pub fn reliable() -> Self {
        Self::scripted(0, false)
    }

    /// Rejects the first `fail_first` deliveries, then accepts
    pub fn failing_first(fail_first: u32) -> Self {
        Self::scripted(fail_first, false)
    }

    /// Rejects every delivery
    pub fn broken() -> Self {
        Self::scripted(0, true)
    }

    fn scripted(fail_first: u32, always_fail: bool) -> Self {
        Self {
            calls: AtomicU32::new(0),
            fail_first,
            always_fail,
            delivered: Mutex::new(Vec::new()),
        }
    }

    /// Delivery attempts made so far, successful or not
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    /// Mail accepted so far, in delivery order
    pub fn delivered(&self) -> Vec<RecordedMail> {
        self.delivered.lock().unwrap().clone()
    }

    /// Accepted mail addressed to `address`, in delivery order
    pub fn delivered_to(&self, address: &str) -> Vec<RecordedMail> {
        self.delivered
            .lock()
            .unwrap()
            .iter()
            .filter(|mail| mail.address == address)
            .cloned()
            .collect()
    }
}

impl DomainPort for MockMailTransport {}

#[async_trait]
impl MailTransport for MockMailTransport {
    async fn deliver(&self, address: &str, subject: &str, body: &str) -> Result<(), PortError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.always_fail || call <= self.fail_first {
            return Err(PortError::connection("smtp refused"));
        }
        self.delivered.lock().unwrap().push(RecordedMail {
            address: address.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
