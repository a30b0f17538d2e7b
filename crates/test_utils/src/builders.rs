//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible
//! defaults. Tests specify only the fields they care about; everything else
//! comes from the fixtures or from generated realistic values.

use chrono::NaiveDate;
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::Name;
use fake::Fake;

use core_kernel::{EmployeeId, IncapacityId};
use domain_incapacity::{
    DocumentKind, Incapacity, IncapacityState, LeaveType, SubmittedDocument,
};
use domain_notifications::{Notification, NotificationCategory, Recipient};
use domain_requests::{DocumentRequest, RequestStatus};

use crate::fixtures::{IdFixtures, StringFixtures, TemporalFixtures};

/// Builder for incapacity claims
pub struct IncapacityBuilder {
    employee_id: EmployeeId,
    leave_type: LeaveType,
    start_date: NaiveDate,
    end_date: NaiveDate,
    state: Option<IncapacityState>,
}

impl Default for IncapacityBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl IncapacityBuilder {
    /// Creates a builder for a 5-day general illness claim
    pub fn new() -> Self {
        Self {
            employee_id: IdFixtures::claimant_id(),
            leave_type: LeaveType::GeneralIllness,
            start_date: TemporalFixtures::leave_start(),
            end_date: TemporalFixtures::leave_end(),
            state: None,
        }
    }

    /// Sets the owning claimant
    pub fn with_employee(mut self, id: EmployeeId) -> Self {
        self.employee_id = id;
        self
    }

    /// Sets the leave type
    pub fn with_leave_type(mut self, leave_type: LeaveType) -> Self {
        self.leave_type = leave_type;
        self
    }

    /// Sets the leave period
    pub fn with_period(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    /// Forces the lifecycle state, bypassing the transition guards
    pub fn with_state(mut self, state: IncapacityState) -> Self {
        self.state = Some(state);
        self
    }

    /// Builds the claim
    pub fn build(self) -> Incapacity {
        let mut claim = Incapacity::new(
            self.employee_id,
            self.leave_type,
            self.start_date,
            self.end_date,
        )
        .expect("builder dates are valid");
        if let Some(state) = self.state {
            claim.state = state;
        }
        claim
    }
}

/// Builder for document requests
pub struct DocumentRequestBuilder {
    incapacity_id: IncapacityId,
    kind: DocumentKind,
    note: Option<String>,
    deadline: NaiveDate,
    status: Option<RequestStatus>,
    reminder_count: u32,
    escalation_count: u32,
}

impl Default for DocumentRequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentRequestBuilder {
    /// Creates a builder for a pending medical certificate request due on
    /// the fixture deadline
    pub fn new() -> Self {
        Self {
            incapacity_id: IdFixtures::incapacity_id(),
            kind: DocumentKind::MedicalCertificate,
            note: None,
            deadline: TemporalFixtures::deadline(),
            status: None,
            reminder_count: 0,
            escalation_count: 0,
        }
    }

    /// Sets the claim the request belongs to
    pub fn with_claim(mut self, id: IncapacityId) -> Self {
        self.incapacity_id = id;
        self
    }

    /// Sets the requested document kind
    pub fn with_kind(mut self, kind: DocumentKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the reviewer note
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Sets the due date
    pub fn with_deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = deadline;
        self
    }

    /// Forces the request status
    pub fn with_status(mut self, status: RequestStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the reminder bookkeeping counters
    pub fn with_counters(mut self, reminders: u32, escalations: u32) -> Self {
        self.reminder_count = reminders;
        self.escalation_count = escalations;
        self
    }

    /// Builds the request
    pub fn build(self) -> DocumentRequest {
        let mut request =
            DocumentRequest::new(self.incapacity_id, self.kind, self.note, self.deadline);
        if let Some(status) = self.status {
            request.status = status;
        }
        request.reminder_count = self.reminder_count;
        request.escalation_count = self.escalation_count;
        request
    }
}

/// Builder for notification recipients
pub struct RecipientBuilder {
    id: EmployeeId,
    display_name: String,
    email: Option<String>,
}

impl Default for RecipientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RecipientBuilder {
    /// Creates a builder with a fresh identity and a generated name and
    /// address
    pub fn new() -> Self {
        Self {
            id: EmployeeId::new_v7(),
            display_name: Name().fake(),
            email: Some(SafeEmail().fake()),
        }
    }

    /// The well-known test claimant
    pub fn claimant() -> Self {
        Self {
            id: IdFixtures::claimant_id(),
            display_name: StringFixtures::claimant_name().to_string(),
            email: Some(StringFixtures::claimant_email().to_string()),
        }
    }

    /// The well-known test reviewer
    pub fn reviewer() -> Self {
        Self {
            id: IdFixtures::reviewer_id(),
            display_name: StringFixtures::reviewer_name().to_string(),
            email: Some(StringFixtures::reviewer_email().to_string()),
        }
    }

    /// Sets the employee identity
    pub fn with_id(mut self, id: EmployeeId) -> Self {
        self.id = id;
        self
    }

    /// Sets the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = name.into();
        self
    }

    /// Sets the email address
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Removes the email address, forcing internal-only delivery
    pub fn without_email(mut self) -> Self {
        self.email = None;
        self
    }

    /// Builds the recipient
    pub fn build(self) -> Recipient {
        Recipient::new(self.id, self.display_name, self.email)
    }
}

/// Builder for stored notifications
pub struct NotificationBuilder {
    recipient_id: EmployeeId,
    category: NotificationCategory,
    subject: String,
    body: String,
}

impl Default for NotificationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationBuilder {
    /// Creates a builder for a reminder addressed to the test claimant
    pub fn new() -> Self {
        Self {
            recipient_id: IdFixtures::claimant_id(),
            category: NotificationCategory::Reminder,
            subject: "Document reminder".to_string(),
            body: "Your medical certificate is due today.".to_string(),
        }
    }

    /// Sets the recipient
    pub fn with_recipient(mut self, id: EmployeeId) -> Self {
        self.recipient_id = id;
        self
    }

    /// Sets the category
    pub fn with_category(mut self, category: NotificationCategory) -> Self {
        self.category = category;
        self
    }

    /// Sets subject and body
    pub fn with_content(mut self, subject: impl Into<String>, body: impl Into<String>) -> Self {
        self.subject = subject.into();
        self.body = body.into();
        self
    }

    /// Builds the notification in its initial pending state
    pub fn build(self) -> Notification {
        Notification::new(
            self.recipient_id,
            self.category,
            self.subject,
            self.body,
            None,
        )
    }
}

/// A well-formed PDF upload of the given kind, sized comfortably under the
/// acceptance limit
pub fn pdf_upload(kind: DocumentKind) -> SubmittedDocument {
    SubmittedDocument::new(kind, format!("{kind}.pdf"), 64 * 1024)
}
