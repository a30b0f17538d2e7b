//! Notification copy for the request workflow
//!
//! All human-facing wording lives here so the workflow and sweep stay free
//! of string building. Dates are spelled out in full because claimants read
//! these in mail clients without any surrounding context.

use chrono::NaiveDate;

use core_kernel::long_date;
use domain_incapacity::Incapacity;
use domain_notifications::{NotificationCategory, NotificationMessage};

use crate::request::DocumentRequest;

/// Claimant summary for a freshly created request batch
pub fn request_created(
    claim: &Incapacity,
    requests: &[DocumentRequest],
    deadline: NaiveDate,
) -> NotificationMessage {
    let mut lines = String::new();
    for request in requests {
        match &request.note {
            Some(note) => {
                lines.push_str(&format!("- {}: {note}\n", request.kind.display_name()));
            }
            None => lines.push_str(&format!("- {}\n", request.kind.display_name())),
        }
    }
    let body = format!(
        "Your {} leave claim needs additional documentation.\n\n\
         Requested documents:\n{lines}\n\
         Please submit everything by {}.",
        claim.leave_type.display_name(),
        long_date(deadline),
    );
    NotificationMessage::new(
        NotificationCategory::RequestCreated,
        format!("Documents required for claim {}", claim.id),
        body,
    )
}

/// Due-today nudge to the claimant
pub fn first_reminder(request: &DocumentRequest) -> NotificationMessage {
    NotificationMessage::new(
        NotificationCategory::Reminder,
        format!("Reminder: {} due today", request.kind.display_name()),
        format!(
            "The {} for your leave claim is due today, {}. \
             Please submit it to keep your claim moving.",
            request.kind.display_name(),
            long_date(request.deadline),
        ),
    )
    .about_request(request.id)
}

/// Overdue warning to the claimant
pub fn urgent_reminder(request: &DocumentRequest, overdue_days: i64) -> NotificationMessage {
    NotificationMessage::new(
        NotificationCategory::UrgentReminder,
        format!("Urgent: {} is overdue", request.kind.display_name()),
        format!(
            "The {} for your leave claim was due on {} and is now {} business \
             day(s) late. Without it your claim will be rejected.",
            request.kind.display_name(),
            long_date(request.deadline),
            overdue_days,
        ),
    )
    .about_request(request.id)
}

/// Reviewer notice that every open request on the claim is answered
pub fn documents_complete(claim: &Incapacity) -> NotificationMessage {
    NotificationMessage::new(
        NotificationCategory::DocumentsComplete,
        format!("Documentation complete for claim {}", claim.id),
        format!(
            "All requested documents for the {} leave claim of employee {} \
             have been received. The claim is ready for validation.",
            claim.leave_type.display_name(),
            claim.employee_id,
        ),
    )
}

/// Reviewer notice that the claim was rejected for silence
pub fn escalation_notice(claim: &Incapacity, request: &DocumentRequest) -> NotificationMessage {
    NotificationMessage::new(
        NotificationCategory::Escalation,
        format!("Claim {} rejected after missed deadline", claim.id),
        format!(
            "The {} requested on {} was never delivered. The grace window has \
             run out and the claim has been rejected.",
            request.kind.display_name(),
            long_date(request.deadline),
        ),
    )
    .about_request(request.id)
}
