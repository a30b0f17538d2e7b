//! Escalation policy for overdue document requests
//!
//! A pure decision function over one request and one date. The daily sweep
//! feeds it every due request and executes whatever it returns; nothing in
//! here touches storage or notifications.
//!
//! Overdue is counted in business days past the deadline: 0 is the due
//! date itself, negative means not yet due. Days 4 to 6 past due are a
//! deliberate quiet stretch between the urgent reminder and escalation.

use chrono::NaiveDate;

use core_kernel::BusinessCalendar;

use crate::request::DocumentRequest;

/// What the sweep should do with one request today
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationAction {
    /// Nothing due today
    None,
    /// Deadline is today and no reminder has gone out
    FirstReminder,
    /// Recently overdue and no urgent reminder has gone out
    UrgentReminder,
    /// Grace window exhausted, reject the claim
    Escalate,
}

/// Day thresholds for the reminder ladder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscalationPolicy {
    /// First overdue day of the urgent-reminder window
    pub urgent_from: i64,
    /// Last overdue day of the urgent-reminder window, inclusive
    pub urgent_through: i64,
    /// Escalate strictly after this many overdue days
    pub escalate_after: i64,
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self {
            urgent_from: 1,
            urgent_through: 3,
            escalate_after: 6,
        }
    }
}

impl EscalationPolicy {
    /// Decides the sweep action for one request
    ///
    /// Rules are evaluated in order: non-pending requests are skipped, the
    /// first reminder fires exactly on the due date, the urgent reminder
    /// fires once inside its window, and escalation fires past the grace
    /// window no matter which reminders were sent.
    pub fn assess(
        &self,
        request: &DocumentRequest,
        today: NaiveDate,
        calendar: &BusinessCalendar,
    ) -> EscalationAction {
        if !request.is_pending() {
            return EscalationAction::None;
        }

        let overdue = calendar.business_days_between(request.deadline, today);

        if overdue == 0 && request.reminder_count == 0 {
            EscalationAction::FirstReminder
        } else if (self.urgent_from..=self.urgent_through).contains(&overdue)
            && request.escalation_count == 0
        {
            EscalationAction::UrgentReminder
        } else if overdue > self.escalate_after {
            EscalationAction::Escalate
        } else {
            EscalationAction::None
        }
    }
}
