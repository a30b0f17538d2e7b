//! Claim registration

use std::sync::Arc;

use tracing::info;

use chrono::NaiveDate;

use core_kernel::{Clock, EmployeeId};

use crate::catalog::RequiredDocumentsCatalog;
use crate::document::{Document, SubmittedDocument};
use crate::error::IncapacityError;
use crate::history::StateTransitionRecord;
use crate::incapacity::{Incapacity, LeaveType};
use crate::ports::IncapacityRepository;
use crate::validation::CompletenessReport;

/// Longest claimable period in calendar days
pub const MAX_CLAIM_DURATION_DAYS: i64 = 180;

/// Result of registering a claim
///
/// `used_fallback` mirrors the catalog outcome so the caller can raise an
/// operator alert when the leave type had no configured rules.
#[derive(Debug, Clone)]
pub struct RegistrationOutcome {
    pub incapacity: Incapacity,
    pub report: CompletenessReport,
    pub used_fallback: bool,
}

/// Registers new claims: date rules, document rules, first audit record
pub struct RegistrationService {
    repository: Arc<dyn IncapacityRepository>,
    catalog: Arc<dyn RequiredDocumentsCatalog>,
    clock: Arc<dyn Clock>,
}

impl RegistrationService {
    pub fn new(
        repository: Arc<dyn IncapacityRepository>,
        catalog: Arc<dyn RequiredDocumentsCatalog>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            catalog,
            clock,
        }
    }

    /// Registers a claim in `PendingValidation`
    ///
    /// Date rules: the period may not start in the future, may not end
    /// before it starts, and may not exceed [`MAX_CLAIM_DURATION_DAYS`].
    /// Documents offered at registration are validated up front; any
    /// invalid upload rejects the whole registration. The claim, its
    /// initial audit record, and accepted documents commit together.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDates`, `InvalidDocument`, or a storage error.
    pub async fn register(
        &self,
        employee_id: EmployeeId,
        leave_type: LeaveType,
        start_date: NaiveDate,
        end_date: NaiveDate,
        attached: &[SubmittedDocument],
    ) -> Result<RegistrationOutcome, IncapacityError> {
        let today = self.clock.today();
        if start_date > today {
            return Err(IncapacityError::InvalidDates(format!(
                "start date {start_date} is in the future"
            )));
        }

        let mut claim = Incapacity::new(employee_id, leave_type, start_date, end_date)?;
        if claim.duration_days > MAX_CLAIM_DURATION_DAYS {
            return Err(IncapacityError::InvalidDates(format!(
                "claimed period of {} days exceeds the {MAX_CLAIM_DURATION_DAYS}-day limit",
                claim.duration_days
            )));
        }

        for submission in attached {
            submission.validate()?;
        }
        let documents: Vec<Document> = attached
            .iter()
            .map(|submission| Document::new(claim.id, submission))
            .collect();
        let attached_kinds: Vec<_> = documents.iter().map(|doc| doc.kind).collect();

        let requirements = self.catalog.lookup(leave_type, claim.duration_days);
        let report = CompletenessReport::evaluate(
            &requirements.ruleset,
            &attached_kinds,
            self.clock.now(),
        );
        claim.record_validation(report.clone());

        let record = StateTransitionRecord::initial(claim.id, employee_id);
        self.repository.create(&claim, &record, &documents).await?;

        info!(
            incapacity_id = %claim.id,
            leave_type = %leave_type,
            duration_days = claim.duration_days,
            complete = report.complete,
            used_fallback = requirements.used_fallback,
            "incapacity registered"
        );

        Ok(RegistrationOutcome {
            incapacity: claim,
            report,
            used_fallback: requirements.used_fallback,
        })
    }
}
