//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for common entities across the incapacity
//! system. These fixtures are designed to be consistent and predictable, so
//! business-day arithmetic lands on the same dates in every test run.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use core_kernel::{DocumentRequestId, EmployeeId, IncapacityId};

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    /// Creates a deterministic claimant ID for testing
    pub fn claimant_id() -> EmployeeId {
        EmployeeId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap())
    }

    /// Creates a deterministic reviewer ID for testing
    pub fn reviewer_id() -> EmployeeId {
        EmployeeId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440002").unwrap())
    }

    /// Creates a deterministic administrator ID for testing
    pub fn administrator_id() -> EmployeeId {
        EmployeeId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440003").unwrap())
    }

    /// Creates a deterministic incapacity ID for testing
    pub fn incapacity_id() -> IncapacityId {
        IncapacityId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440004").unwrap())
    }

    /// Creates a deterministic document request ID for testing
    pub fn request_id() -> DocumentRequestId {
        DocumentRequestId::from_uuid(
            Uuid::parse_str("550e8400-e29b-41d4-a716-446655440005").unwrap(),
        )
    }
}

/// Fixture for temporal test data
///
/// The anchors sit in October 2025: a sweep window starting on a Monday
/// crosses one weekend before its deadline and the 3 November holiday
/// before its escalation, exercising both calendar rules.
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Reference "today" for request scenarios (Monday, 20 October 2025)
    pub fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 20).unwrap()
    }

    /// Three business days after [`TemporalFixtures::monday`] (Thursday)
    pub fn deadline() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 23).unwrap()
    }

    /// Seven business days past [`TemporalFixtures::deadline`], counting
    /// the 3 November holiday as non-working
    pub fn escalation_day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 4).unwrap()
    }

    /// First day of the default leave period
    pub fn leave_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 13).unwrap()
    }

    /// Last day of the default leave period, a 5-day claim
    pub fn leave_end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 17).unwrap()
    }

    /// Midday UTC on `date`, the instant fixed clocks are pinned to
    pub fn midday(date: NaiveDate) -> DateTime<Utc> {
        date.and_hms_opt(12, 0, 0).unwrap().and_utc()
    }
}

/// Fixture for string test data
pub struct StringFixtures;

impl StringFixtures {
    /// Test claimant display name
    pub fn claimant_name() -> &'static str {
        "Carlos Mendoza"
    }

    /// Test claimant email address
    pub fn claimant_email() -> &'static str {
        "carlos.mendoza@example.com"
    }

    /// Test reviewer display name
    pub fn reviewer_name() -> &'static str {
        "Laura Gomez"
    }

    /// Test reviewer email address
    pub fn reviewer_email() -> &'static str {
        "laura.gomez@example.com"
    }

    /// Standard uploaded file name
    pub fn pdf_name() -> &'static str {
        "medical_certificate.pdf"
    }

    /// File name rejected by upload validation
    pub fn executable_name() -> &'static str {
        "scan.exe"
    }
}
