//! Business-day calendar
//!
//! Every deadline in the system is computed in business days: weekdays that
//! are not in the fixed national-holiday set. The calendar owns the holiday
//! set and provides the three operations all deadline math goes through:
//! membership, forward addition, and a signed distance.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use std::collections::HashSet;

/// National holidays for the covered years, as (year, month, day).
///
/// The set is fixed policy: it is compiled in rather than configured, and a
/// new release extends it when a new calendar year is published.
const STANDARD_HOLIDAYS: &[(i32, u32, u32)] = &[
    // 2025
    (2025, 1, 1),
    (2025, 1, 6),
    (2025, 3, 24),
    (2025, 4, 10),
    (2025, 4, 11),
    (2025, 5, 1),
    (2025, 5, 12),
    (2025, 6, 2),
    (2025, 6, 9),
    (2025, 6, 16),
    (2025, 6, 23),
    (2025, 6, 30),
    (2025, 7, 1),
    (2025, 7, 7),
    (2025, 7, 20),
    (2025, 7, 24),
    (2025, 8, 7),
    (2025, 8, 18),
    (2025, 10, 12),
    (2025, 10, 13),
    (2025, 11, 1),
    (2025, 11, 3),
    (2025, 11, 17),
    (2025, 12, 8),
    (2025, 12, 25),
    // 2026
    (2026, 1, 1),
    (2026, 1, 12),
    (2026, 3, 23),
    (2026, 4, 2),
    (2026, 4, 3),
    (2026, 5, 1),
    (2026, 5, 18),
    (2026, 6, 8),
    (2026, 6, 15),
    (2026, 6, 29),
    (2026, 7, 20),
    (2026, 8, 7),
    (2026, 8, 17),
    (2026, 10, 12),
    (2026, 11, 2),
    (2026, 11, 16),
    (2026, 12, 8),
    (2026, 12, 25),
];

/// Calendar of business days: weekdays excluding a fixed holiday set.
///
/// Cloning is cheap enough for the handful of services that hold one; the
/// holiday set stays in the low tens of entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusinessCalendar {
    holidays: HashSet<NaiveDate>,
}

impl BusinessCalendar {
    /// Creates a calendar with the compiled-in national holiday set.
    pub fn with_standard_holidays() -> Self {
        let holidays = STANDARD_HOLIDAYS
            .iter()
            .filter_map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d))
            .collect();
        Self { holidays }
    }

    /// Creates a calendar from an arbitrary holiday set.
    pub fn new(holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            holidays: holidays.into_iter().collect(),
        }
    }

    /// Returns true if the date is in the holiday set.
    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    /// Returns true if the date is a business day: a weekday that is not a holiday.
    pub fn is_business_day(&self, date: NaiveDate) -> bool {
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            return false;
        }
        !self.is_holiday(date)
    }

    /// Adds `n` business days to `start`, skipping weekends and holidays.
    ///
    /// Walks forward one calendar day at a time; `n` is always small (3 in
    /// the current deadline policy), so the linear walk is fine.
    /// `add_business_days(d, 0)` is `d` itself.
    pub fn add_business_days(&self, start: NaiveDate, n: u32) -> NaiveDate {
        let mut current = start;
        let mut added = 0;
        while added < n {
            current = next_day(current);
            if self.is_business_day(current) {
                added += 1;
            }
        }
        current
    }

    /// The first business day strictly after `date`.
    pub fn next_business_day(&self, date: NaiveDate) -> NaiveDate {
        self.add_business_days(date, 1)
    }

    /// Signed count of business days between two dates.
    ///
    /// Zero when the dates are equal. Positive when `to` is ahead of `from`:
    /// the number of business days strictly after `from` up to and including
    /// `to`. Negative when `to` is behind `from`, counting business days of
    /// lateness the same way. Callers use the one function for both "days
    /// remaining" and "days overdue".
    pub fn business_days_between(&self, from: NaiveDate, to: NaiveDate) -> i64 {
        if from == to {
            return 0;
        }

        if from > to {
            // Overdue: count business days walking from `to` up to `from`.
            let mut days = 0;
            let mut current = to;
            while current < from {
                current = next_day(current);
                if self.is_business_day(current) {
                    days -= 1;
                }
            }
            return days;
        }

        let mut days = 0;
        let mut current = from;
        while current < to {
            current = next_day(current);
            if self.is_business_day(current) {
                days += 1;
            }
        }
        days
    }
}

impl Default for BusinessCalendar {
    fn default() -> Self {
        Self::with_standard_holidays()
    }
}

fn next_day(date: NaiveDate) -> NaiveDate {
    // NaiveDate::MAX is hundreds of millennia out; treat overflow as unreachable.
    date.checked_add_days(Days::new(1)).unwrap_or(date)
}

/// Formats a date for human-facing notification copy, e.g. "Friday 17 October 2025".
pub fn long_date(date: NaiveDate) -> String {
    date.format("%A %-d %B %Y").to_string()
}
