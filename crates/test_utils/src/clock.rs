//! Controllable Clock
//!
//! A [`Clock`] implementation pinned to a settable instant so tests drive
//! deadline arithmetic by moving the date instead of waiting for wall time.

use std::sync::Mutex;

use chrono::{DateTime, NaiveDate, Utc};

use core_kernel::Clock;

use crate::fixtures::TemporalFixtures;

/// Clock frozen at a settable instant
///
/// Dates are pinned to midday UTC so `today` never straddles a midnight
/// boundary while a test runs.
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    /// Pins the clock to midday UTC on `date`
    pub fn at(date: NaiveDate) -> Self {
        Self {
            now: Mutex::new(TemporalFixtures::midday(date)),
        }
    }

    /// Pins the clock to an exact instant
    pub fn at_instant(instant: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(instant),
        }
    }

    /// Moves the clock to midday UTC on `date`
    pub fn advance_to(&self, date: NaiveDate) {
        *self.now.lock().unwrap() = TemporalFixtures::midday(date);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}
