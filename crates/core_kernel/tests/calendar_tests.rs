//! Comprehensive unit tests for the BusinessCalendar
//!
//! Tests cover business-day membership, forward addition across weekends
//! and holidays, and the signed between-count both callers rely on
//! ("days remaining" and "days overdue").

use chrono::NaiveDate;
use core_kernel::BusinessCalendar;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

mod membership {
    use super::*;

    #[test]
    fn test_plain_weekdays_are_business_days() {
        let cal = BusinessCalendar::with_standard_holidays();
        // Monday through Friday, week of 2025-10-20 (no holidays)
        for day in 20..=24 {
            assert!(cal.is_business_day(date(2025, 10, day)), "2025-10-{day}");
        }
    }

    #[test]
    fn test_saturday_and_sunday_are_not() {
        let cal = BusinessCalendar::with_standard_holidays();
        assert!(!cal.is_business_day(date(2025, 10, 25)));
        assert!(!cal.is_business_day(date(2025, 10, 26)));
    }

    #[test]
    fn test_standard_holidays_are_excluded() {
        let cal = BusinessCalendar::with_standard_holidays();
        // New Year, Labour Day, Christmas plus a moved Monday holiday
        assert!(!cal.is_business_day(date(2025, 1, 1)));
        assert!(!cal.is_business_day(date(2025, 5, 1)));
        assert!(!cal.is_business_day(date(2025, 12, 25)));
        assert!(!cal.is_business_day(date(2025, 10, 13)));
        assert!(!cal.is_business_day(date(2026, 1, 1)));
    }

    #[test]
    fn test_is_holiday_checks_only_the_set() {
        let cal = BusinessCalendar::with_standard_holidays();
        assert!(cal.is_holiday(date(2025, 12, 25)));
        // A Saturday is not a business day but is not a holiday either
        assert!(!cal.is_holiday(date(2025, 10, 25)));
    }
}

mod addition {
    use super::*;

    #[test]
    fn test_add_within_a_plain_week() {
        let cal = BusinessCalendar::with_standard_holidays();
        assert_eq!(cal.add_business_days(date(2025, 10, 20), 3), date(2025, 10, 23));
    }

    #[test]
    fn test_add_crosses_a_weekend() {
        let cal = BusinessCalendar::with_standard_holidays();
        // Thursday + 3 = Friday, Monday, Tuesday
        assert_eq!(cal.add_business_days(date(2025, 10, 23), 3), date(2025, 10, 28));
    }

    #[test]
    fn test_friday_plus_one_skips_holiday_monday() {
        let cal = BusinessCalendar::with_standard_holidays();
        // Friday 2025-10-10 -> Monday 10-13 is a holiday -> Tuesday 10-14
        assert_eq!(cal.add_business_days(date(2025, 10, 10), 1), date(2025, 10, 14));
        // Friday 2025-10-31 -> Monday 11-03 is a holiday -> Tuesday 11-04
        assert_eq!(cal.add_business_days(date(2025, 10, 31), 1), date(2025, 11, 4));
    }

    #[test]
    fn test_add_zero_returns_start_even_on_non_business_day() {
        let cal = BusinessCalendar::with_standard_holidays();
        assert_eq!(cal.add_business_days(date(2025, 10, 25), 0), date(2025, 10, 25));
        assert_eq!(cal.add_business_days(date(2025, 12, 25), 0), date(2025, 12, 25));
    }

    #[test]
    fn test_add_from_weekend_starts_counting_monday() {
        let cal = BusinessCalendar::with_standard_holidays();
        // Saturday 2025-10-25 + 1 = Monday 10-27
        assert_eq!(cal.add_business_days(date(2025, 10, 25), 1), date(2025, 10, 27));
    }

    #[test]
    fn test_next_business_day() {
        let cal = BusinessCalendar::with_standard_holidays();
        assert_eq!(cal.next_business_day(date(2025, 10, 24)), date(2025, 10, 27));
    }

    #[test]
    fn test_deadline_window_over_year_end() {
        let cal = BusinessCalendar::with_standard_holidays();
        // Tuesday 2025-12-30 + 3: Wed 31, skip Thu Jan 1 (holiday), Fri Jan 2,
        // skip weekend, Mon Jan 5.
        assert_eq!(cal.add_business_days(date(2025, 12, 30), 3), date(2026, 1, 5));
    }
}

mod between {
    use super::*;

    #[test]
    fn test_equal_dates_are_zero() {
        let cal = BusinessCalendar::with_standard_holidays();
        assert_eq!(cal.business_days_between(date(2025, 10, 20), date(2025, 10, 20)), 0);
        assert_eq!(cal.business_days_between(date(2025, 10, 25), date(2025, 10, 25)), 0);
    }

    #[test]
    fn test_days_remaining_is_positive() {
        let cal = BusinessCalendar::with_standard_holidays();
        assert_eq!(cal.business_days_between(date(2025, 10, 20), date(2025, 10, 23)), 3);
    }

    #[test]
    fn test_days_overdue_is_negative() {
        let cal = BusinessCalendar::with_standard_holidays();
        // Deadline Thursday 10-23, today Monday 10-27: Friday and Monday late
        assert_eq!(cal.business_days_between(date(2025, 10, 27), date(2025, 10, 23)), -2);
    }

    #[test]
    fn test_weekend_days_do_not_count() {
        let cal = BusinessCalendar::with_standard_holidays();
        // Friday to Monday is a single business day
        assert_eq!(cal.business_days_between(date(2025, 10, 24), date(2025, 10, 27)), 1);
    }

    #[test]
    fn test_holidays_do_not_count() {
        let cal = BusinessCalendar::with_standard_holidays();
        // Friday 2025-10-10 to Tuesday 10-14: Monday 10-13 is a holiday
        assert_eq!(cal.business_days_between(date(2025, 10, 10), date(2025, 10, 14)), 1);
    }

    #[test]
    fn test_antisymmetry_examples() {
        let cal = BusinessCalendar::with_standard_holidays();
        let pairs = [
            (date(2025, 10, 20), date(2025, 10, 23)),
            (date(2025, 10, 24), date(2025, 11, 4)),
            (date(2025, 12, 24), date(2026, 1, 2)),
        ];
        for (a, b) in pairs {
            assert_eq!(
                cal.business_days_between(a, b),
                -cal.business_days_between(b, a),
                "antisymmetry for {a} / {b}"
            );
        }
    }
}

mod custom_sets {
    use super::*;

    #[test]
    fn test_empty_holiday_set_only_skips_weekends() {
        let cal = BusinessCalendar::new([]);
        assert!(cal.is_business_day(date(2025, 12, 25)));
        assert_eq!(cal.add_business_days(date(2025, 12, 24), 1), date(2025, 12, 25));
    }

    #[test]
    fn test_injected_holiday_changes_the_walk() {
        let cal = BusinessCalendar::new([date(2025, 10, 22)]);
        // Monday + 3: Tue, skip Wed (holiday), Thu, Fri
        assert_eq!(cal.add_business_days(date(2025, 10, 20), 3), date(2025, 10, 24));
    }
}
