//! Calendar arithmetic: month lengths, week boundaries and billable days.

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::models::TargetMonth;

/// Number of working days in a week; the mean daily hours derive from it.
pub const WORKDAYS_PER_WEEK: u32 = 5;

/// Whether `year` is a Gregorian leap year.
pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-12) of `year`.
///
/// Returns `0` for a month outside `1..=12`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.weekday().num_days_from_monday()))
}

/// Whether `date` falls on a Saturday or Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// All weekdays (Monday to Friday) of `month`, ascending.
///
/// There is no holiday calendar: every weekday counts.
pub fn billable_days(month: TargetMonth) -> Vec<NaiveDate> {
    month.days().filter(|d| !is_weekend(*d)).collect()
}

// ── Tests ──────────────────────────────────────────────────────────────────────
