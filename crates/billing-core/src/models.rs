use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Local, NaiveDate};
use serde::{Serialize, Serializer};
use tracing::debug;

use crate::calendar::{self, WORKDAYS_PER_WEEK};
use crate::error::{BillingError, Result};

/// Weekly hours above which a week counts as overworked.
pub const DEFAULT_WEEKLY_CAP: f64 = 35.0;

// ── TargetMonth ───────────────────────────────────────────────────────────────

/// The (year, month) pair being billed.
///
/// Always holds a valid month; construct it with [`TargetMonth::new`] or parse
/// it from `mm/yyyy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetMonth {
    first_day: NaiveDate,
}

impl TargetMonth {
    /// Build a target month, rejecting months outside `1..=12`.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first_day| Self { first_day })
            .ok_or_else(|| BillingError::InvalidMonth(format!("{:02}/{:04}", month, year)))
    }

    /// The month containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            first_day: date - Days::new(u64::from(date.day0())),
        }
    }

    /// The month containing today's local date.
    pub fn current() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    pub fn last_day(&self) -> NaiveDate {
        self.first_day + Days::new(u64::from(self.num_days() - 1))
    }

    pub fn num_days(&self) -> u32 {
        calendar::days_in_month(self.year(), self.month())
    }

    /// Monday of the week containing the first of the month.
    ///
    /// Hours are collected from this date so the first week can be judged as
    /// a whole.
    pub fn window_start(&self) -> NaiveDate {
        calendar::week_start(self.first_day)
    }

    /// Whether `date` lies within this month (same year and month).
    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year() && date.month() == self.month()
    }

    /// Every day of the month, ascending.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        self.first_day.iter_days().take(self.num_days() as usize)
    }

    /// English month name, e.g. `"April"`.
    pub fn month_name(&self) -> String {
        self.first_day.format("%B").to_string()
    }
}

impl fmt::Display for TargetMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:04}", self.month(), self.year())
    }
}

impl FromStr for TargetMonth {
    type Err = BillingError;

    /// Parse `mm/yyyy`. A single-digit month is accepted.
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || {
            debug!("Rejected target month {:?}", s);
            BillingError::InvalidMonth(s.to_string())
        };

        let (month, year) = s.trim().split_once('/').ok_or_else(invalid)?;
        if month.is_empty() || month.len() > 2 || year.len() != 4 {
            return Err(invalid());
        }
        let month: u32 = month.parse().map_err(|_| invalid())?;
        let year: i32 = year.parse().map_err(|_| invalid())?;

        Self::new(year, month).map_err(|_| invalid())
    }
}

impl Serialize for TargetMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ── DailyHours ────────────────────────────────────────────────────────────────

/// Worked hours keyed by calendar date, in ascending date order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DailyHours {
    entries: BTreeMap<NaiveDate, f64>,
}

impl DailyHours {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from `(date, hours)` pairs, failing on the first
    /// repeated date.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        let mut hours = Self::new();
        for (date, value) in entries {
            hours.insert(date, value)?;
        }
        Ok(hours)
    }

    /// Record `hours` for `date`. A date may only be recorded once.
    pub fn insert(&mut self, date: NaiveDate, hours: f64) -> Result<()> {
        if self.entries.contains_key(&date) {
            return Err(BillingError::DuplicateEntry(date));
        }
        self.entries.insert(date, hours);
        Ok(())
    }

    pub fn get(&self, date: NaiveDate) -> Option<f64> {
        self.entries.get(&date).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.entries.keys().next().copied()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.entries.keys().next_back().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.entries.iter().map(|(d, h)| (*d, *h))
    }

    /// Entries between `start` and `end`, both inclusive.
    pub fn range(&self, start: NaiveDate, end: NaiveDate) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.entries.range(start..=end).map(|(d, h)| (*d, *h))
    }

    /// Sum of the hours recorded on days of `month`, weekends included.
    pub fn total_in(&self, month: TargetMonth) -> f64 {
        self.iter()
            .filter(|(d, _)| month.contains(*d))
            .map(|(_, h)| h)
            .sum()
    }
}

// ── WorkPolicy ────────────────────────────────────────────────────────────────

/// Thresholds used to judge weekly workload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WorkPolicy {
    /// Hours expected in a full week; anything above is overworked.
    pub weekly_cap: f64,
}

impl Default for WorkPolicy {
    fn default() -> Self {
        Self {
            weekly_cap: DEFAULT_WEEKLY_CAP,
        }
    }
}

impl WorkPolicy {
    pub fn new(weekly_cap: f64) -> Self {
        Self { weekly_cap }
    }

    /// Hours of a single working day (`weekly_cap / 5`).
    pub fn daily_mean(&self) -> f64 {
        self.weekly_cap / f64::from(WORKDAYS_PER_WEEK)
    }

    /// The weekly cap reduced by one mean day per absent day.
    pub fn min_workable_hours(&self, absent_days: u32) -> f64 {
        self.weekly_cap - f64::from(absent_days) * self.daily_mean()
    }
}

// ── InvoiceParams ─────────────────────────────────────────────────────────────

/// Figures an invoice is filled in with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InvoiceParams {
    pub month: TargetMonth,
    pub total_hours: f64,
    pub hourly_rate: f64,
}

impl InvoiceParams {
    pub fn new(month: TargetMonth, total_hours: f64, hourly_rate: f64) -> Self {
        Self {
            month,
            total_hours,
            hourly_rate,
        }
    }

    pub fn total_amount(&self) -> f64 {
        self.total_hours * self.hourly_rate
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
