//! Billing anomaly detection.
//!
//! Compares the logged days against the weekday calendar of the target month
//! and judges every complete week of the record against the [`WorkPolicy`].

use std::collections::BTreeSet;

use billing_core::calendar::billable_days;
use billing_core::models::{DailyHours, TargetMonth, WorkPolicy};
use chrono::{Days, NaiveDate};
use serde::Serialize;
use tracing::debug;

/// Length of an analysed week window.
const WEEK_DAYS: u64 = 7;

// ── Report types ──────────────────────────────────────────────────────────────

/// A week whose workload deviates from the policy, and by how many hours.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeekDeviation {
    pub week_start: NaiveDate,
    pub hours: f64,
}

/// The four anomaly lists, each in ascending date order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    /// Weekend days of the month that have hours logged.
    pub billed_unbillable: Vec<NaiveDate>,
    /// Weekdays of the month with no hours logged.
    pub unbilled_billable: Vec<NaiveDate>,
    /// Weeks below the minimum workable hours, with the deficit.
    pub underworked_weeks: Vec<WeekDeviation>,
    /// Weeks above the weekly cap, with the surplus.
    pub overworked_weeks: Vec<WeekDeviation>,
}

impl Report {
    /// `true` when none of the four lists has an entry.
    pub fn is_clean(&self) -> bool {
        self.billed_unbillable.is_empty()
            && self.unbilled_billable.is_empty()
            && self.underworked_weeks.is_empty()
            && self.overworked_weeks.is_empty()
    }
}

// ── WeekSummary ───────────────────────────────────────────────────────────────

/// Verdict for one week window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WeekStatus {
    Balanced,
    Underworked { deficit: f64 },
    Overworked { surplus: f64 },
}

/// Aggregates of one complete seven-day window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeekSummary {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub billed_hours: f64,
    /// Recorded days with exactly zero hours.
    pub absent_days: u32,
    pub min_workable_hours: f64,
    pub status: WeekStatus,
}

// ── TimesheetAnalyzer ─────────────────────────────────────────────────────────

/// Flags billing anomalies in a month of daily hours.
#[derive(Debug, Clone, Default)]
pub struct TimesheetAnalyzer {
    policy: WorkPolicy,
}

impl TimesheetAnalyzer {
    pub fn new(policy: WorkPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> WorkPolicy {
        self.policy
    }

    /// Build the full anomaly report for `month`.
    pub fn analyze(&self, hours: &DailyHours, month: TargetMonth) -> Report {
        let weeks = self.week_summaries(hours);
        Self::analyze_with_weeks(hours, month, &weeks)
    }

    /// Build the report from week summaries already computed for `hours`.
    pub fn analyze_with_weeks(
        hours: &DailyHours,
        month: TargetMonth,
        weeks: &[WeekSummary],
    ) -> Report {
        let underworked_weeks = weeks
            .iter()
            .filter_map(|w| match w.status {
                WeekStatus::Underworked { deficit } => Some(WeekDeviation {
                    week_start: w.start,
                    hours: deficit,
                }),
                _ => None,
            })
            .collect();

        let overworked_weeks = weeks
            .iter()
            .filter_map(|w| match w.status {
                WeekStatus::Overworked { surplus } => Some(WeekDeviation {
                    week_start: w.start,
                    hours: surplus,
                }),
                _ => None,
            })
            .collect();

        Report {
            billed_unbillable: Self::billed_unbillable(hours, month),
            unbilled_billable: Self::unbilled_billable(hours, month),
            underworked_weeks,
            overworked_weeks,
        }
    }

    /// Days of `month` with hours logged that are not billable (weekends).
    pub fn billed_unbillable(hours: &DailyHours, month: TargetMonth) -> Vec<NaiveDate> {
        let billable: BTreeSet<NaiveDate> = billable_days(month).into_iter().collect();
        Self::billed_days(hours, month)
            .difference(&billable)
            .copied()
            .collect()
    }

    /// Billable days of `month` without any hours logged.
    pub fn unbilled_billable(hours: &DailyHours, month: TargetMonth) -> Vec<NaiveDate> {
        let billed = Self::billed_days(hours, month);
        billable_days(month)
            .into_iter()
            .filter(|d| !billed.contains(d))
            .collect()
    }

    /// Summaries of every complete week of the record.
    ///
    /// Windows start on the first recorded date and advance by seven days;
    /// a window ending after the last recorded date is not judged.
    pub fn week_summaries(&self, hours: &DailyHours) -> Vec<WeekSummary> {
        let (Some(first), Some(last)) = (hours.first_date(), hours.last_date()) else {
            return Vec::new();
        };

        let mut summaries = Vec::new();
        let mut start = first;
        let mut end = start + Days::new(WEEK_DAYS - 1);

        while end <= last {
            let summary = self.summarize_week(hours, start, end);
            debug!(
                "Week {}: {:.2} hours billed, {} absent, {:.2} expected",
                start, summary.billed_hours, summary.absent_days, summary.min_workable_hours
            );
            summaries.push(summary);

            start = start + Days::new(WEEK_DAYS);
            end = start + Days::new(WEEK_DAYS - 1);
        }

        summaries
    }

    // ── Private ───────────────────────────────────────────────────────────────

    fn summarize_week(&self, hours: &DailyHours, start: NaiveDate, end: NaiveDate) -> WeekSummary {
        let mut billed_hours = 0.0;
        let mut absent_days = 0u32;
        for (_, worked) in hours.range(start, end) {
            billed_hours += worked;
            if worked == 0.0 {
                absent_days += 1;
            }
        }

        let min_workable_hours = self.policy.min_workable_hours(absent_days);
        let status = if billed_hours < min_workable_hours {
            WeekStatus::Underworked {
                deficit: min_workable_hours - billed_hours,
            }
        } else if billed_hours > self.policy.weekly_cap {
            WeekStatus::Overworked {
                surplus: billed_hours - self.policy.weekly_cap,
            }
        } else {
            WeekStatus::Balanced
        };

        WeekSummary {
            start,
            end,
            billed_hours,
            absent_days,
            min_workable_hours,
            status,
        }
    }

    /// Days of `month` with a positive number of hours.
    fn billed_days(hours: &DailyHours, month: TargetMonth) -> BTreeSet<NaiveDate> {
        hours
            .iter()
            .filter(|(d, h)| *h > 0.0 && month.contains(*d))
            .map(|(d, _)| d)
            .collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use billing_core::calendar::is_weekend;

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn april() -> TargetMonth {
        TargetMonth::new(2024, 4).unwrap()
    }

    /// Every day of April 2024: weekdays at `weekday_hours`, weekends at 0.
    fn april_hours(weekday_hours: f64) -> DailyHours {
        DailyHours::from_entries(april().days().map(|d| {
            let h = if is_weekend(d) { 0.0 } else { weekday_hours };
            (d, h)
        }))
        .unwrap()
    }

    /// Seven consecutive days from `start` with the given hours.
    fn week(start: NaiveDate, hours: [f64; 7]) -> DailyHours {
        DailyHours::from_entries(
            hours
                .iter()
                .enumerate()
                .map(|(i, h)| (start + Days::new(i as u64), *h)),
        )
        .unwrap()
    }

    // ── analyze ───────────────────────────────────────────────────────────────

    #[test]
    fn test_full_month_at_seven_hours_is_clean() {
        let report = TimesheetAnalyzer::default().analyze(&april_hours(7.0), april());

        assert!(report.billed_unbillable.is_empty());
        assert!(report.unbilled_billable.is_empty());
        assert!(report.underworked_weeks.is_empty());
        assert!(report.overworked_weeks.is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn test_saturday_hours_are_billed_unbillable() {
        let mut entries: Vec<(NaiveDate, f64)> = april_hours(7.0).iter().collect();
        for entry in entries.iter_mut() {
            if entry.0 == date(2024, 4, 13) {
                entry.1 = 3.0;
            }
        }
        let hours = DailyHours::from_entries(entries).unwrap();

        let report = TimesheetAnalyzer::default().analyze(&hours, april());

        assert_eq!(report.billed_unbillable, vec![date(2024, 4, 13)]);
        assert!(report.unbilled_billable.is_empty());
    }

    #[test]
    fn test_unbilled_weekdays_are_reported_in_order() {
        let hours = DailyHours::from_entries(april_hours(7.0).iter().map(|(d, h)| {
            if d == date(2024, 4, 22) || d == date(2024, 4, 3) {
                (d, 0.0)
            } else {
                (d, h)
            }
        }))
        .unwrap();

        let report = TimesheetAnalyzer::default().analyze(&hours, april());

        assert_eq!(
            report.unbilled_billable,
            vec![date(2024, 4, 3), date(2024, 4, 22)]
        );
    }

    #[test]
    fn test_missing_weekdays_are_unbilled() {
        // Only the first week logged.
        let hours = week(date(2024, 4, 1), [7.0, 7.0, 7.0, 7.0, 7.0, 0.0, 0.0]);

        let unbilled = TimesheetAnalyzer::unbilled_billable(&hours, april());

        assert_eq!(unbilled.len(), 22 - 5);
        assert_eq!(unbilled.first(), Some(&date(2024, 4, 8)));
    }

    #[test]
    fn test_days_outside_month_are_not_billed_unbillable() {
        // May 2024: the window opens on Monday 29 April.
        let may = TargetMonth::new(2024, 5).unwrap();
        let hours = week(date(2024, 4, 29), [7.0, 7.0, 7.0, 7.0, 7.0, 0.0, 0.0]);

        assert!(TimesheetAnalyzer::billed_unbillable(&hours, may).is_empty());

        // Sunday 28 April is outside May; Saturday 4 May is not.
        let hours =
            DailyHours::from_entries([(date(2024, 4, 28), 4.0), (date(2024, 5, 4), 1.0)]).unwrap();
        assert_eq!(
            TimesheetAnalyzer::billed_unbillable(&hours, may),
            vec![date(2024, 5, 4)]
        );
    }

    // ── week_summaries ────────────────────────────────────────────────────────

    #[test]
    fn test_underworked_week_deficit() {
        // Two absent weekdays and 20 hours billed: 35 - 2 * 7 = 21 expected.
        // The following Monday closes the window; the weekend is not recorded.
        let hours = DailyHours::from_entries([
            (date(2024, 4, 1), 7.0),
            (date(2024, 4, 2), 7.0),
            (date(2024, 4, 3), 6.0),
            (date(2024, 4, 4), 0.0),
            (date(2024, 4, 5), 0.0),
            (date(2024, 4, 8), 7.0),
        ])
        .unwrap();

        let report = TimesheetAnalyzer::default().analyze(&hours, april());

        assert_eq!(
            report.underworked_weeks,
            vec![WeekDeviation {
                week_start: date(2024, 4, 1),
                hours: 1.0
            }]
        );
        assert!(report.overworked_weeks.is_empty());
    }

    #[test]
    fn test_recorded_weekend_zeros_count_as_absent() {
        let hours = week(date(2024, 4, 1), [7.0, 7.0, 6.0, 0.0, 0.0, 0.0, 0.0]);

        let weeks = TimesheetAnalyzer::default().week_summaries(&hours);

        assert_eq!(weeks.len(), 1);
        assert_eq!(weeks[0].absent_days, 4);
        assert_eq!(weeks[0].min_workable_hours, 7.0);
        assert_eq!(weeks[0].billed_hours, 20.0);
        assert_eq!(weeks[0].status, WeekStatus::Balanced);
    }

    #[test]
    fn test_overworked_week_surplus() {
        let hours = week(date(2024, 4, 1), [8.0, 8.0, 8.0, 8.0, 8.0, 0.0, 0.0]);

        let report = TimesheetAnalyzer::default().analyze(&hours, april());

        assert_eq!(
            report.overworked_weeks,
            vec![WeekDeviation {
                week_start: date(2024, 4, 1),
                hours: 5.0
            }]
        );
        assert!(report.underworked_weeks.is_empty());
    }

    #[test]
    fn test_partial_trailing_week_is_excluded() {
        // 1-30 April: four complete weeks from Monday 1 April, then 29-30 April.
        let weeks = TimesheetAnalyzer::default().week_summaries(&april_hours(7.0));

        assert_eq!(weeks.len(), 4);
        assert_eq!(weeks[3].start, date(2024, 4, 22));
        assert_eq!(weeks[3].end, date(2024, 4, 28));
        assert!(weeks.iter().all(|w| w.status == WeekStatus::Balanced));
    }

    #[test]
    fn test_weeks_start_at_first_recorded_date() {
        let hours = DailyHours::from_entries((3..=16).map(|d| (date(2024, 4, d), 5.0))).unwrap();

        let weeks = TimesheetAnalyzer::default().week_summaries(&hours);

        assert_eq!(weeks.len(), 2);
        assert_eq!(weeks[0].start, date(2024, 4, 3));
        assert_eq!(weeks[1].start, date(2024, 4, 10));
        assert_eq!(weeks[0].billed_hours, 35.0);
    }

    #[test]
    fn test_empty_record_has_no_weeks() {
        let report = TimesheetAnalyzer::default().analyze(&DailyHours::new(), april());

        assert!(report.underworked_weeks.is_empty());
        assert!(report.overworked_weeks.is_empty());
        assert_eq!(report.unbilled_billable.len(), 22);
    }

    #[test]
    fn test_custom_weekly_cap() {
        let analyzer = TimesheetAnalyzer::new(WorkPolicy::new(40.0));
        let hours = week(date(2024, 4, 1), [7.0, 7.0, 7.0, 7.0, 7.0, 0.0, 0.0]);
        let weeks = analyzer.week_summaries(&hours);

        // 40 - 2 * 8 = 24 expected, 35 billed, not above the cap.
        assert_eq!(weeks[0].min_workable_hours, 24.0);
        assert_eq!(weeks[0].status, WeekStatus::Balanced);
    }

    #[test]
    fn test_analysis_is_deterministic() {
        let hours = april_hours(6.0);
        let analyzer = TimesheetAnalyzer::default();
        assert_eq!(analyzer.analyze(&hours, april()), analyzer.analyze(&hours, april()));
    }
}
