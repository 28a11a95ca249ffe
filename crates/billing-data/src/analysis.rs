//! Main analysis pipeline.
//!
//! Loads the hours export, runs the anomaly analyzer and packages everything
//! the report writer and the invoice need into an [`AnalysisResult`].

use std::path::Path;

use billing_core::calendar::billable_days;
use billing_core::error::Result;
use billing_core::models::{DailyHours, InvoiceParams, TargetMonth, WorkPolicy};
use billing_core::settings::ReportFormat;
use serde::Serialize;
use tracing::{info, warn};

use crate::analyzer::{Report, TimesheetAnalyzer, WeekSummary};
use crate::reader::load_daily_hours;
use crate::report::{render_text, write_report};

// ── Public types ──────────────────────────────────────────────────────────────

/// Counts describing one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AnalysisMetadata {
    /// Daily entries kept from the hours export.
    pub entries_parsed: usize,
    /// Weekdays in the target month.
    pub billable_days: usize,
    /// Complete week windows that were judged.
    pub weeks_analysed: usize,
}

/// The complete output of [`analyze_timesheet`].
#[derive(Debug, Clone)]
pub struct AnalysisResult {
    pub month: TargetMonth,
    pub policy: WorkPolicy,
    pub hours: DailyHours,
    pub weeks: Vec<WeekSummary>,
    pub report: Report,
    /// Hours logged on days of the target month, weekends included.
    pub total_hours: f64,
    pub metadata: AnalysisMetadata,
}

/// JSON shape of the stats file.
#[derive(Serialize)]
struct StatsDocument<'a> {
    month: TargetMonth,
    policy: WorkPolicy,
    total_hours: f64,
    report: &'a Report,
    weeks: &'a [WeekSummary],
    metadata: AnalysisMetadata,
}

impl AnalysisResult {
    /// Invoice figures for this month at `hourly_rate`.
    pub fn invoice_params(&self, hourly_rate: f64) -> InvoiceParams {
        InvoiceParams::new(self.month, self.total_hours, hourly_rate)
    }

    /// Render the stats file contents in `format`.
    pub fn render(&self, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Text => Ok(render_text(&self.report)),
            ReportFormat::Json => {
                let doc = StatsDocument {
                    month: self.month,
                    policy: self.policy,
                    total_hours: self.total_hours,
                    report: &self.report,
                    weeks: &self.weeks,
                    metadata: self.metadata,
                };
                let mut json = serde_json::to_string_pretty(&doc)?;
                json.push('\n');
                Ok(json)
            }
        }
    }

    /// Render in `format` and write the stats file to `path`.
    pub fn write_stats(&self, path: &Path, format: ReportFormat) -> Result<()> {
        write_report(path, &self.render(format)?)?;
        info!("Stats written to {}", path.display());
        Ok(())
    }
}

// ── Public functions ──────────────────────────────────────────────────────────

/// Run the full pipeline on the export at `csv_path`.
///
/// 1. Load the daily hours of the month's window.
/// 2. Judge days and weeks with a [`TimesheetAnalyzer`].
/// 3. Sum the hours to bill.
pub fn analyze_timesheet(
    csv_path: &Path,
    month: TargetMonth,
    policy: WorkPolicy,
) -> Result<AnalysisResult> {
    let hours = load_daily_hours(csv_path, month)?;
    Ok(analyze_hours(hours, month, policy))
}

/// Run the analysis on an already loaded record.
pub fn analyze_hours(hours: DailyHours, month: TargetMonth, policy: WorkPolicy) -> AnalysisResult {
    let analyzer = TimesheetAnalyzer::new(policy);
    let weeks = analyzer.week_summaries(&hours);
    let report = TimesheetAnalyzer::analyze_with_weeks(&hours, month, &weeks);
    let total_hours = hours.total_in(month);

    let metadata = AnalysisMetadata {
        entries_parsed: hours.len(),
        billable_days: billable_days(month).len(),
        weeks_analysed: weeks.len(),
    };

    log_summary(month, &report, total_hours);

    AnalysisResult {
        month,
        policy,
        hours,
        weeks,
        report,
        total_hours,
        metadata,
    }
}

fn log_summary(month: TargetMonth, report: &Report, total_hours: f64) {
    info!("{}: {:.2} hours to bill", month, total_hours);
    if report.is_clean() {
        return;
    }
    warn!(
        "{}: {} weekend days billed, {} weekdays unbilled, {} weeks underworked, {} weeks overworked",
        month,
        report.billed_unbillable.len(),
        report.unbilled_billable.len(),
        report.underworked_weeks.len(),
        report.overworked_weeks.len()
    );
}

// ── Tests ─────────────────────────────────────────────────────────────────────
