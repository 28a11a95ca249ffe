//! Plain-text statistics report.
//!
//! Four sections in a fixed order, each either a success line or a warning
//! followed by one tab-indented line per offending day or week.

use std::path::Path;

use billing_core::error::{BillingError, Result};
use billing_core::formatting::{format_date, format_hours};
use chrono::NaiveDate;

use crate::analyzer::{Report, WeekDeviation};

const NO_BILLED_UNBILLABLE: &str = "✔ No unbillable days have been billed";
const BILLED_UNBILLABLE: &str = "⚠️ WARNING: The following days were weekends but have been billed:";
const NO_UNBILLED_BILLABLE: &str = "✔ No billable days have been left unbilled";
const UNBILLED_BILLABLE: &str =
    "⚠️ WARNING: The following days were week days but have not been billed:";
const NO_UNDERWORKED: &str = "✔ No weeks have been underworked";
const UNDERWORKED: &str = "⚠️ WARNING: The following weeks have been underworked:";
const NO_OVERWORKED: &str = "✔ No weeks have been overworked";
const OVERWORKED: &str = "⚠️ WARNING: The following weeks have been over-worked: ";

/// Render `report` as the four-section text layout.
pub fn render_text(report: &Report) -> String {
    let mut out = String::new();

    push_section(
        &mut out,
        &report.billed_unbillable,
        NO_BILLED_UNBILLABLE,
        BILLED_UNBILLABLE,
        day_line,
    );
    push_section(
        &mut out,
        &report.unbilled_billable,
        NO_UNBILLED_BILLABLE,
        UNBILLED_BILLABLE,
        day_line,
    );
    push_section(
        &mut out,
        &report.underworked_weeks,
        NO_UNDERWORKED,
        UNDERWORKED,
        week_line,
    );
    push_section(
        &mut out,
        &report.overworked_weeks,
        NO_OVERWORKED,
        OVERWORKED,
        week_line,
    );

    out
}

/// Write already rendered report `contents` to `path`.
pub fn write_report(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|source| BillingError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn push_section<T>(
    out: &mut String,
    items: &[T],
    success: &str,
    warning: &str,
    line: fn(&T) -> String,
) {
    if items.is_empty() {
        out.push_str(success);
        out.push('\n');
    } else {
        out.push_str(warning);
        out.push('\n');
        for item in items {
            out.push('\t');
            out.push_str(&line(item));
            out.push('\n');
        }
    }
    out.push('\n');
}

fn day_line(date: &NaiveDate) -> String {
    format_date(*date)
}

fn week_line(week: &WeekDeviation) -> String {
    format!(
        "{} ({} hours)",
        format_date(week.week_start),
        format_hours(week.hours)
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_render_clean_report() {
        let text = render_text(&Report::default());

        assert_eq!(
            text,
            "✔ No unbillable days have been billed\n\
             \n\
             ✔ No billable days have been left unbilled\n\
             \n\
             ✔ No weeks have been underworked\n\
             \n\
             ✔ No weeks have been overworked\n\
             \n"
        );
    }

    #[test]
    fn test_render_all_sections_flagged() {
        let report = Report {
            billed_unbillable: vec![date(2024, 4, 6), date(2024, 4, 13)],
            unbilled_billable: vec![date(2024, 4, 22)],
            underworked_weeks: vec![WeekDeviation {
                week_start: date(2024, 4, 1),
                hours: 1.0,
            }],
            overworked_weeks: vec![WeekDeviation {
                week_start: date(2024, 4, 8),
                hours: 5.5,
            }],
        };

        let text = render_text(&report);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines,
            vec![
                BILLED_UNBILLABLE,
                "\t06/04/2024",
                "\t13/04/2024",
                "",
                UNBILLED_BILLABLE,
                "\t22/04/2024",
                "",
                UNDERWORKED,
                "\t01/04/2024 (1.00 hours)",
                "",
                OVERWORKED,
                "\t08/04/2024 (5.50 hours)",
                "",
            ]
        );
    }

    #[test]
    fn test_overworked_header_keeps_trailing_space() {
        assert!(OVERWORKED.ends_with(": "));
    }

    #[test]
    fn test_write_report_to_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stats-042024.txt");

        write_report(&path, &render_text(&Report::default())).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with(NO_BILLED_UNBILLABLE));
    }

    #[test]
    fn test_write_report_missing_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("stats.txt");

        let err = write_report(&path, "x").unwrap_err();
        assert!(matches!(err, BillingError::FileWrite { .. }));
    }
}
