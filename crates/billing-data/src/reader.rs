//! Hours export loading.
//!
//! The export is a comma-separated table. The first row whose last cell is
//! `TOTAL` starts the data; from there rows come in pairs, a row of
//! `dd/mm/yyyy` dates followed by a row of worked hours. The last non-empty
//! cell of every row is a running total and is discarded.

use std::io::Read;
use std::path::Path;

use billing_core::error::{BillingError, Result};
use billing_core::formatting::parse_date;
use billing_core::models::{DailyHours, TargetMonth};
use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, info};

/// Literal closing the header row.
pub const TOTAL_MARKER: &str = "TOTAL";

// ── Public API ────────────────────────────────────────────────────────────────

/// Load the hours export at `path` for `month`.
///
/// Only dates between the Monday of the week containing the first of the
/// month and the last day of the month are kept.
pub fn load_daily_hours(path: &Path, month: TargetMonth) -> Result<DailyHours> {
    let file = std::fs::File::open(path).map_err(|source| BillingError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let hours = parse_daily_hours(file, month, path)?;

    info!(
        "Loaded {} daily entries for {} from {}",
        hours.len(),
        month,
        path.display()
    );
    Ok(hours)
}

/// Parse an hours export from any reader.
///
/// `source` only names the input in errors.
pub fn parse_daily_hours<R: Read>(reader: R, month: TargetMonth, source: &Path) -> Result<DailyHours> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let records = csv_reader.records().collect::<std::result::Result<Vec<_>, _>>()?;

    let header = records
        .iter()
        .position(is_header_row)
        .ok_or_else(|| BillingError::HeaderNotFound(source.to_path_buf()))?;

    let window_start = month.window_start();
    let window_end = month.last_day();
    let mut hours = DailyHours::new();

    for pair in records[header..].chunks_exact(2) {
        let (date_row, hours_row) = (&pair[0], &pair[1]);
        let dates = data_cells(date_row);
        let values = data_cells(hours_row);

        for (index, cell) in dates.iter().enumerate() {
            let date = parse_date_cell(cell, row_number(date_row))?;

            if date < window_start || date > window_end {
                continue;
            }

            // A date without a matching hours cell was not worked.
            let worked = match values.get(index) {
                Some(value) => parse_hours_cell(value, row_number(hours_row))?,
                None => 0.0,
            };

            debug!("{}: {} hours", date, worked);
            hours.insert(date, worked)?;
        }
    }

    Ok(hours)
}

// ── Internal helpers ──────────────────────────────────────────────────────────

fn is_header_row(record: &StringRecord) -> bool {
    record.iter().last() == Some(TOTAL_MARKER)
}

/// Non-empty cells of a row, without the trailing total column.
fn data_cells(record: &StringRecord) -> Vec<&str> {
    let mut cells: Vec<&str> = record.iter().filter(|c| !c.is_empty()).collect();
    cells.pop();
    cells
}

/// 1-based line number of a record in the source.
fn row_number(record: &StringRecord) -> usize {
    record.position().map_or(0, |p| p.line() as usize)
}

fn parse_date_cell(cell: &str, row: usize) -> Result<NaiveDate> {
    parse_date(cell).ok_or_else(|| BillingError::InvalidDate {
        row,
        value: cell.to_string(),
    })
}

fn parse_hours_cell(cell: &str, row: usize) -> Result<f64> {
    match cell.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Ok(value),
        _ => Err(BillingError::InvalidHours {
            row,
            value: cell.to_string(),
        }),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
