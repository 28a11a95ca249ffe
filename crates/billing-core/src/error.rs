use std::path::PathBuf;

use chrono::NaiveDate;
use thiserror::Error;

/// All errors produced while analysing a timesheet and rendering its invoice.
#[derive(Error, Debug)]
pub enum BillingError {
    /// The same calendar date appears twice in the hours source.
    #[error("Duplicate information for {0}")]
    DuplicateEntry(NaiveDate),

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file could not be created or written.
    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No row of the hours source ends with the `TOTAL` marker.
    #[error("No TOTAL header row found in {0}")]
    HeaderNotFound(PathBuf),

    /// A cell in a date row is not a `dd/mm/yyyy` date.
    #[error("Invalid date {value:?} on row {row}")]
    InvalidDate { row: usize, value: String },

    /// A cell in an hours row is not a non-negative number.
    #[error("Invalid hours {value:?} on row {row}")]
    InvalidHours { row: usize, value: String },

    /// A target month string is not a valid `mm/yyyy` pair.
    #[error("Invalid month {0:?}, expected mm/yyyy")]
    InvalidMonth(String),

    /// The hours source is not readable as CSV.
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    /// The external typesetting program could not be launched.
    #[error("Failed to run {program}: {source}")]
    ProcessSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be produced.
    #[error("Failed to serialise JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Convenience alias used throughout the billing crates.
pub type Result<T> = std::result::Result<T, BillingError>;
