//! Shared domain types for the timesheet billing tools.
//!
//! Holds the calendar arithmetic, the error type, number/date formatting,
//! command-line settings and the logging bootstrap used by both binaries.

pub mod calendar;
pub mod error;
pub mod formatting;
pub mod logging;
pub mod models;
pub mod settings;
