//! Timesheet ingestion and analysis.
//!
//! Reads the hours export into a [`DailyHours`](billing_core::models::DailyHours)
//! record, flags billing anomalies, and writes the statistics report.

pub mod analysis;
pub mod analyzer;
pub mod reader;
pub mod report;
