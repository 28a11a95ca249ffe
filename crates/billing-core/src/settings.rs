use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::debug;

use crate::error::{BillingError, Result};
use crate::logging::LOG_LEVELS;
use crate::models::{TargetMonth, WorkPolicy, DEFAULT_WEEKLY_CAP};

/// Subject line used when none is given.
pub const DEFAULT_SUBJECT: &str = "Invoice for current month";

/// Output format of the statistics report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    /// Four-section plain text report.
    #[default]
    Text,
    /// Pretty-printed JSON with the same lists plus run metadata.
    Json,
}

// ── AnalyzerSettings (CLI) ─────────────────────────────────────────────────────

/// Analyse a monthly timesheet and generate its invoice
#[derive(Parser, Debug, Clone)]
#[command(
    name = "process-timesheet",
    about = "Analyse a monthly timesheet and generate its invoice",
    version
)]
pub struct AnalyzerSettings {
    /// Path to the CSV with the hour log
    #[arg(long, alias = "csv_path", default_value = "Time sheet.csv")]
    pub csv_path: PathBuf,

    /// Month to bill (mm/yyyy), defaults to the current month
    #[arg(long)]
    pub month: Option<TargetMonth>,

    /// Hourly rate
    #[arg(long, value_parser = parse_non_negative)]
    pub rate: f64,

    /// Output file with stats, relative to the output directory
    #[arg(long)]
    pub stats: Option<PathBuf>,

    /// Format of the stats file
    #[arg(long, value_enum, default_value_t = ReportFormat::Text)]
    pub stats_format: ReportFormat,

    /// LaTeX file with the bill template
    #[arg(long, alias = "latex_template", default_value = "billing_template.tex")]
    pub latex_template: PathBuf,

    /// Directory to place the output files
    #[arg(long, alias = "output_directory", default_value = ".")]
    pub output_directory: PathBuf,

    /// Typesetting program used to build the invoice PDF
    #[arg(long, env = "PDFLATEX", default_value = "pdflatex")]
    pub latex_program: String,

    /// Hours in a full working week
    #[arg(long, default_value_t = DEFAULT_WEEKLY_CAP, value_parser = parse_positive)]
    pub weekly_cap: f64,

    /// Only write the stats file, skip the invoice
    #[arg(long)]
    pub no_invoice: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = LOG_LEVELS)]
    pub log_level: String,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

impl AnalyzerSettings {
    /// Parse the process arguments and resolve date-dependent defaults.
    pub fn load() -> Self {
        Self::load_from(std::env::args_os())
    }

    /// Same as [`AnalyzerSettings::load`] with an explicit argument list.
    pub fn load_from<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::parse_from(args).resolve()
    }

    /// Pin the target month and apply the `--debug` flag.
    fn resolve(mut self) -> Self {
        if self.month.is_none() {
            let month = TargetMonth::current();
            debug!("No --month given, billing {}", month);
            self.month = Some(month);
        }
        if self.debug {
            self.log_level = "DEBUG".to_string();
        }
        self
    }

    /// Check the settings that clap cannot check on its own.
    pub fn validate(&self) -> Result<()> {
        debug!(
            "Billing {} from {} into {}",
            self.target_month(),
            self.csv_path.display(),
            self.output_directory.display()
        );
        if !self.output_directory.is_dir() {
            return Err(BillingError::Config(format!(
                "output directory {} does not exist",
                self.output_directory.display()
            )));
        }
        Ok(())
    }

    pub fn target_month(&self) -> TargetMonth {
        self.month.unwrap_or_else(TargetMonth::current)
    }

    pub fn work_policy(&self) -> WorkPolicy {
        WorkPolicy::new(self.weekly_cap)
    }

    /// Where the stats file is written: `--stats` (or `stats-<mmyyyy>.txt`)
    /// inside the output directory. An absolute `--stats` is used as is.
    ///
    /// The default name follows `--month`, not today's date.
    pub fn stats_path(&self) -> PathBuf {
        let name = self
            .stats
            .clone()
            .unwrap_or_else(|| default_stats_name(self.target_month(), self.stats_format));
        self.output_directory.join(name)
    }
}

/// `stats-<mmyyyy>.txt` (or `.json`) for `month`.
pub fn default_stats_name(month: TargetMonth, format: ReportFormat) -> PathBuf {
    let ext = match format {
        ReportFormat::Text => "txt",
        ReportFormat::Json => "json",
    };
    PathBuf::from(format!("stats-{:02}{:04}.{}", month.month(), month.year(), ext))
}

// ── MailerSettings (CLI) ───────────────────────────────────────────────────────

/// Send an e-mail with an optional attachment through an SMTP relay
#[derive(Parser, Clone)]
#[command(
    name = "email-pdf",
    about = "Send an e-mail with an optional attachment through an SMTP relay",
    version
)]
pub struct MailerSettings {
    /// Sender of the e-mail
    #[arg(long, env = "MAIL_FROM")]
    pub fromaddr: String,

    /// Receiver of the e-mail
    #[arg(long, env = "MAIL_TO")]
    pub toaddr: String,

    /// File to be attached
    #[arg(long)]
    pub attachment: Option<PathBuf>,

    /// Subject line
    #[arg(long, default_value = DEFAULT_SUBJECT)]
    pub subject: String,

    /// SMTP relay host
    #[arg(long, env = "SMTP_HOST", default_value = "smtp.gmail.com")]
    pub smtp_host: String,

    /// SMTP relay port (STARTTLS)
    #[arg(long, env = "SMTP_PORT", default_value_t = 587)]
    pub smtp_port: u16,

    /// SMTP login, defaults to the sender address
    #[arg(long, env = "SMTP_USERNAME")]
    pub smtp_username: Option<String>,

    /// SMTP password
    #[arg(long, env = "SMTP_PASSWORD", hide_env_values = true)]
    pub smtp_password: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = LOG_LEVELS)]
    pub log_level: String,

    /// File containing the body of the message
    pub body: PathBuf,
}

impl MailerSettings {
    /// The login used against the relay.
    pub fn username(&self) -> &str {
        self.smtp_username.as_deref().unwrap_or(&self.fromaddr)
    }
}

impl fmt::Debug for MailerSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MailerSettings")
            .field("fromaddr", &self.fromaddr)
            .field("toaddr", &self.toaddr)
            .field("attachment", &self.attachment)
            .field("subject", &self.subject)
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_username", &self.smtp_username)
            .field("smtp_password", &"<redacted>")
            .field("log_level", &self.log_level)
            .field("body", &self.body)
            .finish()
    }
}

// ── Value parsers ──────────────────────────────────────────────────────────────

fn parse_non_negative(s: &str) -> std::result::Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("{s:?} is not a number"))?;
    if !value.is_finite() || value < 0.0 {
        return Err(format!("{s:?} must be a non-negative number"));
    }
    Ok(value)
}

fn parse_positive(s: &str) -> std::result::Result<f64, String> {
    let value = parse_non_negative(s)?;
    if value == 0.0 {
        return Err(format!("{s:?} must be greater than zero"));
    }
    Ok(value)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
