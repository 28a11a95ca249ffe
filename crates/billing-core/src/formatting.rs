use chrono::NaiveDate;

/// Day/month/year form used in reports and invoices.
pub const DATE_FORMAT: &str = "%d/%m/%Y";

/// Format a date as `dd/mm/yyyy`.
///
/// # Examples
///
/// ```
/// use billing_core::formatting::format_date;
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 4, 6).unwrap();
/// assert_eq!(format_date(date), "06/04/2024");
/// ```
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a `dd/mm/yyyy` date, tolerating surrounding whitespace.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

/// Format an hour count with exactly two decimals.
///
/// # Examples
///
/// ```
/// use billing_core::formatting::format_hours;
///
/// assert_eq!(format_hours(1.0), "1.00");
/// assert_eq!(format_hours(154.333), "154.33");
/// ```
pub fn format_hours(hours: f64) -> String {
    format!("{:.2}", hours)
}

/// Format a monetary amount with exactly two decimals and no currency sign.
pub fn format_amount(amount: f64) -> String {
    format!("{:.2}", amount)
}

/// Format an hourly rate in its shortest form: `50.0` becomes `"50"`,
/// `42.5` stays `"42.5"`.
pub fn format_rate(rate: f64) -> String {
    rate.to_string()
}

// ── Tests ──────────────────────────────────────────────────────────────────────
