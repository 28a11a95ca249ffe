use std::sync::OnceLock;

use billing_core::formatting::{format_amount, format_date, format_hours, format_rate};
use billing_core::models::{InvoiceParams, TargetMonth};
use regex::{Captures, Regex};

/// A token of the invoice template replaced with a figure of the month.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// Last day of the month, `dd/mm/yyyy`.
    CurrentDate,
    /// `mm/yyyy`.
    CurrentInvoiceNumber,
    /// English month name.
    CurrentMonth,
    /// Four-digit year.
    CurrentYear,
    /// Billed hours, two decimals.
    WorkedHours,
    /// Hourly rate as given.
    HourlyRate,
    /// Hours times rate, two decimals.
    TotalAmount,
}

impl Placeholder {
    pub const ALL: [Placeholder; 7] = [
        Placeholder::CurrentDate,
        Placeholder::CurrentInvoiceNumber,
        Placeholder::CurrentMonth,
        Placeholder::CurrentYear,
        Placeholder::WorkedHours,
        Placeholder::HourlyRate,
        Placeholder::TotalAmount,
    ];

    /// The literal token as it appears in the template.
    pub fn token(self) -> &'static str {
        match self {
            Placeholder::CurrentDate => "CURRENTDATE",
            Placeholder::CurrentInvoiceNumber => "CURRENTINVOICENUMBER",
            Placeholder::CurrentMonth => "CURRENTMONTH",
            Placeholder::CurrentYear => "CURRENTYEAR",
            Placeholder::WorkedHours => "WORKEDHOURS",
            Placeholder::HourlyRate => "HOURLYRATE",
            Placeholder::TotalAmount => "TOTALAMOUNT",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.token() == token)
    }

    /// The text replacing this token for `params`.
    pub fn value(self, params: &InvoiceParams) -> String {
        let month = params.month;
        match self {
            Placeholder::CurrentDate => format_date(month.last_day()),
            Placeholder::CurrentInvoiceNumber => month.to_string(),
            Placeholder::CurrentMonth => month.month_name(),
            Placeholder::CurrentYear => format!("{:04}", month.year()),
            Placeholder::WorkedHours => format_hours(params.total_hours),
            Placeholder::HourlyRate => format_rate(params.hourly_rate),
            Placeholder::TotalAmount => format_amount(params.total_amount()),
        }
    }
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        let alternation = Placeholder::ALL.map(Placeholder::token).join("|");
        Regex::new(&alternation).expect("regex is valid")
    })
}

/// Replace every placeholder token of `template` with its value.
///
/// Replacement is a single pass over the template, so a substituted value
/// is never itself substituted.
pub fn fill_template(template: &str, params: &InvoiceParams) -> String {
    placeholder_regex()
        .replace_all(template, |caps: &Captures<'_>| {
            Placeholder::from_token(&caps[0])
                .map(|p| p.value(params))
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// File stem of the invoice for `month`, e.g. `"24.04 - Invoice"`.
pub fn invoice_stem(month: TargetMonth) -> String {
    format!("{:02}.{:02} - Invoice", month.year().rem_euclid(100), month.month())
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn april_params() -> InvoiceParams {
        InvoiceParams::new(TargetMonth::new(2024, 4).unwrap(), 154.0, 50.0)
    }

    #[test]
    fn test_placeholder_values() {
        let params = april_params();
        assert_eq!(Placeholder::CurrentDate.value(&params), "30/04/2024");
        assert_eq!(Placeholder::CurrentInvoiceNumber.value(&params), "04/2024");
        assert_eq!(Placeholder::CurrentMonth.value(&params), "April");
        assert_eq!(Placeholder::CurrentYear.value(&params), "2024");
        assert_eq!(Placeholder::WorkedHours.value(&params), "154.00");
        assert_eq!(Placeholder::HourlyRate.value(&params), "50");
        assert_eq!(Placeholder::TotalAmount.value(&params), "7700.00");
    }

    #[test]
    fn test_placeholder_current_date_leap_february() {
        let params = InvoiceParams::new(TargetMonth::new(2024, 2).unwrap(), 0.0, 1.0);
        assert_eq!(Placeholder::CurrentDate.value(&params), "29/02/2024");
    }

    #[test]
    fn test_placeholder_token_round_trip() {
        for placeholder in Placeholder::ALL {
            assert_eq!(Placeholder::from_token(placeholder.token()), Some(placeholder));
        }
        assert_eq!(Placeholder::from_token("NOTATOKEN"), None);
    }

    #[test]
    fn test_fill_template_replaces_every_token() {
        let template = "\\date{CURRENTDATE}\n\
                        Invoice CURRENTINVOICENUMBER for CURRENTMONTH CURRENTYEAR\n\
                        WORKEDHOURS h x HOURLYRATE = TOTALAMOUNT\n";

        let filled = fill_template(template, &april_params());

        assert_eq!(
            filled,
            "\\date{30/04/2024}\n\
             Invoice 04/2024 for April 2024\n\
             154.00 h x 50 = 7700.00\n"
        );
    }

    #[test]
    fn test_fill_template_repeated_tokens() {
        let filled = fill_template("CURRENTYEAR-CURRENTYEAR", &april_params());
        assert_eq!(filled, "2024-2024");
    }

    #[test]
    fn test_fill_template_without_tokens_is_unchanged() {
        let template = "\\documentclass{article}\n";
        assert_eq!(fill_template(template, &april_params()), template);
    }

    #[test]
    fn test_fill_template_fractional_rate() {
        let params = InvoiceParams::new(TargetMonth::new(2024, 4).unwrap(), 10.5, 42.5);
        assert_eq!(fill_template("HOURLYRATE/TOTALAMOUNT", &params), "42.5/446.25");
    }

    #[test]
    fn test_invoice_stem() {
        assert_eq!(invoice_stem(TargetMonth::new(2024, 4).unwrap()), "24.04 - Invoice");
        assert_eq!(invoice_stem(TargetMonth::new(2009, 12).unwrap()), "09.12 - Invoice");
    }
}
