use std::path::PathBuf;

use anyhow::{Context, Result};
use billing_core::logging::setup_logging;
use billing_core::settings::AnalyzerSettings;
use billing_data::analysis::analyze_timesheet;
use billing_invoice::{InvoiceGenerator, PdfLatex};

fn main() -> Result<()> {
    let settings = AnalyzerSettings::load();
    setup_logging(&settings.log_level);

    tracing::info!("process-timesheet v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::debug!("{:?}", settings);

    let output = run(&settings)?;
    tracing::info!("Stats: {}", output.stats.display());
    if let Some(invoice) = output.invoice {
        tracing::info!("Invoice: {}", invoice.display());
    }
    Ok(())
}

/// Output files of one run.
#[derive(Debug)]
struct RunOutput {
    stats: PathBuf,
    invoice: Option<PathBuf>,
}

fn run(settings: &AnalyzerSettings) -> Result<RunOutput> {
    settings.validate()?;
    let month = settings.target_month();

    let analysis = analyze_timesheet(&settings.csv_path, month, settings.work_policy())
        .with_context(|| format!("analysing {}", settings.csv_path.display()))?;

    let stats = settings.stats_path();
    analysis
        .write_stats(&stats, settings.stats_format)
        .context("writing stats")?;

    if settings.no_invoice {
        tracing::info!("Skipping invoice generation");
        return Ok(RunOutput {
            stats,
            invoice: None,
        });
    }

    let generator = InvoiceGenerator::new(PdfLatex::new(settings.latex_program.as_str()));
    let invoice = generator
        .generate(
            &settings.latex_template,
            &analysis.invoice_params(settings.rate),
            &settings.output_directory,
        )
        .context("generating invoice")?;

    Ok(RunOutput {
        stats,
        invoice: Some(invoice),
    })
}
